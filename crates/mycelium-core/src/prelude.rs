//! Mycelium Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use mycelium_core::prelude::*;
//! ```

pub use crate::types::{DecayingItem, EdgeKey, EdgeKind, RoomId, Tick, Timestamp};

pub use crate::topology::TopologyProvider;

pub use crate::compost::CompostSource;

pub use crate::store::{SnapshotStore, GROWN_EDGES_KEY, STATE_KEY};

pub use crate::clock::{Clock, ManualClock, SystemClock};

pub use crate::error::{MyceliumError, Result};
