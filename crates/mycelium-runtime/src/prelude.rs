//! Mycelium Runtime Prelude - convenient imports for common usage.
//!
//! ```rust
//! use mycelium_runtime::prelude::*;
//! ```

pub use mycelium_core::prelude::*;

// Re-export the engine
pub use crate::engine::{EdgeView, Mycelium, MyceliumBuilder};
pub use crate::events::{EventQueue, MyceliumEvent};
pub use crate::metrics::MyceliumStats;

// Re-export configuration
pub use crate::config::{
    CompostConfig, DiffusionConfig, GrowthConfig, MyceliumConfig, RipeningConfig, TrailConfig,
};

// Re-export topology and state
pub use crate::room_graph::{RoomGraph, RoomSpec};
pub use crate::state::{SimulationState, Snapshot, SNAPSHOT_VERSION};

// Re-export store backends
pub use crate::persistence::{FileStore, MemoryStore, UnavailableStore};

#[cfg(feature = "sqlite")]
pub use crate::sqlite_store::SqliteStore;

#[cfg(feature = "async")]
pub use crate::async_runtime::{shared, spawn_ticker, SharedMycelium, TickerHandle};
