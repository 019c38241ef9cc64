//! # Mycelium Core
//!
//! Core types and collaborator traits for the Mycelium simulation.
//!
//! The Mycelium treats a site's room-navigation graph as a living organism.
//! This crate holds the vocabulary shared by every other crate:
//!
//! - **Types** - room identities, undirected edge keys, timestamps, decaying items
//! - **TopologyProvider** - the room graph, static edges plus grown ones
//! - **CompostSource** - pull-based feed of decaying external memories
//! - **SnapshotStore** - string key-value persistence for derived state
//! - **Clock** - wall-clock source, swappable for deterministic tests
//!
//! ## Quick Start
//!
//! ```rust
//! use mycelium_core::prelude::*;
//!
//! let a = RoomId::from("atrium");
//! let b = RoomId::from("boiler");
//!
//! // Edge keys are undirected: both orders produce the same key.
//! assert_eq!(EdgeKey::new(&a, &b), EdgeKey::new(&b, &a));
//! ```

pub mod types;
pub mod topology;
pub mod compost;
pub mod store;
pub mod clock;
pub mod error;
pub mod prelude;
