//! # Mycelium Runtime
//!
//! The simulation engine and its host plumbing.
//!
//! The runtime is the organism: it owns the room graph, the per-room state,
//! and the tick that moves nutrient through the world, ripens rooms, composts
//! forgotten memories and grows new passages along worn trails.
//!
//! ```rust
//! use mycelium_runtime::prelude::*;
//!
//! let graph = RoomGraph::new(vec![
//!     RoomSpec::new("atrium").exits(["library", "garden"]),
//!     RoomSpec::new("library"),
//!     RoomSpec::new("garden"),
//! ]);
//! let mut mycelium = Mycelium::new(graph);
//! mycelium.on_room_enter(&RoomId::from("atrium"));
//! mycelium.run_fixed(10, 0.2);
//! assert!(mycelium.nutrients(&RoomId::from("atrium")) > 0.0);
//! ```

pub mod compost;
pub mod config;
pub mod diffusion;
pub mod engine;
pub mod events;
pub mod growth;
pub mod metrics;
pub mod persistence;
pub mod room_graph;
pub mod state;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;

#[cfg(feature = "async")]
pub mod async_runtime;

pub mod prelude;
