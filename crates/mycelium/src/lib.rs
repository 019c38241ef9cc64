//! # Mycelium
//!
//! A living room graph. A site's rooms and exits are treated as an organism:
//! the room a visitor lingers in generates nutrient, nutrient diffuses along
//! the exits, well-fed rooms ripen, and paths the visitor keeps walking wear
//! into trails that eventually grow into new passages.
//!
//! ## Quick Start
//!
//! ```rust
//! use mycelium::prelude::*;
//!
//! let graph = RoomGraph::new(vec![
//!     RoomSpec::new("atrium").exits(["library", "garden"]),
//!     RoomSpec::new("library").exits(["archive"]),
//!     RoomSpec::new("garden"),
//!     RoomSpec::new("archive"),
//! ]);
//!
//! let mut mycelium = Mycelium::builder(graph)
//!     .config(MyceliumConfig::seeded(42))
//!     .compost_source(vec![DecayingItem::new("old-letter", 0.9)])
//!     .build()
//!     .unwrap();
//!
//! mycelium.on_room_enter(&RoomId::from("atrium"));
//! mycelium.run_fixed(50, 0.2);
//!
//! mycelium.on_room_enter(&RoomId::from("library"));
//! assert!(mycelium.trail_strength(&RoomId::from("atrium"), &RoomId::from("library")) > 0.0);
//!
//! for edge in mycelium.edges() {
//!     println!("{} ({:?}) trail {:.3}", edge.edge, edge.kind, edge.trail);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`mycelium_core`] - Shared types and the collaborator traits hosts implement
//! - [`mycelium_runtime`] - The tick engine, room graph, state store and snapshot backends
//!
//! ## The Tick
//!
//! | Phase | Biological Analog | What It Does |
//! |-------|-------------------|--------------|
//! | Generation | Photosynthesis | The visitor's room gains nutrient |
//! | Diffusion | Hyphal transport | Nutrient flows along exits, favouring worn trails |
//! | Ripening | Fruiting | Rooms above threshold ripen, never un-ripen |
//! | Bursts | Ethylene | A ripening milestone feeds every neighbor once |
//! | Composting | Decomposition | Forgotten memories become nutrient |
//! | Growth | Anastomosis | Worn two-hop paths grow a direct passage |
//!
//! ## Persistence
//!
//! State is flushed to a [`SnapshotStore`](mycelium_core::store::SnapshotStore)
//! on navigation and every few ticks; flushing never blocks or fails the tick.
//!
//! ```rust,ignore
//! use mycelium::prelude::*;
//!
//! let store = FileStore::new(".mycelium");
//! let graph = RoomGraph::new(rooms).with_store(Box::new(store.clone()));
//! let mycelium = Mycelium::builder(graph).store(store).build()?;
//! ```

// Re-export all subcrates
pub use mycelium_core as core;
pub use mycelium_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use mycelium::prelude::*;
/// ```
pub mod prelude {
    pub use mycelium_runtime::prelude::*;
}
