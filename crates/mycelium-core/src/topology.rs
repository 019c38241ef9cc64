//! Topology: the room-navigation graph.
//!
//! The base graph is defined outside the simulation and never changes. The
//! Mycelium can only add to it: grown edges are layered on top, persisted,
//! and never removed.

use crate::error::Result;
use crate::types::*;

/// The room graph as seen by the simulation.
///
/// This is a trait rather than a concrete type so that hosts can supply the
/// site's own graph definition.
pub trait TopologyProvider {
    /// All known rooms, in a stable order.
    fn rooms(&self) -> Vec<RoomId>;

    /// Whether the room exists in the base graph.
    fn contains(&self, room: &RoomId) -> bool;

    /// Current neighbors: static edges first, then grown ones, without
    /// duplicates. Unknown rooms have no neighbors.
    fn neighbors(&self, room: &RoomId) -> Vec<RoomId>;

    /// Whether grown edges may attach to this room.
    fn is_discoverable(&self, room: &RoomId) -> bool;

    /// Whether the base graph already connects `a` and `b`.
    fn is_statically_connected(&self, a: &RoomId, b: &RoomId) -> bool;

    /// Whether `a` and `b` are connected by any edge, static or grown.
    fn is_connected(&self, a: &RoomId, b: &RoomId) -> bool {
        self.neighbors(a).iter().any(|n| n == b)
    }

    /// Add an undirected grown edge.
    ///
    /// Returns `Ok(true)` if the edge was new, `Ok(false)` if it already
    /// existed as a grown edge. Refuses loops, unknown or undiscoverable
    /// endpoints, and statically connected pairs.
    fn add_grown_edge(&mut self, a: &RoomId, b: &RoomId) -> Result<bool>;

    /// All grown edges, in key order.
    fn grown_edges(&self) -> Vec<EdgeKey>;

    /// Every current edge (static and grown) with its kind.
    fn all_edges(&self) -> Vec<(EdgeKey, EdgeKind)>;

    /// Number of rooms.
    fn room_count(&self) -> usize {
        self.rooms().len()
    }
}
