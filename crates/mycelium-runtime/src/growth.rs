//! Topology growth: wiring shortcuts along heavily used two-hop trails.
//!
//! If the visitor keeps walking `A -> B -> C`, both legs' trails stay high.
//! Once both exceed the growth threshold the organism grows a direct `A - C`
//! edge, the way a slime mold thickens a well-used route into a shortcut.

use crate::state::SimulationState;
use mycelium_core::topology::TopologyProvider;
use mycelium_core::types::*;

/// A two-hop path eligible to become a direct edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthCandidate {
    pub from: RoomId,
    pub via: RoomId,
    pub to: RoomId,
    /// The weaker of the two trail legs.
    pub strength: f64,
}

/// Find the first eligible far room reachable from `active` in two hops.
///
/// Neighbors are scanned in topology order, so the result is deterministic.
/// Rooms already connected to `active` and undiscoverable rooms are skipped.
pub fn find_candidate<T>(
    state: &SimulationState,
    topology: &T,
    active: &RoomId,
    threshold: f64,
) -> Option<GrowthCandidate>
where
    T: TopologyProvider + ?Sized,
{
    if !topology.is_discoverable(active) {
        return None;
    }
    let direct = topology.neighbors(active);

    for via in &direct {
        let first_leg = state.trail(&EdgeKey::new(active, via));
        if first_leg <= threshold {
            continue;
        }
        for far in topology.neighbors(via) {
            if &far == active || direct.contains(&far) || !topology.is_discoverable(&far) {
                continue;
            }
            let second_leg = state.trail(&EdgeKey::new(via, &far));
            if second_leg > threshold {
                return Some(GrowthCandidate {
                    from: active.clone(),
                    via: via.clone(),
                    to: far,
                    strength: first_leg.min(second_leg),
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room_graph::{RoomGraph, RoomSpec};

    fn r(id: &str) -> RoomId {
        RoomId::from(id)
    }

    fn corridor() -> RoomGraph {
        RoomGraph::new(vec![
            RoomSpec::new("a").exits(["b"]),
            RoomSpec::new("b").exits(["c", "h"]),
            RoomSpec::new("c"),
            RoomSpec::new("h").hidden(),
        ])
    }

    fn worn(state: &mut SimulationState, a: &str, b: &str, v: f64) {
        state.adjust_trail(&EdgeKey::new(&r(a), &r(b)), v);
    }

    #[test]
    fn both_legs_must_exceed_threshold() {
        let graph = corridor();
        let mut state = SimulationState::new();
        worn(&mut state, "a", "b", 0.9);
        worn(&mut state, "b", "c", 0.4);
        assert!(find_candidate(&state, &graph, &r("a"), 0.5).is_none());

        worn(&mut state, "b", "c", 0.3);
        let candidate = find_candidate(&state, &graph, &r("a"), 0.5).unwrap();
        assert_eq!(candidate.to, r("c"));
        assert_eq!(candidate.via, r("b"));
        assert!((candidate.strength - 0.7).abs() < 1e-12);
    }

    #[test]
    fn hidden_far_rooms_are_never_candidates() {
        let graph = corridor();
        let mut state = SimulationState::new();
        worn(&mut state, "a", "b", 0.9);
        worn(&mut state, "b", "h", 0.9);
        assert!(find_candidate(&state, &graph, &r("a"), 0.5).is_none());
    }

    #[test]
    fn already_connected_rooms_are_skipped() {
        let mut graph = corridor();
        let mut state = SimulationState::new();
        worn(&mut state, "a", "b", 0.9);
        worn(&mut state, "b", "c", 0.9);
        graph.add_grown_edge(&r("a"), &r("c")).unwrap();
        assert!(find_candidate(&state, &graph, &r("a"), 0.5).is_none());
    }
}
