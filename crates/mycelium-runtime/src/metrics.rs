//! Aggregate statistics over the simulation state.

use crate::state::SimulationState;
use mycelium_core::topology::TopologyProvider;
use mycelium_core::types::*;
use serde::Serialize;

/// Statistics about the Mycelium at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct MyceliumStats {
    pub tick: Tick,
    pub active_room: Option<RoomId>,
    pub rooms: usize,
    pub total_nutrient: f64,
    pub system_ripeness: f64,
    /// Rooms whose ripeness has reached 1.
    pub ripe_rooms: usize,
    pub milestones_fired: usize,
    pub live_trails: usize,
    pub strongest_trail: Option<(EdgeKey, f64)>,
    pub grown_edges: usize,
    pub composted: usize,
}

impl MyceliumStats {
    pub fn collect<T>(state: &SimulationState, topology: &T) -> Self
    where
        T: TopologyProvider + ?Sized,
    {
        let rooms = topology.rooms();
        let system_ripeness = if rooms.is_empty() {
            0.0
        } else {
            rooms.iter().map(|r| state.ripeness(r)).sum::<f64>() / rooms.len() as f64
        };
        let strongest_trail = state
            .trails()
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(k, v)| (k.clone(), *v));

        Self {
            tick: state.tick(),
            active_room: state.active().cloned(),
            rooms: rooms.len(),
            total_nutrient: state.nutrients().values().sum(),
            system_ripeness,
            ripe_rooms: state.ripeness_map().values().filter(|&&v| v >= 1.0).count(),
            milestones_fired: state.fired_count(),
            live_trails: state.trails().len(),
            strongest_trail,
            grown_edges: topology.grown_edges().len(),
            composted: state.composted().len(),
        }
    }

    /// Ripeness of the rooms ranked highest first, for reports.
    pub fn top_ripeness(state: &SimulationState, n: usize) -> Vec<(RoomId, f64)> {
        let mut ranked: Vec<(RoomId, f64)> = state
            .ripeness_map()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room_graph::{RoomGraph, RoomSpec};

    #[test]
    fn collects_totals() {
        let graph = RoomGraph::new(vec![
            RoomSpec::new("a").exits(["b"]),
            RoomSpec::new("b"),
        ]);
        let mut state = SimulationState::new();
        let (a, b) = (RoomId::from("a"), RoomId::from("b"));
        state.set_nutrient(&a, 1.5);
        state.set_nutrient(&b, 0.5);
        state.ripen(&a, 1.0);
        state.adjust_trail(&EdgeKey::new(&a, &b), 0.3);

        let stats = MyceliumStats::collect(&state, &graph);
        assert_eq!(stats.rooms, 2);
        assert!((stats.total_nutrient - 2.0).abs() < 1e-12);
        assert!((stats.system_ripeness - 0.5).abs() < 1e-12);
        assert_eq!(stats.ripe_rooms, 1);
        assert_eq!(stats.strongest_trail, Some((EdgeKey::new(&a, &b), 0.3)));

        let top = MyceliumStats::top_ripeness(&state, 5);
        assert_eq!(top[0].0, a);
    }
}
