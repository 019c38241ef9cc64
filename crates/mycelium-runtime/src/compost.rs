//! Compost bridge: turns decayed external memories into nutrient.
//!
//! The bridge pulls from a [`CompostSource`] and credits at most one item per
//! check. Credited ids are recorded in the state store, so an item that stays
//! in the source's list is never credited twice, even across restarts.

use crate::config::CompostConfig;
use crate::state::SimulationState;
use mycelium_core::compost::CompostSource;
use mycelium_core::error::Result;
use mycelium_core::topology::TopologyProvider;
use mycelium_core::types::*;

/// What a successful compost check credited.
#[derive(Debug, Clone, PartialEq)]
pub struct CompostCredit {
    pub item: String,
    pub room: RoomId,
    /// Credited to the active room.
    pub amount: f64,
    /// Credited to each of the active room's neighbors.
    pub neighbor_amount: f64,
    pub neighbors: Vec<RoomId>,
}

/// Nutrient credited to the active room for an item with this decay degree.
pub fn compost_amount(config: &CompostConfig, decay_degree: f64) -> f64 {
    decay_degree.clamp(0.0, 1.0) * config.yield_per_decay
}

/// Pull-based adapter between the simulation and a compost source.
#[derive(Default)]
pub struct CompostBridge {
    source: Option<Box<dyn CompostSource + Send>>,
}

impl CompostBridge {
    pub fn new(source: Box<dyn CompostSource + Send>) -> Self {
        Self { source: Some(source) }
    }

    /// A bridge with nothing to pull from.
    pub fn disconnected() -> Self {
        Self { source: None }
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }

    pub fn set_source(&mut self, source: Box<dyn CompostSource + Send>) {
        self.source = Some(source);
    }

    /// Run one compost check.
    ///
    /// Returns `Ok(None)` when nothing was eligible (or no source is
    /// attached) and `Err` when the source could not be queried; in both
    /// cases the state is untouched.
    pub fn check<T>(
        &self,
        state: &mut SimulationState,
        topology: &T,
        active: &RoomId,
        config: &CompostConfig,
    ) -> Result<Option<CompostCredit>>
    where
        T: TopologyProvider + ?Sized,
    {
        let Some(source) = self.source.as_ref() else {
            return Ok(None);
        };
        let items = source.list_decaying_items()?;

        let Some(item) = items.into_iter().find(|item| {
            item.decay_degree > config.threshold && !state.composted_contains(&item.id)
        }) else {
            return Ok(None);
        };

        let amount = compost_amount(config, item.decay_degree);
        state.add_nutrient(active, amount);

        let neighbors = topology.neighbors(active);
        let neighbor_amount = if neighbors.is_empty() {
            0.0
        } else {
            amount * config.neighbor_share / neighbors.len() as f64
        };
        for neighbor in &neighbors {
            state.add_nutrient(neighbor, neighbor_amount);
        }

        state.mark_composted(&item.id);
        Ok(Some(CompostCredit {
            item: item.id,
            room: active.clone(),
            amount,
            neighbor_amount,
            neighbors,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room_graph::{RoomGraph, RoomSpec};
    use mycelium_core::error::MyceliumError;

    fn r(id: &str) -> RoomId {
        RoomId::from(id)
    }

    fn graph() -> RoomGraph {
        RoomGraph::new(vec![
            RoomSpec::new("crypt").exits(["nave", "cloister"]),
            RoomSpec::new("nave"),
            RoomSpec::new("cloister"),
        ])
    }

    #[test]
    fn credits_first_eligible_item_once() {
        let graph = graph();
        let config = CompostConfig::default();
        let bridge = CompostBridge::new(Box::new(vec![
            DecayingItem::new("fresh", 0.2),
            DecayingItem::new("old-letter", 0.9),
            DecayingItem::new("old-photo", 0.95),
        ]));
        let mut state = SimulationState::new();

        let credit = bridge.check(&mut state, &graph, &r("crypt"), &config).unwrap().unwrap();
        assert_eq!(credit.item, "old-letter");
        assert!((state.nutrient(&r("crypt")) - 0.9 * 3.0).abs() < 1e-12);
        assert!((state.nutrient(&r("nave")) - 0.9 * 3.0 * 0.25 / 2.0).abs() < 1e-12);

        // Next check moves on to the next eligible item.
        let credit = bridge.check(&mut state, &graph, &r("crypt"), &config).unwrap().unwrap();
        assert_eq!(credit.item, "old-photo");

        // Then nothing is left.
        assert!(bridge.check(&mut state, &graph, &r("crypt"), &config).unwrap().is_none());
        assert_eq!(state.composted().len(), 2);
    }

    #[test]
    fn threshold_is_exclusive() {
        let graph = graph();
        let config = CompostConfig::default();
        let bridge = CompostBridge::new(Box::new(vec![DecayingItem::new("edge", 0.7)]));
        let mut state = SimulationState::new();
        assert!(bridge.check(&mut state, &graph, &r("crypt"), &config).unwrap().is_none());
    }

    #[test]
    fn unavailable_source_leaves_state_untouched() {
        let graph = graph();
        let config = CompostConfig::default();
        let source = || -> Result<Vec<DecayingItem>> {
            Err(MyceliumError::compost_unavailable("memory service down"))
        };
        let bridge = CompostBridge::new(Box::new(source));
        let mut state = SimulationState::new();
        assert!(bridge.check(&mut state, &graph, &r("crypt"), &config).is_err());
        assert!(state.nutrients().is_empty());
    }

    #[test]
    fn disconnected_bridge_does_nothing() {
        let graph = graph();
        let bridge = CompostBridge::disconnected();
        let mut state = SimulationState::new();
        let result = bridge.check(&mut state, &graph, &r("crypt"), &CompostConfig::default());
        assert!(matches!(result, Ok(None)));
        assert!(!bridge.is_connected());
    }
}
