//! Nutrient diffusion along room edges.
//!
//! Deltas for the whole graph are computed against a frozen view of the
//! state and only then applied, so the result does not depend on the order
//! rooms are visited in.

use crate::config::DiffusionConfig;
use crate::state::SimulationState;
use mycelium_core::topology::TopologyProvider;
use mycelium_core::types::*;
use std::collections::BTreeMap;

/// Fraction of a room's nutrient that leaves it over `dt` seconds.
///
/// Clamped to 1 so a very long tick can empty a room but never overdraw it.
pub fn outflow_fraction(config: &DiffusionConfig, dt: f64) -> f64 {
    (config.decay_factor * dt * config.outflow_scale).clamp(0.0, 1.0)
}

/// Compute per-room nutrient deltas for one diffusion step.
///
/// Each room above the floor loses `nutrient * fraction`, split evenly over
/// its current neighbors. Each neighbor receives its share scaled by the
/// edge's trail multiplier, so the amount received is never more than the
/// amount sent.
pub fn diffusion_deltas<T>(
    state: &SimulationState,
    topology: &T,
    config: &DiffusionConfig,
    dt: f64,
) -> BTreeMap<RoomId, f64>
where
    T: TopologyProvider + ?Sized,
{
    let fraction = outflow_fraction(config, dt);
    let mut deltas: BTreeMap<RoomId, f64> = BTreeMap::new();
    if fraction <= 0.0 {
        return deltas;
    }

    for (room, &nutrient) in state.nutrients() {
        if nutrient <= config.nutrient_floor {
            continue;
        }
        let neighbors = topology.neighbors(room);
        if neighbors.is_empty() {
            continue;
        }

        let outflow = nutrient * fraction;
        *deltas.entry(room.clone()).or_insert(0.0) -= outflow;

        let share = outflow / neighbors.len() as f64;
        for neighbor in neighbors {
            let trail = state.trail(&EdgeKey::new(room, &neighbor));
            *deltas.entry(neighbor).or_insert(0.0) += share * config.trail_multiplier(trail);
        }
    }

    deltas
}

/// Apply precomputed deltas. Results are clamped at zero.
pub fn apply_deltas(state: &mut SimulationState, deltas: &BTreeMap<RoomId, f64>) {
    for (room, delta) in deltas {
        state.add_nutrient(room, *delta);
    }
}

/// Run one full diffusion step.
pub fn diffuse<T>(state: &mut SimulationState, topology: &T, config: &DiffusionConfig, dt: f64)
where
    T: TopologyProvider + ?Sized,
{
    let deltas = diffusion_deltas(state, topology, config, dt);
    apply_deltas(state, &deltas);
}
