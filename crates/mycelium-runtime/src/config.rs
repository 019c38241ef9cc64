//! Simulation parameters.
//!
//! Every constant the tick uses lives here so hosts can tune the organism
//! without touching the engine. Use with `Mycelium::builder()` or
//! `Mycelium::from_config()`.

use mycelium_core::error::{MyceliumError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the Mycelium simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MyceliumConfig {
    /// Wall-clock interval between ticks in milliseconds (default: 200).
    pub tick_interval_ms: u64,
    /// Upper bound on a single tick's dt in seconds (default: 30.0).
    pub max_dt_secs: f64,

    /// Nutrient generated per second at the active room (default: 0.5).
    pub generation_rate: f64,
    /// Flush the snapshot every this many ticks (default: 25).
    pub flush_every_ticks: u64,
    /// Capacity of the render event queue (default: 256).
    pub event_queue_capacity: usize,
    /// Seed for the sampling RNG. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Diffusion settings.
    pub diffusion: DiffusionConfig,
    /// Trail reinforcement and decay.
    pub trails: TrailConfig,
    /// Ripening and ethylene bursts.
    pub ripening: RipeningConfig,
    /// Compost bridge.
    pub compost: CompostConfig,
    /// Topology growth.
    pub growth: GrowthConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionConfig {
    /// Fraction of a room's nutrient that leaves it per second, before
    /// `outflow_scale` (default: 0.3).
    pub decay_factor: f64,
    /// Extra scale on outflow (default: 0.5).
    pub outflow_scale: f64,
    /// Share multiplier on an edge with no trail (default: 0.3).
    pub trail_floor: f64,
    /// Share multiplier on a fully reinforced edge (default: 1.0).
    pub trail_ceiling: f64,
    /// Rooms at or below this nutrient do not diffuse (default: 1e-4).
    pub nutrient_floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Added to an edge's trail per traversal (default: 0.15).
    pub increment: f64,
    /// Per-tick multiplicative decay (default: 0.998).
    pub decay: f64,
    /// Trails below this are dropped (default: 1e-3).
    pub epsilon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RipeningConfig {
    /// Nutrient above which a room ripens (default: 1.0).
    pub threshold: f64,
    /// Ripeness gained per second just above threshold (default: 0.01).
    pub base_rate: f64,
    /// Rate bonus per unit of excess nutrient (default: 0.25).
    pub excess_gain: f64,
    /// Cap on the excess bonus (default: 2.0, i.e. at most 3x base rate).
    pub excess_cap: f64,
    /// Ripeness milestones that fire ethylene bursts, ascending
    /// (default: [0.25, 0.5, 0.75, 1.0]).
    pub milestones: Vec<f64>,
    /// Each neighbor receives `milestone * burst_strength` (default: 0.5).
    pub burst_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompostConfig {
    /// Query the compost source every this many ticks (default: 50).
    pub check_every_ticks: u64,
    /// Items must have decayed beyond this (default: 0.7).
    pub threshold: f64,
    /// Nutrient per unit of decay credited to the active room (default: 3.0).
    pub yield_per_decay: f64,
    /// Fraction of the credit shared among the active room's neighbors
    /// (default: 0.25).
    pub neighbor_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Probability that a tick runs the growth check (default: 0.05).
    pub probability: f64,
    /// Both trail legs of a two-hop path must exceed this (default: 0.5).
    pub threshold: f64,
}

impl Default for MyceliumConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            max_dt_secs: 30.0,
            generation_rate: 0.5,
            diffusion: DiffusionConfig::default(),
            trails: TrailConfig::default(),
            ripening: RipeningConfig::default(),
            compost: CompostConfig::default(),
            growth: GrowthConfig::default(),
            flush_every_ticks: 25,
            event_queue_capacity: 256,
            seed: None,
        }
    }
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            decay_factor: 0.3,
            outflow_scale: 0.5,
            trail_floor: 0.3,
            trail_ceiling: 1.0,
            nutrient_floor: 1e-4,
        }
    }
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            increment: 0.15,
            decay: 0.998,
            epsilon: 1e-3,
        }
    }
}

impl Default for RipeningConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            base_rate: 0.01,
            excess_gain: 0.25,
            excess_cap: 2.0,
            milestones: vec![0.25, 0.5, 0.75, 1.0],
            burst_strength: 0.5,
        }
    }
}

impl Default for CompostConfig {
    fn default() -> Self {
        Self {
            check_every_ticks: 50,
            threshold: 0.7,
            yield_per_decay: 3.0,
            neighbor_share: 0.25,
        }
    }
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            probability: 0.05,
            threshold: 0.5,
        }
    }
}

impl DiffusionConfig {
    /// Map a trail strength in [0, 1] onto the share multiplier: a floor plus
    /// a trail-proportional bonus.
    pub fn trail_multiplier(&self, trail: f64) -> f64 {
        self.trail_floor + (self.trail_ceiling - self.trail_floor) * trail.clamp(0.0, 1.0)
    }
}

impl RipeningConfig {
    /// Ripeness gained over `dt` seconds at the given nutrient level.
    /// Zero at or below the threshold.
    pub fn ripen_amount(&self, nutrient: f64, dt: f64) -> f64 {
        let excess = nutrient - self.threshold;
        if excess <= 0.0 {
            return 0.0;
        }
        let bonus = (excess * self.excess_gain).min(self.excess_cap);
        self.base_rate * (1.0 + bonus) * dt
    }
}

impl MyceliumConfig {
    /// A config with a fixed RNG seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Check every parameter is in a range the tick can work with.
    pub fn validate(&self) -> Result<()> {
        fn unit(field: &str, v: f64) -> Result<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(MyceliumError::invalid_config(field, v, "must be in [0, 1]"))
            }
        }
        fn non_negative(field: &str, v: f64) -> Result<()> {
            if v >= 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(MyceliumError::invalid_config(field, v, "must be finite and >= 0"))
            }
        }

        if self.tick_interval_ms == 0 {
            return Err(MyceliumError::invalid_config("tick_interval_ms", 0, "must be > 0"));
        }
        non_negative("max_dt_secs", self.max_dt_secs)?;
        non_negative("generation_rate", self.generation_rate)?;

        non_negative("diffusion.decay_factor", self.diffusion.decay_factor)?;
        non_negative("diffusion.outflow_scale", self.diffusion.outflow_scale)?;
        unit("diffusion.trail_floor", self.diffusion.trail_floor)?;
        unit("diffusion.trail_ceiling", self.diffusion.trail_ceiling)?;
        if self.diffusion.trail_floor > self.diffusion.trail_ceiling {
            return Err(MyceliumError::invalid_config(
                "diffusion.trail_floor",
                self.diffusion.trail_floor,
                "must not exceed trail_ceiling",
            ));
        }
        non_negative("diffusion.nutrient_floor", self.diffusion.nutrient_floor)?;

        unit("trails.increment", self.trails.increment)?;
        if !(self.trails.decay > 0.0 && self.trails.decay < 1.0) {
            return Err(MyceliumError::invalid_config("trails.decay", self.trails.decay, "must be in (0, 1)"));
        }
        unit("trails.epsilon", self.trails.epsilon)?;

        non_negative("ripening.threshold", self.ripening.threshold)?;
        non_negative("ripening.base_rate", self.ripening.base_rate)?;
        non_negative("ripening.excess_gain", self.ripening.excess_gain)?;
        non_negative("ripening.excess_cap", self.ripening.excess_cap)?;
        non_negative("ripening.burst_strength", self.ripening.burst_strength)?;
        let mut previous = 0.0;
        for &m in &self.ripening.milestones {
            if !(m > 0.0 && m <= 1.0) || m <= previous {
                return Err(MyceliumError::invalid_config(
                    "ripening.milestones",
                    m,
                    "must be strictly ascending within (0, 1]",
                ));
            }
            previous = m;
        }

        if self.compost.check_every_ticks == 0 {
            return Err(MyceliumError::invalid_config("compost.check_every_ticks", 0, "must be > 0"));
        }
        unit("compost.threshold", self.compost.threshold)?;
        non_negative("compost.yield_per_decay", self.compost.yield_per_decay)?;
        unit("compost.neighbor_share", self.compost.neighbor_share)?;

        unit("growth.probability", self.growth.probability)?;
        unit("growth.threshold", self.growth.threshold)?;

        if self.flush_every_ticks == 0 {
            return Err(MyceliumError::invalid_config("flush_every_ticks", 0, "must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        MyceliumConfig::default().validate().unwrap();
    }

    #[test]
    fn trail_multiplier_spans_floor_to_ceiling() {
        let d = DiffusionConfig::default();
        assert!((d.trail_multiplier(0.0) - 0.3).abs() < 1e-12);
        assert!((d.trail_multiplier(1.0) - 1.0).abs() < 1e-12);
        assert!((d.trail_multiplier(0.5) - 0.65).abs() < 1e-12);
        // Out-of-range trails are clamped.
        assert!((d.trail_multiplier(7.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ripening_scales_with_excess_and_caps() {
        let r = RipeningConfig::default();
        assert_eq!(r.ripen_amount(1.0, 1.0), 0.0);
        let mild = r.ripen_amount(1.5, 1.0);
        let strong = r.ripen_amount(3.0, 1.0);
        assert!(strong > mild && mild > 0.0);
        let capped = r.ripen_amount(1_000.0, 1.0);
        assert!((capped - r.base_rate * 3.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_unordered_milestones() {
        let mut config = MyceliumConfig::default();
        config.ripening.milestones = vec![0.5, 0.25];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_decaying_trails() {
        let mut config = MyceliumConfig::default();
        config.trails.decay = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: MyceliumConfig = serde_json::from_str(r#"{"generation_rate": 2.0, "growth": {"threshold": 0.4}}"#).unwrap();
        assert_eq!(config.generation_rate, 2.0);
        assert_eq!(config.growth.threshold, 0.4);
        assert_eq!(config.growth.probability, 0.05);
        assert_eq!(config.ripening.milestones.len(), 4);
    }
}
