//! Simulation state store: nutrients, ripeness, trails, visits, compost.
//!
//! The store is the single authoritative record the tick mutates. Records are
//! created lazily on first write and read back as zero before that. Maps are
//! ordered so that iteration (and therefore every tick) is deterministic.
//!
//! Fired milestones are not persisted. They are recomputed from ripeness on
//! load: a room whose ripeness is at or past a milestone has already fired it.

use mycelium_core::types::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Current snapshot format version.
///
/// Version 3 writes trails as `[a, b, value]` entries. Versions 1 and 2 used a
/// map keyed by `"a|b"`, which is still read.
pub const SNAPSHOT_VERSION: u32 = 3;

/// Serializable snapshot of the whole simulation state.
///
/// Every field after `version` defaults when missing, so older snapshots
/// load and are upgraded in place on the next flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub meta: SnapshotMeta,
    #[serde(default)]
    pub active: Option<RoomId>,
    #[serde(default)]
    pub nutrients: BTreeMap<RoomId, f64>,
    #[serde(default)]
    pub ripeness: BTreeMap<RoomId, f64>,
    #[serde(default, with = "trail_entries")]
    pub trails: BTreeMap<EdgeKey, f64>,
    #[serde(default)]
    pub last_visit: BTreeMap<RoomId, Timestamp>,
    #[serde(default)]
    pub composted: BTreeSet<String>,
}

/// Trails as a sequence of `[a, b, value]` entries.
mod trail_entries {
    use super::*;
    use serde::{Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Entries(Vec<(RoomId, RoomId, f64)>),
        Keyed(BTreeMap<String, f64>),
    }

    pub fn serialize<S: Serializer>(
        trails: &BTreeMap<EdgeKey, f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(trails.iter().map(|(k, v)| (k.low(), k.high(), v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<EdgeKey, f64>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Entries(entries) => entries
                .into_iter()
                .map(|(a, b, v)| (EdgeKey::new(&a, &b), v))
                .collect(),
            Repr::Keyed(map) => map
                .into_iter()
                .filter_map(|(raw, v)| match raw.parse::<EdgeKey>() {
                    Ok(key) => Some((key, v)),
                    Err(e) => {
                        warn!(error = %e, "unreadable trail key skipped");
                        None
                    }
                })
                .collect(),
        })
    }
}

/// Snapshot metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotMeta {
    #[serde(default)]
    pub snapshot_id: String,
    #[serde(default)]
    pub tick: Tick,
    #[serde(default)]
    pub saved_at: Timestamp,
}

/// The in-memory simulation state.
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    active: Option<RoomId>,
    nutrients: BTreeMap<RoomId, f64>,
    ripeness: BTreeMap<RoomId, f64>,
    trails: BTreeMap<EdgeKey, f64>,
    last_visit: BTreeMap<RoomId, Timestamp>,
    composted: BTreeSet<String>,
    fired: BTreeSet<(RoomId, MilestoneKey)>,
    tick: Tick,
}

/// A milestone value as an orderable key.
///
/// Milestones are compared at micro-unit resolution, which is far finer than
/// any sensible milestone spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MilestoneKey(u32);

impl MilestoneKey {
    pub fn new(milestone: f64) -> Self {
        Self((milestone.clamp(0.0, 1.0) * 1_000_000.0).round() as u32)
    }

    pub fn value(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl SimulationState {
    /// An all-zero state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the state from a snapshot, deriving fired milestones from
    /// ripeness.
    pub fn from_snapshot(snapshot: Snapshot, milestones: &[f64]) -> Self {
        let mut state = Self {
            active: snapshot.active,
            nutrients: snapshot
                .nutrients
                .into_iter()
                .filter(|(_, v)| v.is_finite())
                .map(|(k, v)| (k, v.max(0.0)))
                .collect(),
            ripeness: snapshot
                .ripeness
                .into_iter()
                .filter(|(_, v)| v.is_finite())
                .map(|(k, v)| (k, v.clamp(0.0, 1.0)))
                .collect(),
            trails: snapshot
                .trails
                .into_iter()
                .filter(|(k, v)| v.is_finite() && *v > 0.0 && !k.is_loop())
                .map(|(k, v)| (k, v.min(1.0)))
                .collect(),
            last_visit: snapshot.last_visit,
            composted: snapshot.composted,
            fired: BTreeSet::new(),
            tick: snapshot.meta.tick,
        };
        state.rebuild_fired(milestones);
        state
    }

    /// Parse a serialized snapshot. Malformed data yields the zero state.
    pub fn from_json(raw: &str, milestones: &[f64]) -> Self {
        match serde_json::from_str::<Snapshot>(raw) {
            Ok(snapshot) => {
                if snapshot.version > SNAPSHOT_VERSION {
                    warn!(
                        version = snapshot.version,
                        supported = SNAPSHOT_VERSION,
                        "snapshot is newer than this build, reading best-effort"
                    );
                }
                Self::from_snapshot(snapshot, milestones)
            }
            Err(e) => {
                warn!(error = %e, "malformed snapshot, starting from zero state");
                Self::new()
            }
        }
    }

    /// Recompute the fired-milestone set from ripeness.
    pub fn rebuild_fired(&mut self, milestones: &[f64]) {
        self.fired.clear();
        for (room, &ripeness) in &self.ripeness {
            for &m in milestones {
                if ripeness >= m {
                    self.fired.insert((room.clone(), MilestoneKey::new(m)));
                }
            }
        }
    }

    /// Capture the current state.
    pub fn to_snapshot(&self, saved_at: Timestamp) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            meta: SnapshotMeta {
                snapshot_id: uuid::Uuid::new_v4().to_string(),
                tick: self.tick,
                saved_at,
            },
            active: self.active.clone(),
            nutrients: self.nutrients.clone(),
            ripeness: self.ripeness.clone(),
            trails: self.trails.clone(),
            last_visit: self.last_visit.clone(),
            composted: self.composted.clone(),
        }
    }

    // --- Active room and tick counter ---

    pub fn active(&self) -> Option<&RoomId> {
        self.active.as_ref()
    }

    pub fn set_active(&mut self, room: RoomId) -> Option<RoomId> {
        self.active.replace(room)
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    pub fn advance_tick(&mut self) -> Tick {
        self.tick += 1;
        self.tick
    }

    // --- Nutrients ---

    pub fn nutrient(&self, room: &RoomId) -> f64 {
        self.nutrients.get(room).copied().unwrap_or(0.0)
    }

    /// Set a room's nutrient. Negative and non-finite values become zero.
    pub fn set_nutrient(&mut self, room: &RoomId, value: f64) {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        self.nutrients.insert(room.clone(), value);
    }

    pub fn add_nutrient(&mut self, room: &RoomId, delta: f64) {
        let current = self.nutrient(room);
        self.set_nutrient(room, current + delta);
    }

    pub fn nutrients(&self) -> &BTreeMap<RoomId, f64> {
        &self.nutrients
    }

    // --- Ripeness ---

    pub fn ripeness(&self, room: &RoomId) -> f64 {
        self.ripeness.get(room).copied().unwrap_or(0.0)
    }

    /// Raise a room's ripeness by `amount`, clamped to 1. Never lowers it.
    /// Returns `(before, after)`.
    pub fn ripen(&mut self, room: &RoomId, amount: f64) -> (f64, f64) {
        let before = self.ripeness(room);
        let after = if amount.is_finite() && amount > 0.0 {
            (before + amount).min(1.0)
        } else {
            before
        };
        self.ripeness.insert(room.clone(), after);
        (before, after)
    }

    pub fn ripeness_map(&self) -> &BTreeMap<RoomId, f64> {
        &self.ripeness
    }

    // --- Milestones ---

    pub fn has_fired(&self, room: &RoomId, milestone: f64) -> bool {
        self.fired.contains(&(room.clone(), MilestoneKey::new(milestone)))
    }

    /// Record a milestone as fired. Returns `false` if it already was.
    pub fn mark_fired(&mut self, room: &RoomId, milestone: f64) -> bool {
        self.fired.insert((room.clone(), MilestoneKey::new(milestone)))
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }

    // --- Trails ---

    pub fn trail(&self, key: &EdgeKey) -> f64 {
        self.trails.get(key).copied().unwrap_or(0.0)
    }

    /// Adjust a trail by `delta`, clamped into [0, 1]. Loops are ignored.
    /// Returns the new strength.
    pub fn adjust_trail(&mut self, key: &EdgeKey, delta: f64) -> f64 {
        if key.is_loop() {
            return 0.0;
        }
        let value = (self.trail(key) + delta).clamp(0.0, 1.0);
        if value > 0.0 {
            self.trails.insert(key.clone(), value);
        } else {
            self.trails.remove(key);
        }
        value
    }

    /// Multiply every trail by `factor`, dropping those that fall below
    /// `epsilon`. Returns the number dropped.
    pub fn decay_trails(&mut self, factor: f64, epsilon: f64) -> usize {
        let before = self.trails.len();
        self.trails.retain(|_, v| {
            *v = (*v * factor).clamp(0.0, 1.0);
            *v >= epsilon
        });
        before - self.trails.len()
    }

    pub fn trails(&self) -> &BTreeMap<EdgeKey, f64> {
        &self.trails
    }

    // --- Visits ---

    pub fn record_visit(&mut self, room: &RoomId, at: Timestamp) {
        self.last_visit.insert(room.clone(), at);
    }

    pub fn last_visit(&self, room: &RoomId) -> Option<Timestamp> {
        self.last_visit.get(room).copied()
    }

    // --- Compost ---

    pub fn composted_contains(&self, id: &str) -> bool {
        self.composted.contains(id)
    }

    /// Returns `false` if the id was already composted.
    pub fn mark_composted(&mut self, id: &str) -> bool {
        self.composted.insert(id.to_string())
    }

    pub fn composted(&self) -> &BTreeSet<String> {
        &self.composted
    }
}
