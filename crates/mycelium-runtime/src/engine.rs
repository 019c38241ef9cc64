//! Mycelium: the propagation engine.
//!
//! One `Mycelium` owns the whole simulation: the topology, the state store,
//! the compost bridge, the snapshot store and the render queue. Hosts create
//! exactly one per running simulation and drive it with [`Mycelium::tick`] on
//! a fixed wall-clock interval plus [`Mycelium::on_room_enter`] on navigation.
//!
//! Each tick:
//! 1. Generation: the active room gains `generation_rate * dt`
//! 2. Diffusion: nutrient spreads along edges, weighted by trail strength
//! 3. Trail decay: every trail shrinks; negligible ones are dropped
//! 4. Ripening: rooms above threshold ripen; new milestones fire bursts
//! 5. Composting: every N ticks, one decayed memory becomes nutrient
//! 6. Growth: on sampled ticks, a worn two-hop path may grow a shortcut
//! 7. Persistence: every N ticks the snapshot is flushed

use crate::compost::CompostBridge;
use crate::config::MyceliumConfig;
use crate::diffusion;
use crate::events::{EventQueue, MyceliumEvent};
use crate::growth;
use crate::metrics::MyceliumStats;
use crate::persistence::MemoryStore;
use crate::room_graph::RoomGraph;
use crate::state::SimulationState;
use mycelium_core::clock::{Clock, SystemClock};
use mycelium_core::compost::CompostSource;
use mycelium_core::error::{MyceliumError, Result};
use mycelium_core::store::{SnapshotStore, STATE_KEY};
use mycelium_core::topology::TopologyProvider;
use mycelium_core::types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

/// An edge as seen by renderers: endpoints, kind and current trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub edge: EdgeKey,
    pub kind: EdgeKind,
    pub trail: f64,
}

/// The Mycelium simulation.
pub struct Mycelium<T: TopologyProvider = RoomGraph> {
    topology: T,
    state: SimulationState,
    config: MyceliumConfig,
    compost: CompostBridge,
    store: Box<dyn SnapshotStore + Send>,
    clock: Box<dyn Clock + Send>,
    rng: StdRng,
    events: EventQueue,
    /// Every current edge, rebuilt whenever the topology grows.
    edge_cache: Vec<(EdgeKey, EdgeKind)>,
    last_tick_ms: Option<Timestamp>,
}

/// Builder for [`Mycelium`].
pub struct MyceliumBuilder<T: TopologyProvider> {
    topology: T,
    config: MyceliumConfig,
    store: Option<Box<dyn SnapshotStore + Send>>,
    compost: Option<Box<dyn CompostSource + Send>>,
    clock: Option<Box<dyn Clock + Send>>,
    rng: Option<StdRng>,
}

impl<T: TopologyProvider> MyceliumBuilder<T> {
    pub fn config(mut self, config: MyceliumConfig) -> Self {
        self.config = config;
        self
    }

    /// Where snapshots are loaded from and flushed to. Defaults to a fresh
    /// [`MemoryStore`].
    pub fn store(mut self, store: impl SnapshotStore + Send + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn compost_source(mut self, source: impl CompostSource + Send + 'static) -> Self {
        self.compost = Some(Box::new(source));
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: impl Clock + Send + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Overrides the config seed.
    pub fn rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Validate the config, load the persisted snapshot (or start from
    /// zero) and assemble the simulation.
    pub fn build(self) -> Result<Mycelium<T>> {
        self.config.validate()?;
        Ok(self.assemble())
    }

    fn assemble(self) -> Mycelium<T> {
        let store = self.store.unwrap_or_else(|| Box::new(MemoryStore::new()));
        let state = load_state(store.as_ref(), &self.config.ripening.milestones);
        let rng = self.rng.unwrap_or_else(|| match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        });
        let edge_cache = self.topology.all_edges();

        Mycelium {
            topology: self.topology,
            state,
            events: EventQueue::new(self.config.event_queue_capacity),
            config: self.config,
            compost: self.compost.map(CompostBridge::new).unwrap_or_default(),
            store,
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            rng,
            edge_cache,
            last_tick_ms: None,
        }
    }
}

fn load_state(store: &dyn SnapshotStore, milestones: &[f64]) -> SimulationState {
    match store.read(STATE_KEY) {
        Ok(Some(raw)) => SimulationState::from_json(&raw, milestones),
        Ok(None) => SimulationState::new(),
        Err(e) => {
            warn!(error = %e, "snapshot store unreadable, starting from zero state");
            SimulationState::new()
        }
    }
}

impl<T: TopologyProvider> Mycelium<T> {
    /// Start building a simulation over `topology`.
    pub fn builder(topology: T) -> MyceliumBuilder<T> {
        MyceliumBuilder {
            topology,
            config: MyceliumConfig::default(),
            store: None,
            compost: None,
            clock: None,
            rng: None,
        }
    }

    /// A simulation with default configuration and an in-memory store.
    pub fn new(topology: T) -> Self {
        Self::builder(topology).assemble()
    }

    /// A simulation with the given configuration and an in-memory store.
    pub fn from_config(topology: T, config: MyceliumConfig) -> Result<Self> {
        Self::builder(topology).config(config).build()
    }

    // --- Navigation ---

    /// The visitor entered `room`.
    ///
    /// Reinforces the trail from the previous room, records the visit, and
    /// flushes the snapshot.
    pub fn on_room_enter(&mut self, room: &RoomId) -> MyceliumEvent {
        let now = self.clock.now_ms();
        let previous = self.state.set_active(room.clone());

        let mut trail = 0.0;
        if let Some(prev) = previous.as_ref().filter(|p| *p != room) {
            trail = self
                .state
                .adjust_trail(&EdgeKey::new(prev, room), self.config.trails.increment);
        }
        self.state.record_visit(room, now);

        debug!(room = %room, from = ?previous, trail, "room entered");
        let event = MyceliumEvent::Entered {
            room: room.clone(),
            from: previous,
            trail,
        };
        self.events.push(self.state.tick(), event.clone());
        self.flush();
        event
    }

    // --- Tick ---

    /// Run one tick, measuring dt from the clock since the previous tick.
    ///
    /// The first tick after construction assumes one nominal interval.
    pub fn tick(&mut self) -> Vec<MyceliumEvent> {
        let now = self.clock.now_ms();
        let dt = match self.last_tick_ms {
            Some(last) => now.saturating_sub(last) as f64 / 1000.0,
            None => self.config.tick_interval_ms as f64 / 1000.0,
        };
        self.last_tick_ms = Some(now);
        self.step(dt)
    }

    /// Run one tick with an explicit dt in seconds.
    pub fn tick_with_dt(&mut self, dt: f64) -> Vec<MyceliumEvent> {
        self.last_tick_ms = Some(self.clock.now_ms());
        self.step(dt)
    }

    /// Run `ticks` ticks at a fixed dt.
    pub fn run_fixed(&mut self, ticks: u64, dt: f64) -> Vec<MyceliumEvent> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(self.tick_with_dt(dt));
        }
        all
    }

    fn step(&mut self, dt: f64) -> Vec<MyceliumEvent> {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_dt_secs)
        } else {
            0.0
        };
        let tick = self.state.advance_tick();
        let mut events = Vec::new();

        // Phase 1: Generation
        if let Some(active) = self.state.active().cloned() {
            self.state
                .add_nutrient(&active, self.config.generation_rate * dt);
        }

        // Phase 2: Diffusion
        diffusion::diffuse(&mut self.state, &self.topology, &self.config.diffusion, dt);

        // Phase 3: Trail decay
        self.state
            .decay_trails(self.config.trails.decay, self.config.trails.epsilon);

        // Phase 4: Ripening and ethylene bursts
        self.ripen(dt, &mut events);

        // Phase 5: Composting
        if tick % self.config.compost.check_every_ticks == 0 {
            if let Some(event) = self.compost_check() {
                events.push(event);
            }
        }

        // Phase 6: Topology growth
        if self.config.growth.probability > 0.0
            && self.rng.gen_bool(self.config.growth.probability)
        {
            if let Some(event) = self.try_grow() {
                events.push(event);
            }
        }

        // Phase 7: Persistence
        if tick % self.config.flush_every_ticks == 0 && self.flush() {
            events.push(MyceliumEvent::Flushed { tick });
        }

        events.push(MyceliumEvent::TickComplete {
            tick,
            dt,
            total_nutrient: self.total_nutrient(),
        });
        self.events.extend(tick, &events);
        events
    }

    fn ripen(&mut self, dt: f64, events: &mut Vec<MyceliumEvent>) {
        let ripening = &self.config.ripening;
        let mut gains: Vec<(RoomId, f64)> = Vec::new();
        for (room, &nutrient) in self.state.nutrients() {
            if nutrient <= ripening.threshold || self.state.ripeness(room) >= 1.0 {
                continue;
            }
            let gain = ripening.ripen_amount(nutrient, dt);
            if gain > 0.0 {
                gains.push((room.clone(), gain));
            }
        }

        let milestones = ripening.milestones.clone();
        for (room, gain) in gains {
            let (_, after) = self.state.ripen(&room, gain);
            for &milestone in &milestones {
                if after < milestone {
                    break;
                }
                if self.state.mark_fired(&room, milestone) {
                    self.burst(&room, milestone, events);
                }
            }
        }
    }

    /// Ethylene burst: every current neighbor receives `milestone *
    /// burst_strength` at once, regardless of trail.
    fn burst(&mut self, room: &RoomId, milestone: f64, events: &mut Vec<MyceliumEvent>) {
        info!(room = %room, milestone, "ripeness milestone reached");
        events.push(MyceliumEvent::MilestoneReached {
            room: room.clone(),
            milestone,
        });
        let amount = milestone * self.config.ripening.burst_strength;
        for neighbor in self.topology.neighbors(room) {
            self.state.add_nutrient(&neighbor, amount);
            events.push(MyceliumEvent::Burst {
                from: room.clone(),
                to: neighbor,
                milestone,
                amount,
            });
        }
    }

    /// Run a compost check now, outside the regular schedule.
    ///
    /// Source failures are logged and swallowed; the next scheduled check
    /// tries again.
    pub fn compost_check(&mut self) -> Option<MyceliumEvent> {
        let active = self.state.active().cloned()?;
        match self
            .compost
            .check(&mut self.state, &self.topology, &active, &self.config.compost)
        {
            Ok(Some(credit)) => {
                info!(item = %credit.item, room = %credit.room, amount = credit.amount, "memory composted");
                Some(MyceliumEvent::Composted {
                    item: credit.item,
                    room: credit.room,
                    amount: credit.amount,
                    neighbor_amount: credit.neighbor_amount,
                })
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "compost source unavailable, skipping cycle");
                None
            }
        }
    }

    /// Run the growth check now, regardless of sampling.
    ///
    /// Grows at most one edge from the active room.
    pub fn try_grow(&mut self) -> Option<MyceliumEvent> {
        let active = self.state.active().cloned()?;
        let candidate = growth::find_candidate(
            &self.state,
            &self.topology,
            &active,
            self.config.growth.threshold,
        )?;

        match self.topology.add_grown_edge(&candidate.from, &candidate.to) {
            Ok(true) => {
                self.edge_cache = self.topology.all_edges();
                let edge = EdgeKey::new(&candidate.from, &candidate.to);
                info!(edge = %edge, via = %candidate.via, strength = candidate.strength, "edge grown");
                Some(MyceliumEvent::EdgeGrown {
                    edge,
                    via: candidate.via,
                })
            }
            Ok(false) => None,
            Err(e) => {
                debug!(error = %e, "growth refused");
                None
            }
        }
    }

    // --- Persistence ---

    /// Write the snapshot to the store. Failures are logged and dropped.
    ///
    /// Returns whether the write succeeded.
    pub fn flush(&mut self) -> bool {
        let snapshot = self.state.to_snapshot(self.clock.now_ms());
        let result = serde_json::to_string_pretty(&snapshot)
            .map_err(MyceliumError::from)
            .and_then(|json| self.store.write(STATE_KEY, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "snapshot flush failed");
                false
            }
        }
    }

    // --- Accessors ---

    pub fn ripeness(&self, room: &RoomId) -> f64 {
        self.state.ripeness(room)
    }

    pub fn nutrients(&self, room: &RoomId) -> f64 {
        self.state.nutrient(room)
    }

    pub fn trail_strength(&self, a: &RoomId, b: &RoomId) -> f64 {
        self.state.trail(&EdgeKey::new(a, b))
    }

    pub fn last_visit(&self, room: &RoomId) -> Option<Timestamp> {
        self.state.last_visit(room)
    }

    /// Spend up to `amount` of a room's nutrient. Returns what was actually
    /// drained, which is less when the room holds less.
    pub fn drain_nutrients(&mut self, room: &RoomId, amount: f64) -> f64 {
        if !(amount.is_finite() && amount > 0.0) {
            return 0.0;
        }
        let current = self.state.nutrient(room);
        let drained = amount.min(current);
        self.state.set_nutrient(room, current - drained);
        drained
    }

    /// Mean ripeness across every room in the topology.
    pub fn system_ripeness(&self) -> f64 {
        let rooms = self.topology.rooms();
        if rooms.is_empty() {
            return 0.0;
        }
        rooms.iter().map(|r| self.state.ripeness(r)).sum::<f64>() / rooms.len() as f64
    }

    pub fn active_room(&self) -> Option<&RoomId> {
        self.state.active()
    }

    pub fn total_nutrient(&self) -> f64 {
        self.state.nutrients().values().sum()
    }

    /// Every current edge with its trail, for tendril rendering.
    pub fn edges(&self) -> Vec<EdgeView> {
        self.edge_cache
            .iter()
            .map(|(edge, kind)| EdgeView {
                edge: edge.clone(),
                kind: *kind,
                trail: self.state.trail(edge),
            })
            .collect()
    }

    /// Remove and return every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<(Tick, MyceliumEvent)> {
        self.events.drain()
    }

    pub fn recent_events(&self) -> impl Iterator<Item = &(Tick, MyceliumEvent)> {
        self.events.iter()
    }

    pub fn stats(&self) -> MyceliumStats {
        MyceliumStats::collect(&self.state, &self.topology)
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Direct access to the state store, e.g. to seed nutrient.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn topology(&self) -> &T {
        &self.topology
    }

    pub fn config(&self) -> &MyceliumConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.state.tick()
    }

    /// Force the tick counter, e.g. to line up a compost or flush check.
    pub fn set_tick_count(&mut self, tick: Tick) {
        self.state.set_tick(tick);
    }

    pub fn set_compost_source(&mut self, source: impl CompostSource + Send + 'static) {
        self.compost.set_source(Box::new(source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::UnavailableStore;
    use crate::room_graph::RoomSpec;
    use mycelium_core::clock::ManualClock;

    fn r(id: &str) -> RoomId {
        RoomId::from(id)
    }

    fn graph() -> RoomGraph {
        RoomGraph::new(vec![
            RoomSpec::new("foyer").exits(["gallery", "stair"]),
            RoomSpec::new("gallery").exits(["attic"]),
            RoomSpec::new("stair"),
            RoomSpec::new("attic"),
        ])
    }

    #[test]
    fn entering_reinforces_trail_and_records_visit() {
        let clock = ManualClock::new(10_000);
        let mut m = Mycelium::builder(graph()).clock(clock.clone()).build().unwrap();
        m.on_room_enter(&r("foyer"));
        clock.advance_ms(500);
        let event = m.on_room_enter(&r("gallery"));

        assert_eq!(
            event,
            MyceliumEvent::Entered {
                room: r("gallery"),
                from: Some(r("foyer")),
                trail: 0.15,
            }
        );
        assert_eq!(m.trail_strength(&r("gallery"), &r("foyer")), 0.15);
        assert_eq!(m.last_visit(&r("gallery")), Some(10_500));
        assert_eq!(m.active_room(), Some(&r("gallery")));
    }

    #[test]
    fn reentering_same_room_does_not_reinforce() {
        let mut m = Mycelium::new(graph());
        m.on_room_enter(&r("foyer"));
        m.on_room_enter(&r("foyer"));
        assert!(m.state().trails().is_empty());
    }

    #[test]
    fn tick_measures_dt_from_clock() {
        let clock = ManualClock::new(0);
        let mut m = Mycelium::builder(graph()).clock(clock.clone()).build().unwrap();
        m.on_room_enter(&r("stair"));
        m.tick();
        clock.advance_ms(2_000);
        let events = m.tick();
        let dt = events.iter().find_map(|e| match e {
            MyceliumEvent::TickComplete { dt, .. } => Some(*dt),
            _ => None,
        });
        assert_eq!(dt, Some(2.0));
    }

    #[test]
    fn dt_is_clamped() {
        let mut m = Mycelium::new(graph());
        m.on_room_enter(&r("stair"));
        m.tick_with_dt(10_000.0);
        // 30 s cap at 0.5/s, minus what diffused away.
        assert!(m.total_nutrient() <= 15.0 + 1e-9);
        assert!(m.total_nutrient() > 0.0);
    }

    #[test]
    fn drain_never_goes_below_zero() {
        let mut m = Mycelium::new(graph());
        m.state_mut().set_nutrient(&r("attic"), 2.0);
        assert_eq!(m.drain_nutrients(&r("attic"), 0.5), 0.5);
        assert_eq!(m.drain_nutrients(&r("attic"), 9.0), 1.5);
        assert_eq!(m.nutrients(&r("attic")), 0.0);
        assert_eq!(m.drain_nutrients(&r("attic"), -1.0), 0.0);
    }

    #[test]
    fn system_ripeness_is_mean_over_rooms() {
        let mut m = Mycelium::new(graph());
        m.state_mut().ripen(&r("foyer"), 1.0);
        m.state_mut().ripen(&r("attic"), 0.2);
        assert!((m.system_ripeness() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn failing_store_is_swallowed() {
        let mut m = Mycelium::builder(graph()).store(UnavailableStore).build().unwrap();
        m.on_room_enter(&r("foyer"));
        assert!(!m.flush());
        m.run_fixed(30, 0.2);
        assert!(m.nutrients(&r("foyer")) > 0.0);
    }

    #[test]
    fn growth_updates_edge_cache() {
        let mut m = Mycelium::new(graph());
        assert_eq!(m.edges().len(), 3);
        m.state_mut().adjust_trail(&EdgeKey::new(&r("foyer"), &r("gallery")), 0.8);
        m.state_mut().adjust_trail(&EdgeKey::new(&r("gallery"), &r("attic")), 0.8);
        m.state_mut().set_active(r("foyer"));

        let event = m.try_grow().unwrap();
        assert_eq!(
            event,
            MyceliumEvent::EdgeGrown {
                edge: EdgeKey::new(&r("foyer"), &r("attic")),
                via: r("gallery"),
            }
        );
        let edges = m.edges();
        assert_eq!(edges.len(), 4);
        assert!(edges.iter().any(|e| e.kind == EdgeKind::Grown));
        assert!(m.try_grow().is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = MyceliumConfig::default();
        config.growth.probability = 2.0;
        assert!(Mycelium::from_config(graph(), config).is_err());
    }

    #[test]
    fn render_queue_collects_events() {
        let mut m = Mycelium::new(graph());
        m.on_room_enter(&r("foyer"));
        m.run_fixed(3, 0.2);
        let drained = m.drain_events();
        assert!(matches!(drained[0].1, MyceliumEvent::Entered { .. }));
        assert_eq!(
            drained
                .iter()
                .filter(|(_, e)| matches!(e, MyceliumEvent::TickComplete { .. }))
                .count(),
            3
        );
        assert_eq!(m.recent_events().count(), 0);
    }
}
