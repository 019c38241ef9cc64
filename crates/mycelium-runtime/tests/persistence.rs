//! Snapshot persistence across restarts.
//!
//! A "restart" here is dropping the `Mycelium` and building a fresh one over
//! the same store, the way a host does on page reload.

use mycelium_runtime::prelude::*;

fn r(id: &str) -> RoomId {
    RoomId::from(id)
}

fn specs() -> Vec<RoomSpec> {
    vec![
        RoomSpec::new("hub").exits(["east", "west"]),
        RoomSpec::new("east").exits(["far"]),
        RoomSpec::new("west"),
        RoomSpec::new("far"),
    ]
}

fn config() -> MyceliumConfig {
    let mut config = MyceliumConfig::seeded(11);
    config.growth.probability = 0.0;
    config.ripening.base_rate = 0.3;
    config.ripening.excess_gain = 0.0;
    config
}

fn boot<S>(store: S) -> Mycelium
where
    S: SnapshotStore + Clone + Send + 'static,
{
    boot_world(specs(), store)
}

fn boot_world<S>(specs: Vec<RoomSpec>, store: S) -> Mycelium
where
    S: SnapshotStore + Clone + Send + 'static,
{
    let graph = RoomGraph::new(specs).with_store(Box::new(store.clone()));
    Mycelium::builder(graph)
        .config(config())
        .store(store)
        .build()
        .unwrap()
}

fn milestones_for(events: &[MyceliumEvent], room: &RoomId) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            MyceliumEvent::MilestoneReached { room: r, milestone } if r == room => Some(*milestone),
            _ => None,
        })
        .collect()
}

#[test]
fn state_survives_restart() {
    let store = MemoryStore::new();
    let (nutrient, trail, tick) = {
        let mut m = boot(store.clone());
        m.on_room_enter(&r("hub"));
        m.on_room_enter(&r("east"));
        m.run_fixed(7, 1.0);
        assert!(m.flush());
        (m.nutrients(&r("east")), m.trail_strength(&r("hub"), &r("east")), m.current_tick())
    };

    let m = boot(store);
    assert_eq!(m.active_room(), Some(&r("east")));
    assert!((m.nutrients(&r("east")) - nutrient).abs() < 1e-12);
    assert!((m.trail_strength(&r("east"), &r("hub")) - trail).abs() < 1e-12);
    assert!(trail > 0.0);
    assert_eq!(m.current_tick(), tick);
    assert!(m.last_visit(&r("hub")).is_some());
}

#[test]
fn room_id_with_separator_keeps_its_trail() {
    let world = || vec![RoomSpec::new("hall|east").exits(["kitchen"]), RoomSpec::new("kitchen")];
    let store = MemoryStore::new();
    let before = {
        let mut m = boot_world(world(), store.clone());
        m.on_room_enter(&r("hall|east"));
        m.on_room_enter(&r("kitchen"));
        assert!(m.flush());
        m.state().trails().clone()
    };
    assert!(before[&EdgeKey::new(&r("hall|east"), &r("kitchen"))] > 0.0);

    let m = boot_world(world(), store);
    assert_eq!(m.state().trails(), &before);
    assert!(m.trail_strength(&r("kitchen"), &r("hall|east")) > 0.0);
}

#[test]
fn empty_room_id_does_not_discard_the_snapshot() {
    let world = || vec![RoomSpec::new("").exits(["x"]), RoomSpec::new("x")];
    let store = MemoryStore::new();
    let (total, trail) = {
        let mut m = boot_world(world(), store.clone());
        m.on_room_enter(&r(""));
        m.on_room_enter(&r("x"));
        m.run_fixed(5, 1.0);
        assert!(m.flush());
        (m.total_nutrient(), m.trail_strength(&r(""), &r("x")))
    };
    assert!(total > 0.0);
    assert!(trail > 0.0);

    let m = boot_world(world(), store);
    assert_eq!(m.active_room(), Some(&r("x")));
    assert!((m.total_nutrient() - total).abs() < 1e-9);
    assert!((m.trail_strength(&r("x"), &r("")) - trail).abs() < 1e-12);
}

#[test]
fn grown_edge_to_separator_room_survives_restart() {
    let world = || {
        vec![
            RoomSpec::new("hall|east").exits(["kitchen"]),
            RoomSpec::new("kitchen").exits(["cellar"]),
            RoomSpec::new("cellar"),
        ]
    };
    let store = MemoryStore::new();
    {
        let mut graph = RoomGraph::new(world()).with_store(Box::new(store.clone()));
        assert!(graph.add_grown_edge(&r("hall|east"), &r("cellar")).unwrap());
    }

    let graph = RoomGraph::new(world()).with_store(Box::new(store));
    assert_eq!(graph.grown_edges(), vec![EdgeKey::new(&r("cellar"), &r("hall|east"))]);
    assert!(graph.is_connected(&r("hall|east"), &r("cellar")));
}

#[test]
fn milestones_do_not_refire_after_restart() {
    let store = MemoryStore::new();
    let hub = r("hub");
    {
        let mut m = boot(store.clone());
        m.state_mut().set_nutrient(&hub, 50.0);
        let events = m.tick_with_dt(1.0);
        assert_eq!(milestones_for(&events, &hub), vec![0.25]);
        assert!(m.flush());
    }

    let mut m = boot(store);
    assert!(m.state().has_fired(&hub, 0.25));
    assert!(!m.state().has_fired(&hub, 0.5));

    let events = m.tick_with_dt(1.0);
    assert_eq!(milestones_for(&events, &hub), vec![0.5]);
}

#[test]
fn fully_ripe_room_stays_quiet_after_restart() {
    let store = MemoryStore::new();
    let hub = r("hub");
    {
        let mut m = boot(store.clone());
        m.state_mut().set_nutrient(&hub, 50.0);
        m.run_fixed(4, 1.0);
        assert_eq!(m.ripeness(&hub), 1.0);
        assert!(m.flush());
    }

    let mut m = boot(store);
    m.state_mut().set_nutrient(&hub, 50.0);
    let events = m.run_fixed(10, 1.0);
    assert!(milestones_for(&events, &hub).is_empty());
    assert_eq!(m.ripeness(&hub), 1.0);
}

#[test]
fn grown_edges_survive_restart() {
    let store = MemoryStore::new();
    {
        let mut graph = RoomGraph::new(specs()).with_store(Box::new(store.clone()));
        assert!(graph.add_grown_edge(&r("hub"), &r("far")).unwrap());
        assert!(!graph.add_grown_edge(&r("far"), &r("hub")).unwrap());
    }

    let graph = RoomGraph::new(specs()).with_store(Box::new(store));
    assert_eq!(graph.grown_edges(), vec![EdgeKey::new(&r("hub"), &r("far"))]);
    assert!(graph.is_connected(&r("far"), &r("hub")));
}

#[test]
fn composted_items_stay_composted_after_restart() {
    let store = MemoryStore::new();
    let items = vec![DecayingItem::new("diary", 0.9)];
    {
        let mut m = boot(store.clone());
        m.set_compost_source(items.clone());
        m.on_room_enter(&r("hub"));
        assert!(m.compost_check().is_some());
        assert!(m.flush());
    }

    let mut m = boot(store);
    m.set_compost_source(items);
    assert_eq!(m.compost_check(), None);
}

#[test]
fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    {
        let mut m = boot(store.clone());
        m.on_room_enter(&r("west"));
        m.run_fixed(3, 1.0);
        assert!(m.flush());
    }
    assert!(store.path_for(STATE_KEY).exists());

    let raw = std::fs::read_to_string(store.path_for(STATE_KEY)).unwrap();
    assert!(raw.lines().count() > 1, "state file should be pretty-printed");
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["version"], SNAPSHOT_VERSION);

    let m = boot(store);
    assert_eq!(m.active_room(), Some(&r("west")));
    assert!(m.nutrients(&r("west")) > 0.0);
}

#[test]
fn corrupt_snapshot_starts_from_zero() {
    let mut store = MemoryStore::new();
    store.write(STATE_KEY, "{ not json").unwrap();
    store.write(GROWN_EDGES_KEY, "[\"hub|").unwrap();

    let m = boot(store);
    assert_eq!(m.active_room(), None);
    assert_eq!(m.total_nutrient(), 0.0);
    assert!(m.topology().grown_edges().is_empty());
}

#[test]
fn unavailable_store_never_blocks_the_tick() {
    let graph = RoomGraph::new(specs()).with_store(Box::new(UnavailableStore));
    let mut m = Mycelium::builder(graph)
        .config(config())
        .store(UnavailableStore)
        .build()
        .unwrap();
    m.on_room_enter(&r("hub"));
    let events = m.run_fixed(50, 0.2);
    assert!(!events.iter().any(|e| matches!(e, MyceliumEvent::Flushed { .. })));
    assert!(m.nutrients(&r("hub")) > 0.0);
}
