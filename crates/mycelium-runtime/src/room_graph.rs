//! Concrete implementation of the TopologyProvider trait using petgraph.
//!
//! The base graph is built once from a list of [`RoomSpec`]s and never
//! mutated afterwards. Grown edges live in a separate append-only set layered
//! on top, and are optionally written through to a [`SnapshotStore`] so they
//! survive restarts.

use mycelium_core::error::{MyceliumError, Result};
use mycelium_core::store::{SnapshotStore, GROWN_EDGES_KEY};
use mycelium_core::topology::TopologyProvider;
use mycelium_core::types::*;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::Undirected;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Static definition of a room, as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub id: RoomId,
    /// Undiscoverable rooms never receive grown edges.
    #[serde(default = "default_discoverable")]
    pub discoverable: bool,
    /// Static exits to other rooms.
    #[serde(default)]
    pub exits: Vec<RoomId>,
}

fn default_discoverable() -> bool {
    true
}

impl RoomSpec {
    pub fn new(id: impl Into<RoomId>) -> Self {
        Self {
            id: id.into(),
            discoverable: true,
            exits: Vec::new(),
        }
    }

    pub fn exits<I, R>(mut self, exits: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoomId>,
    {
        self.exits = exits.into_iter().map(Into::into).collect();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.discoverable = false;
        self
    }
}

/// Per-room data held in the base graph.
#[derive(Debug, Clone)]
struct RoomData {
    id: RoomId,
    discoverable: bool,
}

/// Petgraph-backed room graph with a grown-edge overlay.
pub struct RoomGraph {
    base: Graph<RoomData, (), Undirected>,
    /// Map from room id to petgraph's internal index.
    index: HashMap<RoomId, NodeIndex>,
    /// Static exits in declaration order, per room.
    static_order: HashMap<RoomId, Vec<RoomId>>,
    grown: BTreeSet<EdgeKey>,
    store: Option<Box<dyn SnapshotStore + Send>>,
}

impl RoomGraph {
    /// Build the base graph. Exits naming unknown rooms, and self-exits, are
    /// skipped.
    pub fn new(specs: impl IntoIterator<Item = RoomSpec>) -> Self {
        let specs: Vec<RoomSpec> = specs.into_iter().collect();
        let mut base = Graph::new_undirected();
        let mut index = HashMap::new();

        for spec in &specs {
            if index.contains_key(&spec.id) {
                warn!(room = %spec.id, "duplicate room definition ignored");
                continue;
            }
            let idx = base.add_node(RoomData {
                id: spec.id.clone(),
                discoverable: spec.discoverable,
            });
            index.insert(spec.id.clone(), idx);
        }

        let mut static_order: HashMap<RoomId, Vec<RoomId>> = HashMap::new();
        for spec in &specs {
            let from_idx = index[&spec.id];
            for exit in &spec.exits {
                let Some(&to_idx) = index.get(exit) else {
                    warn!(room = %spec.id, exit = %exit, "exit to unknown room ignored");
                    continue;
                };
                if to_idx == from_idx {
                    continue;
                }
                if base.find_edge(from_idx, to_idx).is_none() {
                    base.add_edge(from_idx, to_idx, ());
                }
                push_unique(static_order.entry(spec.id.clone()).or_default(), exit);
                push_unique(static_order.entry(exit.clone()).or_default(), &spec.id);
            }
        }

        Self {
            base,
            index,
            static_order,
            grown: BTreeSet::new(),
            store: None,
        }
    }

    /// Attach a store for grown edges and restore any previously grown ones.
    ///
    /// Restoring is additive and tolerant: unparseable data is ignored and
    /// stored edges that are no longer valid against the base graph are
    /// skipped.
    pub fn with_store(mut self, store: Box<dyn SnapshotStore + Send>) -> Self {
        match store.read(GROWN_EDGES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<EdgeKey>>(&raw) {
                Ok(edges) => {
                    for edge in edges {
                        if self.validate_growth(edge.low(), edge.high()).is_ok() {
                            self.grown.insert(edge);
                        } else {
                            debug!(edge = %edge, "stored grown edge no longer valid, skipped");
                        }
                    }
                }
                Err(e) => warn!(error = %e, "malformed grown-edge record ignored"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read grown edges"),
        }
        self.store = Some(store);
        self
    }

    fn validate_growth(&self, a: &RoomId, b: &RoomId) -> Result<()> {
        if a == b {
            return Err(MyceliumError::growth_refused(a.as_str(), b.as_str(), "self loop"));
        }
        for room in [a, b] {
            let Some(&idx) = self.index.get(room) else {
                return Err(MyceliumError::unknown_room(room.as_str()));
            };
            if !self.base[idx].discoverable {
                return Err(MyceliumError::growth_refused(
                    a.as_str(),
                    b.as_str(),
                    format!("{} is not discoverable", room),
                ));
            }
        }
        if self.is_statically_connected(a, b) {
            return Err(MyceliumError::growth_refused(
                a.as_str(),
                b.as_str(),
                "already statically connected",
            ));
        }
        Ok(())
    }

    fn persist_grown(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let edges: Vec<&EdgeKey> = self.grown.iter().collect();
        let result = serde_json::to_string_pretty(&edges)
            .map_err(MyceliumError::from)
            .and_then(|json| store.write(GROWN_EDGES_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "failed to persist grown edges");
        }
    }
}

fn push_unique(list: &mut Vec<RoomId>, room: &RoomId) {
    if !list.contains(room) {
        list.push(room.clone());
    }
}

impl TopologyProvider for RoomGraph {
    fn rooms(&self) -> Vec<RoomId> {
        self.base
            .node_indices()
            .map(|idx| self.base[idx].id.clone())
            .collect()
    }

    fn contains(&self, room: &RoomId) -> bool {
        self.index.contains_key(room)
    }

    fn neighbors(&self, room: &RoomId) -> Vec<RoomId> {
        let mut out = self.static_order.get(room).cloned().unwrap_or_default();
        for edge in &self.grown {
            if let Some(other) = edge.other(room) {
                push_unique(&mut out, other);
            }
        }
        out
    }

    fn is_discoverable(&self, room: &RoomId) -> bool {
        self.index
            .get(room)
            .map_or(false, |&idx| self.base[idx].discoverable)
    }

    fn is_statically_connected(&self, a: &RoomId, b: &RoomId) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => self.base.find_edge(ia, ib).is_some(),
            _ => false,
        }
    }

    fn add_grown_edge(&mut self, a: &RoomId, b: &RoomId) -> Result<bool> {
        self.validate_growth(a, b)?;
        let added = self.grown.insert(EdgeKey::new(a, b));
        if added {
            self.persist_grown();
        }
        Ok(added)
    }

    fn grown_edges(&self) -> Vec<EdgeKey> {
        self.grown.iter().cloned().collect()
    }

    fn all_edges(&self) -> Vec<(EdgeKey, EdgeKind)> {
        let mut edges: Vec<(EdgeKey, EdgeKind)> = self
            .base
            .edge_indices()
            .filter_map(|idx| self.base.edge_endpoints(idx))
            .map(|(a, b)| (EdgeKey::new(&self.base[a].id, &self.base[b].id), EdgeKind::Static))
            .collect();
        edges.extend(self.grown.iter().map(|e| (e.clone(), EdgeKind::Grown)));
        edges
    }

    fn room_count(&self) -> usize {
        self.base.node_count()
    }
}
