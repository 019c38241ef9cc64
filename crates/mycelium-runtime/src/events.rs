//! Events emitted by the simulation and the render queue that buffers them.

use mycelium_core::types::*;
use serde::Serialize;
use std::collections::VecDeque;

/// Event emitted by the Mycelium during simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MyceliumEvent {
    /// The visitor entered a room.
    Entered {
        room: RoomId,
        from: Option<RoomId>,
        /// Trail strength of the traversed edge after reinforcement.
        trail: f64,
    },
    /// A room's ripeness crossed a milestone for the first time.
    MilestoneReached { room: RoomId, milestone: f64 },
    /// Ethylene burst: nutrient pushed from a ripening room to a neighbor.
    Burst {
        from: RoomId,
        to: RoomId,
        milestone: f64,
        amount: f64,
    },
    /// A decayed external item was converted into nutrient.
    Composted {
        item: String,
        room: RoomId,
        amount: f64,
        neighbor_amount: f64,
    },
    /// A new edge grew between two rooms via a shared neighbor.
    EdgeGrown {
        edge: EdgeKey,
        via: RoomId,
    },
    /// The snapshot was written to the store.
    Flushed { tick: Tick },
    /// A tick completed.
    TickComplete { tick: Tick, dt: f64, total_nutrient: f64 },
}

/// Bounded FIFO of recent events for renderers.
///
/// When full, the oldest events are dropped first.
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<(Tick, MyceliumEvent)>,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, tick: Tick, event: MyceliumEvent) {
        if self.capacity == 0 {
            return;
        }
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back((tick, event));
    }

    pub fn extend(&mut self, tick: Tick, events: &[MyceliumEvent]) {
        for event in events {
            self.push(tick, event.clone());
        }
    }

    /// Remove and return everything queued, oldest first.
    pub fn drain(&mut self) -> Vec<(Tick, MyceliumEvent)> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Tick, MyceliumEvent)> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
