//! Async host support for the Mycelium.
//!
//! Runs the tick on a tokio interval while other tasks (request handlers,
//! renderers) read or navigate through the same shared handle.
//!
//! # Feature Flag
//!
//! This module requires the `async` feature:
//! ```toml
//! mycelium-runtime = { version = "0.1", features = ["async"] }
//! ```
//!
//! # Locking
//!
//! The whole simulation sits behind one mutex, held for the entire tick.
//! Diffusion must see one consistent state, so a tick is never interleaved
//! with navigation or accessor reads.
//!
//! # Example
//!
//! ```rust,ignore
//! use mycelium_runtime::async_runtime::{shared, spawn_ticker};
//! use mycelium_runtime::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mycelium = shared(Mycelium::new(RoomGraph::new(rooms)));
//!     let ticker = spawn_ticker(mycelium.clone(), Duration::from_millis(200));
//!
//!     mycelium.lock().await.on_room_enter(&RoomId::from("atrium"));
//!     // ...
//!     ticker.stop().await;
//! }
//! ```

#![cfg(feature = "async")]

use crate::engine::Mycelium;
use crate::events::MyceliumEvent;
use mycelium_core::topology::TopologyProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// A Mycelium shared between tasks.
pub type SharedMycelium<T> = Arc<Mutex<Mycelium<T>>>;

/// Wrap a simulation for sharing.
pub fn shared<T: TopologyProvider>(mycelium: Mycelium<T>) -> SharedMycelium<T> {
    Arc::new(Mutex::new(mycelium))
}

/// Handle to a running ticker task.
pub struct TickerHandle {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl TickerHandle {
    /// Stop ticking after the current tick. Returns how many ticks ran.
    pub async fn stop(self) -> u64 {
        let _ = self.stop_tx.send(true);
        self.handle.await.unwrap_or(0)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawn a task that ticks the simulation every `interval`.
///
/// Missed intervals are skipped rather than bursted; the next tick's dt
/// absorbs the gap. The simulation is flushed once when the ticker stops.
pub fn spawn_ticker<T>(mycelium: SharedMycelium<T>, interval: Duration) -> TickerHandle
where
    T: TopologyProvider + Send + 'static,
{
    spawn_ticker_with(mycelium, interval, |_| {})
}

/// Like [`spawn_ticker`], calling `on_events` with each tick's events while
/// the lock is still held.
pub fn spawn_ticker_with<T, F>(
    mycelium: SharedMycelium<T>,
    interval: Duration,
    mut on_events: F,
) -> TickerHandle
where
    T: TopologyProvider + Send + 'static,
    F: FnMut(&[MyceliumEvent]) + Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let mut guard = mycelium.lock().await;
                    let events = guard.tick();
                    on_events(&events);
                    ticks += 1;
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        mycelium.lock().await.flush();
        debug!(ticks, "ticker stopped");
        ticks
    });

    TickerHandle { stop_tx, handle }
}
