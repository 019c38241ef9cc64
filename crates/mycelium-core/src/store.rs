//! Snapshot store: where derived state survives restarts.

use crate::error::Result;

/// Key under which the simulation snapshot is stored.
pub const STATE_KEY: &str = "mycelium.state";

/// Key under which the topology's grown edges are stored.
pub const GROWN_EDGES_KEY: &str = "mycelium.grown";

/// A string key-value store.
///
/// Writes are best-effort from the simulation's point of view: a failing
/// write is logged and dropped, never retried.
pub trait SnapshotStore {
    /// Read the value for `key`, `Ok(None)` if it was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value for `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}
