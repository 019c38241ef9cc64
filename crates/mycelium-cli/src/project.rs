//! Loading a project's world: rooms, memories and the persisted simulation.

use anyhow::{bail, Context, Result};
use mycelium::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// The `rooms.toml` file: a list of `[[rooms]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomsFile {
    #[serde(default)]
    pub rooms: Vec<RoomSpec>,
}

/// Sample world written by `mycelium init`.
pub const SAMPLE_ROOMS: &str = r#"# Rooms and their exits. Exits are two-way.
# Rooms with `discoverable = false` never receive grown passages.

[[rooms]]
id = "atrium"
exits = ["library", "garden", "stair"]

[[rooms]]
id = "library"
exits = ["study", "archive"]

[[rooms]]
id = "garden"
exits = ["greenhouse", "pond"]

[[rooms]]
id = "stair"
exits = ["tower"]

[[rooms]]
id = "study"

[[rooms]]
id = "archive"

[[rooms]]
id = "greenhouse"
exits = ["pond"]

[[rooms]]
id = "pond"

[[rooms]]
id = "tower"

[[rooms]]
id = "crypt"
exits = ["archive"]
discoverable = false
"#;

/// Sample memories written by `mycelium init`.
pub const SAMPLE_MEMORIES: &str = r#"[
  { "id": "first-visit", "decay_degree": 0.95 },
  { "id": "old-guestbook", "decay_degree": 0.8 },
  { "id": "recent-note", "decay_degree": 0.1 }
]
"#;

/// A compost source backed by a JSON file of decaying items.
///
/// The file is re-read on every check so edits are picked up while running.
/// A missing file means nothing has decayed yet.
pub struct MemoryFile {
    path: PathBuf,
}

impl MemoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CompostSource for MemoryFile {
    fn list_decaying_items(&self) -> mycelium::prelude::Result<Vec<DecayingItem>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| {
            MyceliumError::compost_unavailable(format!("{}: {e}", self.path.display()))
        })
    }
}

/// A loaded project.
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Find and load the project around the current directory.
    pub fn load() -> Result<Self> {
        let (config, root) = Config::load()?;
        Ok(Self { root, config })
    }

    pub fn rooms_path(&self) -> PathBuf {
        self.root.join(&self.config.project.rooms)
    }

    pub fn memories_path(&self) -> PathBuf {
        self.root.join(&self.config.project.memories)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(&self.config.project.data_dir)
    }

    pub fn rooms(&self) -> Result<Vec<RoomSpec>> {
        load_rooms(&self.rooms_path())
    }

    /// Build the simulation over the project's rooms, restoring persisted
    /// state and grown edges from the data directory.
    pub fn open(&self, seed: Option<u64>) -> Result<Mycelium> {
        let specs = self.rooms()?;
        let data_dir = self.data_dir();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let store = FileStore::new(&data_dir);

        let mut config = self.config.simulation.clone();
        if seed.is_some() {
            config.seed = seed;
        }

        let graph = RoomGraph::new(specs).with_store(Box::new(store.clone()));
        let mycelium = Mycelium::builder(graph)
            .config(config)
            .store(store)
            .compost_source(MemoryFile::new(self.memories_path()))
            .build()
            .context("Invalid [simulation] settings")?;
        Ok(mycelium)
    }
}

/// Parse a rooms file.
pub fn load_rooms(path: &Path) -> Result<Vec<RoomSpec>> {
    if !path.exists() {
        bail!(
            "No rooms file at {}. Run `mycelium init` first.",
            path.display()
        );
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rooms: {}", path.display()))?;
    let file: RoomsFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse rooms: {}", path.display()))?;
    if file.rooms.is_empty() {
        bail!("{} defines no rooms", path.display());
    }
    Ok(file.rooms)
}

/// Resolve a room id against the topology, with a helpful error.
pub fn require_room(mycelium: &Mycelium, room: &str) -> Result<RoomId> {
    let id = RoomId::from(room);
    if !mycelium.topology().contains(&id) {
        let known: Vec<String> = mycelium
            .topology()
            .rooms()
            .iter()
            .map(|r| r.to_string())
            .collect();
        bail!("Unknown room '{}'. Known rooms: {}", room, known.join(", "));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rooms_parse() {
        let file: RoomsFile = toml::from_str(SAMPLE_ROOMS).unwrap();
        assert_eq!(file.rooms.len(), 10);
        let crypt = file.rooms.iter().find(|r| r.id.as_str() == "crypt").unwrap();
        assert!(!crypt.discoverable);
        assert!(file.rooms[0].discoverable);
    }

    #[test]
    fn sample_memories_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memories.json");
        std::fs::write(&path, SAMPLE_MEMORIES).unwrap();

        let items = MemoryFile::new(&path).list_decaying_items().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "first-visit");
    }

    #[test]
    fn missing_memories_are_empty_and_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memories.json");
        assert!(MemoryFile::new(&path).list_decaying_items().unwrap().is_empty());

        std::fs::write(&path, "not json").unwrap();
        assert!(MemoryFile::new(&path).list_decaying_items().is_err());
    }

    #[test]
    fn project_opens_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rooms.toml"), SAMPLE_ROOMS).unwrap();
        let project = Project {
            root: dir.path().to_path_buf(),
            config: Config::default(),
        };

        {
            let mut m = project.open(Some(1)).unwrap();
            let atrium = require_room(&m, "atrium").unwrap();
            m.on_room_enter(&atrium);
            m.run_fixed(10, 1.0);
            assert!(m.flush());
        }

        let m = project.open(None).unwrap();
        assert_eq!(m.active_room(), Some(&RoomId::from("atrium")));
        assert!(require_room(&m, "ballroom").is_err());
    }
}
