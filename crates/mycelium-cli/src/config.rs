//! Configuration management for Mycelium CLI.

use anyhow::{Context, Result};
use mycelium::prelude::MyceliumConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "mycelium.toml";

/// Mycelium project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub simulation: MyceliumConfig,
}

/// Where the project's inputs and state live, relative to `mycelium.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_rooms")]
    pub rooms: String,
    #[serde(default = "default_memories")]
    pub memories: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

// Default value functions
fn default_rooms() -> String { "rooms.toml".to_string() }
fn default_memories() -> String { "memories.json".to_string() }
fn default_data_dir() -> String { ".mycelium".to_string() }

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            rooms: default_rooms(),
            memories: default_memories(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load config from mycelium.toml in the current or parent directories.
    ///
    /// Returns the config and the directory relative paths resolve against.
    pub fn load() -> Result<(Self, PathBuf)> {
        match find_config_file() {
            Some(path) => {
                let config = Self::load_from(&path)?;
                let root = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                Ok((config, root))
            }
            None => Ok((Config::default(), std::env::current_dir()?)),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find mycelium.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
