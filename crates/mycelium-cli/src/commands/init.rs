//! Initialize a new Mycelium project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};
use crate::project::{SAMPLE_MEMORIES, SAMPLE_ROOMS};

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    println!("{} Initializing Mycelium project...", "→".blue());

    let config = Config::default();

    // Create data directory
    let data_dir = base_path.join(&config.project.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    println!("  {} Created {}", "✓".green(), data_dir.display());

    // Create default config
    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        config.save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    write_if_missing(&base_path.join(&config.project.rooms), SAMPLE_ROOMS)?;
    write_if_missing(&base_path.join(&config.project.memories), SAMPLE_MEMORIES)?;

    // Snapshots are machine state, not project input
    let gitignore_path = data_dir.join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, "*.json\n")?;
        println!("  {} Created {}", "✓".green(), gitignore_path.display());
    }

    println!();
    println!("{} Mycelium project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} mycelium enter atrium", "1.".blue());
    println!("  {} mycelium run --ticks 300 --walk", "2.".blue());
    println!("  {} mycelium stats", "3.".blue());

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("  {} {} already exists", "•".yellow(), path.display());
        return Ok(());
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("  {} Created {}", "✓".green(), path.display());
    Ok(())
}
