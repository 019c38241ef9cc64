//! Show one room's state and its edges.

use anyhow::Result;
use colored::Colorize;
use mycelium::prelude::*;

use crate::project::{require_room, Project};

pub fn run(room: &str) -> Result<()> {
    let project = Project::load()?;
    let mycelium = project.open(None)?;
    let room = require_room(&mycelium, room)?;
    let topology = mycelium.topology();

    let marker = if mycelium.active_room() == Some(&room) {
        " (visitor here)".green().to_string()
    } else {
        String::new()
    };
    println!("{}{}", room.to_string().white().bold(), marker);
    println!("{}", "─".repeat(40).dimmed());
    println!("  Nutrient:      {:.4}", mycelium.nutrients(&room));
    println!("  Ripeness:      {:.4}", mycelium.ripeness(&room));
    println!(
        "  Discoverable:  {}",
        if topology.is_discoverable(&room) { "yes" } else { "no" }
    );
    match mycelium.last_visit(&room) {
        Some(ms) => println!("  Last visit:    {} ms since epoch", ms),
        None => println!("  Last visit:    never"),
    }

    let fired: Vec<String> = mycelium
        .config()
        .ripening
        .milestones
        .iter()
        .filter(|&&m| mycelium.state().has_fired(&room, m))
        .map(|m| format!("{m}"))
        .collect();
    if !fired.is_empty() {
        println!("  Milestones:    {}", fired.join(", ").yellow());
    }

    println!();
    println!("{}", "Edges".blue().bold());
    for neighbor in topology.neighbors(&room) {
        let kind = if topology.is_statically_connected(&room, &neighbor) {
            "static".dimmed()
        } else {
            "grown".green()
        };
        println!(
            "  {:<18} {:<8} trail {:.3}",
            neighbor.to_string(),
            kind,
            mycelium.trail_strength(&room, &neighbor)
        );
    }

    Ok(())
}
