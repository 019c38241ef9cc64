//! Move the visitor into a room.

use anyhow::Result;
use colored::Colorize;
use mycelium::prelude::*;

use crate::project::{require_room, Project};

pub fn run(room: &str) -> Result<()> {
    let project = Project::load()?;
    let mut mycelium = project.open(None)?;
    let room = require_room(&mycelium, room)?;

    // Navigation flushes the snapshot itself.
    match mycelium.on_room_enter(&room) {
        MyceliumEvent::Entered { room, from: Some(from), trail } => {
            println!(
                "{} {} → {}  trail {}",
                "→".blue(),
                from.to_string().dimmed(),
                room.to_string().cyan().bold(),
                format!("{trail:.3}").green()
            );
        }
        _ => println!("{} Entered {}", "→".blue(), room.to_string().cyan().bold()),
    }

    println!(
        "  Nutrient: {:.3}   Ripeness: {:.3}",
        mycelium.nutrients(&room),
        mycelium.ripeness(&room)
    );
    let exits: Vec<String> = mycelium
        .topology()
        .neighbors(&room)
        .iter()
        .map(|r| r.to_string())
        .collect();
    println!("  Exits:    {}", exits.join(", ").yellow());

    Ok(())
}
