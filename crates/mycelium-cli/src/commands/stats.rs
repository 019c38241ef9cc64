//! Show simulation statistics.

use anyhow::Result;
use colored::Colorize;
use mycelium::prelude::*;

use crate::project::Project;

pub fn run() -> Result<()> {
    let project = Project::load()?;
    let mycelium = project.open(None)?;
    let stats = mycelium.stats();

    println!("{}", "Mycelium Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "World".blue().bold());
    println!("  Rooms:             {}", stats.rooms.to_string().cyan());
    println!(
        "  Visitor in:        {}",
        stats
            .active_room
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string())
            .cyan()
    );
    println!("  Ticks run:         {}", stats.tick.to_string().cyan());
    println!();

    println!("{}", "Growth".blue().bold());
    println!("  Total nutrient:    {:.3}", stats.total_nutrient);
    println!("  System ripeness:   {:.1}%", stats.system_ripeness * 100.0);
    println!("  Ripe rooms:        {}", stats.ripe_rooms.to_string().green());
    println!("  Milestones fired:  {}", stats.milestones_fired);
    println!();

    println!("{}", "Trails".blue().bold());
    println!("  Live trails:       {}", stats.live_trails.to_string().cyan());
    if let Some((edge, strength)) = &stats.strongest_trail {
        println!("  Strongest:         {} ({:.3})", edge.to_string().yellow(), strength);
    }
    println!("  Grown passages:    {}", stats.grown_edges.to_string().green());
    println!("  Memories composted: {}", stats.composted);
    println!();

    let top = MyceliumStats::top_ripeness(mycelium.state(), 5);
    if !top.is_empty() {
        println!("{}", "Ripest Rooms".blue().bold());
        for (room, ripeness) in top {
            println!("  {:<18} {:.3}", room.to_string(), ripeness);
        }
        println!();
    }

    println!("{}", "═".repeat(40).dimmed());

    Ok(())
}
