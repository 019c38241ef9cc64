//! Run the simulation.

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mycelium::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::project::Project;

/// Chance per tick that the wandering visitor takes an exit.
const WALK_MOVE_PROBABILITY: f64 = 0.1;

pub fn run(ticks: u64, dt: Option<f64>, walk: bool, seed: Option<u64>, verbose: bool) -> Result<()> {
    let project = Project::load()?;

    println!("{} Loading {}...", "→".blue(), project.rooms_path().display());
    let mut mycelium = project.open(seed)?;
    let dt = dt.unwrap_or(mycelium.config().tick_interval_ms as f64 / 1000.0);

    let initial = mycelium.stats();
    println!(
        "  Loaded: {} rooms, {} trails, {} grown passages",
        initial.rooms.to_string().cyan(),
        initial.live_trails.to_string().cyan(),
        initial.grown_edges.to_string().cyan()
    );

    let mut walker = walk.then(|| match seed {
        Some(s) => StdRng::seed_from_u64(s.wrapping_add(1)),
        None => StdRng::from_entropy(),
    });
    if walker.is_some() && mycelium.active_room().is_none() {
        if let Some(start) = mycelium.topology().rooms().into_iter().next() {
            mycelium.on_room_enter(&start);
        }
    }

    println!(
        "{} Running {} ticks at dt {}s...",
        "→".blue(),
        ticks.to_string().cyan(),
        dt
    );

    let pb = ProgressBar::new(ticks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks")?
            .progress_chars("#>-"),
    );

    for _ in 0..ticks {
        if let Some(rng) = walker.as_mut() {
            wander(&mut mycelium, rng);
        }
        for event in mycelium.tick_with_dt(dt) {
            if let Some(line) = describe(&event) {
                pb.println(line);
            } else if verbose {
                if let MyceliumEvent::TickComplete { tick, total_nutrient, .. } = event {
                    debug!(tick, total_nutrient, "tick complete");
                }
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    mycelium.flush();

    let fin = mycelium.stats();
    println!();
    println!("{} Simulation complete!", "✓".green().bold());
    println!(
        "  Nutrient:  {} → {}",
        format!("{:.3}", initial.total_nutrient).yellow(),
        format!("{:.3}", fin.total_nutrient).green()
    );
    println!(
        "  Ripeness:  {} → {}",
        format!("{:.1}%", initial.system_ripeness * 100.0).yellow(),
        format!("{:.1}%", fin.system_ripeness * 100.0).green()
    );
    println!(
        "  Passages:  {} → {}",
        initial.grown_edges.to_string().yellow(),
        fin.grown_edges.to_string().green()
    );

    Ok(())
}

/// Occasionally move the visitor through a random exit.
fn wander(mycelium: &mut Mycelium, rng: &mut StdRng) {
    if !rng.gen_bool(WALK_MOVE_PROBABILITY) {
        return;
    }
    let Some(here) = mycelium.active_room().cloned() else {
        return;
    };
    let exits = mycelium.topology().neighbors(&here);
    if exits.is_empty() {
        return;
    }
    let next = exits[rng.gen_range(0..exits.len())].clone();
    mycelium.on_room_enter(&next);
}

/// One-line summary for events worth showing above the progress bar.
fn describe(event: &MyceliumEvent) -> Option<String> {
    match event {
        MyceliumEvent::MilestoneReached { room, milestone } => Some(format!(
            "  {} {} ripened to {}",
            "✿".magenta(),
            room.to_string().cyan(),
            milestone
        )),
        MyceliumEvent::Composted { item, room, amount, .. } => Some(format!(
            "  {} composted {} in {} (+{:.2})",
            "♻".green(),
            item.yellow(),
            room.to_string().cyan(),
            amount
        )),
        MyceliumEvent::EdgeGrown { edge, via } => Some(format!(
            "  {} grew {} (worn through {})",
            "⟿".green().bold(),
            edge.to_string().cyan().bold(),
            via
        )),
        _ => None,
    }
}
