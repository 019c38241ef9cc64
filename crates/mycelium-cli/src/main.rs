//! Mycelium CLI - drive a room-graph simulation from the terminal.

mod commands;
mod config;
mod project;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mycelium")]
#[command(author, version, about = "Mycelium - a living room graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Mycelium project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Move the visitor into a room
    Enter {
        /// Room id
        room: String,
    },

    /// Run the simulation
    Run {
        /// Number of ticks to run
        #[arg(short, long, default_value = "100")]
        ticks: u64,

        /// Seconds of simulated time per tick (default: the configured tick interval)
        #[arg(long)]
        dt: Option<f64>,

        /// Let a visitor wander the rooms while ticking
        #[arg(short, long)]
        walk: bool,

        /// RNG seed for growth sampling and the walk
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show simulation statistics
    Stats,

    /// Show one room's state and its edges
    Inspect {
        /// Room id
        room: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Enter { room } => commands::enter::run(&room),
        Commands::Run { ticks, dt, walk, seed } => {
            commands::run::run(ticks, dt, walk, seed, cli.verbose)
        }
        Commands::Stats => commands::stats::run(),
        Commands::Inspect { room } => commands::inspect::run(&room),
    }
}
