//! CLI frontend for the Fetchland game server.

mod commands;
mod protocol;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fetchland",
    about = "Fetchland: dogs, roads and lost-and-found loot",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the game and answer line commands on stdin with JSON on stdout
    Serve(commands::serve::ServeArgs),

    /// Run a headless game with randomly steered dogs
    Simulate {
        /// Game configuration file
        #[arg(short, long)]
        config_file: PathBuf,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "100")]
        ticks: u64,

        /// Simulated milliseconds per tick
        #[arg(long, default_value = "100")]
        tick_ms: u64,

        /// Player to add, as `name@map` (default: one dog per map)
        #[arg(short, long = "player")]
        players: Vec<String>,

        /// RNG seed for deterministic runs
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Show all events (not just summary)
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the maps of a game configuration
    Maps {
        /// Game configuration file
        #[arg(short, long)]
        config_file: PathBuf,
    },

    /// Show a page of the leaderboard
    Records {
        /// Leaderboard database
        #[arg(long)]
        db: PathBuf,

        /// Number of records to skip
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Number of records to show (at most 100)
        #[arg(long, default_value = "100")]
        limit: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(args),
        Commands::Simulate {
            config_file,
            ticks,
            tick_ms,
            players,
            seed,
            verbose,
        } => commands::simulate::run(&config_file, ticks, tick_ms, &players, seed, verbose),
        Commands::Maps { config_file } => commands::maps::run(&config_file),
        Commands::Records { db, offset, limit } => commands::records::run(&db, offset, limit),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
