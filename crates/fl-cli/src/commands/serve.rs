use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use fl_app::{AppConfig, Application, Strand, StrandHandle};
use fl_simulation::SimConfig;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::protocol::{self, Joined, Request, TickSummary};

/// Options of `fetchland serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Game configuration file
    #[arg(short, long)]
    config_file: PathBuf,

    /// Advance the world automatically every this many milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    tick_period: Option<u64>,

    /// File the world is restored from and saved to
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Save automatically every this many simulated milliseconds
    #[arg(long)]
    save_state_period: Option<u64>,

    /// Place new dogs at random road points
    #[arg(long)]
    randomize_spawn_points: bool,

    /// SQLite leaderboard database (default: in memory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// RNG seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,
}

impl ServeArgs {
    fn app_config(&self) -> AppConfig {
        let mut sim = SimConfig::default().with_randomize_spawn(self.randomize_spawn_points);
        if let Some(seed) = self.seed {
            sim = sim.with_seed(seed);
        }
        let mut config = AppConfig::default().with_sim(sim);
        if let Some(ms) = self.tick_period {
            config = config.with_tick_period(Duration::from_millis(ms));
        }
        if let Some(path) = &self.state_file {
            config = config.with_state_file(path);
        }
        if let Some(ms) = self.save_state_period {
            config = config.with_save_period(Duration::from_millis(ms));
        }
        if let Some(path) = &self.db {
            config = config.with_leaderboard(path);
        }
        config
    }
}

/// Serve line commands until `quit`, end of input or Ctrl-C.
pub fn run(args: ServeArgs) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("cannot start runtime: {e}"))?;
    runtime.block_on(serve(args))
}

async fn serve(args: ServeArgs) -> Result<(), String> {
    let game = super::load_game(&args.config_file)?;
    let config = args.app_config();
    let mut app = Application::open(game, &config).map_err(|e| e.to_string())?;
    app.restore()
        .map_err(|e| format!("cannot restore state: {e}"))?;

    let (handle, strand) = Strand::spawn(app, config.tick_period);
    tracing::info!(config = %args.config_file.display(), "serving");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "cannot read stdin");
                        break;
                    }
                };
                let response = match protocol::parse(&line) {
                    Ok(None) => continue,
                    Ok(Some(Request::Quit)) => break,
                    Ok(Some(request)) => dispatch(&handle, request).await,
                    Err(e) => protocol::failure(&e),
                };
                println!("{response}");
            }
            _ = &mut interrupt => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    handle
        .shutdown()
        .await
        .map_err(|e| format!("shutdown failed: {e}"))?;
    strand
        .await
        .map_err(|e| format!("application task failed: {e}"))?;
    Ok(())
}

async fn dispatch(handle: &StrandHandle, request: Request) -> Value {
    match request {
        Request::Join { map, name } => {
            protocol::respond(handle.join(map, name).await.map(Joined::from))
        }
        Request::Move { dog, code } => protocol::respond(handle.set_direction(dog, code).await),
        Request::Tick(delta) => protocol::respond(handle.tick(delta).await.map(TickSummary::from)),
        Request::State(map) => protocol::respond(handle.state(map).await),
        Request::Maps => protocol::respond(handle.maps().await),
        Request::Records { offset, limit } => {
            protocol::respond(handle.records(offset, limit).await)
        }
        Request::Save => protocol::respond(handle.save().await),
        Request::Quit => protocol::respond(Ok(())),
    }
}
