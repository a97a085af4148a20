use std::path::PathBuf;
use std::time::Duration;

use fl_simulation::SimConfig;

/// How the application is wired up around the simulation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Period of the automatic clock. `None` means ticks are sent as commands.
    pub tick_period: Option<Duration>,
    /// Where the world is saved. `None` disables saving.
    pub state_file: Option<PathBuf>,
    /// Simulated time between automatic saves. `None` saves only on request
    /// and at shutdown.
    pub save_period: Option<Duration>,
    /// SQLite leaderboard database. `None` keeps records in memory.
    pub leaderboard: Option<PathBuf>,
    /// Number of leaderboard connections.
    pub pool_size: usize,
    /// Simulation settings.
    pub sim: SimConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_period: None,
            state_file: None,
            save_period: None,
            leaderboard: None,
            pool_size: 4,
            sim: SimConfig::default(),
        }
    }
}

impl AppConfig {
    /// Drive ticks from a clock with this period. A zero period keeps ticks
    /// manual.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = Some(period).filter(|p| !p.is_zero());
        self
    }

    /// Save the world to `path`.
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    /// Save automatically every `period` of simulated time.
    pub fn with_save_period(mut self, period: Duration) -> Self {
        self.save_period = Some(period);
        self
    }

    /// Keep the leaderboard in the SQLite database at `path`.
    pub fn with_leaderboard(mut self, path: impl Into<PathBuf>) -> Self {
        self.leaderboard = Some(path.into());
        self
    }

    /// Set the number of leaderboard connections.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the simulation settings.
    pub fn with_sim(mut self, sim: SimConfig) -> Self {
        self.sim = sim;
        self
    }
}
