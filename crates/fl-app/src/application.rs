use std::time::Duration;

use fl_core::{Direction, GameConfig, MapId};
use fl_simulation::{DogId, JoinOutcome, SessionState, TickReport, WorldRegistry, WorldSnapshot};
use fl_store::{LeaderboardSink, MemoryLeaderboard, PlayerRecord, SqliteLeaderboard, StateFile};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// A map as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapInfo {
    /// Map id, used to join.
    pub id: MapId,
    /// Display name.
    pub name: String,
}

/// Owner of all mutable game state.
///
/// Wraps the registry with the string-typed command surface, hands retired
/// players to the leaderboard and saves the world periodically.
pub struct Application {
    registry: WorldRegistry,
    leaderboard: Box<dyn LeaderboardSink>,
    state_file: Option<StateFile>,
    save_period: Option<Duration>,
    since_save: Duration,
    unrecorded: Vec<PlayerRecord>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("registry", &self.registry)
            .field("state_file", &self.state_file)
            .field("save_period", &self.save_period)
            .field("unrecorded", &self.unrecorded.len())
            .finish()
    }
}

impl Application {
    /// An application around `registry`, handing retirees to `leaderboard`.
    /// Nothing is saved until a state file is set.
    pub fn new(registry: WorldRegistry, leaderboard: Box<dyn LeaderboardSink>) -> Self {
        Self {
            registry,
            leaderboard,
            state_file: None,
            save_period: None,
            since_save: Duration::ZERO,
            unrecorded: Vec::new(),
        }
    }

    /// Save to `file`, automatically every `period` of simulated time if set.
    pub fn with_state_file(mut self, file: StateFile, period: Option<Duration>) -> Self {
        self.state_file = Some(file);
        self.save_period = period;
        self
    }

    /// Build the application described by `config` around the maps of `game`.
    pub fn open(game: GameConfig, config: &AppConfig) -> AppResult<Self> {
        let registry = WorldRegistry::from_maps(game.maps, config.sim.clone())?;
        let leaderboard: Box<dyn LeaderboardSink> = match &config.leaderboard {
            Some(path) => Box::new(SqliteLeaderboard::open(path, config.pool_size)?),
            None => Box::new(MemoryLeaderboard::new()),
        };
        let app = Self::new(registry, leaderboard);
        Ok(match &config.state_file {
            Some(path) => app.with_state_file(StateFile::new(path), config.save_period),
            None => app,
        })
    }

    /// The simulation state, read-only.
    pub fn registry(&self) -> &WorldRegistry {
        &self.registry
    }

    /// Load the state file into the registry. Returns whether anything was
    /// loaded.
    pub fn restore(&mut self) -> AppResult<bool> {
        let Some(file) = &self.state_file else {
            return Ok(false);
        };
        let Some(snapshot) = file.load::<WorldSnapshot>()? else {
            tracing::info!(path = %file.path().display(), "no saved state");
            return Ok(false);
        };
        self.registry.restore(snapshot)?;
        tracing::info!(path = %file.path().display(), "state restored");
        Ok(true)
    }

    /// Retirees the leaderboard has not accepted yet.
    pub fn unrecorded(&self) -> &[PlayerRecord] {
        &self.unrecorded
    }

    /// Hand queued retirees to the leaderboard. They stay queued on failure.
    pub fn flush_records(&mut self) -> AppResult<()> {
        if self.unrecorded.is_empty() {
            return Ok(());
        }
        self.leaderboard.record(&self.unrecorded)?;
        tracing::debug!(count = self.unrecorded.len(), "retirees recorded");
        self.unrecorded.clear();
        Ok(())
    }

    fn try_flush_records(&mut self) {
        if let Err(e) = self.flush_records() {
            tracing::warn!(
                error = %e,
                pending = self.unrecorded.len(),
                "leaderboard unavailable, retirees kept for retry"
            );
        }
    }

    /// Write the world to the state file. Returns whether a file is configured.
    ///
    /// Queued retirees are retried first.
    pub fn save(&mut self) -> AppResult<bool> {
        self.try_flush_records();
        let Some(file) = &self.state_file else {
            return Ok(false);
        };
        file.save(&self.registry.snapshot())?;
        self.since_save = Duration::ZERO;
        tracing::info!(path = %file.path().display(), tick = self.registry.clock().tick(), "state saved");
        Ok(true)
    }

    /// Add a player to the session on `map`.
    pub fn join(&mut self, map: &str, name: &str) -> AppResult<JoinOutcome> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidName);
        }
        Ok(self.registry.join(&MapId::new(map), name)?)
    }

    /// Steer a dog with a client direction code.
    pub fn set_direction(&mut self, dog: DogId, code: &str) -> AppResult<()> {
        let direction = Direction::parse(code)?;
        Ok(self.registry.set_direction(dog, direction)?)
    }

    /// Advance the world, record retirees and save if a save is due.
    ///
    /// A leaderboard failure does not fail the tick: the retirees are queued
    /// and retried on the next tick or save.
    pub fn tick(&mut self, delta: Duration) -> AppResult<TickReport> {
        let report = self.registry.tick(delta);
        self.unrecorded
            .extend(report.retired.iter().map(PlayerRecord::from));
        self.try_flush_records();
        if let Some(period) = self.save_period {
            self.since_save += delta;
            if self.since_save >= period {
                self.save()?;
            }
        }
        Ok(report)
    }

    /// The client view of a session.
    pub fn state(&self, session: &str) -> AppResult<SessionState> {
        Ok(self.registry.state(&MapId::new(session))?)
    }

    /// Every loaded map, in configuration order.
    pub fn maps(&self) -> Vec<MapInfo> {
        self.registry
            .maps()
            .iter()
            .map(|m| MapInfo {
                id: m.id().clone(),
                name: m.name().to_string(),
            })
            .collect()
    }

    /// A page of the leaderboard.
    pub fn records(&self, offset: usize, limit: usize) -> AppResult<Vec<PlayerRecord>> {
        Ok(self.leaderboard.top(offset, limit)?)
    }
}
