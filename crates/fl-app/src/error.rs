use fl_core::CoreError;
use fl_simulation::SimError;
use fl_store::StoreError;

/// Alias for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;

/// Errors returned by the application and its strand.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad input at the command boundary, such as an unknown direction code.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The simulation rejected the command.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// Saving, loading or the leaderboard failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A player name must not be blank.
    #[error("player name must not be empty")]
    InvalidName,

    /// Ticks are driven by the periodic clock.
    #[error("manual ticks are disabled while a tick period is configured")]
    ManualTickDisabled,

    /// The strand has shut down.
    #[error("application strand is closed")]
    StrandClosed,
}
