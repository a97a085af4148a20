/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by state files and the leaderboard.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A state file could not be encoded or decoded.
    #[error("state encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The leaderboard database failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A leaderboard page larger than allowed was requested.
    #[error("page size {requested} exceeds the maximum of {max}")]
    LimitTooLarge {
        /// The requested page size.
        requested: usize,
        /// The largest page size served.
        max: usize,
    },

    /// A pool was created without connections.
    #[error("connection pool needs at least one connection")]
    EmptyPool,
}
