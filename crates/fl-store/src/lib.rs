//! Persistence for Fetchland.
//!
//! Two independent stores live here: the state file, which holds a JSON
//! [`fl_simulation::WorldSnapshot`] replaced atomically on every save, and the
//! leaderboard of retired players, kept in SQLite behind a small blocking
//! connection pool.

/// Error types for the store crate.
pub mod error;
/// A fixed-size pool of exclusive connections.
pub mod pool;
/// Retired player records and leaderboard sinks.
pub mod records;
/// Atomic JSON state files.
pub mod state_file;

/// Re-exports of [`error::StoreError`] and [`error::StoreResult`].
pub use error::{StoreError, StoreResult};
/// Re-exports of the pool types.
pub use pool::{ConnectionPool, PooledConnection};
/// Re-exports of leaderboard types.
pub use records::{LeaderboardSink, MAX_PAGE, MemoryLeaderboard, PlayerRecord, SqliteLeaderboard};
/// Re-export of [`state_file::StateFile`].
pub use state_file::StateFile;
