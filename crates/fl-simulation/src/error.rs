use fl_core::MapId;

use crate::dog::DogId;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors returned by registry and session operations.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// No map with this id was loaded.
    #[error("map not found: {0}")]
    MapNotFound(MapId),

    /// No session runs on this map yet.
    #[error("session not found: {0}")]
    SessionNotFound(MapId),

    /// No dog with this id is in play.
    #[error("dog not found: {0}")]
    DogNotFound(DogId),

    /// A map with this id is already registered.
    #[error("map already exists: {0}")]
    DuplicateMap(MapId),

    /// A session for this map already exists.
    #[error("session already exists: {0}")]
    DuplicateSession(MapId),

    /// A dog with this id is already in play.
    #[error("dog already exists: {0}")]
    DuplicateDog(DogId),

    /// A snapshot cannot be restored into this registry.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
