use crate::geom::Point;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or loading map data.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A road is neither strictly horizontal nor strictly vertical.
    #[error("road from {start} to {end} must be axis-aligned and non-empty")]
    InvalidRoad {
        /// The road's start point.
        start: Point,
        /// The road's end point.
        end: Point,
    },

    /// Two offices on one map share an id.
    #[error("office already exists: \"{0}\"")]
    DuplicateOffice(String),

    /// Two maps in one configuration share an id.
    #[error("map already exists: \"{0}\"")]
    DuplicateMap(String),

    /// A direction code other than `L`, `R`, `U`, `D` or the empty string.
    #[error("invalid direction: \"{0}\"")]
    InvalidDirection(String),

    /// The configuration is structurally valid JSON but semantically wrong.
    #[error("config error: {0}")]
    Config(String),

    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for the expected shape.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}
