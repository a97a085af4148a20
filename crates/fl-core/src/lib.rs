//! Core types for Fetchland: the immutable road map the simulation runs on.
//!
//! This crate holds everything that is fixed for the lifetime of a server:
//! road geometry, offices, the loot catalog and the tunable per-map
//! parameters. It also loads that data from the JSON game configuration.
//! Nothing in here mutates during a tick.

/// Game configuration file loading.
pub mod config;
/// Movement directions and their client-facing codes.
pub mod direction;
/// Error types used throughout the crate.
pub mod error;
/// Integer and continuous 2D geometry.
pub mod geom;
/// Roads, offices, buildings, loot types and the map that owns them.
pub mod map;

/// Re-export configuration types.
pub use config::{GameConfig, LootSpawnConfig};
/// Re-export the direction enum.
pub use direction::Direction;
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export geometry types.
pub use geom::{Point, Position, Velocity};
/// Re-export map types.
pub use map::{Building, LootType, Map, MapId, Office, Road};
