//! The Fetchland application layer.
//!
//! [`Application`] ties the simulation registry to the leaderboard and the
//! state file. [`Strand`] runs it on a single tokio task and hands out
//! [`StrandHandle`]s, so every command and clock tick is applied in one
//! sequence.

/// The owner of all mutable game state.
pub mod application;
/// Application wiring configuration.
pub mod config;
/// Error types for the application crate.
pub mod error;
/// The task that serializes commands and ticks.
pub mod strand;

/// Re-exports of the application types.
pub use application::{Application, MapInfo};
/// Re-export of [`config::AppConfig`].
pub use config::AppConfig;
/// Re-exports of [`error::AppError`] and [`error::AppResult`].
pub use error::{AppError, AppResult};
/// Re-exports of the strand types.
pub use strand::{Strand, StrandHandle};
