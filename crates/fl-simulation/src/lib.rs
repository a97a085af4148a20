//! Tick-based simulation for Fetchland.
//!
//! Dogs move along the road corridors of a [`fl_core::Map`], loot appears at
//! random road points, and a sweep over each dog's path finds the loot and
//! offices it reached during the tick. The [`WorldRegistry`] owns every
//! session and drives the tick; all state can be captured as a
//! [`WorldSnapshot`] and restored from one.

/// Simulation clock for tracking ticks and elapsed time.
pub mod clock;
/// Sweep-based gatherer/item collision detection.
pub mod collision;
/// Configuration for a world registry.
pub mod config;
/// Mutable context passed to sessions each tick.
pub mod context;
/// Dogs and their corridor-clamped motion.
pub mod dog;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Loot items and the probabilistic loot generator.
pub mod loot;
/// The registry of maps and sessions.
pub mod registry;
/// A running game on one map.
pub mod session;
/// Serializable world state.
pub mod snapshot;

/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-exports of the collision engine entry points.
pub use collision::{GatheringEvent, ItemGathererProvider, ItemRef, find_gather_events};
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-export of [`context::TickContext`].
pub use context::TickContext;
/// Re-exports of [`dog::Dog`] and [`dog::DogId`].
pub use dog::{Dog, DogId};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-exports of loot types.
pub use loot::{LootGenerator, LootId, LootItem};
/// Re-exports of [`registry::WorldRegistry`] and [`registry::JoinOutcome`].
pub use registry::{JoinOutcome, WorldRegistry};
/// Re-exports of session types.
pub use session::{Retirement, Session, SessionId, SessionState, TickReport};
/// Re-exports of snapshot types.
pub use snapshot::{DogSnapshot, SessionSnapshot, WorldSnapshot};
