//! Serializable copies of the mutable world state.
//!
//! Maps are not part of a snapshot: they come from the game configuration and
//! sessions refer to them by id. Durations are stored as whole nanoseconds, so
//! ticks of any length survive a save.

use std::time::Duration;

use fl_core::{Direction, MapId, Point, Position, Road, Velocity};
use serde::{Deserialize, Serialize};

use crate::dog::{Dog, DogId};
use crate::error::{SimError, SimResult};
use crate::loot::LootItem;

/// The whole registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick counter of the registry clock.
    pub tick: u64,
    /// Simulated time of the registry clock.
    pub elapsed_ns: u64,
    /// Id the next joining dog receives.
    pub next_dog_id: u64,
    /// All sessions.
    pub sessions: Vec<SessionSnapshot>,
}

/// One session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The map the session runs on.
    pub map_id: MapId,
    /// Id the next spawned loot item receives.
    pub next_loot_id: u64,
    /// Time accumulated by the loot generator since its last spawn.
    pub time_without_loot_ns: u64,
    /// Dogs in join order.
    pub dogs: Vec<DogSnapshot>,
    /// Loot on the ground.
    pub loot: Vec<LootItem>,
}

/// One dog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogSnapshot {
    /// Registry-wide dog id.
    pub id: DogId,
    /// Player name.
    pub name: String,
    /// Current position.
    pub position: Position,
    /// Position at the start of the last tick.
    pub previous_position: Position,
    /// Current velocity.
    pub velocity: Velocity,
    /// Direction last set.
    pub direction: Direction,
    /// Start and end of the road the dog last moved on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_road: Option<[Point; 2]>,
    /// Carried items in pickup order.
    pub bag: Vec<LootItem>,
    /// Score so far.
    pub score: u64,
    /// Idle time in nanoseconds.
    pub idle_ns: u64,
    /// Play time in nanoseconds.
    pub play_time_ns: u64,
}

impl From<&Dog> for DogSnapshot {
    fn from(dog: &Dog) -> Self {
        Self {
            id: dog.id,
            name: dog.name.clone(),
            position: dog.position,
            previous_position: dog.previous_position,
            velocity: dog.velocity,
            direction: dog.direction,
            current_road: dog.current_road.map(|r| [r.start(), r.end()]),
            bag: dog.bag.clone(),
            score: dog.score,
            idle_ns: nanos(dog.idle),
            play_time_ns: nanos(dog.play_time),
        }
    }
}

impl DogSnapshot {
    /// Rebuild the dog, rejecting non-finite coordinates and invalid roads.
    pub fn into_dog(self) -> SimResult<Dog> {
        let finite = [
            self.position.x,
            self.position.y,
            self.previous_position.x,
            self.previous_position.y,
            self.velocity.x,
            self.velocity.y,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(SimError::InvalidSnapshot(format!(
                "dog {} has a non-finite position or velocity",
                self.id
            )));
        }
        let current_road = self
            .current_road
            .map(|[start, end]| Road::new(start, end))
            .transpose()
            .map_err(|e| SimError::InvalidSnapshot(format!("dog {}: {e}", self.id)))?;

        Ok(Dog {
            id: self.id,
            name: self.name,
            position: self.position,
            previous_position: self.previous_position,
            velocity: self.velocity,
            direction: self.direction,
            current_road,
            bag: self.bag,
            score: self.score,
            idle: Duration::from_nanos(self.idle_ns),
            play_time: Duration::from_nanos(self.play_time_ns),
        })
    }
}

/// Whole nanoseconds of `d`, saturating after about 584 years.
pub(crate) fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
