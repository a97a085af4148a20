use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::geom::Velocity;

/// The direction a dog is heading in.
///
/// Clients address directions with single-letter codes; `Idle` is the empty
/// code and means "stand still".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards negative `y` (`"U"`).
    North,
    /// Towards positive `y` (`"D"`).
    South,
    /// Towards positive `x` (`"R"`).
    East,
    /// Towards negative `x` (`"L"`).
    West,
    /// Not moving (`""`).
    #[default]
    Idle,
}

impl Direction {
    /// Parse a client direction code.
    ///
    /// The empty string is `Idle`; anything other than `L`, `R`, `U`, `D` is
    /// rejected.
    pub fn parse(code: &str) -> CoreResult<Self> {
        match code {
            "L" => Ok(Self::West),
            "R" => Ok(Self::East),
            "U" => Ok(Self::North),
            "D" => Ok(Self::South),
            "" => Ok(Self::Idle),
            other => Err(CoreError::InvalidDirection(other.to_string())),
        }
    }

    /// The client-facing code for this direction.
    pub fn code(self) -> &'static str {
        match self {
            Self::West => "L",
            Self::East => "R",
            Self::North => "U",
            Self::South => "D",
            Self::Idle => "",
        }
    }

    /// East or West.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }

    /// North or South.
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    /// `-1.0`, `1.0` or `0.0` along the moving axis.
    pub fn sign(self) -> f64 {
        match self {
            Self::West | Self::North => -1.0,
            Self::East | Self::South => 1.0,
            Self::Idle => 0.0,
        }
    }

    /// The velocity of something moving this way at `speed` units per second.
    pub fn velocity(self, speed: f64) -> Velocity {
        match self {
            Self::West | Self::East => Velocity::new(self.sign() * speed, 0.0),
            Self::North | Self::South => Velocity::new(0.0, self.sign() * speed),
            Self::Idle => Velocity::ZERO,
        }
    }

    /// The four moving directions.
    pub const MOVING: [Direction; 4] = [Self::North, Self::South, Self::East, Self::West];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::North => write!(f, "north"),
            Self::South => write!(f, "south"),
            Self::East => write!(f, "east"),
            Self::West => write!(f, "west"),
            Self::Idle => write!(f, "idle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_codes() {
        assert_eq!(Direction::parse("L").unwrap(), Direction::West);
        assert_eq!(Direction::parse("R").unwrap(), Direction::East);
        assert_eq!(Direction::parse("U").unwrap(), Direction::North);
        assert_eq!(Direction::parse("D").unwrap(), Direction::South);
        assert_eq!(Direction::parse("").unwrap(), Direction::Idle);
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert!(matches!(
            Direction::parse("X"),
            Err(CoreError::InvalidDirection(code)) if code == "X"
        ));
        assert!(Direction::parse("l").is_err());
    }

    #[test]
    fn code_round_trips() {
        for dir in Direction::MOVING.into_iter().chain([Direction::Idle]) {
            assert_eq!(Direction::parse(dir.code()).unwrap(), dir);
        }
    }

    #[test]
    fn velocity_follows_axis_and_sign() {
        assert_eq!(Direction::West.velocity(2.0), Velocity::new(-2.0, 0.0));
        assert_eq!(Direction::East.velocity(2.0), Velocity::new(2.0, 0.0));
        assert_eq!(Direction::North.velocity(2.0), Velocity::new(0.0, -2.0));
        assert_eq!(Direction::South.velocity(2.0), Velocity::new(0.0, 2.0));
        assert!(Direction::Idle.velocity(2.0).is_zero());
    }
}
