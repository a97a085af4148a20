use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// An integer coordinate on the road grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate, growing to the east.
    pub x: i32,
    /// Vertical coordinate, growing to the south.
    pub y: i32,
}

impl Point {
    /// Create a point from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Position::new(f64::from(p.x), f64::from(p.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A continuous position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product, treating both positions as vectors from the origin.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Squared length, treating the position as a vector from the origin.
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// The nearest grid cell, rounding half away from zero on each axis.
    pub fn rounded(self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl Add<Velocity> for Position {
    type Output = Position;

    fn add(self, v: Velocity) -> Position {
        Position::new(self.x + v.x, self.y + v.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, other: Position) -> Position {
        Position::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// A velocity in world units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Velocity {
    /// The zero velocity.
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    /// Create a velocity from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both components are exactly zero.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Scale by a duration expressed in seconds.
    pub fn scaled(self, seconds: f64) -> Velocity {
        Velocity::new(self.x * seconds, self.y * seconds)
    }
}
