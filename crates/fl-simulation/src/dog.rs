use std::fmt;
use std::time::Duration;

use fl_core::{Direction, Position, Road, Velocity, map::ROAD_HALF_WIDTH};
use serde::{Deserialize, Serialize};

use crate::loot::LootItem;

/// Capture width of a dog.
pub const DOG_WIDTH: f64 = 0.6;

/// Identifier of a dog, unique across the whole registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DogId(pub u64);

impl fmt::Display for DogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player-controlled dog.
///
/// Dogs move along the road corridors of their map, pick up loot into a
/// bounded bag and hand the bag over at offices for score.
#[derive(Debug, Clone, PartialEq)]
pub struct Dog {
    pub(crate) id: DogId,
    pub(crate) name: String,
    pub(crate) position: Position,
    pub(crate) previous_position: Position,
    pub(crate) velocity: Velocity,
    pub(crate) direction: Direction,
    pub(crate) current_road: Option<Road>,
    pub(crate) bag: Vec<LootItem>,
    pub(crate) score: u64,
    pub(crate) idle: Duration,
    pub(crate) play_time: Duration,
}

impl Dog {
    /// A standing dog with an empty bag.
    pub fn new(id: DogId, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            previous_position: position,
            velocity: Velocity::ZERO,
            direction: Direction::Idle,
            current_road: None,
            bag: Vec::new(),
            score: 0,
            idle: Duration::ZERO,
            play_time: Duration::ZERO,
        }
    }

    /// The dog's registry-wide id.
    pub fn id(&self) -> DogId {
        self.id
    }

    /// The player name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the dog stands now.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Where the dog stood before the last call to [`Dog::advance`].
    pub fn previous_position(&self) -> Position {
        self.previous_position
    }

    /// Current velocity; zero when standing.
    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// The direction last set, kept after the dog stops at a bound.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The road the last move was clamped against, if any.
    pub fn current_road(&self) -> Option<Road> {
        self.current_road
    }

    /// Carried items in pickup order.
    pub fn bag(&self) -> &[LootItem] {
        &self.bag
    }

    /// Score from all deliveries so far.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Time spent standing still since the dog last moved.
    pub fn idle_time(&self) -> Duration {
        self.idle
    }

    /// Time spent in the game.
    pub fn play_time(&self) -> Duration {
        self.play_time
    }

    /// Head in `direction` at `speed` units per second. `Idle` stops the dog.
    ///
    /// A negative or non-finite speed leaves the dog standing, facing
    /// `direction`.
    pub fn set_direction(&mut self, direction: Direction, speed: f64) {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            0.0
        };
        self.direction = direction;
        self.velocity = direction.velocity(speed);
    }

    /// Account for `delta` of play time, growing or resetting the idle timer.
    pub fn track_activity(&mut self, delta: Duration) {
        self.play_time += delta;
        if self.velocity.is_zero() {
            self.idle += delta;
        } else {
            self.idle = Duration::ZERO;
        }
    }

    /// Move for `delta`, staying inside the road corridors.
    ///
    /// Among the roads through the current cell that run along the direction
    /// of travel, the one reaching furthest ahead bounds the move. Without
    /// such a road the dog may only wander within its cell. Hitting a bound
    /// stops the dog.
    pub fn advance(&mut self, delta: Duration, roads: &[Road]) {
        self.previous_position = self.position;
        if delta.is_zero() || self.velocity.is_zero() {
            return;
        }

        let horizontal = self.direction.is_horizontal();
        let sign = self.direction.sign();
        if sign == 0.0 {
            return;
        }
        let cell = self.position.rounded();
        let target = self.position + self.velocity.scaled(delta.as_secs_f64());

        let road = roads
            .iter()
            .filter(|r| r.contains_cell(cell))
            .filter(|r| {
                if horizontal {
                    r.is_horizontal()
                } else {
                    r.is_vertical()
                }
            })
            .map(|road| {
                let (lo, hi) = if horizontal { road.x_span() } else { road.y_span() };
                let bound = if sign > 0.0 {
                    f64::from(hi) + ROAD_HALF_WIDTH
                } else {
                    f64::from(lo) - ROAD_HALF_WIDTH
                };
                (bound, road)
            })
            .max_by(|(a, _), (b, _)| (a * sign).total_cmp(&(b * sign)));

        let (bound, centre) = match road {
            Some((bound, road)) => {
                let centre = if horizontal { road.start().y } else { road.start().x };
                (bound, Some(f64::from(centre)))
            }
            None => {
                let own = if horizontal { cell.x } else { cell.y };
                (f64::from(own) + sign * ROAD_HALF_WIDTH, None)
            }
        };
        self.current_road = road.map(|(_, r)| *r);

        let (along, cross) = if horizontal {
            (target.x, target.y)
        } else {
            (target.y, target.x)
        };
        let overshoot = if sign > 0.0 { along > bound } else { along < bound };
        let along = if overshoot {
            self.velocity = Velocity::ZERO;
            bound
        } else {
            along
        };
        // Entering a road from a crossing: pull into its corridor.
        let cross = match centre {
            Some(c) => cross.clamp(c - ROAD_HALF_WIDTH, c + ROAD_HALF_WIDTH),
            None => cross,
        };

        self.position = if horizontal {
            Position::new(along, cross)
        } else {
            Position::new(cross, along)
        };
    }

    /// Put `item` into the bag, or hand it back if the bag is full.
    pub fn try_pick_up(&mut self, item: LootItem, capacity: usize) -> Result<(), LootItem> {
        if self.bag.len() >= capacity {
            return Err(item);
        }
        self.bag.push(item);
        Ok(())
    }

    /// Empty the bag into the score. Returns the item count and value gained.
    pub fn deliver(&mut self) -> (usize, u64) {
        let count = self.bag.len();
        let value: u64 = self.bag.drain(..).map(|item| u64::from(item.value)).sum();
        self.score += value;
        (count, value)
    }
}

#[cfg(test)]
mod tests {
    use fl_core::Point;
    use proptest::prelude::*;

    use super::*;
    use crate::loot::LootId;

    fn cross_map() -> Vec<Road> {
        vec![
            Road::horizontal(Point::new(0, 0), 10).unwrap(),
            Road::vertical(Point::new(10, 0), 10).unwrap(),
            Road::horizontal(Point::new(10, 10), 0).unwrap(),
            Road::vertical(Point::new(0, 10), 0).unwrap(),
            Road::vertical(Point::new(5, -5), 5).unwrap(),
        ]
    }

    fn item(id: u64, value: u32) -> LootItem {
        LootItem {
            id: LootId(id),
            kind: 0,
            value,
            position: Position::default(),
        }
    }

    fn assert_pos(actual: Position, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
            "expected ({x}, {y}), got {actual}"
        );
    }

    #[test]
    fn moves_freely_inside_the_road() {
        let roads = cross_map();
        let mut dog = Dog::new(DogId(0), "Rex", Position::new(0.0, 0.0));
        dog.set_direction(Direction::East, 2.0);
        dog.advance(Duration::from_millis(1500), &roads);
        assert_pos(dog.position(), 3.0, 0.0);
        assert_pos(dog.previous_position(), 0.0, 0.0);
        assert_eq!(dog.velocity(), Velocity::new(2.0, 0.0));
        assert_eq!(dog.current_road(), Some(roads[0]));
    }

    #[test]
    fn stops_at_the_road_end() {
        let roads = cross_map();
        let mut dog = Dog::new(DogId(0), "Rex", Position::new(8.0, 0.0));
        dog.set_direction(Direction::East, 5.0);
        dog.advance(Duration::from_secs(1), &roads);
        assert_pos(dog.position(), 10.4, 0.0);
        assert!(dog.velocity().is_zero());
        assert_eq!(dog.direction(), Direction::East);
    }

    #[test]
    fn stops_at_the_corridor_edge_when_no_road_leads_that_way() {
        let roads = cross_map();
        let mut dog = Dog::new(DogId(0), "Rex", Position::new(3.0, 0.0));
        dog.set_direction(Direction::South, 1.0);
        dog.advance(Duration::from_secs(2), &roads);
        assert_pos(dog.position(), 3.0, 0.4);
        assert!(dog.velocity().is_zero());
        assert_eq!(dog.current_road(), None);
    }

    #[test]
    fn turns_at_a_crossing() {
        let roads = cross_map();
        let mut dog = Dog::new(DogId(0), "Rex", Position::new(5.2, 0.0));
        dog.set_direction(Direction::North, 1.0);
        dog.advance(Duration::from_secs(3), &roads);
        assert_pos(dog.position(), 5.2, -3.0);
        assert_eq!(dog.current_road(), Some(roads[4]));
    }

    #[test]
    fn picks_the_road_reaching_furthest_at_a_joint() {
        let roads = vec![
            Road::horizontal(Point::new(0, 0), 5).unwrap(),
            Road::horizontal(Point::new(5, 0), 20).unwrap(),
        ];
        let mut dog = Dog::new(DogId(0), "Rex", Position::new(4.8, 0.0));
        dog.set_direction(Direction::East, 1.0);
        dog.advance(Duration::from_secs(4), &roads);
        assert_pos(dog.position(), 8.8, 0.0);
        assert_eq!(dog.current_road(), Some(roads[1]));

        // Heading back, the joint cell is not reached within one move...
        dog.set_direction(Direction::West, 1.0);
        dog.advance(Duration::from_secs(30), &roads);
        assert_pos(dog.position(), 4.6, 0.0);
        assert!(dog.velocity().is_zero());

        // ...but from the joint the first road takes over.
        dog.set_direction(Direction::West, 1.0);
        dog.advance(Duration::from_secs(30), &roads);
        assert_pos(dog.position(), -0.4, 0.0);
        assert_eq!(dog.current_road(), Some(roads[0]));
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let roads = cross_map();
        let mut dog = Dog::new(DogId(0), "Rex", Position::new(2.0, 0.0));
        dog.set_direction(Direction::West, 3.0);
        dog.advance(Duration::ZERO, &roads);
        assert_pos(dog.position(), 2.0, 0.0);
        assert_eq!(dog.velocity(), Velocity::new(-3.0, 0.0));
        assert_eq!(dog.current_road(), None);
    }

    #[test]
    fn invalid_speeds_keep_the_dog_in_place() {
        let roads = cross_map();
        for speed in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut dog = Dog::new(DogId(0), "Rex", Position::new(2.0, 0.0));
            dog.set_direction(Direction::East, speed);
            assert!(dog.velocity().is_zero(), "speed {speed}");
            assert_eq!(dog.direction(), Direction::East);
            dog.advance(Duration::from_secs(100), &roads);
            assert_pos(dog.position(), 2.0, 0.0);
        }
    }

    #[test]
    fn activity_tracking() {
        let mut dog = Dog::new(DogId(0), "Rex", Position::default());
        dog.track_activity(Duration::from_millis(300));
        dog.track_activity(Duration::from_millis(200));
        assert_eq!(dog.idle_time(), Duration::from_millis(500));
        assert_eq!(dog.play_time(), Duration::from_millis(500));

        dog.set_direction(Direction::North, 1.0);
        dog.track_activity(Duration::from_millis(100));
        assert_eq!(dog.idle_time(), Duration::ZERO);
        assert_eq!(dog.play_time(), Duration::from_millis(600));
    }

    #[test]
    fn bag_respects_capacity() {
        let mut dog = Dog::new(DogId(0), "Rex", Position::default());
        assert!(dog.try_pick_up(item(0, 1), 2).is_ok());
        assert!(dog.try_pick_up(item(1, 2), 2).is_ok());
        let rejected = dog.try_pick_up(item(2, 3), 2).unwrap_err();
        assert_eq!(rejected.id, LootId(2));
        assert_eq!(dog.bag().len(), 2);
    }

    #[test]
    fn delivery_empties_bag_into_score() {
        let mut dog = Dog::new(DogId(0), "Rex", Position::default());
        for (id, value) in [(0, 1), (1, 2), (2, 3)] {
            dog.try_pick_up(item(id, value), 3).unwrap();
        }
        assert_eq!(dog.deliver(), (3, 6));
        assert_eq!(dog.score(), 6);
        assert!(dog.bag().is_empty());
        assert_eq!(dog.deliver(), (0, 0));
        assert_eq!(dog.score(), 6);
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::North),
            Just(Direction::South),
            Just(Direction::East),
            Just(Direction::West),
            Just(Direction::Idle),
        ]
    }

    proptest! {
        #[test]
        fn idle_dogs_never_move(
            x in -20.0f64..20.0,
            y in -20.0f64..20.0,
            delta_ms in 0u64..100_000,
        ) {
            let roads = cross_map();
            let mut dog = Dog::new(DogId(0), "Rex", Position::new(x, y));
            dog.set_direction(Direction::Idle, 3.0);
            prop_assert!(dog.velocity().is_zero());
            dog.advance(Duration::from_millis(delta_ms), &roads);
            prop_assert_eq!(dog.position(), Position::new(x, y));
        }

        #[test]
        fn stays_in_a_corridor_of_the_starting_cell(
            start in 0usize..5,
            fraction in 0.0f64..=1.0,
            steps in prop::collection::vec((direction_strategy(), 0.1f64..5.0, 0u64..5_000), 1..30),
        ) {
            let roads = cross_map();
            let mut dog = Dog::new(DogId(0), "Rex", roads[start].lerp(fraction));
            for (direction, speed, delta_ms) in steps {
                let cell = dog.position().rounded();
                dog.set_direction(direction, speed);
                dog.advance(Duration::from_millis(delta_ms), &roads);
                let pos = dog.position();
                prop_assert!(
                    roads.iter().any(|r| r.contains_cell(cell) && r.corridor_contains(pos)),
                    "{} left the corridors of cell {}", pos, cell
                );
            }
        }
    }
}
