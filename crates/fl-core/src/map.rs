use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LootSpawnConfig;
use crate::error::{CoreError, CoreResult};
use crate::geom::{Point, Position};

/// Half-width of the walkable corridor around every road.
pub const ROAD_HALF_WIDTH: f64 = 0.4;

/// Identifier of a map, as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub String);

impl MapId {
    /// Wrap a string id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An axis-aligned road segment.
///
/// A road is either horizontal or vertical, never both: zero-length and
/// diagonal segments cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Road {
    start: Point,
    end: Point,
}

impl Road {
    /// Build a road between two points, rejecting diagonal and empty segments.
    pub fn new(start: Point, end: Point) -> CoreResult<Self> {
        let horizontal = start.y == end.y && start.x != end.x;
        let vertical = start.x == end.x && start.y != end.y;
        if horizontal || vertical {
            Ok(Self { start, end })
        } else {
            Err(CoreError::InvalidRoad { start, end })
        }
    }

    /// A horizontal road from `start` to `(end_x, start.y)`.
    pub fn horizontal(start: Point, end_x: i32) -> CoreResult<Self> {
        Self::new(start, Point::new(end_x, start.y))
    }

    /// A vertical road from `start` to `(start.x, end_y)`.
    pub fn vertical(start: Point, end_y: i32) -> CoreResult<Self> {
        Self::new(start, Point::new(start.x, end_y))
    }

    /// The point the road was declared from.
    pub fn start(&self) -> Point {
        self.start
    }

    /// The point the road was declared to.
    pub fn end(&self) -> Point {
        self.end
    }

    /// Whether the road runs east-west.
    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    /// Whether the road runs north-south.
    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// `(min, max)` of the road's extent along `x`.
    pub fn x_span(&self) -> (i32, i32) {
        (self.start.x.min(self.end.x), self.start.x.max(self.end.x))
    }

    /// `(min, max)` of the road's extent along `y`.
    pub fn y_span(&self) -> (i32, i32) {
        (self.start.y.min(self.end.y), self.start.y.max(self.end.y))
    }

    /// Whether the grid cell lies on the road.
    pub fn contains_cell(&self, cell: Point) -> bool {
        let (x0, x1) = self.x_span();
        let (y0, y1) = self.y_span();
        (x0..=x1).contains(&cell.x) && (y0..=y1).contains(&cell.y)
    }

    /// Whether a continuous position lies inside the road's corridor.
    pub fn corridor_contains(&self, pos: Position) -> bool {
        let (x0, x1) = self.x_span();
        let (y0, y1) = self.y_span();
        let eps = 1e-9;
        pos.x >= f64::from(x0) - ROAD_HALF_WIDTH - eps
            && pos.x <= f64::from(x1) + ROAD_HALF_WIDTH + eps
            && pos.y >= f64::from(y0) - ROAD_HALF_WIDTH - eps
            && pos.y <= f64::from(y1) + ROAD_HALF_WIDTH + eps
    }

    /// The point a `fraction` (0.0..=1.0) of the way from start to end.
    pub fn lerp(&self, fraction: f64) -> Position {
        let start = Position::from(self.start);
        let end = Position::from(self.end);
        Position::new(
            start.x + (end.x - start.x) * fraction,
            start.y + (end.y - start.y) * fraction,
        )
    }
}

/// A building footprint. Clients draw these; the simulation ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Top-left corner.
    pub position: Point,
    /// Extent along `x`.
    pub width: i32,
    /// Extent along `y`.
    pub height: i32,
}

/// A drop-off point where dogs exchange their bag for score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Office {
    /// Unique id within the map.
    pub id: String,
    /// Location on the road grid.
    pub position: Point,
    /// Drawing offset for clients.
    pub offset: Point,
}

/// An entry of a map's loot catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootType {
    /// Display name.
    pub name: String,
    /// Asset file for clients.
    pub file: String,
    /// Asset kind for clients.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    /// Optional tint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Drawing scale.
    pub scale: f64,
    /// Score awarded when delivered to an office.
    pub value: u32,
}

/// An immutable game map.
#[derive(Debug, Clone)]
pub struct Map {
    id: MapId,
    name: String,
    roads: Vec<Road>,
    buildings: Vec<Building>,
    offices: Vec<Office>,
    office_index: HashMap<String, usize>,
    loot_types: Vec<LootType>,
    dog_speed: f64,
    bag_capacity: usize,
    retirement: Duration,
    loot_spawn: LootSpawnConfig,
}

impl Map {
    /// An empty map with speed 1, bag capacity 3 and a one minute retirement timeout.
    pub fn new(id: MapId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            roads: Vec::new(),
            buildings: Vec::new(),
            offices: Vec::new(),
            office_index: HashMap::new(),
            loot_types: Vec::new(),
            dog_speed: 1.0,
            bag_capacity: 3,
            retirement: Duration::from_secs(60),
            loot_spawn: LootSpawnConfig::default(),
        }
    }

    /// Set the speed of every dog on this map, in units per second.
    pub fn with_dog_speed(mut self, speed: f64) -> Self {
        self.dog_speed = speed;
        self
    }

    /// Set how many items a dog can carry.
    pub fn with_bag_capacity(mut self, capacity: usize) -> Self {
        self.bag_capacity = capacity;
        self
    }

    /// Set how long a dog may stand still before it retires.
    pub fn with_retirement(mut self, timeout: Duration) -> Self {
        self.retirement = timeout;
        self
    }

    /// Set the loot spawn parameters.
    pub fn with_loot_spawn(mut self, config: LootSpawnConfig) -> Self {
        self.loot_spawn = config;
        self
    }

    /// Append a road.
    pub fn add_road(&mut self, road: Road) {
        self.roads.push(road);
    }

    /// Append a building.
    pub fn add_building(&mut self, building: Building) {
        self.buildings.push(building);
    }

    /// Append an office. Fails without modifying the map if the id is taken.
    pub fn add_office(&mut self, office: Office) -> CoreResult<()> {
        if self.office_index.contains_key(&office.id) {
            return Err(CoreError::DuplicateOffice(office.id));
        }
        self.office_index
            .insert(office.id.clone(), self.offices.len());
        self.offices.push(office);
        Ok(())
    }

    /// Append a loot catalog entry.
    pub fn add_loot_type(&mut self, loot_type: LootType) {
        self.loot_types.push(loot_type);
    }

    /// The map id.
    pub fn id(&self) -> &MapId {
        &self.id
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All roads in declaration order.
    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// All buildings in declaration order.
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// All offices in declaration order.
    pub fn offices(&self) -> &[Office] {
        &self.offices
    }

    /// Look up an office by id.
    pub fn office(&self, id: &str) -> Option<&Office> {
        self.office_index.get(id).map(|&i| &self.offices[i])
    }

    /// The loot catalog.
    pub fn loot_types(&self) -> &[LootType] {
        &self.loot_types
    }

    /// Dog speed in units per second.
    pub fn dog_speed(&self) -> f64 {
        self.dog_speed
    }

    /// Bag capacity of every dog on this map.
    pub fn bag_capacity(&self) -> usize {
        self.bag_capacity
    }

    /// Idle time after which a dog retires.
    pub fn retirement(&self) -> Duration {
        self.retirement
    }

    /// Loot spawn parameters.
    pub fn loot_spawn(&self) -> LootSpawnConfig {
        self.loot_spawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn road_orientation() {
        let h = Road::horizontal(Point::new(0, 0), 10).unwrap();
        assert!(h.is_horizontal());
        assert!(!h.is_vertical());

        let v = Road::vertical(Point::new(3, 5), -2).unwrap();
        assert!(v.is_vertical());
        assert!(!v.is_horizontal());
        assert_eq!(v.y_span(), (-2, 5));
    }

    #[test]
    fn road_rejects_degenerate_segments() {
        assert!(Road::new(Point::new(1, 1), Point::new(1, 1)).is_err());
        assert!(Road::new(Point::new(0, 0), Point::new(2, 3)).is_err());
    }

    #[test]
    fn road_cell_and_corridor_membership() {
        let road = Road::horizontal(Point::new(10, 0), 0).unwrap();
        assert!(road.contains_cell(Point::new(0, 0)));
        assert!(road.contains_cell(Point::new(10, 0)));
        assert!(!road.contains_cell(Point::new(11, 0)));
        assert!(!road.contains_cell(Point::new(5, 1)));

        assert!(road.corridor_contains(Position::new(-0.4, 0.4)));
        assert!(road.corridor_contains(Position::new(10.4, -0.4)));
        assert!(!road.corridor_contains(Position::new(10.5, 0.0)));
        assert!(!road.corridor_contains(Position::new(3.0, 0.41)));
    }

    #[test]
    fn road_lerp_walks_from_start_to_end() {
        let road = Road::vertical(Point::new(2, 0), 8).unwrap();
        assert_eq!(road.lerp(0.0), Position::new(2.0, 0.0));
        assert_eq!(road.lerp(0.5), Position::new(2.0, 4.0));
        assert_eq!(road.lerp(1.0), Position::new(2.0, 8.0));
    }

    #[test]
    fn duplicate_office_leaves_map_unchanged() {
        let mut map = Map::new(MapId::new("m"), "Map");
        let office = Office {
            id: "o1".into(),
            position: Point::new(0, 0),
            offset: Point::new(5, 0),
        };
        map.add_office(office.clone()).unwrap();
        let err = map.add_office(office).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateOffice(id) if id == "o1"));
        assert_eq!(map.offices().len(), 1);
        assert!(map.office("o1").is_some());
    }

    #[test]
    fn map_builder_sets_parameters() {
        let map = Map::new(MapId::new("m"), "Map")
            .with_dog_speed(4.0)
            .with_bag_capacity(5)
            .with_retirement(Duration::from_millis(1500));
        assert_eq!(map.id().as_str(), "m");
        assert!((map.dog_speed() - 4.0).abs() < f64::EPSILON);
        assert_eq!(map.bag_capacity(), 5);
        assert_eq!(map.retirement(), Duration::from_millis(1500));
    }
}
