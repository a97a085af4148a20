use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::geom::Point;
use crate::map::{Building, LootType, Map, MapId, Office, Road};

/// Parameters of the probabilistic loot spawner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LootSpawnConfig {
    /// Reference interval the probability is defined over.
    pub period: Duration,
    /// Chance that one missing item appears within one `period`.
    pub probability: f64,
}

impl Default for LootSpawnConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(5),
            probability: 0.5,
        }
    }
}

/// The maps described by a game configuration file.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    /// Maps in file order.
    pub maps: Vec<Map>,
}

impl GameConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate configuration JSON.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let raw: RawConfig = serde_json::from_str(text)?;
        raw.into_config()
    }
}

// ---------------------------------------------------------------------------
// Raw file shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default = "default_dog_speed")]
    default_dog_speed: f64,
    #[serde(default = "default_bag_capacity")]
    default_bag_capacity: usize,
    /// Seconds.
    #[serde(default = "default_retirement_secs")]
    dog_retirement_time: f64,
    #[serde(default)]
    loot_generator_config: Option<RawLootGenerator>,
    maps: Vec<RawMap>,
}

fn default_dog_speed() -> f64 {
    1.0
}

fn default_bag_capacity() -> usize {
    3
}

fn default_retirement_secs() -> f64 {
    60.0
}

#[derive(Debug, Deserialize)]
struct RawLootGenerator {
    /// Seconds.
    period: f64,
    probability: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMap {
    id: String,
    name: String,
    dog_speed: Option<f64>,
    bag_capacity: Option<usize>,
    #[serde(default)]
    loot_types: Vec<LootType>,
    #[serde(default)]
    roads: Vec<RawRoad>,
    #[serde(default)]
    buildings: Vec<RawBuilding>,
    #[serde(default)]
    offices: Vec<RawOffice>,
}

#[derive(Debug, Deserialize)]
struct RawRoad {
    x0: i32,
    y0: i32,
    x1: Option<i32>,
    y1: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawBuilding {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOffice {
    id: String,
    x: i32,
    y: i32,
    offset_x: i32,
    offset_y: i32,
}

impl RawConfig {
    fn into_config(self) -> CoreResult<GameConfig> {
        let retirement = seconds(self.dog_retirement_time, "dogRetirementTime")?;
        let loot_spawn = match self.loot_generator_config {
            Some(raw) => {
                if !(0.0..=1.0).contains(&raw.probability) {
                    return Err(CoreError::Config(format!(
                        "lootGeneratorConfig.probability must be within 0..=1, got {}",
                        raw.probability
                    )));
                }
                LootSpawnConfig {
                    period: seconds(raw.period, "lootGeneratorConfig.period")?,
                    probability: raw.probability,
                }
            }
            None => LootSpawnConfig::default(),
        };

        let default_speed = speed(self.default_dog_speed, "defaultDogSpeed")?;

        let mut seen = HashSet::new();
        let mut maps = Vec::with_capacity(self.maps.len());
        for raw in self.maps {
            if !seen.insert(raw.id.clone()) {
                return Err(CoreError::DuplicateMap(raw.id));
            }
            let dog_speed = match raw.dog_speed {
                Some(value) => speed(value, &format!("maps[{}].dogSpeed", raw.id))?,
                None => default_speed,
            };
            let mut map = Map::new(MapId::new(raw.id), raw.name)
                .with_dog_speed(dog_speed)
                .with_bag_capacity(raw.bag_capacity.unwrap_or(self.default_bag_capacity))
                .with_retirement(retirement)
                .with_loot_spawn(loot_spawn);

            for road in raw.roads {
                map.add_road(road.into_road()?);
            }
            for b in raw.buildings {
                map.add_building(Building {
                    position: Point::new(b.x, b.y),
                    width: b.w,
                    height: b.h,
                });
            }
            for o in raw.offices {
                map.add_office(Office {
                    id: o.id,
                    position: Point::new(o.x, o.y),
                    offset: Point::new(o.offset_x, o.offset_y),
                })?;
            }
            for loot_type in raw.loot_types {
                map.add_loot_type(loot_type);
            }
            maps.push(map);
        }

        Ok(GameConfig { maps })
    }
}

impl RawRoad {
    fn into_road(self) -> CoreResult<Road> {
        let start = Point::new(self.x0, self.y0);
        match (self.x1, self.y1) {
            (Some(x1), None) => Road::horizontal(start, x1),
            (None, Some(y1)) => Road::vertical(start, y1),
            _ => Err(CoreError::Config(format!(
                "road at {start} needs exactly one of x1 or y1"
            ))),
        }
    }
}

fn seconds(value: f64, field: &str) -> CoreResult<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| CoreError::Config(format!("{field} must be a non-negative number of seconds")))
}

fn speed(value: f64, field: &str) -> CoreResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CoreError::Config(format!(
            "{field} must be a non-negative finite speed, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r##"{
        "defaultDogSpeed": 3.0,
        "defaultBagCapacity": 2,
        "dogRetirementTime": 15.0,
        "lootGeneratorConfig": { "period": 5.0, "probability": 0.5 },
        "maps": [
            {
                "id": "map1",
                "name": "Map 1",
                "dogSpeed": 4.0,
                "bagCapacity": 5,
                "lootTypes": [
                    { "name": "key", "file": "assets/key.obj", "type": "obj",
                      "rotation": 90, "color": "#338844", "scale": 0.03, "value": 10 },
                    { "name": "wallet", "file": "assets/wallet.obj", "type": "obj",
                      "scale": 0.01, "value": 30 }
                ],
                "roads": [
                    { "x0": 0, "y0": 0, "x1": 40 },
                    { "x0": 40, "y0": 0, "y1": 30 }
                ],
                "buildings": [ { "x": 5, "y": 5, "w": 30, "h": 20 } ],
                "offices": [ { "id": "o0", "x": 40, "y": 30, "offsetX": 5, "offsetY": 0 } ]
            },
            {
                "id": "town",
                "name": "Town",
                "roads": [ { "x0": 0, "y0": 0, "y1": 10 } ]
            }
        ]
    }"##;

    #[test]
    fn parses_sample_config() {
        let config = GameConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.maps.len(), 2);

        let map1 = &config.maps[0];
        assert_eq!(map1.id().as_str(), "map1");
        assert!((map1.dog_speed() - 4.0).abs() < f64::EPSILON);
        assert_eq!(map1.bag_capacity(), 5);
        assert_eq!(map1.retirement(), Duration::from_secs(15));
        assert_eq!(map1.roads().len(), 2);
        assert!(map1.roads()[0].is_horizontal());
        assert!(map1.roads()[1].is_vertical());
        assert_eq!(map1.offices()[0].offset, Point::new(5, 0));
        assert_eq!(map1.loot_types()[0].rotation, Some(90));
        assert_eq!(map1.loot_types()[1].color, None);
        assert_eq!(map1.loot_types()[1].value, 30);
        assert_eq!(map1.loot_spawn().period, Duration::from_secs(5));

        let town = &config.maps[1];
        assert!((town.dog_speed() - 3.0).abs() < f64::EPSILON);
        assert_eq!(town.bag_capacity(), 2);
    }

    #[test]
    fn road_with_both_ends_is_rejected() {
        let json = r#"{ "maps": [ { "id": "m", "name": "M",
            "roads": [ { "x0": 0, "y0": 0, "x1": 4, "y1": 4 } ] } ] }"#;
        assert!(matches!(GameConfig::from_json(json), Err(CoreError::Config(_))));
    }

    #[test]
    fn road_with_no_end_is_rejected() {
        let json = r#"{ "maps": [ { "id": "m", "name": "M",
            "roads": [ { "x0": 0, "y0": 0 } ] } ] }"#;
        assert!(matches!(GameConfig::from_json(json), Err(CoreError::Config(_))));
    }

    #[test]
    fn duplicate_map_ids_are_rejected() {
        let json = r#"{ "maps": [ { "id": "m", "name": "A" }, { "id": "m", "name": "B" } ] }"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(CoreError::DuplicateMap(id)) if id == "m"
        ));
    }

    #[test]
    fn duplicate_office_ids_are_rejected() {
        let json = r#"{ "maps": [ { "id": "m", "name": "A", "offices": [
            { "id": "o", "x": 0, "y": 0, "offsetX": 0, "offsetY": 0 },
            { "id": "o", "x": 1, "y": 0, "offsetX": 0, "offsetY": 0 } ] } ] }"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(CoreError::DuplicateOffice(_))
        ));
    }

    #[test]
    fn invalid_probability_is_rejected() {
        let json = r#"{ "lootGeneratorConfig": { "period": 1.0, "probability": 1.5 },
            "maps": [] }"#;
        assert!(matches!(GameConfig::from_json(json), Err(CoreError::Config(_))));
    }

    #[test]
    fn negative_or_non_finite_speeds_are_rejected() {
        let map_speed = r#"{ "maps": [ { "id": "m", "name": "M", "dogSpeed": -1.0 } ] }"#;
        let err = GameConfig::from_json(map_speed).unwrap_err();
        assert!(matches!(&err, CoreError::Config(msg) if msg.contains("maps[m].dogSpeed")));

        let default_speed = r#"{ "defaultDogSpeed": -0.5, "maps": [] }"#;
        assert!(matches!(
            GameConfig::from_json(default_speed),
            Err(CoreError::Config(_))
        ));

        // JSON has no NaN or infinity literal; an overflowing number is refused too.
        let huge = r#"{ "maps": [ { "id": "m", "name": "M", "dogSpeed": 1e999 } ] }"#;
        assert!(GameConfig::from_json(huge).is_err());

        let standing = r#"{ "maps": [ { "id": "m", "name": "M", "dogSpeed": 0.0 } ] }"#;
        assert!(GameConfig::from_json(standing).unwrap().maps[0].dog_speed().abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(GameConfig::from_json("{"), Err(CoreError::Json(_))));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.maps.len(), 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
