use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use fl_core::{Direction, Map, MapId, Position, Velocity};
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::collision::{
    GatheringEvent, Gatherer, Item, ItemRef, VecProvider, find_gather_events,
};
use crate::context::TickContext;
use crate::dog::{DOG_WIDTH, Dog, DogId};
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::loot::{ITEM_WIDTH, LootGenerator, LootId, LootItem, OFFICE_WIDTH};
use crate::snapshot::{SessionSnapshot, nanos};

/// Sessions are keyed by the map they run on.
pub type SessionId = MapId;

/// A dog leaving the game after standing still too long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retirement {
    /// The retired dog.
    pub dog: DogId,
    /// The player name.
    pub name: String,
    /// Final score.
    pub score: u64,
    /// Total time in the game.
    pub play_time: Duration,
}

/// A bag handed over at an office.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// The delivering dog.
    pub dog: DogId,
    /// Items handed over.
    pub items: usize,
    /// Score gained.
    pub value: u64,
}

/// What happened in one session during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Newly placed loot.
    pub spawned: Vec<LootId>,
    /// Pickups in the order they happened.
    pub collected: Vec<(DogId, LootId)>,
    /// Office deliveries in the order they happened.
    pub delivered: Vec<Delivery>,
    /// Dogs removed from the session.
    pub retired: Vec<Retirement>,
}

impl TickReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: TickReport) {
        self.spawned.extend(other.spawned);
        self.collected.extend(other.collected);
        self.delivered.extend(other.delivered);
        self.retired.extend(other.retired);
    }
}

/// A dog as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DogState {
    /// Dog id.
    pub id: DogId,
    /// Player name.
    pub name: String,
    /// Current position.
    pub pos: Position,
    /// Current velocity.
    pub speed: Velocity,
    /// Direction code (`"L"`, `"R"`, `"U"`, `"D"` or `""`).
    pub dir: &'static str,
    /// Carried items in pickup order.
    pub bag: Vec<BagItemState>,
    /// Score so far.
    pub score: u64,
}

/// A carried item as shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BagItemState {
    /// Item id.
    pub id: LootId,
    /// Index into the map's loot catalog.
    #[serde(rename = "type")]
    pub kind: usize,
}

/// A loot item on the ground as shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LootState {
    /// Item id.
    pub id: LootId,
    /// Index into the map's loot catalog.
    #[serde(rename = "type")]
    pub kind: usize,
    /// Where the item lies.
    pub pos: Position,
}

/// Everything a client needs to draw a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    /// Dogs in join order.
    pub dogs: Vec<DogState>,
    /// Loot on the ground, ordered by id.
    pub loot: Vec<LootState>,
}

/// One running game on one map.
///
/// Each tick runs the same pipeline: dogs account for activity and move, the
/// spawner tops up loot, the sweep finds contacts, contacts are resolved in
/// time order, and dogs idle for too long retire.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    map: Arc<Map>,
    dogs: Vec<Dog>,
    dog_index: HashMap<DogId, usize>,
    loot: BTreeMap<LootId, LootItem>,
    next_loot_id: u64,
    generator: LootGenerator,
}

impl Session {
    /// An empty session on `map`, spawning loot with the map's parameters.
    pub fn new(map: Arc<Map>) -> Self {
        let generator = LootGenerator::new(map.loot_spawn());
        Self {
            id: map.id().clone(),
            map,
            dogs: Vec::new(),
            dog_index: HashMap::new(),
            loot: BTreeMap::new(),
            next_loot_id: 0,
            generator,
        }
    }

    /// Replace the loot generator.
    pub fn with_generator(mut self, generator: LootGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// The session id, which is the id of its map.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The map the session runs on.
    pub fn map(&self) -> &Arc<Map> {
        &self.map
    }

    /// Dogs in join order.
    pub fn dogs(&self) -> &[Dog] {
        &self.dogs
    }

    /// The dog with this id, if it plays here.
    pub fn dog(&self, id: DogId) -> Option<&Dog> {
        self.dog_index.get(&id).map(|&i| &self.dogs[i])
    }

    /// Mutable access to the dog with this id.
    pub fn dog_mut(&mut self, id: DogId) -> Option<&mut Dog> {
        self.dog_index.get(&id).map(|&i| &mut self.dogs[i])
    }

    /// Loot on the ground, ordered by id.
    pub fn loot(&self) -> impl Iterator<Item = &LootItem> {
        self.loot.values()
    }

    /// Number of items on the ground.
    pub fn loot_count(&self) -> usize {
        self.loot.len()
    }

    /// Add a dog. Fails without touching the session if the id is taken.
    pub fn add_dog(&mut self, dog: Dog) -> SimResult<()> {
        if self.dog_index.contains_key(&dog.id) {
            return Err(SimError::DuplicateDog(dog.id));
        }
        self.dog_index.insert(dog.id, self.dogs.len());
        self.dogs.push(dog);
        Ok(())
    }

    /// Remove a dog and hand it back.
    pub fn remove_dog(&mut self, id: DogId) -> Option<Dog> {
        let idx = self.dog_index.remove(&id)?;
        let dog = self.dogs.remove(idx);
        for (i, d) in self.dogs.iter().enumerate().skip(idx) {
            self.dog_index.insert(d.id, i);
        }
        Some(dog)
    }

    /// Point a dog in `direction` at the map's dog speed.
    pub fn set_direction(&mut self, id: DogId, direction: Direction) -> SimResult<()> {
        let speed = self.map.dog_speed();
        let dog = self.dog_mut(id).ok_or(SimError::DogNotFound(id))?;
        dog.set_direction(direction, speed);
        Ok(())
    }

    /// Where a new dog appears: a random road point when `randomize` is set,
    /// otherwise the start of the first road. A map without roads spawns at
    /// the origin.
    pub fn spawn_point(&self, randomize: bool, rng: &mut StdRng) -> Position {
        let roads = self.map.roads();
        match roads.first() {
            None => Position::default(),
            Some(first) if !randomize => Position::from(first.start()),
            Some(_) => {
                let road = roads[rng.random_range(0..roads.len())];
                road.lerp(rng.random::<f64>())
            }
        }
    }

    /// Put a loot item of catalog entry `kind` at `position`.
    ///
    /// Returns `None` when the catalog has no such entry.
    pub fn place_loot(&mut self, kind: usize, position: Position) -> Option<LootId> {
        let value = self.map.loot_types().get(kind)?.value;
        let id = LootId(self.next_loot_id);
        self.next_loot_id += 1;
        self.loot.insert(
            id,
            LootItem {
                id,
                kind,
                value,
                position,
            },
        );
        Some(id)
    }

    /// Place one item of a random type at a random road point.
    fn spawn_random_loot(&mut self, rng: &mut StdRng) -> Option<LootId> {
        let kinds = self.map.loot_types().len();
        let roads = self.map.roads();
        if kinds == 0 || roads.is_empty() {
            return None;
        }
        let kind = rng.random_range(0..kinds);
        let road = roads[rng.random_range(0..roads.len())];
        let position = road.lerp(rng.random::<f64>());
        self.place_loot(kind, position)
    }

    /// Run one tick of length `delta`.
    pub fn tick(&mut self, delta: Duration, ctx: &mut TickContext<'_>) -> TickReport {
        let mut report = TickReport::default();

        for dog in &mut self.dogs {
            dog.track_activity(delta);
            dog.advance(delta, self.map.roads());
        }

        let wanted = self
            .generator
            .generate(delta, self.loot.len(), self.dogs.len());
        for _ in 0..wanted {
            let Some(id) = self.spawn_random_loot(ctx.rng) else {
                break;
            };
            tracing::debug!(session = %self.id, loot = %id, "loot spawned");
            ctx.emit(
                SimEventKind::LootSpawned {
                    session: self.id.clone(),
                    loot: id,
                },
                format!("Loot {id} appeared on {}", self.id),
            );
            report.spawned.push(id);
        }

        let events = find_gather_events(&self.gather_provider());
        report.merge(self.resolve(&events, ctx));

        report.retired = self.retire_idle(ctx);
        report
    }

    /// The sweep input for the current tick: one gatherer per dog, the loot
    /// on the ground, then one item per office.
    fn gather_provider(&self) -> VecProvider {
        let mut provider = VecProvider::new();
        for dog in &self.dogs {
            provider.add_gatherer(Gatherer {
                id: dog.id,
                start: dog.previous_position,
                end: dog.position,
                width: DOG_WIDTH,
            });
        }
        for item in self.loot.values() {
            provider.add_item(Item {
                id: ItemRef::Loot(item.id),
                position: item.position,
                width: ITEM_WIDTH,
            });
        }
        for (idx, office) in self.map.offices().iter().enumerate() {
            provider.add_item(Item {
                id: ItemRef::Office(idx),
                position: Position::from(office.position),
                width: OFFICE_WIDTH,
            });
        }
        provider
    }

    /// Apply time-ordered contact events.
    ///
    /// Loot already taken earlier in the tick is skipped. A dog with a full
    /// bag leaves the item where it is. Reaching an office turns the bag into
    /// score.
    pub fn resolve(&mut self, events: &[GatheringEvent], ctx: &mut TickContext<'_>) -> TickReport {
        let mut report = TickReport::default();
        let capacity = self.map.bag_capacity();

        for event in events {
            let Some(&idx) = self.dog_index.get(&event.gatherer) else {
                continue;
            };
            let dog = &mut self.dogs[idx];
            match event.item {
                ItemRef::Loot(loot_id) => {
                    let Some(item) = self.loot.remove(&loot_id) else {
                        continue;
                    };
                    match dog.try_pick_up(item, capacity) {
                        Ok(()) => {
                            ctx.emit(
                                SimEventKind::LootCollected {
                                    dog: dog.id,
                                    loot: loot_id,
                                },
                                format!("{} picked up loot {loot_id}", dog.name),
                            );
                            report.collected.push((dog.id, loot_id));
                        }
                        Err(item) => {
                            self.loot.insert(loot_id, item);
                            ctx.emit(
                                SimEventKind::LootLeftBehind {
                                    dog: dog.id,
                                    loot: loot_id,
                                },
                                format!("{} has no room for loot {loot_id}", dog.name),
                            );
                        }
                    }
                }
                ItemRef::Office(_) => {
                    let (items, value) = dog.deliver();
                    if items == 0 {
                        continue;
                    }
                    ctx.emit(
                        SimEventKind::LootDelivered {
                            dog: dog.id,
                            items,
                            value,
                        },
                        format!("{} delivered {items} items for {value}", dog.name),
                    );
                    report.delivered.push(Delivery {
                        dog: dog.id,
                        items,
                        value,
                    });
                }
            }
        }
        report
    }

    fn retire_idle(&mut self, ctx: &mut TickContext<'_>) -> Vec<Retirement> {
        let timeout = self.map.retirement();
        let retiring: Vec<DogId> = self
            .dogs
            .iter()
            .filter(|d| d.velocity.is_zero() && d.idle >= timeout)
            .map(|d| d.id)
            .collect();

        let mut retired = Vec::with_capacity(retiring.len());
        for id in retiring {
            let Some(dog) = self.remove_dog(id) else {
                continue;
            };
            tracing::info!(
                session = %self.id,
                dog = %dog.id,
                player = %dog.name,
                score = dog.score,
                "dog retired"
            );
            ctx.emit(
                SimEventKind::DogRetired {
                    dog: dog.id,
                    score: dog.score,
                },
                format!("{} retired with {} points", dog.name, dog.score),
            );
            retired.push(Retirement {
                dog: dog.id,
                name: dog.name,
                score: dog.score,
                play_time: dog.play_time,
            });
        }
        retired
    }

    /// The client view of the session.
    pub fn state(&self) -> SessionState {
        SessionState {
            dogs: self
                .dogs
                .iter()
                .map(|d| DogState {
                    id: d.id,
                    name: d.name.clone(),
                    pos: d.position,
                    speed: d.velocity,
                    dir: d.direction.code(),
                    bag: d
                        .bag
                        .iter()
                        .map(|item| BagItemState {
                            id: item.id,
                            kind: item.kind,
                        })
                        .collect(),
                    score: d.score,
                })
                .collect(),
            loot: self
                .loot
                .values()
                .map(|item| LootState {
                    id: item.id,
                    kind: item.kind,
                    pos: item.position,
                })
                .collect(),
        }
    }

    /// Capture the session for persistence.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            map_id: self.id.clone(),
            next_loot_id: self.next_loot_id,
            time_without_loot_ns: nanos(self.generator.time_without_loot()),
            dogs: self.dogs.iter().map(Into::into).collect(),
            loot: self.loot.values().cloned().collect(),
        }
    }

    /// Rebuild a session on `map` from a snapshot, checking that dog ids are
    /// unique and that every loot item, on the ground or in a bag, has a known
    /// type and an id below the saved counter that no other item shares.
    pub fn from_snapshot(map: Arc<Map>, snapshot: SessionSnapshot) -> SimResult<Self> {
        let generator = LootGenerator::new(map.loot_spawn())
            .with_time_without_loot(Duration::from_nanos(snapshot.time_without_loot_ns));
        let mut session = Session::new(map).with_generator(generator);
        session.next_loot_id = snapshot.next_loot_id;

        let mut loot_ids = HashSet::new();
        for item in snapshot.loot {
            session.check_restored_loot(&item, &mut loot_ids)?;
            session.loot.insert(item.id, item);
        }
        for dog in snapshot.dogs {
            if dog.bag.len() > session.map.bag_capacity() {
                return Err(SimError::InvalidSnapshot(format!(
                    "dog {} carries more than the bag capacity",
                    dog.id
                )));
            }
            for item in &dog.bag {
                session.check_restored_loot(item, &mut loot_ids)?;
            }
            session.add_dog(dog.into_dog()?)?;
        }
        Ok(session)
    }

    fn check_restored_loot(&self, item: &LootItem, seen: &mut HashSet<LootId>) -> SimResult<()> {
        if item.id.0 >= self.next_loot_id {
            return Err(SimError::InvalidSnapshot(format!(
                "loot {} is not below the loot counter {}",
                item.id, self.next_loot_id
            )));
        }
        if item.kind >= self.map.loot_types().len() {
            return Err(SimError::InvalidSnapshot(format!(
                "loot {} has unknown type {}",
                item.id, item.kind
            )));
        }
        if !seen.insert(item.id) {
            return Err(SimError::InvalidSnapshot(format!(
                "loot {} appears twice in session {}",
                item.id, self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fl_core::{LootSpawnConfig, LootType, Office, Point, Road};
    use rand::SeedableRng;

    use super::*;
    use crate::clock::SimClock;
    use crate::event::EventLog;

    fn loot_type(value: u32) -> LootType {
        LootType {
            name: format!("thing{value}"),
            file: "assets/thing.obj".into(),
            kind: "obj".into(),
            rotation: None,
            color: None,
            scale: 1.0,
            value,
        }
    }

    /// A 20-unit horizontal road with an office at x = 10.
    fn street() -> Map {
        let mut map = Map::new(MapId::new("street"), "Street")
            .with_bag_capacity(3)
            .with_retirement(Duration::from_secs(10))
            .with_loot_spawn(LootSpawnConfig {
                period: Duration::from_secs(1),
                probability: 0.0,
            });
        map.add_road(Road::horizontal(Point::new(0, 0), 20).unwrap());
        map.add_office(Office {
            id: "post".into(),
            position: Point::new(10, 0),
            offset: Point::new(0, 0),
        })
        .unwrap();
        for value in [1, 2, 3] {
            map.add_loot_type(loot_type(value));
        }
        map
    }

    struct Harness {
        clock: SimClock,
        events: EventLog,
        rng: StdRng,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                clock: SimClock::new(),
                events: EventLog::new(0),
                rng: StdRng::seed_from_u64(7),
            }
        }

        fn tick(&mut self, session: &mut Session, delta: Duration) -> TickReport {
            self.clock.advance(delta);
            let mut ctx = TickContext {
                clock: &self.clock,
                events: &mut self.events,
                rng: &mut self.rng,
            };
            session.tick(delta, &mut ctx)
        }
    }

    fn session_with_dog(map: Map, x: f64) -> Session {
        let mut session = Session::new(Arc::new(map));
        session
            .add_dog(Dog::new(DogId(1), "Rex", Position::new(x, 0.0)))
            .unwrap();
        session
    }

    #[test]
    fn dog_collects_loot_in_path_order() {
        let mut session = session_with_dog(street(), 0.0);
        let far = session.place_loot(0, Position::new(6.0, 0.0)).unwrap();
        let near = session.place_loot(1, Position::new(2.0, 0.0)).unwrap();
        session.set_direction(DogId(1), Direction::East).unwrap();

        let mut h = Harness::new();
        let report = h.tick(&mut session, Duration::from_secs(7));
        assert_eq!(report.collected, vec![(DogId(1), near), (DogId(1), far)]);
        let bag: Vec<_> = session.dog(DogId(1)).unwrap().bag().iter().map(|i| i.id).collect();
        assert_eq!(bag, vec![near, far]);
        assert_eq!(session.loot_count(), 0);
    }

    #[test]
    fn office_turns_bag_into_score() {
        let mut session = session_with_dog(street(), 0.0);
        for (kind, x) in [(0, 1.0), (1, 2.0), (2, 3.0)] {
            session.place_loot(kind, Position::new(x, 0.0)).unwrap();
        }
        session.set_direction(DogId(1), Direction::East).unwrap();

        let mut h = Harness::new();
        let report = h.tick(&mut session, Duration::from_secs(12));
        assert_eq!(report.collected.len(), 3);
        assert_eq!(
            report.delivered,
            vec![Delivery {
                dog: DogId(1),
                items: 3,
                value: 6
            }]
        );
        let dog = session.dog(DogId(1)).unwrap();
        assert_eq!(dog.score(), 6);
        assert!(dog.bag().is_empty());
    }

    #[test]
    fn full_bag_leaves_loot_on_the_ground() {
        let map = street().with_bag_capacity(1);
        let mut session = session_with_dog(map, 0.0);
        let first = session.place_loot(0, Position::new(1.0, 0.0)).unwrap();
        let second = session.place_loot(0, Position::new(2.0, 0.0)).unwrap();
        session.set_direction(DogId(1), Direction::East).unwrap();

        let mut h = Harness::new();
        let report = h.tick(&mut session, Duration::from_secs(3));
        assert_eq!(report.collected, vec![(DogId(1), first)]);
        let remaining: Vec<_> = session.loot().map(|i| i.id).collect();
        assert_eq!(remaining, vec![second]);
        assert!(
            h.events
                .iter()
                .any(|e| matches!(e.kind, SimEventKind::LootLeftBehind { loot, .. } if loot == second))
        );
    }

    #[test]
    fn loot_taken_by_an_earlier_dog_is_gone() {
        let mut session = session_with_dog(street(), 0.0);
        session
            .add_dog(Dog::new(DogId(2), "Fido", Position::new(4.0, 0.0)))
            .unwrap();
        let item = session.place_loot(0, Position::new(5.0, 0.0)).unwrap();
        session.set_direction(DogId(1), Direction::East).unwrap();
        session.set_direction(DogId(2), Direction::East).unwrap();

        let mut h = Harness::new();
        let report = h.tick(&mut session, Duration::from_secs(6));
        // Fido passes x = 5 early in the tick, Rex near its end.
        assert_eq!(report.collected, vec![(DogId(2), item)]);
        assert!(session.dog(DogId(1)).unwrap().bag().is_empty());
        assert_eq!(session.dog(DogId(2)).unwrap().score(), 1);
    }

    #[test]
    fn idle_dog_retires_and_leaves_the_session() {
        let mut session = session_with_dog(street(), 0.0);
        let mut h = Harness::new();

        let report = h.tick(&mut session, Duration::from_secs(9));
        assert!(report.retired.is_empty());

        let report = h.tick(&mut session, Duration::from_secs(1));
        assert_eq!(report.retired.len(), 1);
        let retirement = &report.retired[0];
        assert_eq!(retirement.dog, DogId(1));
        assert_eq!(retirement.name, "Rex");
        assert_eq!(retirement.play_time, Duration::from_secs(10));
        assert!(session.dog(DogId(1)).is_none());
        assert!(session.dogs().is_empty());
    }

    #[test]
    fn moving_resets_the_idle_timer() {
        let mut session = session_with_dog(street(), 0.0);
        let mut h = Harness::new();
        h.tick(&mut session, Duration::from_secs(9));
        session.set_direction(DogId(1), Direction::East).unwrap();
        h.tick(&mut session, Duration::from_secs(1));
        let dog = session.dog(DogId(1)).unwrap();
        assert_eq!(dog.idle_time(), Duration::ZERO);
        assert_eq!(dog.play_time(), Duration::from_secs(10));
    }

    #[test]
    fn spawner_tops_up_to_dog_count() {
        let map = street().with_loot_spawn(LootSpawnConfig {
            period: Duration::from_secs(1),
            probability: 1.0,
        });
        let mut session = session_with_dog(map, 0.0);
        session
            .add_dog(Dog::new(DogId(2), "Fido", Position::new(20.0, 0.0)))
            .unwrap();

        let mut h = Harness::new();
        let report = h.tick(&mut session, Duration::from_millis(100));
        assert_eq!(report.spawned.len(), 2);
        assert_eq!(session.loot_count(), 2);
        let road = session.map().roads()[0];
        for item in session.loot() {
            assert!(road.corridor_contains(item.position));
            assert!(item.kind < 3);
            assert_eq!(item.value, session.map().loot_types()[item.kind].value);
        }

        let report = h.tick(&mut session, Duration::from_millis(100));
        assert!(report.spawned.is_empty());
    }

    #[test]
    fn empty_catalog_spawns_nothing() {
        let mut map = Map::new(MapId::new("bare"), "Bare").with_loot_spawn(LootSpawnConfig {
            period: Duration::from_secs(1),
            probability: 1.0,
        });
        map.add_road(Road::horizontal(Point::new(0, 0), 5).unwrap());
        let mut session = session_with_dog(map, 0.0);
        let mut h = Harness::new();
        let report = h.tick(&mut session, Duration::from_secs(1));
        assert!(report.spawned.is_empty());
        assert_eq!(session.loot_count(), 0);
    }

    #[test]
    fn place_loot_rejects_unknown_kind() {
        let mut session = Session::new(Arc::new(street()));
        assert!(session.place_loot(3, Position::default()).is_none());
        assert_eq!(session.place_loot(2, Position::default()), Some(LootId(0)));
        assert_eq!(session.place_loot(0, Position::default()), Some(LootId(1)));
    }

    #[test]
    fn duplicate_dog_is_rejected() {
        let mut session = session_with_dog(street(), 0.0);
        let err = session
            .add_dog(Dog::new(DogId(1), "Copy", Position::default()))
            .unwrap_err();
        assert!(matches!(err, SimError::DuplicateDog(DogId(1))));
        assert_eq!(session.dogs().len(), 1);
        assert_eq!(session.dog(DogId(1)).unwrap().name(), "Rex");
    }

    #[test]
    fn remove_dog_keeps_index_consistent() {
        let mut session = Session::new(Arc::new(street()));
        for id in 0..4 {
            session
                .add_dog(Dog::new(DogId(id), format!("d{id}"), Position::default()))
                .unwrap();
        }
        assert!(session.remove_dog(DogId(1)).is_some());
        assert!(session.remove_dog(DogId(1)).is_none());
        for id in [0, 2, 3] {
            assert_eq!(session.dog(DogId(id)).unwrap().id(), DogId(id));
        }
    }

    #[test]
    fn unknown_dog_cannot_steer() {
        let mut session = Session::new(Arc::new(street()));
        assert!(matches!(
            session.set_direction(DogId(9), Direction::North),
            Err(SimError::DogNotFound(DogId(9)))
        ));
    }

    #[test]
    fn spawn_point_defaults_to_first_road_start() {
        let session = Session::new(Arc::new(street()));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(session.spawn_point(false, &mut rng), Position::new(0.0, 0.0));
        let random = session.spawn_point(true, &mut rng);
        assert!(session.map().roads()[0].corridor_contains(random));

        let empty = Session::new(Arc::new(Map::new(MapId::new("void"), "Void")));
        assert_eq!(empty.spawn_point(true, &mut rng), Position::default());
    }

    #[test]
    fn state_reports_dogs_and_loot() {
        let mut session = session_with_dog(street(), 3.0);
        session.set_direction(DogId(1), Direction::West).unwrap();
        session.place_loot(2, Position::new(8.0, 0.0)).unwrap();

        let state = session.state();
        assert_eq!(state.dogs.len(), 1);
        assert_eq!(state.dogs[0].dir, "L");
        assert_eq!(state.dogs[0].speed, Velocity::new(-1.0, 0.0));
        assert_eq!(state.loot[0].kind, 2);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["loot"][0]["type"], 2);
        assert_eq!(json["dogs"][0]["name"], "Rex");
    }
}
