use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fl_core::{Direction, Map, MapId};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::context::TickContext;
use crate::dog::{Dog, DogId};
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::session::{Session, SessionId, SessionState, TickReport};
use crate::snapshot::{WorldSnapshot, nanos};

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The session the dog was placed in.
    pub session_id: SessionId,
    /// The new dog.
    pub dog_id: DogId,
}

/// The owner of all maps and sessions.
///
/// Maps are loaded once and shared with their session. Sessions are created
/// on the first join to their map. Dog ids are unique across sessions.
pub struct WorldRegistry {
    maps: Vec<Arc<Map>>,
    map_index: HashMap<MapId, usize>,
    sessions: Vec<Session>,
    session_index: HashMap<SessionId, usize>,
    dog_sessions: HashMap<DogId, usize>,
    next_dog_id: u64,
    config: SimConfig,
    clock: SimClock,
    rng: StdRng,
    events: EventLog,
}

impl std::fmt::Debug for WorldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldRegistry")
            .field("tick", &self.clock.tick())
            .field("maps", &self.maps.len())
            .field("sessions", &self.sessions.len())
            .field("dogs", &self.dog_sessions.len())
            .finish()
    }
}

impl WorldRegistry {
    /// An empty registry.
    pub fn new(config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let events = EventLog::new(config.max_events);
        Self {
            maps: Vec::new(),
            map_index: HashMap::new(),
            sessions: Vec::new(),
            session_index: HashMap::new(),
            dog_sessions: HashMap::new(),
            next_dog_id: 0,
            config,
            clock: SimClock::new(),
            rng,
            events,
        }
    }

    /// A registry holding `maps`.
    pub fn from_maps(maps: impl IntoIterator<Item = Map>, config: SimConfig) -> SimResult<Self> {
        let mut registry = Self::new(config);
        for map in maps {
            registry.add_map(map)?;
        }
        Ok(registry)
    }

    /// Register a map. Fails without changes if the id is taken.
    pub fn add_map(&mut self, map: Map) -> SimResult<()> {
        if self.map_index.contains_key(map.id()) {
            return Err(SimError::DuplicateMap(map.id().clone()));
        }
        self.map_index.insert(map.id().clone(), self.maps.len());
        self.maps.push(Arc::new(map));
        Ok(())
    }

    /// All maps in registration order.
    pub fn maps(&self) -> &[Arc<Map>] {
        &self.maps
    }

    /// The map with this id.
    pub fn map(&self, id: &MapId) -> Option<&Arc<Map>> {
        self.map_index.get(id).map(|&i| &self.maps[i])
    }

    /// All sessions in creation order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// The session running on this map, if anyone joined it.
    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.session_index.get(id).map(|&i| &self.sessions[i])
    }

    /// The session a dog plays in.
    pub fn session_of(&self, dog: DogId) -> Option<&Session> {
        self.dog_sessions.get(&dog).map(|&i| &self.sessions[i])
    }

    /// The shared simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The shared event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The settings the registry was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Add a dog named `name` to the session on `map_id`, creating the
    /// session if needed. An unknown map creates nothing.
    pub fn join(&mut self, map_id: &MapId, name: &str) -> SimResult<JoinOutcome> {
        let map = self
            .map(map_id)
            .cloned()
            .ok_or_else(|| SimError::MapNotFound(map_id.clone()))?;

        let idx = match self.session_index.get(map_id) {
            Some(&idx) => idx,
            None => {
                tracing::info!(session = %map_id, "session created");
                self.session_index.insert(map_id.clone(), self.sessions.len());
                self.sessions.push(Session::new(map));
                self.sessions.len() - 1
            }
        };

        let dog_id = DogId(self.next_dog_id);
        let session = &mut self.sessions[idx];
        let position = session.spawn_point(self.config.randomize_spawn_points, &mut self.rng);
        session.add_dog(Dog::new(dog_id, name, position))?;
        self.next_dog_id += 1;
        self.dog_sessions.insert(dog_id, idx);

        tracing::info!(session = %map_id, dog = %dog_id, player = name, "dog joined");
        let tick = self.clock.tick();
        self.events.record(SimEvent::new(
            tick,
            SimEventKind::DogJoined {
                dog: dog_id,
                session: map_id.clone(),
            },
            format!("{name} joined {map_id}"),
        ));
        Ok(JoinOutcome {
            session_id: map_id.clone(),
            dog_id,
        })
    }

    /// Steer a dog.
    pub fn set_direction(&mut self, dog: DogId, direction: Direction) -> SimResult<()> {
        let idx = *self
            .dog_sessions
            .get(&dog)
            .ok_or(SimError::DogNotFound(dog))?;
        self.sessions[idx].set_direction(dog, direction)
    }

    /// The client view of a session.
    pub fn state(&self, id: &SessionId) -> SimResult<SessionState> {
        self.session(id)
            .map(Session::state)
            .ok_or_else(|| SimError::SessionNotFound(id.clone()))
    }

    /// Advance every session by `delta`.
    pub fn tick(&mut self, delta: Duration) -> TickReport {
        self.clock.advance(delta);
        let mut report = TickReport::default();
        for session in &mut self.sessions {
            let mut ctx = TickContext {
                clock: &self.clock,
                events: &mut self.events,
                rng: &mut self.rng,
            };
            report.merge(session.tick(delta, &mut ctx));
        }
        for retirement in &report.retired {
            self.dog_sessions.remove(&retirement.dog);
        }
        report
    }

    /// Capture all sessions, dogs and loot.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.clock.tick(),
            elapsed_ns: nanos(self.clock.elapsed()),
            next_dog_id: self.next_dog_id,
            sessions: self.sessions.iter().map(Session::snapshot).collect(),
        }
    }

    /// Replace all sessions with the content of `snapshot`.
    ///
    /// Everything is validated before anything is replaced, so a failed
    /// restore leaves the registry as it was.
    pub fn restore(&mut self, snapshot: WorldSnapshot) -> SimResult<()> {
        let mut sessions = Vec::with_capacity(snapshot.sessions.len());
        let mut session_index = HashMap::new();
        let mut dog_sessions = HashMap::new();

        for session in snapshot.sessions {
            let map = self
                .map(&session.map_id)
                .cloned()
                .ok_or_else(|| SimError::MapNotFound(session.map_id.clone()))?;
            if session_index.contains_key(&session.map_id) {
                return Err(SimError::DuplicateSession(session.map_id));
            }
            let restored = Session::from_snapshot(map, session)?;
            let idx = sessions.len();
            for dog in restored.dogs() {
                if dog.id().0 >= snapshot.next_dog_id {
                    return Err(SimError::InvalidSnapshot(format!(
                        "dog {} is not below the dog counter {}",
                        dog.id(),
                        snapshot.next_dog_id
                    )));
                }
                if dog_sessions.insert(dog.id(), idx).is_some() {
                    return Err(SimError::DuplicateDog(dog.id()));
                }
            }
            session_index.insert(restored.id().clone(), idx);
            sessions.push(restored);
        }

        self.sessions = sessions;
        self.session_index = session_index;
        self.dog_sessions = dog_sessions;
        self.next_dog_id = snapshot.next_dog_id;
        self.clock = SimClock::resume(snapshot.tick, Duration::from_nanos(snapshot.elapsed_ns));
        tracing::info!(
            sessions = self.sessions.len(),
            dogs = self.dog_sessions.len(),
            "world restored"
        );
        Ok(())
    }
}
