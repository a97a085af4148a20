use std::collections::VecDeque;

use fl_core::MapId;

use crate::dog::DogId;
use crate::loot::LootId;

/// Something that happened to a dog or to the loot of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEventKind {
    /// A dog entered a session.
    DogJoined {
        /// The new dog.
        dog: DogId,
        /// The session it joined.
        session: MapId,
    },
    /// The spawner placed a new item.
    LootSpawned {
        /// The session the item belongs to.
        session: MapId,
        /// The new item.
        loot: LootId,
    },
    /// A dog put an item into its bag.
    LootCollected {
        /// The collecting dog.
        dog: DogId,
        /// The collected item.
        loot: LootId,
    },
    /// A dog reached an item with a full bag and left it on the ground.
    LootLeftBehind {
        /// The dog with the full bag.
        dog: DogId,
        /// The item that stays on the map.
        loot: LootId,
    },
    /// A dog emptied its bag at an office.
    LootDelivered {
        /// The delivering dog.
        dog: DogId,
        /// Number of items handed over.
        items: usize,
        /// Score gained.
        value: u64,
    },
    /// A dog stood still long enough to retire.
    DogRetired {
        /// The retired dog.
        dog: DogId,
        /// Its final score.
        score: u64,
    },
}

impl SimEventKind {
    /// Whether `id` is the dog this event is about.
    pub fn involves(&self, id: DogId) -> bool {
        match self {
            Self::DogJoined { dog, .. }
            | Self::LootCollected { dog, .. }
            | Self::LootLeftBehind { dog, .. }
            | Self::LootDelivered { dog, .. }
            | Self::DogRetired { dog, .. } => *dog == id,
            Self::LootSpawned { .. } => false,
        }
    }
}

/// One entry of the event log.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// Tick the event happened in.
    pub tick: u64,
    /// What happened.
    pub kind: SimEventKind,
    /// Text for logs and the CLI.
    pub description: String,
}

impl SimEvent {
    /// An event at `tick`.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Recent simulation events, oldest first.
///
/// A bounded log evicts its oldest entry for every entry recorded past the
/// bound. A bound of 0 keeps everything.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: VecDeque<SimEvent>,
    bound: usize,
}

impl EventLog {
    /// An empty log holding at most `bound` events, or any number for 0.
    pub fn new(bound: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            bound,
        }
    }

    /// Append `event`, evicting the oldest entry when full.
    pub fn record(&mut self, event: SimEvent) {
        if self.bound > 0 && self.entries.len() == self.bound {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// All events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter()
    }

    /// Events recorded during `tick`.
    pub fn at_tick(&self, tick: u64) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter().filter(move |e| e.tick == tick)
    }

    /// Events about the dog `id`.
    pub fn for_dog(&self, id: DogId) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter().filter(move |e| e.kind.involves(id))
    }

    /// Number of events held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no events.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
