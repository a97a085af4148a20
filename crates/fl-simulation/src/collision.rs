//! Sweep-based detection of dogs passing over items within one tick.
//!
//! A gatherer is a straight segment from its tick-start to its tick-end
//! position plus a capture width; an item is a point plus a width. A pair
//! collides when the closest approach of the segment to the point lies on the
//! segment and within the sum of both widths.

use fl_core::Position;

use crate::dog::DogId;
use crate::loot::LootId;

/// Closest approach of a moving point to a fixed one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionResult {
    /// Squared distance at closest approach.
    pub sq_distance: f64,
    /// Fraction of the path travelled at closest approach.
    pub proj_ratio: f64,
}

impl CollectionResult {
    /// Whether the closest approach lies on the path and within `collect_radius`.
    pub fn is_collected(&self, collect_radius: f64) -> bool {
        (0.0..=1.0).contains(&self.proj_ratio)
            && self.sq_distance <= collect_radius * collect_radius
    }
}

/// Moving from `a` to `b`, how close do we come to `c`?
///
/// `a` and `b` must differ.
pub fn try_collect_point(a: Position, b: Position, c: Position) -> CollectionResult {
    let v = b - a;
    let u = c - a;
    let u_dot_v = u.dot(v);
    let v_len2 = v.length_squared();
    CollectionResult {
        sq_distance: u.length_squared() - (u_dot_v * u_dot_v) / v_len2,
        proj_ratio: u_dot_v / v_len2,
    }
}

/// What an item stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// A loot item lying on the map.
    Loot(LootId),
    /// The office at this index of the map's office list.
    Office(usize),
}

/// A stationary collectible point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    /// What the item stands for.
    pub id: ItemRef,
    /// Where it is.
    pub position: Position,
    /// Its capture width.
    pub width: f64,
}

/// A dog's path over one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gatherer {
    /// The dog.
    pub id: DogId,
    /// Tick-start position.
    pub start: Position,
    /// Tick-end position.
    pub end: Position,
    /// Capture width.
    pub width: f64,
}

/// Indexed access to the items and gatherers of one tick.
pub trait ItemGathererProvider {
    /// Number of items.
    fn items_count(&self) -> usize;
    /// The item at `idx`.
    fn item(&self, idx: usize) -> Item;
    /// Number of gatherers.
    fn gatherers_count(&self) -> usize;
    /// The gatherer at `idx`.
    fn gatherer(&self, idx: usize) -> Gatherer;
}

/// A provider backed by two vectors.
#[derive(Debug, Clone, Default)]
pub struct VecProvider {
    items: Vec<Item>,
    gatherers: Vec<Gatherer>,
}

impl VecProvider {
    /// An empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item.
    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Append a gatherer.
    pub fn add_gatherer(&mut self, gatherer: Gatherer) {
        self.gatherers.push(gatherer);
    }
}

impl ItemGathererProvider for VecProvider {
    fn items_count(&self) -> usize {
        self.items.len()
    }

    fn item(&self, idx: usize) -> Item {
        self.items[idx]
    }

    fn gatherers_count(&self) -> usize {
        self.gatherers.len()
    }

    fn gatherer(&self, idx: usize) -> Gatherer {
        self.gatherers[idx]
    }
}

/// A gatherer reaching an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatheringEvent {
    /// The item reached.
    pub item: ItemRef,
    /// The dog reaching it.
    pub gatherer: DogId,
    /// Squared distance at closest approach.
    pub sq_distance: f64,
    /// Fraction of the tick at which the item is reached.
    pub time: f64,
}

/// All gatherer/item contacts of one tick, earliest first.
///
/// Events at the same time are ordered by gatherer index, then item index.
/// Gatherers that did not move collect nothing.
pub fn find_gather_events(provider: &impl ItemGathererProvider) -> Vec<GatheringEvent> {
    let mut found: Vec<(usize, usize, GatheringEvent)> = Vec::new();

    for g_idx in 0..provider.gatherers_count() {
        let gatherer = provider.gatherer(g_idx);
        if gatherer.start == gatherer.end {
            continue;
        }
        for i_idx in 0..provider.items_count() {
            let item = provider.item(i_idx);
            let result = try_collect_point(gatherer.start, gatherer.end, item.position);
            if result.is_collected(gatherer.width + item.width) {
                found.push((
                    g_idx,
                    i_idx,
                    GatheringEvent {
                        item: item.id,
                        gatherer: gatherer.id,
                        sq_distance: result.sq_distance,
                        time: result.proj_ratio,
                    },
                ));
            }
        }
    }

    found.sort_by(|a, b| {
        a.2.time
            .total_cmp(&b.2.time)
            .then(a.0.cmp(&b.0))
            .then(a.1.cmp(&b.1))
    });
    found.into_iter().map(|(_, _, event)| event).collect()
}
