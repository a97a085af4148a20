use std::fmt;
use std::time::Duration;

use fl_core::{LootSpawnConfig, Position};
use serde::{Deserialize, Serialize};

/// Capture width of a loot item.
pub const ITEM_WIDTH: f64 = 0.0;
/// Capture width of an office.
pub const OFFICE_WIDTH: f64 = 0.5;

/// Identifier of a loot item, unique within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootId(pub u64);

impl fmt::Display for LootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A collectible lying on the map or carried in a bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    /// Session-unique id.
    pub id: LootId,
    /// Index into the map's loot catalog.
    #[serde(rename = "type")]
    pub kind: usize,
    /// Score the item is worth at an office.
    pub value: u32,
    /// Where the item was spawned.
    pub position: Position,
}

/// Source of the `[0, 1]` factor the spawn probability is scaled by.
pub type RandomFactor = Box<dyn FnMut() -> f64 + Send>;

/// Decides how many loot items appear per tick.
///
/// The chance of a spawn grows with the time elapsed since the last one: with
/// base probability `p` per `period`, after `t` without loot the probability
/// is `1 - (1 - p)^(t / period)`. Time that did not produce loot carries over
/// into the next call.
pub struct LootGenerator {
    period: Duration,
    probability: f64,
    time_without_loot: Duration,
    random: RandomFactor,
}

impl fmt::Debug for LootGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LootGenerator")
            .field("period", &self.period)
            .field("probability", &self.probability)
            .field("time_without_loot", &self.time_without_loot)
            .finish()
    }
}

impl LootGenerator {
    /// A generator whose random factor is always 1.
    pub fn new(config: LootSpawnConfig) -> Self {
        Self {
            period: config.period,
            probability: config.probability,
            time_without_loot: Duration::ZERO,
            random: Box::new(|| 1.0),
        }
    }

    /// Replace the random factor source.
    pub fn with_random(mut self, random: impl FnMut() -> f64 + Send + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    /// Resume with time already accumulated since the last spawn.
    pub fn with_time_without_loot(mut self, elapsed: Duration) -> Self {
        self.time_without_loot = elapsed;
        self
    }

    /// Time accumulated since the last spawn.
    pub fn time_without_loot(&self) -> Duration {
        self.time_without_loot
    }

    /// How many items to spawn after `delta`, given the current item and
    /// looter counts. Never brings `loot_count` above `looter_count`.
    pub fn generate(&mut self, delta: Duration, loot_count: usize, looter_count: usize) -> usize {
        self.time_without_loot += delta;
        let shortage = looter_count.saturating_sub(loot_count);
        let ratio = if self.period.is_zero() {
            f64::INFINITY
        } else {
            self.time_without_loot.as_secs_f64() / self.period.as_secs_f64()
        };
        let probability =
            ((1.0 - (1.0 - self.probability).powf(ratio)) * (self.random)()).clamp(0.0, 1.0);
        // NaN casts to 0.
        let generated = ((shortage as f64) * probability).round() as usize;
        let generated = generated.min(shortage);
        if generated > 0 {
            self.time_without_loot = Duration::ZERO;
        }
        generated
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn generator(period_ms: u64, probability: f64) -> LootGenerator {
        LootGenerator::new(LootSpawnConfig {
            period: Duration::from_millis(period_ms),
            probability,
        })
    }

    #[test]
    fn no_looters_means_no_loot() {
        let mut g = generator(1000, 1.0);
        assert_eq!(g.generate(Duration::from_secs(10), 0, 0), 0);
    }

    #[test]
    fn certain_probability_fills_the_shortage() {
        let mut g = generator(1000, 1.0);
        assert_eq!(g.generate(Duration::from_millis(1), 1, 4), 3);
        assert_eq!(g.time_without_loot(), Duration::ZERO);
    }

    #[test]
    fn zero_probability_never_spawns() {
        let mut g = generator(1000, 0.0);
        for _ in 0..100 {
            assert_eq!(g.generate(Duration::from_secs(1), 0, 10), 0);
        }
    }

    #[test]
    fn probability_grows_with_elapsed_time() {
        // One period at p = 0.5 gives 0.5 * 4 = 2 items.
        let mut g = generator(1000, 0.5);
        assert_eq!(g.generate(Duration::from_secs(1), 0, 4), 2);

        // Two periods give 1 - 0.25 = 0.75, so 3 items.
        let mut g = generator(1000, 0.5);
        assert_eq!(g.generate(Duration::from_secs(2), 0, 4), 3);
    }

    #[test]
    fn residue_carries_over_between_calls() {
        // A short tick produces nothing for a single looter...
        let mut g = generator(1000, 0.5);
        assert_eq!(g.generate(Duration::from_millis(100), 0, 1), 0);
        assert_eq!(g.time_without_loot(), Duration::from_millis(100));
        // ...but the accumulated time eventually crosses the rounding threshold.
        let mut spawned = 0;
        for _ in 0..20 {
            spawned += g.generate(Duration::from_millis(100), 0, 1);
            if spawned > 0 {
                break;
            }
        }
        assert_eq!(spawned, 1);
        assert_eq!(g.time_without_loot(), Duration::ZERO);
    }

    #[test]
    fn split_ticks_match_one_long_tick() {
        let mut long = generator(1000, 0.5);
        let mut short = generator(1000, 0.5);
        let expected = long.generate(Duration::from_millis(1000), 0, 1);
        let mut got = 0;
        for _ in 0..10 {
            got += short.generate(Duration::from_millis(100), 0, 1);
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn random_factor_scales_probability() {
        let mut g = generator(1000, 1.0).with_random(|| 0.5);
        assert_eq!(g.generate(Duration::from_secs(1), 0, 4), 2);
        let mut g = generator(1000, 1.0).with_random(|| 0.0);
        assert_eq!(g.generate(Duration::from_secs(1), 0, 4), 0);
    }

    #[test]
    fn zero_period_spawns_immediately() {
        let mut g = generator(0, 0.3);
        assert_eq!(g.generate(Duration::ZERO, 0, 2), 2);
    }

    proptest! {
        #[test]
        fn never_exceeds_looter_count(
            period_ms in 0u64..10_000,
            probability in 0.0f64..=1.0,
            random in 0.0f64..=1.0,
            deltas in prop::collection::vec(0u64..5_000, 1..20),
            looters in 0usize..50,
            initial_loot in 0usize..60,
        ) {
            let mut g = generator(period_ms, probability).with_random(move || random);
            let mut loot = initial_loot;
            for delta in deltas {
                let n = g.generate(Duration::from_millis(delta), loot, looters);
                if loot >= looters {
                    prop_assert_eq!(n, 0);
                } else {
                    prop_assert!(loot + n <= looters);
                }
                loot += n;
            }
        }
    }
}
