/// Configuration for a world registry.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for reproducible spawns. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Spawn new dogs at a random point of a random road instead of at the
    /// start of the first road.
    pub randomize_spawn_points: bool,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            randomize_spawn_points: false,
            max_events: 1000,
        }
    }
}

impl SimConfig {
    /// Set the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Choose whether new dogs spawn at random road points.
    pub fn with_randomize_spawn(mut self, randomize: bool) -> Self {
        self.randomize_spawn_points = randomize;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }
}
