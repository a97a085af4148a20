use rand::rngs::StdRng;

use crate::clock::SimClock;
use crate::event::{EventLog, SimEvent, SimEventKind};

/// Mutable context handed to each session during a tick.
pub struct TickContext<'a> {
    /// The registry clock, already advanced to the current tick.
    pub clock: &'a SimClock,
    /// The shared event log.
    pub events: &'a mut EventLog,
    /// The registry's random source.
    pub rng: &'a mut StdRng,
}

impl TickContext<'_> {
    /// Emit a simulation event at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .record(SimEvent::new(self.clock.tick(), kind, description));
    }

    /// The current tick number.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }
}
