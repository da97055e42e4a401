//! Synthetic transaction source for offline demos
//!
//! Emits a short burst of seed events so the canvas is not empty at startup,
//! then one event per steady interval.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::core::{EventSource, Inbound, TransactionEvent, TxKind};
use crate::time::Clock;

pub const SEED_EVENTS: u64 = 5;
pub const SEED_SPACING: Duration = Duration::from_millis(200);
pub const STEADY_INTERVAL: Duration = Duration::from_millis(800);
/// Values are drawn from `[MIN_VALUE, MAX_VALUE)`.
pub const MIN_VALUE: f64 = 10.0;
pub const MAX_VALUE: f64 = 1010.0;

/// Emission time of the `n`th event, relative to start.
pub fn offset_of(n: u64) -> Duration {
    if n < SEED_EVENTS {
        SEED_SPACING * n as u32
    } else {
        let seeds_end = SEED_SPACING * (SEED_EVENTS - 1) as u32;
        seeds_end + STEADY_INTERVAL * (n - SEED_EVENTS + 1) as u32
    }
}

pub struct Simulator {
    rng: StdRng,
    emitted: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            emitted: 0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            emitted: 0,
        }
    }

    /// Produce the next synthetic event observed at `now`.
    pub fn next_event(&mut self, now: u64) -> TransactionEvent {
        let kind = TxKind::SIMULATED
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(TxKind::Transfer);
        let value = self.rng.gen_range(MIN_VALUE..MAX_VALUE);
        self.emitted += 1;
        TransactionEvent::synthetic(kind, value, now)
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Dispatch events to `source` on the seed-then-steady schedule until
    /// shutdown.
    pub async fn run(
        mut self,
        source: EventSource,
        clock: Arc<dyn Clock>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("simulator started");
        let start = Instant::now();
        loop {
            let at = start + offset_of(self.emitted);
            tokio::select! {
                _ = tokio::time::sleep_until(at) => {}
                _ = shutdown.changed() => break,
            }
            let event = self.next_event(clock.now_ms());
            debug!(kind = %event.kind, value = event.value, "simulated transaction");
            source.dispatch(&Inbound::Transaction(event));
        }
        info!(emitted = self.emitted, "simulator stopped");
    }
}
