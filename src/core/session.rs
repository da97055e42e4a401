//! Session-scoped dashboard state
//!
//! One `Session` owns the throttler, the transaction log, the particle store
//! and the stats aggregator. Writers per field:
//! - throttle queue, log, particles: the pipeline driver (`accept`, `pump`,
//!   `cull`) and the render loop (`tick`)
//! - bounds: the resize handler
//! - stats: the stats stream listener and the REST poller

use tracing::debug;

use super::event::TransactionEvent;
use super::log::{TransactionLog, DEFAULT_LOG_CAPACITY};
use super::particles::{Bounds, ParticleStore};
use super::stats::{ApiStats, RollingStats, StatsAggregator, StatsUpdate};
use super::throttle::{ThrottleConfig, Throttler};
use crate::time::Millis;

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub throttle: ThrottleConfig,
    pub log_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            throttle: ThrottleConfig::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

pub struct Session {
    throttler: Throttler<TransactionEvent>,
    log: TransactionLog,
    particles: ParticleStore,
    stats: StatsAggregator,
    committed_total: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_particles(config, ParticleStore::new())
    }

    /// Session with a caller-provided particle store (seeded in tests).
    pub fn with_particles(config: SessionConfig, particles: ParticleStore) -> Self {
        Self {
            throttler: Throttler::new(config.throttle),
            log: TransactionLog::new(config.log_capacity),
            particles,
            stats: StatsAggregator::new(),
            committed_total: 0,
        }
    }

    /// Hand an inbound event to the throttler. Returns the wait before commit.
    pub fn accept(&mut self, event: TransactionEvent, now: Millis) -> Millis {
        self.throttler.accept(event, now)
    }

    /// Commit every event whose deferred time has come. Returns the count.
    pub fn pump(&mut self, now: Millis) -> usize {
        let due = self.throttler.take_due(now);
        let count = due.len();
        for deferred in due {
            self.commit(deferred.item, now);
        }
        if count > 0 {
            debug!(
                committed = count,
                pending = self.throttler.pending(),
                particles = self.particles.len(),
                "events committed"
            );
        }
        count
    }

    fn commit(&mut self, event: TransactionEvent, now: Millis) {
        self.particles.spawn_in_current_bounds(&event, now);
        self.log.append(event);
        self.stats.increment_recent_activity(1);
        self.committed_total += 1;
    }

    /// Time of the next deferred commit, for the driver's timer.
    pub fn next_due(&self) -> Option<Millis> {
        self.throttler.next_due()
    }

    pub fn pending(&self) -> u32 {
        self.throttler.pending()
    }

    /// Age-based removal without recomputing the curve.
    pub fn cull(&mut self, now: Millis) -> usize {
        self.particles.cull(now)
    }

    /// Per-frame update of particle opacity and glow.
    pub fn tick(&mut self, now: Millis) {
        self.particles.tick(now);
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.particles.set_bounds(bounds);
    }

    pub fn apply_stats(&mut self, update: &StatsUpdate) {
        self.stats.apply_tps_and_block(update);
    }

    pub fn apply_api_stats(&mut self, api: &ApiStats) {
        self.stats.apply_snapshot(api);
    }

    pub fn stats(&self) -> RollingStats {
        self.stats.snapshot()
    }

    pub fn log(&self) -> &TransactionLog {
        &self.log
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    pub fn committed_total(&self) -> u64 {
        self.committed_total
    }

    /// Drop outstanding commits and live particles (teardown).
    pub fn reset(&mut self) {
        self.throttler.clear();
        self.particles.clear();
    }
}
