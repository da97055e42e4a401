//! Rolling network statistics
//!
//! Holds the authoritative last-known values. Presentation smoothing lives in
//! [`crate::core::counter`], never here.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validator count shown until the REST poll reports one.
pub const DEFAULT_ACTIVE_VALIDATORS: u32 = 99;

/// Snapshot handed to display widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingStats {
    pub recent_activity_count: u64,
    pub tps: f64,
    pub block_height: u64,
    pub active_validator_count: u32,
    pub total_transactions: u64,
    pub gas_price: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for RollingStats {
    fn default() -> Self {
        Self {
            recent_activity_count: 0,
            tps: 0.0,
            block_height: 0,
            active_validator_count: DEFAULT_ACTIVE_VALIDATORS,
            total_transactions: 0,
            gas_price: None,
            updated_at: None,
        }
    }
}

/// Partial update from the `network_stats` push topic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdate {
    #[serde(default)]
    pub block_number: u64,
    #[serde(default)]
    pub tps: f64,
    #[serde(default)]
    pub gas_price: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Body of the REST stats endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStats {
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub tps: f64,
    #[serde(default)]
    pub active_validators: u32,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Owner of [`RollingStats`].
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: RollingStats,
    // set once the push stream has delivered a value
    stream_seen: bool,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite tps and block height from the push stream. No smoothing.
    pub fn apply_tps_and_block(&mut self, update: &StatsUpdate) {
        let tps = if update.tps.is_finite() && update.tps >= 0.0 {
            update.tps
        } else {
            0.0
        };
        self.stats.tps = tps;
        self.stats.block_height = update.block_number;
        if update.gas_price.is_some() {
            self.stats.gas_price = update.gas_price.clone();
        }
        if update.timestamp.is_some() {
            self.stats.updated_at = update.timestamp.clone();
        }
        self.stream_seen = true;
        debug!(tps, block = update.block_number, "network stats applied");
    }

    pub fn increment_recent_activity(&mut self, n: u64) {
        self.stats.recent_activity_count = self.stats.recent_activity_count.saturating_add(n);
    }

    /// Seed from the REST poll. Validators and totals always win; tps and
    /// block height only until the push stream takes over.
    pub fn apply_snapshot(&mut self, api: &ApiStats) {
        self.stats.total_transactions = api.total_transactions;
        if api.active_validators > 0 {
            self.stats.active_validator_count = api.active_validators;
        }
        if !self.stream_seen {
            if api.tps.is_finite() && api.tps >= 0.0 {
                self.stats.tps = api.tps;
            }
            self.stats.block_height = api.block_height;
        }
        if api.timestamp.is_some() && !self.stream_seen {
            self.stats.updated_at = api.timestamp.clone();
        }
        debug!(
            total = api.total_transactions,
            validators = api.active_validators,
            seeded = !self.stream_seen,
            "api stats applied"
        );
    }

    pub fn snapshot(&self) -> RollingStats {
        self.stats.clone()
    }

    pub fn stats(&self) -> &RollingStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(block: u64, tps: f64) -> StatsUpdate {
        StatsUpdate {
            block_number: block,
            tps,
            gas_price: Some("52".into()),
            timestamp: None,
        }
    }

    #[test]
    fn starts_with_placeholders() {
        let agg = StatsAggregator::new();
        let s = agg.snapshot();
        assert_eq!(s.tps, 0.0);
        assert_eq!(s.block_height, 0);
        assert_eq!(s.recent_activity_count, 0);
        assert_eq!(s.active_validator_count, DEFAULT_ACTIVE_VALIDATORS);
    }

    #[test]
    fn stream_update_overwrites_wholesale() {
        let mut agg = StatsAggregator::new();
        agg.apply_tps_and_block(&update(100, 250.5));
        agg.apply_tps_and_block(&update(90, 3.0));
        let s = agg.snapshot();
        assert_eq!(s.block_height, 90);
        assert_eq!(s.tps, 3.0);
        assert_eq!(s.gas_price.as_deref(), Some("52"));
    }

    #[test]
    fn non_finite_tps_is_zeroed() {
        let mut agg = StatsAggregator::new();
        agg.apply_tps_and_block(&update(1, f64::NAN));
        assert_eq!(agg.stats().tps, 0.0);
    }

    #[test]
    fn recent_activity_accumulates() {
        let mut agg = StatsAggregator::new();
        agg.increment_recent_activity(1);
        agg.increment_recent_activity(4);
        assert_eq!(agg.stats().recent_activity_count, 5);
    }

    #[test]
    fn poll_seeds_until_stream_arrives() {
        let mut agg = StatsAggregator::new();
        let api = ApiStats {
            total_transactions: 1_000,
            tps: 12.0,
            active_validators: 120,
            block_height: 500,
            timestamp: None,
        };
        agg.apply_snapshot(&api);
        let s = agg.snapshot();
        assert_eq!((s.tps, s.block_height), (12.0, 500));
        assert_eq!(s.active_validator_count, 120);
        assert_eq!(s.total_transactions, 1_000);

        agg.apply_tps_and_block(&update(600, 40.0));
        agg.apply_snapshot(&ApiStats {
            block_height: 550,
            tps: 1.0,
            ..api
        });
        let s = agg.snapshot();
        assert_eq!((s.tps, s.block_height), (40.0, 600), "stream values win");
    }

    #[test]
    fn update_parses_wire_shape() {
        let u: StatsUpdate = serde_json::from_str(
            r#"{"blockNumber": 123, "tps": 4.5, "gasPrice": "50000000000"}"#,
        )
        .unwrap();
        assert_eq!(u.block_number, 123);
        assert_eq!(u.tps, 4.5);
        assert!(u.timestamp.is_none());
    }
}
