//! Periodic REST stats poll
//!
//! Fetches `GET {api}/analytics/stats` on a fixed interval and folds the
//! result into the session. Failures are logged; the next tick retries.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::core::{ApiStats, Session};
use crate::error::{Error, Result};

/// Accepted response shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatsBody {
    Envelope { success: bool, stats: ApiStats },
    Bare(ApiStats),
}

/// Decode a stats response, either `{"success":..,"stats":{..}}` or the bare
/// stats object.
pub fn parse_stats_body(body: &str) -> Result<ApiStats> {
    match serde_json::from_str::<StatsBody>(body)? {
        StatsBody::Envelope { success: true, stats } => Ok(stats),
        StatsBody::Envelope { success: false, .. } => Err(Error::ApiFailure),
        StatsBody::Bare(stats) => Ok(stats),
    }
}

pub struct StatsPoller {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    session: Arc<Mutex<Session>>,
}

impl StatsPoller {
    pub fn new(url: impl Into<String>, interval: Duration, session: Arc<Mutex<Session>>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            interval,
            session,
        }
    }

    pub async fn fetch(&self) -> Result<ApiStats> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_stats_body(&body)
    }

    /// Poll immediately, then every interval, until shutdown.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            match self.fetch().await {
                Ok(stats) => {
                    debug!(url = %self.url, "stats polled");
                    self.session.lock().apply_api_stats(&stats);
                }
                Err(e) => warn!(url = %self.url, error = %e, "stats poll failed"),
            }
        }
        debug!("stats poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_and_bare_bodies() {
        let envelope = r#"{"success":true,"stats":{"totalTransactions":1200,"tps":3.5,"activeValidators":120,"blockHeight":88,"timestamp":"2024-01-01T00:00:00Z"}}"#;
        let stats = parse_stats_body(envelope).unwrap();
        assert_eq!(stats.total_transactions, 1200);
        assert_eq!(stats.active_validators, 120);
        assert_eq!(stats.block_height, 88);

        let bare = r#"{"totalTransactions":7,"tps":1.0,"activeValidators":3,"blockHeight":9}"#;
        let stats = parse_stats_body(bare).unwrap();
        assert_eq!(stats.total_transactions, 7);
        assert_eq!(stats.timestamp, None);
    }

    #[test]
    fn failure_envelope_and_garbage_are_errors() {
        let failed = r#"{"success":false,"stats":{}}"#;
        assert!(matches!(parse_stats_body(failed), Err(Error::ApiFailure)));
        assert!(matches!(parse_stats_body("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn polled_stats_seed_the_session() {
        let session = Arc::new(Mutex::new(Session::default()));
        let stats = parse_stats_body(r#"{"totalTransactions":50,"tps":2.0,"activeValidators":10,"blockHeight":4}"#)
            .unwrap();
        session.lock().apply_api_stats(&stats);
        let snapshot = session.lock().stats();
        assert_eq!(snapshot.total_transactions, 50);
        assert_eq!(snapshot.block_height, 4);
        assert_eq!(snapshot.active_validator_count, 10);
    }
}
