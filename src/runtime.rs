//! Async pipeline wiring
//!
//! ```text
//! stream / simulator --> EventSource --> intake (mpsc) --> driver --> Session
//!                                   \--> stats listener ------------> Session
//! REST poller ------------------------------------------------------> Session
//! ```
//!
//! The driver task owns every throttle timer: it sleeps until the session's
//! next deferred commit, takes new events off the intake channel, and culls
//! expired particles on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::adapter::{TOPIC_NETWORK_STATS, TOPIC_TRANSACTIONS};
use crate::core::{EventSource, Session, SessionConfig, Subscription, TransactionEvent};
use crate::poll::StatsPoller;
use crate::simulator::Simulator;
use crate::stream::StreamClient;
use crate::time::{Clock, SystemClock};
use crate::ws_state::StreamStatus;

/// Cadence of the background particle cull.
pub const CULL_INTERVAL: Duration = Duration::from_millis(100);
/// Grace period for tasks to finish after the shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Where transactions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Live,
    Simulated,
}

/// Cheap, cloneable read access to a running pipeline.
#[derive(Clone)]
pub struct RuntimeView {
    pub session: Arc<Mutex<Session>>,
    pub transactions: StreamStatus,
    pub stats: StreamStatus,
    pub feed: Feed,
}

pub struct Runtime {
    view: RuntimeView,
    shutdown_tx: watch::Sender<bool>,
    driver: JoinHandle<()>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    subscriptions: Vec<Subscription>,
}

impl Runtime {
    /// Spawn the pipeline on the current tokio runtime.
    pub fn start(config: &Config, feed: Feed) -> Self {
        Self::start_with_clock(config, feed, Arc::new(SystemClock))
    }

    pub fn start_with_clock(config: &Config, feed: Feed, clock: Arc<dyn Clock>) -> Self {
        let session = Arc::new(Mutex::new(Session::new(SessionConfig {
            throttle: config.throttle,
            ..SessionConfig::default()
        })));
        let source = EventSource::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (intake_tx, intake_rx) = mpsc::unbounded_channel();

        let subscriptions = vec![
            source.on_transaction(move |ev| {
                if intake_tx.send(ev.clone()).is_err() {
                    debug!("intake closed, transaction dropped");
                }
            }),
            {
                let session = session.clone();
                source.on_stats(move |update| session.lock().apply_stats(update))
            },
        ];

        let driver = tokio::spawn(drive(
            session.clone(),
            clock.clone(),
            intake_rx,
            shutdown_rx.clone(),
        ));

        let transactions = StreamStatus::new();
        let stats = StreamStatus::new();
        let mut tasks = Vec::new();

        match feed {
            Feed::Live => {
                for (name, topic, status) in [
                    ("transactions", TOPIC_TRANSACTIONS, &transactions),
                    ("network stats", TOPIC_NETWORK_STATS, &stats),
                ] {
                    let client = StreamClient::new(
                        config.ws_url.clone(),
                        topic,
                        source.clone(),
                        status.clone(),
                        clock.clone(),
                    )
                    .with_reconnect(config.reconnect);
                    tasks.push((name, tokio::spawn(client.run(shutdown_rx.clone()))));
                }
                let poller =
                    StatsPoller::new(config.stats_url(), config.poll_interval, session.clone());
                tasks.push(("stats poller", tokio::spawn(poller.run(shutdown_rx.clone()))));
            }
            Feed::Simulated => {
                let sim = Simulator::new();
                tasks.push((
                    "simulator",
                    tokio::spawn(sim.run(source.clone(), clock.clone(), shutdown_rx.clone())),
                ));
            }
        }

        info!(?feed, ws = %config.ws_url, "pipeline started");
        Self {
            view: RuntimeView {
                session,
                transactions,
                stats,
                feed,
            },
            shutdown_tx,
            driver,
            tasks,
            subscriptions,
        }
    }

    pub fn view(&self) -> RuntimeView {
        self.view.clone()
    }

    pub fn session(&self) -> Arc<Mutex<Session>> {
        self.view.session.clone()
    }

    /// Stop all tasks, close the streams, release listeners and drop any
    /// outstanding commits.
    pub async fn shutdown(self) {
        info!("shutting down pipeline");
        let _ = self.shutdown_tx.send(true);
        drop(self.subscriptions);

        for (name, mut handle) in self.tasks {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await.is_err() {
                warn!(task = name, "task did not stop in time, aborting");
                handle.abort();
            }
        }
        self.driver.abort();

        self.view.session.lock().reset();
        debug!("pipeline stopped");
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}

/// Throttle driver: the only task that accepts, commits and culls.
async fn drive(
    session: Arc<Mutex<Session>>,
    clock: Arc<dyn Clock>,
    mut intake: mpsc::UnboundedReceiver<TransactionEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut cull = tokio::time::interval(CULL_INTERVAL);
    cull.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        let wait = session
            .lock()
            .next_due()
            .map(|due| Duration::from_millis(due.saturating_sub(clock.now_ms())));

        tokio::select! {
            ev = intake.recv() => {
                let Some(ev) = ev else { break };
                let now = clock.now_ms();
                let mut session = session.lock();
                if session.accept(ev, now) == 0 {
                    session.pump(now);
                }
            }
            _ = sleep_for(wait) => {
                session.lock().pump(clock.now_ms());
            }
            _ = cull.tick() => {
                session.lock().cull(clock.now_ms());
            }
            _ = shutdown.changed() => break,
        }
    }
    debug!("driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Inbound, StatsUpdate, TxKind};

    async fn wait_for<F: Fn() -> bool>(cond: F) -> bool {
        for _ in 0..200 {
            if cond() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cond()
    }

    #[tokio::test]
    async fn driver_commits_throttled_events() {
        let session = Arc::new(Mutex::new(Session::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(drive(session.clone(), Arc::new(SystemClock), rx, stop_rx));

        for _ in 0..3 {
            tx.send(TransactionEvent::synthetic(TxKind::Swap, 1.0, 0)).unwrap();
        }
        assert!(wait_for(|| session.lock().log().len() == 3).await);
        assert_eq!(session.lock().stats().recent_activity_count, 3);
        assert_eq!(session.lock().pending(), 0);

        stop_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn dispatched_events_reach_the_session_until_shutdown() {
        let config = Config::default();
        let runtime = Runtime::start(&config, Feed::Simulated);
        let view = runtime.view();

        // simulator seeds arrive within the first second
        assert!(wait_for(|| view.session.lock().committed_total() >= 1).await);

        runtime.shutdown().await;
        let session = view.session.lock();
        assert_eq!(session.pending(), 0);
        assert!(session.particles().is_empty());
    }

    #[tokio::test]
    async fn stats_listener_updates_session() {
        let session = Arc::new(Mutex::new(Session::default()));
        let source = EventSource::new();
        let target = session.clone();
        let sub = source.on_stats(move |u| target.lock().apply_stats(u));

        source.dispatch(&Inbound::Stats(StatsUpdate {
            block_number: 77,
            tps: 12.5,
            gas_price: None,
            timestamp: None,
        }));
        assert_eq!(session.lock().stats().block_height, 77);

        drop(sub);
        source.dispatch(&Inbound::Stats(StatsUpdate {
            block_number: 78,
            tps: 1.0,
            gas_price: None,
            timestamp: None,
        }));
        assert_eq!(session.lock().stats().block_height, 77, "disposed listener stays silent");
    }
}
