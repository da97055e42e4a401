//! Push-stream client
//!
//! One task per topic. Each connection sends the subscribe handshake as soon
//! as it opens, then feeds every text frame to the shared [`EventSource`].
//! Transport failures are recorded in the stream's [`StreamStatus`] and, if
//! enabled, retried with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::core::{subscribe_message, EventSource};
use crate::error::Error;
use crate::time::Clock;
use crate::ws_state::StreamStatus;

/// Exponential reconnect delay: doubles from `initial` up to `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30))
    }
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// How a single connection ended.
enum Ended {
    Shutdown,
    Closed,
}

pub struct StreamClient {
    url: String,
    topic: &'static str,
    source: EventSource,
    status: StreamStatus,
    clock: Arc<dyn Clock>,
    reconnect: bool,
    backoff: Backoff,
}

impl StreamClient {
    pub fn new(
        url: impl Into<String>,
        topic: &'static str,
        source: EventSource,
        status: StreamStatus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            url: url.into(),
            topic,
            source,
            status,
            clock,
            reconnect: true,
            backoff: Backoff::default(),
        }
    }

    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Connect and pump messages until `shutdown` flips to `true` (or its
    /// sender is dropped). Reconnects after failures when enabled.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.connect_once(&mut shutdown).await {
                Ended::Shutdown => break,
                Ended::Closed if !self.reconnect => break,
                Ended::Closed => {}
            }

            let delay = self.backoff.next_delay();
            info!(topic = self.topic, delay_ms = delay.as_millis() as u64, "Reconnecting");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }
        self.status.set_disconnected();
        debug!(topic = self.topic, "Stream task finished");
    }

    async fn connect_once(&mut self, shutdown: &mut watch::Receiver<bool>) -> Ended {
        info!(url = %self.url, topic = self.topic, "Connecting to WebSocket");
        self.status.set_connecting();

        let connected = tokio::select! {
            res = connect_async(self.url.as_str()) => res,
            _ = shutdown.changed() => return Ended::Shutdown,
        };
        let ws_stream = match connected {
            Ok((stream, _)) => {
                info!(topic = self.topic, "WebSocket connected");
                self.status.set_connected();
                self.backoff.reset();
                stream
            }
            Err(e) => {
                let e = Error::from(e);
                error!(topic = self.topic, error = %e, "Failed to connect");
                self.status.set_error(e.to_string());
                return Ended::Closed;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        let subscribe = subscribe_message(self.topic);
        if let Err(e) = write.send(Message::Text(subscribe.into())).await {
            let e = Error::from(e);
            error!(topic = self.topic, error = %e, "Failed to send subscribe message");
            self.status.set_error(e.to_string());
            return Ended::Closed;
        }

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    debug!(topic = self.topic, "Closing WebSocket");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        debug!(topic = self.topic, error = %e, "Close frame not sent");
                    }
                    return Ended::Shutdown;
                }
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        self.source.handle_message(&text, self.clock.now_ms());
                    }
                    Some(Ok(Message::Close(_))) => {
                        warn!(topic = self.topic, "WebSocket closed by server");
                        self.status.set_disconnected();
                        return Ended::Closed;
                    }
                    Some(Err(e)) => {
                        let e = Error::from(e);
                        error!(topic = self.topic, error = %e, "WebSocket error");
                        self.status.set_error(e.to_string());
                        return Ended::Closed;
                    }
                    None => {
                        warn!(topic = self.topic, "WebSocket stream ended");
                        self.status.set_disconnected();
                        return Ended::Closed;
                    }
                    _ => {}
                }
            }
        }
    }
}
