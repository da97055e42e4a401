//! Event source adapter
//!
//! Parses raw stream messages into canonical values and fans them out to
//! registered listeners. A bad message is logged and dropped; it never
//! reaches the transport loop as an error.

use serde::Deserialize;
use serde_json::Value;
use tracing::{trace, warn};

use super::event::{to_display_units, TransactionEvent, TxKind};
use super::observer::{Observers, Subscription};
use super::stats::StatsUpdate;
use crate::time::Millis;

/// Topic carrying transactions.
pub const TOPIC_TRANSACTIONS: &str = "new_transaction";
/// Topic carrying network stats.
pub const TOPIC_NETWORK_STATS: &str = "network_stats";

/// Subscription handshake sent right after a connection opens.
pub fn subscribe_message(topic: &str) -> String {
    serde_json::json!({ "type": "subscribe", "topic": topic }).to_string()
}

/// A successfully parsed inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Transaction(TransactionEvent),
    Stats(StatsUpdate),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTransaction {
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    from_address: Option<String>,
    #[serde(default)]
    to_address: Option<String>,
    #[serde(default)]
    transaction_type: Option<String>,
}

/// Parse one stream message.
///
/// Returns `None` for malformed JSON, unknown message types, and messages
/// whose payload does not fit the expected shape.
pub fn parse_message(msg: &str, now: Millis) -> Option<Inbound> {
    trace!(len = msg.len(), "Parsing message");

    let json: Value = serde_json::from_str(msg)
        .map_err(|e| {
            warn!(error = %e, "Failed to parse JSON");
        })
        .ok()?;

    let msg_type = json["type"].as_str()?;
    let data = json.get("data")?;

    match msg_type {
        TOPIC_TRANSACTIONS => {
            let wire: WireTransaction = serde_json::from_value(data.clone())
                .map_err(|e| {
                    warn!(error = %e, "Malformed transaction payload");
                })
                .ok()?;
            let kind = wire
                .transaction_type
                .as_deref()
                .map(TxKind::from_wire)
                .unwrap_or(TxKind::Transfer);
            let value = to_display_units(wire.value.as_ref());
            Some(Inbound::Transaction(TransactionEvent::new(
                kind,
                value,
                wire.hash,
                wire.from_address,
                wire.to_address,
                now,
            )))
        }
        TOPIC_NETWORK_STATS => {
            let update: StatsUpdate = serde_json::from_value(data.clone())
                .map_err(|e| {
                    warn!(error = %e, "Malformed network stats payload");
                })
                .ok()?;
            Some(Inbound::Stats(update))
        }
        other => {
            // acks, pings and topics we did not ask for
            trace!(msg_type = other, "Ignoring message");
            None
        }
    }
}

/// Listener hub for both topics.
#[derive(Clone, Default)]
pub struct EventSource {
    transactions: Observers<TransactionEvent>,
    stats: Observers<StatsUpdate>,
}

impl EventSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn on_transaction<F>(&self, f: F) -> Subscription
    where
        F: Fn(&TransactionEvent) + Send + Sync + 'static,
    {
        self.transactions.subscribe(f)
    }

    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn on_stats<F>(&self, f: F) -> Subscription
    where
        F: Fn(&StatsUpdate) + Send + Sync + 'static,
    {
        self.stats.subscribe(f)
    }

    /// Parse `msg` and notify the matching listeners. Returns the parsed value.
    pub fn handle_message(&self, msg: &str, now: Millis) -> Option<Inbound> {
        let inbound = parse_message(msg, now)?;
        self.dispatch(&inbound);
        Some(inbound)
    }

    /// Notify listeners of an already-normalized value (simulator path).
    pub fn dispatch(&self, inbound: &Inbound) {
        match inbound {
            Inbound::Transaction(ev) => {
                self.transactions.notify(ev);
            }
            Inbound::Stats(update) => {
                self.stats.notify(update);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.transactions.len() + self.stats.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn parses_transaction_message() {
        let msg = r#"{
            "type": "new_transaction",
            "data": {
                "hash": "0xfeed",
                "value": "1000000000000000000",
                "fromAddress": "0xaaa",
                "toAddress": "0xbbb",
                "transactionType": "SWAP"
            }
        }"#;
        let Some(Inbound::Transaction(ev)) = parse_message(msg, 42) else {
            panic!("expected transaction");
        };
        assert_eq!(ev.kind, TxKind::Swap);
        assert_eq!(ev.hash, "0xfeed");
        assert_eq!(ev.from, "0xaaa");
        assert_eq!(ev.to, "0xbbb");
        assert!((ev.value - 1.0).abs() < 1e-12);
        assert_eq!(ev.observed_at, 42);
    }

    #[test]
    fn numeric_value_and_unknown_type() {
        let msg = r#"{"type":"new_transaction","data":{"value":5e17,"transactionType":"approve"}}"#;
        let Some(Inbound::Transaction(ev)) = parse_message(msg, 0) else {
            panic!("expected transaction");
        };
        assert_eq!(ev.kind, TxKind::Transfer);
        assert!((ev.value - 0.5).abs() < 1e-12);
        assert_eq!(ev.hash.len(), 66, "missing hash is synthesized");
    }

    #[test]
    fn non_numeric_value_is_zero_not_nan() {
        let msg = r#"{"type":"new_transaction","data":{"value":"lots","transactionType":"mint"}}"#;
        let Some(Inbound::Transaction(ev)) = parse_message(msg, 0) else {
            panic!("expected transaction");
        };
        assert_eq!(ev.value, 0.0);
    }

    #[test]
    fn parses_stats_message() {
        let msg = r#"{"type":"network_stats","data":{"blockNumber":77,"tps":12.5,"gasPrice":"1"}}"#;
        let Some(Inbound::Stats(u)) = parse_message(msg, 0) else {
            panic!("expected stats");
        };
        assert_eq!(u.block_number, 77);
        assert_eq!(u.tps, 12.5);
    }

    #[test]
    fn ignores_garbage_and_other_types() {
        assert!(parse_message("{not json", 0).is_none());
        assert!(parse_message(r#"{"type":"subscribed","data":{"topic":"x"}}"#, 0).is_none());
        assert!(parse_message(r#"{"type":"new_transaction"}"#, 0).is_none());
        assert!(parse_message(r#"{"type":"network_stats","data":{"blockNumber":"high"}}"#, 0).is_none());
        assert!(parse_message(r#"[1,2,3]"#, 0).is_none());
    }

    #[test]
    fn subscribe_handshake_shape() {
        let v: Value = serde_json::from_str(&subscribe_message(TOPIC_NETWORK_STATS)).unwrap();
        assert_eq!(v["type"], "subscribe");
        assert_eq!(v["topic"], "network_stats");
    }

    #[test]
    fn dispatches_to_matching_listeners_only() {
        let source = EventSource::new();
        let txs = Arc::new(Mutex::new(Vec::new()));
        let blocks = Arc::new(Mutex::new(Vec::new()));

        let _tx_sub = {
            let txs = txs.clone();
            source.on_transaction(move |ev| txs.lock().push(ev.kind))
        };
        let stats_sub = {
            let blocks = blocks.clone();
            source.on_stats(move |u| blocks.lock().push(u.block_number))
        };

        source.handle_message(r#"{"type":"new_transaction","data":{"transactionType":"burn"}}"#, 0);
        source.handle_message(r#"{"type":"network_stats","data":{"blockNumber":9,"tps":1}}"#, 0);
        source.handle_message("garbage", 0);

        assert_eq!(*txs.lock(), vec![TxKind::Burn]);
        assert_eq!(*blocks.lock(), vec![9]);

        drop(stats_sub);
        source.handle_message(r#"{"type":"network_stats","data":{"blockNumber":10,"tps":1}}"#, 0);
        assert_eq!(*blocks.lock(), vec![9]);
        assert_eq!(source.listener_count(), 1);
    }
}
