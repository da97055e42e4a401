//! Canonical transaction event and its kind
//!
//! A [`TransactionEvent`] is created once per inbound message and never
//! mutated afterwards. Fields missing on the wire are synthesized here.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::time::Millis;

/// Smallest-unit amounts are divided by this to get display units.
pub const WEI_PER_UNIT: f64 = 1e18;

/// Closed set of transaction kinds shown in the log and legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Transfer,
    Swap,
    Mint,
    Burn,
    Stake,
    Other,
}

impl TxKind {
    pub const ALL: &'static [TxKind] = &[
        TxKind::Transfer,
        TxKind::Swap,
        TxKind::Mint,
        TxKind::Burn,
        TxKind::Stake,
        TxKind::Other,
    ];

    /// Kinds produced by the simulator (never `Other`).
    pub const SIMULATED: &'static [TxKind] = &[
        TxKind::Transfer,
        TxKind::Swap,
        TxKind::Mint,
        TxKind::Burn,
        TxKind::Stake,
    ];

    /// Case-insensitive mapping of a wire `transactionType`.
    /// Anything unrecognized is a plain transfer.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "transfer" => TxKind::Transfer,
            "swap" => TxKind::Swap,
            "mint" => TxKind::Mint,
            "burn" => TxKind::Burn,
            "stake" => TxKind::Stake,
            "other" => TxKind::Other,
            _ => TxKind::Transfer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TxKind::Transfer => "transfer",
            TxKind::Swap => "swap",
            TxKind::Mint => "mint",
            TxKind::Burn => "burn",
            TxKind::Stake => "stake",
            TxKind::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TxKind::Transfer => "Transfer",
            TxKind::Swap => "Swap",
            TxKind::Mint => "Mint",
            TxKind::Burn => "Burn",
            TxKind::Stake => "Stake",
            TxKind::Other => "Other",
        }
    }

    /// Display color as `(r, g, b)`.
    pub fn color_rgb(&self) -> (u8, u8, u8) {
        match self {
            TxKind::Transfer => (0x3b, 0x82, 0xf6),
            TxKind::Swap => (0x10, 0xb9, 0x81),
            TxKind::Mint => (0x8b, 0x5c, 0xf6),
            TxKind::Burn => (0xef, 0x44, 0x44),
            TxKind::Stake => (0xf5, 0x9e, 0x0b),
            TxKind::Other => (0x6b, 0x72, 0x80),
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A normalized transaction, ready for the log and the visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionEvent {
    pub id: String,
    pub hash: String,
    pub kind: TxKind,
    pub from: String,
    pub to: String,
    /// Display units, always finite and non-negative.
    pub value: f64,
    /// Ingestion wall-clock time (epoch ms)
    pub observed_at: Millis,
}

impl TransactionEvent {
    /// Build an event, synthesizing any identifiers not supplied by the source.
    pub fn new(
        kind: TxKind,
        value: f64,
        hash: Option<String>,
        from: Option<String>,
        to: Option<String>,
        observed_at: Millis,
    ) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            id: format!("tx-{}", uuid::Uuid::new_v4().simple()),
            hash: non_empty(hash).unwrap_or_else(|| random_hex(&mut rng, 32)),
            kind,
            from: non_empty(from).unwrap_or_else(|| random_hex(&mut rng, 20)),
            to: non_empty(to).unwrap_or_else(|| random_hex(&mut rng, 20)),
            value: sanitize_amount(value),
            observed_at,
        }
    }

    /// Event with every identifier synthesized (simulator, tests).
    pub fn synthetic(kind: TxKind, value: f64, observed_at: Millis) -> Self {
        Self::new(kind, value, None, None, None, observed_at)
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// `0x`-prefixed random hex string of `bytes` bytes.
pub fn random_hex<R: Rng>(rng: &mut R, bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rng.fill(buf.as_mut_slice());
    format!("0x{}", hex::encode(buf))
}

/// Clamp to a finite, non-negative amount.
fn sanitize_amount(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Convert a smallest-unit amount (JSON string or number) to display units.
///
/// Accepts decimal integers, floats with exponent, and `0x` hex strings.
/// Missing, non-numeric, negative or non-finite input yields `0.0`.
pub fn to_display_units(raw: Option<&Value>) -> f64 {
    let smallest = match raw {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_amount_str(s),
        _ => 0.0,
    };
    sanitize_amount(smallest / WEI_PER_UNIT)
}

fn parse_amount_str(s: &str) -> f64 {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u128::from_str_radix(hex, 16)
            .map(|v| v as f64)
            .unwrap_or(0.0);
    }
    s.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_mapping_is_case_insensitive() {
        assert_eq!(TxKind::from_wire("SWAP"), TxKind::Swap);
        assert_eq!(TxKind::from_wire("Mint"), TxKind::Mint);
        assert_eq!(TxKind::from_wire(" burn "), TxKind::Burn);
        assert_eq!(TxKind::from_wire("stake"), TxKind::Stake);
        assert_eq!(TxKind::from_wire("OTHER"), TxKind::Other);
    }

    #[test]
    fn unknown_kind_falls_back_to_transfer() {
        assert_eq!(TxKind::from_wire("contract_call"), TxKind::Transfer);
        assert_eq!(TxKind::from_wire(""), TxKind::Transfer);
    }

    #[test]
    fn one_unit_converts_to_one() {
        let v = to_display_units(Some(&json!("1000000000000000000")));
        assert!((v - 1.0).abs() < 1e-12);
        let v = to_display_units(Some(&json!(2_500_000_000_000_000_000.0_f64)));
        assert!((v - 2.5).abs() < 1e-12);
    }

    #[test]
    fn hex_amounts_are_accepted() {
        // 0xde0b6b3a7640000 == 10^18
        let v = to_display_units(Some(&json!("0xde0b6b3a7640000")));
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn garbage_amounts_become_zero() {
        for raw in [json!("not a number"), json!(null), json!({}), json!("-5"), json!("NaN")] {
            let v = to_display_units(Some(&raw));
            assert_eq!(v, 0.0, "{raw} should convert to 0");
        }
        assert_eq!(to_display_units(None), 0.0);
    }

    #[test]
    fn synthetic_event_has_well_formed_identifiers() {
        let ev = TransactionEvent::synthetic(TxKind::Swap, 12.5, 1_000);
        assert!(ev.id.starts_with("tx-"));
        assert_eq!(ev.hash.len(), 2 + 64);
        assert_eq!(ev.from.len(), 2 + 40);
        assert_eq!(ev.to.len(), 2 + 40);
        assert!(ev.hash.starts_with("0x"));
        assert_eq!(ev.value, 12.5);
    }

    #[test]
    fn provided_identifiers_are_kept_and_ids_are_unique() {
        let a = TransactionEvent::new(
            TxKind::Mint,
            1.0,
            Some("0xabc".into()),
            Some("0xfrom".into()),
            Some("".into()),
            0,
        );
        let b = TransactionEvent::synthetic(TxKind::Mint, 1.0, 0);
        assert_eq!(a.hash, "0xabc");
        assert_eq!(a.from, "0xfrom");
        assert_eq!(a.to.len(), 42, "empty address is synthesized");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn negative_or_nan_values_are_clamped() {
        assert_eq!(TransactionEvent::synthetic(TxKind::Burn, -3.0, 0).value, 0.0);
        assert_eq!(TransactionEvent::synthetic(TxKind::Burn, f64::NAN, 0).value, 0.0);
    }
}
