//! Runtime configuration from the environment
//!
//! Values come from `TXPULSE_*` variables (a `.env` file is loaded by the
//! binary first). Command-line flags override them afterwards.

use std::env;
use std::time::Duration;

use crate::core::ThrottleConfig;
use crate::error::{Error, Result};

pub const DEFAULT_WS_URL: &str = "ws://localhost:8081/ws/analytics";
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_POLL_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Analytics push stream
    pub ws_url: String,
    /// REST base, without trailing slash
    pub api_url: String,
    pub poll_interval: Duration,
    pub reconnect: bool,
    pub throttle: ThrottleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            reconnect: true,
            throttle: ThrottleConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup("TXPULSE_WS_URL")) {
            config.ws_url = url;
        }
        if let Some(url) = non_empty(lookup("TXPULSE_API_URL")) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = non_empty(lookup("TXPULSE_POLL_SECS")) {
            let secs: u64 = raw
                .parse()
                .map_err(|_| Error::Config(format!("TXPULSE_POLL_SECS: not a number: {raw}")))?;
            if secs == 0 {
                return Err(Error::Config("TXPULSE_POLL_SECS must be at least 1".into()));
            }
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(raw) = non_empty(lookup("TXPULSE_RECONNECT")) {
            config.reconnect = parse_bool(&raw)
                .ok_or_else(|| Error::Config(format!("TXPULSE_RECONNECT: not a boolean: {raw}")))?;
        }

        Ok(config)
    }

    /// REST endpoint for the stats snapshot.
    pub fn stats_url(&self) -> String {
        format!("{}/analytics/stats", self.api_url)
    }

    pub fn validate(self) -> Result<Self> {
        self.throttle.validate()?;
        Ok(self)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stats_url(), "http://localhost:8080/api/v1/analytics/stats");
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TXPULSE_WS_URL", "wss://example.org/ws"),
            ("TXPULSE_API_URL", "https://example.org/api/"),
            ("TXPULSE_POLL_SECS", "5"),
            ("TXPULSE_RECONNECT", "off"),
        ]))
        .unwrap();
        assert_eq!(config.ws_url, "wss://example.org/ws");
        assert_eq!(config.stats_url(), "https://example.org/api/analytics/stats");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert!(!config.reconnect);
    }

    #[test]
    fn blank_values_fall_back() {
        let config = Config::from_lookup(lookup(&[("TXPULSE_WS_URL", "  ")])).unwrap();
        assert_eq!(config.ws_url, DEFAULT_WS_URL);
    }

    #[test]
    fn bad_values_are_rejected() {
        for pairs in [
            [("TXPULSE_POLL_SECS", "soon")],
            [("TXPULSE_POLL_SECS", "0")],
            [("TXPULSE_RECONNECT", "maybe")],
        ] {
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{err}");
        }
    }

    #[test]
    fn validate_checks_throttle() {
        let mut config = Config::default();
        config.throttle.min_delay = Duration::from_millis(50);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidThrottle { .. })
        ));
    }
}
