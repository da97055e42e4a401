//! Crate error type

use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(
        "invalid throttle constants: need min ({min:?}) <= base ({base:?}) <= max ({max:?}) <= 60s and threshold >= 1 (got {threshold})"
    )]
    InvalidThrottle {
        base: Duration,
        min: Duration,
        max: Duration,
        threshold: u32,
    },

    #[error("stats endpoint reported failure")]
    ApiFailure,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "cli")]
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[cfg(feature = "cli")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
