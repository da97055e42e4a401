//! Shared WebSocket connection state
//!
//! Each stream (transactions, network stats) owns one [`StreamStatus`]. The
//! stream task is the only writer; the status indicator and logs read it.

use std::sync::Arc;

use parking_lot::Mutex;

/// WebSocket connection state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum WsState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

impl WsState {
    pub fn is_connected(&self) -> bool {
        matches!(self, WsState::Connected)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WsState::Disconnected => "Disconnected",
            WsState::Connecting => "Connecting...",
            WsState::Connected => "Connected",
            WsState::Error(_) => "Error",
        }
    }
}

#[derive(Debug, Default)]
struct StatusInner {
    state: WsState,
    last_error: Option<String>,
}

/// Observable state of one stream: current [`WsState`] plus the last error
/// seen, which survives the transition back to `Disconnected`.
#[derive(Clone, Debug, Default)]
pub struct StreamStatus {
    inner: Arc<Mutex<StatusInner>>,
}

impl StreamStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WsState {
        self.inner.lock().state.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().state.is_connected()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    pub fn set_connecting(&self) {
        self.inner.lock().state = WsState::Connecting;
    }

    /// A successful connection clears the previous error.
    pub fn set_connected(&self) {
        let mut inner = self.inner.lock();
        inner.state = WsState::Connected;
        inner.last_error = None;
    }

    pub fn set_disconnected(&self) {
        self.inner.lock().state = WsState::Disconnected;
    }

    pub fn set_error(&self, error: impl Into<String>) {
        let error = error.into();
        let mut inner = self.inner.lock();
        inner.state = WsState::Error(error.clone());
        inner.last_error = Some(error);
    }
}
