//! tx-pulse - real-time transaction visualization core
//!
//! Ingests a push stream of blockchain transactions and network stats,
//! paces bursty arrivals through an adaptive throttler, and exposes:
//! - a capped log of the most recent transactions
//! - short-lived particles for the live canvas
//! - rolling network statistics
//!
//! Transport, REST polling and the desktop dashboard live behind the `cli`
//! and `gui` features; everything else is plain synchronous state.

pub mod config;
pub mod core;
pub mod error;
pub mod render;
pub mod time;
pub mod ws_state;

#[cfg(feature = "cli")]
pub mod poll;
#[cfg(feature = "cli")]
pub mod runtime;
#[cfg(feature = "cli")]
pub mod simulator;
#[cfg(feature = "cli")]
pub mod stream;

#[cfg(feature = "gui")]
pub mod app;
#[cfg(feature = "gui")]
pub mod theme;

pub use error::{Error, Result};
