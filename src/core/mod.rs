//! Platform-agnostic core - shared between the desktop dashboard and the CLI

pub mod adapter;
pub mod counter;
pub mod event;
pub mod format;
pub mod log;
pub mod observer;
pub mod particles;
pub mod session;
pub mod stats;
pub mod throttle;

pub use adapter::{parse_message, subscribe_message, EventSource, Inbound};
pub use event::{TransactionEvent, TxKind};
pub use log::TransactionLog;
pub use observer::{Observers, Subscription};
pub use particles::{Bounds, Particle, ParticleStore, PARTICLE_LIFETIME_MS};
pub use session::{Session, SessionConfig};
pub use stats::{ApiStats, RollingStats, StatsAggregator, StatsUpdate};
pub use throttle::{ThrottleConfig, Throttler};
