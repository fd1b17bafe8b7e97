//! Server services
//!
//! - [`Notifier`] - transactional email, best-effort
//! - [`StatsHub`] / [`StatsBroadcaster`] - live dashboard events

pub mod live;
pub mod notifier;

pub use live::{EventSink, LiveEvent, StatsBroadcaster, StatsHub, StatsSnapshot, compute_stats};
pub use notifier::{LogNotifier, Notifier, NotifyResult, SesNotifier, notifier_from_env};
