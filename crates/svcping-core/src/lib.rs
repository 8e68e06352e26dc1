//! svcping-core — the data model shared by the checker and the daemon.
//!
//! A [`Config`] is a list of [`ServiceCheckSpec`]s read once at startup
//! from a JSON document. Specs are immutable values; the probe and
//! heartbeat URLs are derived from them on demand.

pub mod config;
pub mod duration;
pub mod error;
pub mod spec;

pub use config::Config;
pub use duration::parse_duration;
pub use error::{ConfigError, ConfigResult, DurationError};
pub use spec::{DEFAULT_HEARTBEAT_BASE, ServiceCheckSpec};
