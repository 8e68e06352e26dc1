//! Error types for config loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading the check configuration.
///
/// All of these are fatal at startup: no checker runs on a bad config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid heartbeat base url {0:?}: expected an absolute http or https url with a host")]
    InvalidHeartbeatBase(String),
}

/// Errors from parsing a duration string such as `"1m30s"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("duration {0:?} overflows")]
    Overflow(String),

    #[error("negative duration {0:?}")]
    Negative(String),

    #[error("check frequency must be positive, got {0:?}")]
    NotPositive(String),
}
