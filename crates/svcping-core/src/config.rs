//! Config document parser.

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::spec::ServiceCheckSpec;

/// The full check configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Heartbeat monitor for checks that do not name their own.
    #[serde(default)]
    pub heartbeat_base_url: Option<String>,
    #[serde(default)]
    pub checks: Vec<ServiceCheckSpec>,
}

impl Config {
    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    fn resolve_heartbeat_bases(mut self) -> ConfigResult<Self> {
        if let Some(base) = &self.heartbeat_base_url {
            validate_heartbeat_base(base)?;
        }
        for check in &mut self.checks {
            match &check.heartbeat_base_url {
                Some(base) => validate_heartbeat_base(base)?,
                None => check.heartbeat_base_url = self.heartbeat_base_url.clone(),
            }
        }
        Ok(self)
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(s)?;
        config.resolve_heartbeat_bases()
    }
}

fn validate_heartbeat_base(base: &str) -> ConfigResult<()> {
    let invalid = || ConfigError::InvalidHeartbeatBase(base.to_string());
    let url = Url::parse(base).map_err(|_| invalid())?;

    let http = matches!(url.scheme(), "http" | "https");
    if !http || !url.has_host() || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(())
}
