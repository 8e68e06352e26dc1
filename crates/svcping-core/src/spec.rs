//! A single service to probe and the heartbeat it reports to.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::duration::deserialize_check_frequency;

/// Heartbeat monitor used when neither the check nor the config names one.
pub const DEFAULT_HEARTBEAT_BASE: &str = "https://hc-ping.com";

/// One service check, as read from the config document.
///
/// Fields other than `checkFrequency` default to empty values when absent.
/// An incomplete spec still loads; its probe URL is simply malformed and
/// every cycle fails with a request-build error.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheckSpec {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub path: String,
    /// Extra request headers for the probe. A `Host` entry (any case)
    /// overrides the request authority instead of being sent as a header.
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,

    /// Identifier appended to the heartbeat base URL.
    #[serde(default, rename = "healthCheckUUID")]
    pub health_check_uuid: String,
    /// Per-check heartbeat monitor; filled from the config-level value
    /// at load time when unset.
    #[serde(default)]
    pub heartbeat_base_url: Option<String>,

    #[serde(deserialize_with = "deserialize_check_frequency")]
    pub check_frequency: Duration,
}

impl ServiceCheckSpec {
    /// The in-cluster URL probed with `GET`.
    pub fn http_endpoint(&self) -> String {
        format!(
            "http://{}.{}.svc.cluster.local:{}{}",
            self.service, self.namespace, self.port, self.path
        )
    }

    /// The monitor URL pinged with `HEAD` after a successful probe.
    pub fn health_check_endpoint(&self) -> String {
        let base = self
            .heartbeat_base_url
            .as_deref()
            .unwrap_or(DEFAULT_HEARTBEAT_BASE)
            .trim_end_matches('/');
        format!("{base}/{}", self.health_check_uuid)
    }
}

impl fmt::Display for ServiceCheckSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.http_endpoint())
    }
}
