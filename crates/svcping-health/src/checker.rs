//! A single check cycle: probe the service, then ping the heartbeat monitor.

use svcping_core::ServiceCheckSpec;
use thiserror::Error;

use crate::client::{ClientError, ProbeClient, ProbeRequest, RequestBuildError};
use crate::shutdown::Shutdown;

/// Result of one cycle.
pub type CheckOutcome = Result<(), CheckFailure>;

/// Why a cycle failed.
#[derive(Debug, Error)]
pub enum CheckFailure {
    #[error("failed to build probe request for {check}: {source}")]
    ProbeRequest {
        check: String,
        #[source]
        source: RequestBuildError,
    },

    #[error("{check} failed health check: {source}")]
    ProbeTransport {
        check: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("non-200 status code ({status}) from {check}")]
    ProbeStatus { check: String, status: u16 },

    #[error("failed to build heartbeat request: {0}")]
    HeartbeatRequest(#[source] RequestBuildError),

    #[error("failed to send heartbeat to {url}: {source}")]
    HeartbeatTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("non-200 status code ({status}) from heartbeat monitor {url}")]
    HeartbeatStatus { url: String, status: u16 },

    #[error("check cancelled by shutdown")]
    Cancelled,
}

impl CheckFailure {
    /// Stable label for the failure class, used as a log field.
    pub fn cause(&self) -> &'static str {
        match self {
            CheckFailure::ProbeRequest { .. } => "probe_request",
            CheckFailure::ProbeTransport { .. } => "probe_transport",
            CheckFailure::ProbeStatus { .. } => "probe_status",
            CheckFailure::HeartbeatRequest(_) => "heartbeat_request",
            CheckFailure::HeartbeatTransport { .. } => "heartbeat_transport",
            CheckFailure::HeartbeatStatus { .. } => "heartbeat_status",
            CheckFailure::Cancelled => "cancelled",
        }
    }

    /// Whether the heartbeat stage failed after a healthy probe.
    pub fn is_heartbeat(&self) -> bool {
        matches!(
            self,
            CheckFailure::HeartbeatRequest(_)
                | CheckFailure::HeartbeatTransport { .. }
                | CheckFailure::HeartbeatStatus { .. }
        )
    }
}

/// Build the `GET` probe for a spec, with its extra headers applied.
///
/// Headers are applied in name order so repeated builds are identical.
pub fn probe_request(spec: &ServiceCheckSpec) -> Result<ProbeRequest, RequestBuildError> {
    let mut request = ProbeRequest::get(&spec.http_endpoint())?;

    let mut headers: Vec<_> = spec.extra_headers.iter().collect();
    headers.sort();
    for (name, value) in headers {
        request.set_header(name, value)?;
    }
    Ok(request)
}

/// Build the `HEAD` heartbeat ping for a spec.
pub fn heartbeat_request(spec: &ServiceCheckSpec) -> Result<ProbeRequest, RequestBuildError> {
    ProbeRequest::head(&spec.health_check_endpoint())
}

/// Run one probe-then-heartbeat cycle.
///
/// The heartbeat is sent only when the probe returns exactly 200. Both
/// calls go through the shared client, so transient failures have already
/// been retried by the time they surface here.
pub async fn run_check(
    spec: &ServiceCheckSpec,
    client: &ProbeClient,
    shutdown: &Shutdown,
) -> CheckOutcome {
    let probe = probe_request(spec).map_err(|source| CheckFailure::ProbeRequest {
        check: spec.to_string(),
        source,
    })?;

    match client.send(&probe, shutdown).await {
        Ok(status) if status.as_u16() == 200 => {}
        Ok(status) => {
            return Err(CheckFailure::ProbeStatus {
                check: spec.to_string(),
                status: status.as_u16(),
            });
        }
        Err(ClientError::Cancelled) => return Err(CheckFailure::Cancelled),
        Err(ClientError::Transport(source)) => {
            return Err(CheckFailure::ProbeTransport {
                check: spec.to_string(),
                source,
            });
        }
    }

    let heartbeat = heartbeat_request(spec).map_err(CheckFailure::HeartbeatRequest)?;

    match client.send(&heartbeat, shutdown).await {
        Ok(status) if status.as_u16() == 200 => Ok(()),
        Ok(status) => Err(CheckFailure::HeartbeatStatus {
            url: heartbeat.url().to_string(),
            status: status.as_u16(),
        }),
        Err(ClientError::Cancelled) => Err(CheckFailure::Cancelled),
        Err(ClientError::Transport(source)) => Err(CheckFailure::HeartbeatTransport {
            url: heartbeat.url().to_string(),
            source,
        }),
    }
}
