//! Shared fixtures for checker integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::time::Duration;

use svcping_core::ServiceCheckSpec;
use svcping_health::{ProbeClient, RetryPolicy};
use wiremock::MockServer;

pub const NAMESPACE: &str = "default";

/// In-cluster host name for a test service.
pub fn cluster_host(service: &str) -> String {
    format!("{service}.{NAMESPACE}.svc.cluster.local")
}

/// Retries with waits short enough for tests.
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        min_wait: Duration::from_millis(5),
        max_wait: Duration::from_millis(20),
    }
}

/// A spec whose probe lands on `port` and whose heartbeat goes to `heartbeat`.
pub fn spec(service: &str, port: u16, path: &str, heartbeat: &MockServer) -> ServiceCheckSpec {
    ServiceCheckSpec {
        namespace: NAMESPACE.to_string(),
        service: service.to_string(),
        port,
        path: path.to_string(),
        extra_headers: HashMap::new(),
        health_check_uuid: format!("{service}-uuid"),
        heartbeat_base_url: Some(heartbeat.uri()),
        check_frequency: Duration::from_millis(50),
    }
}

/// Client that resolves each named service to localhost.
pub fn client(services: &[&str], timeout: Duration, retry: RetryPolicy) -> ProbeClient {
    let localhost = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
    services
        .iter()
        .fold(ProbeClient::builder(), |builder, service| {
            builder.resolve(cluster_host(service), localhost)
        })
        .timeout(timeout)
        .retry_policy(retry)
        .no_proxy()
        .build()
        .unwrap()
}

/// A localhost port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}
