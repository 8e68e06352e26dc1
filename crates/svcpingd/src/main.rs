//! svcpingd — the svcping daemon.
//!
//! Loads the check config, runs one checker per service until SIGINT or
//! SIGTERM, and answers liveness probes for itself on the side.
//!
//! # Usage
//!
//! ```text
//! svcpingd --config /etc/svcping/config.json --listen 0.0.0.0:80
//! ```

mod liveness;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use svcping_core::Config;
use svcping_health::{ProbeClient, RetryPolicy, Shutdown, Supervisor};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,svcpingd=debug,svcping_health=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Parser)]
#[command(
    name = "svcpingd",
    about = "Probe in-cluster services and report healthy ones to a heartbeat monitor",
    version
)]
struct Cli {
    /// Path to the JSON check config.
    #[arg(long, env = "SVCPING_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Address for the liveness endpoint.
    #[arg(long, default_value = "0.0.0.0:80")]
    listen: SocketAddr,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Per-request timeout in seconds.
    #[arg(long, default_value = "5")]
    probe_timeout: u64,

    /// Retries for transient request failures.
    #[arg(long, default_value = "2")]
    max_retries: u32,
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = Config::from_file(&cli.config)
        .inspect_err(|e| error!(error = %e, "failed to read config"))?;
    info!(path = ?cli.config, checks = config.checks.len(), "config loaded");

    let client = ProbeClient::builder()
        .timeout(Duration::from_secs(cli.probe_timeout))
        .retry_policy(RetryPolicy {
            max_retries: cli.max_retries,
            ..RetryPolicy::default()
        })
        .build()
        .context("failed to build http client")?;

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // ── Checkers and liveness endpoint ─────────────────────────

    let supervisor = Supervisor::spawn(config.checks, &client, &shutdown);
    let liveness = tokio::spawn(liveness::serve(cli.listen, shutdown.clone()));

    supervisor.join().await;
    // With no checks configured the supervisor returns at once; the
    // process exits rather than idling with nothing to do.
    liveness.abort();
    let _ = liveness.await;

    info!("exiting...");
    Ok(())
}

/// Resolve on SIGINT, or SIGTERM on unix.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["svcpingd"]).unwrap();
        assert_eq!(cli.listen, "0.0.0.0:80".parse::<SocketAddr>().unwrap());
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.probe_timeout, 5);
        assert_eq!(cli.max_retries, 2);
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "svcpingd",
            "--config",
            "/etc/svcping/checks.json",
            "--listen",
            "127.0.0.1:8080",
            "--log-format",
            "pretty",
            "--max-retries",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/svcping/checks.json"));
        assert_eq!(cli.listen.port(), 8080);
        assert_eq!(cli.log_format, LogFormat::Pretty);
        assert_eq!(cli.max_retries, 0);
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["svcpingd", "--log-format", "xml"]).is_err());
    }
}
