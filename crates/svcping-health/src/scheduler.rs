//! Per-service check loop.
//!
//! One [`Scheduler`] owns one spec for the life of the process:
//!
//! ```text
//! Idle ──arm──▶ Waiting ──timer──▶ Checking ──log──▶ Waiting
//!                  │                                    │
//!                  └──────────── shutdown ──▶ Stopped ◀─┘
//! ```
//!
//! The timer is re-armed only after a check has finished and been logged,
//! so a slow check pushes the next one back instead of overlapping it.

use std::time::Duration;

use svcping_core::ServiceCheckSpec;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::checker::{CheckFailure, run_check};
use crate::client::ProbeClient;
use crate::shutdown::Shutdown;

/// Loop-local timer holding only its own next fire time.
#[derive(Debug)]
struct CheckTimer {
    period: Duration,
    next_fire: Instant,
}

impl CheckTimer {
    fn armed(period: Duration) -> Self {
        Self {
            period,
            next_fire: Instant::now() + period,
        }
    }

    fn rearm(&mut self) {
        self.next_fire = Instant::now() + self.period;
    }

    async fn wait(&self) {
        tokio::time::sleep_until(self.next_fire).await;
    }
}

/// Repeating checker for a single service.
#[derive(Debug)]
pub struct Scheduler {
    spec: ServiceCheckSpec,
    client: ProbeClient,
}

impl Scheduler {
    pub fn new(spec: ServiceCheckSpec, client: ProbeClient) -> Self {
        Self { spec, client }
    }

    /// Run checks until `shutdown` fires, returning how many completed.
    ///
    /// Nothing is logged and no request is started once shutdown has been
    /// observed. A check cancelled mid-flight is not counted.
    pub async fn run(self, shutdown: Shutdown) -> u64 {
        let mut completed = 0;
        if shutdown.is_triggered() {
            return completed;
        }

        let mut timer = CheckTimer::armed(self.spec.check_frequency);
        info!(check = %self.spec, interval = ?self.spec.check_frequency, "starting checker");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                _ = timer.wait() => {}
            }

            match run_check(&self.spec, &self.client, &shutdown).await {
                Ok(()) => info!(check = %self.spec, "health check ok"),
                Err(CheckFailure::Cancelled) => break,
                Err(failure) => warn!(
                    check = %self.spec,
                    cause = failure.cause(),
                    error = %failure,
                    "failed health check"
                ),
            }
            completed += 1;

            if shutdown.is_triggered() {
                break;
            }
            timer.rearm();
        }

        completed
    }
}
