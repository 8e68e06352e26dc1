//! Fan-out/join over one scheduler task per service.

use svcping_core::ServiceCheckSpec;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::client::ProbeClient;
use crate::scheduler::Scheduler;
use crate::shutdown::Shutdown;

/// A spawned scheduler and the spec it runs, for log context.
struct SchedulerSlot {
    check: String,
    handle: JoinHandle<u64>,
}

/// Owns the handles of every running scheduler.
pub struct Supervisor {
    slots: Vec<SchedulerSlot>,
}

impl Supervisor {
    /// Spawn one scheduler task per spec.
    ///
    /// Each task gets its own clone of the client and shutdown signal;
    /// tasks never wait on one another.
    pub fn spawn(
        specs: impl IntoIterator<Item = ServiceCheckSpec>,
        client: &ProbeClient,
        shutdown: &Shutdown,
    ) -> Self {
        let slots: Vec<_> = specs
            .into_iter()
            .map(|spec| {
                let check = spec.to_string();
                let scheduler = Scheduler::new(spec, client.clone());
                let shutdown = shutdown.clone();
                let handle = tokio::spawn(scheduler.run(shutdown));
                SchedulerSlot { check, handle }
            })
            .collect();

        debug!(checkers = slots.len(), "checkers spawned");
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Wait for every scheduler to stop.
    ///
    /// A scheduler that panicked is logged and does not stop the others
    /// from being joined.
    pub async fn join(self) {
        for slot in self.slots {
            match slot.handle.await {
                Ok(completed) => debug!(check = %slot.check, completed, "checker stopped"),
                Err(e) => error!(check = %slot.check, error = %e, "checker task failed"),
            }
        }
        info!("all checkers stopped");
    }
}
