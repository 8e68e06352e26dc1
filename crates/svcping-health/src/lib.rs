//! svcping-health — periodic service probes with dead-man's-switch heartbeats.
//!
//! Each configured service gets its own scheduler task. On every tick the
//! task probes the service with `GET`; only when that returns 200 does it
//! ping the external heartbeat monitor with `HEAD`. The monitor alerts an
//! operator when pings stop arriving, so a failed heartbeat is reported as
//! a failed check even when the service itself is fine.
//!
//! # Architecture
//!
//! ```text
//! Supervisor
//!   ├── Scheduler (one task per ServiceCheckSpec)
//!   │   ├── CheckTimer (loop-local, re-armed after each cycle)
//!   │   └── run_check() → CheckOutcome
//!   │       ├── GET  http://{service}.{namespace}.svc.cluster.local:{port}{path}
//!   │       └── HEAD {heartbeat base}/{healthCheckUUID}
//!   ├── ProbeClient (shared, read-only; timeout + bounded retries)
//!   └── Shutdown (shared watch signal; ends every wait and request)
//! ```
//!
//! Cycle failures are logged at warn level and never stop a scheduler.

pub mod checker;
pub mod client;
pub mod scheduler;
pub mod shutdown;
pub mod supervisor;

pub use checker::{CheckFailure, CheckOutcome, heartbeat_request, probe_request, run_check};
pub use client::{
    ClientError, ProbeClient, ProbeClientBuilder, ProbeRequest, RequestBuildError, RetryPolicy,
};
pub use scheduler::Scheduler;
pub use shutdown::Shutdown;
pub use supervisor::Supervisor;
