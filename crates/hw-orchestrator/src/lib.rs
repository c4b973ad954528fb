//! hw-orchestrator: the scan server
//!
//! Accepts scan submissions over HTTP, runs each as a background job that
//! fans out over SSH sessions to the targets and local network tools, tracks
//! progress in a shared job table, and renders finished jobs into HTML
//! reports.

pub mod api;
pub mod jobs;
pub mod orchestrator;
pub mod plan;
pub mod progress;
pub mod report;
pub mod server;
pub mod state;

pub use jobs::{InMemoryJobStore, JobManager, JobStore};
pub use orchestrator::{Orchestrator, SharedReport};
pub use plan::ScanPlan;
pub use report::{ReportError, ReportService};
pub use state::ServerState;
