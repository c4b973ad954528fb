//! hw-core: Core abstractions and configuration for hostwarden
//!
//! This crate provides the shared domain model (targets, check results,
//! network scan results, jobs and reports), the traits at the seams between
//! the orchestrator and its collaborators, the HTTP wire types, and the
//! configuration structures used by the server and CLI.

pub mod api;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{ConfigError, ConnectError, ValidationError};
pub use types::{
    CheckResult, CheckStatus, Job, JobId, JobState, NetworkScanResult, RawExecutionResult,
    ScanReport, ServerReport, Target, ToolKind, ToolStatus, ToolTargetResult,
};
