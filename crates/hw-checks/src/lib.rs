//! hw-checks: host-local security checks
//!
//! This crate provides:
//! - The registry of built-in checks ([`CheckKind`]), each a shell command,
//!   a timeout and a pure parser over the command's output
//! - Batch dispatch of checks over one live execution session
//! - The extended host audit (Lynis)

pub mod audit;
pub mod dispatch;
pub mod parsers;
pub mod registry;

pub use audit::{run_extended_audit, EXTENDED_AUDIT_NAME};
pub use dispatch::{guard_parse, panic_message, run_checks};
pub use registry::CheckKind;

#[cfg(test)]
pub(crate) mod testing;
