//! hostwarden: command-line interface
//!
//! Provides the `hostwarden` binary: runs the scan server, submits scans
//! from a targets file, polls job status and fetches reports.

pub mod client;
pub mod commands;
pub mod output;
pub mod targets;
