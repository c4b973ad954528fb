//! hw-tools: local network scanners
//!
//! Each tool is an external binary (or, for OpenVAS, an HTTP API) run from
//! the scanning machine against hosts, URLs or a subnet derived from the
//! job's targets. Every runner probes for its binary first and reports `n/a`
//! when it is missing; spawn failures and timeouts become result entries,
//! never errors.

pub mod nikto;
pub mod nmap;
pub mod nuclei;
pub mod openvas;
pub mod process;
pub mod runner;
pub mod vuls;
pub mod zmap;

pub use process::{probe, run_command, CommandOutput, ToolError};
pub use runner::LocalToolRunner;
