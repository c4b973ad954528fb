//! hw-ssh: SSH execution sessions
//!
//! Implements the [`hw_core::traits::ExecutionSession`] contract on top of
//! russh: decode the target's key, connect with bounded retries, run
//! commands on fresh exec channels with per-command timeouts, disconnect.

pub mod credentials;
pub mod retry;
pub mod session;

pub use credentials::{decode_credential, encode_credential};
pub use session::{SshSession, SshSessionProvider};
