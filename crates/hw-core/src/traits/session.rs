//! Execution session traits

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ConnectError;
use crate::types::{RawExecutionResult, Target};

/// A stateful command channel to one remote target
///
/// Connect once, run any number of commands with individual timeouts, then
/// close. Implementations hold transport resources until `close`.
#[async_trait]
pub trait ExecutionSession: Send {
    /// Establish the connection
    async fn connect(&mut self) -> Result<(), ConnectError>;

    /// Run a command, bounded by `timeout`
    ///
    /// Connects implicitly if `connect` has not succeeded yet. Never fails:
    /// transport and timeout problems are reported in
    /// [`RawExecutionResult::error`].
    async fn run(&mut self, command: &str, timeout: Duration) -> RawExecutionResult;

    /// Release the connection. Idempotent; safe without a prior connect.
    async fn close(&mut self);
}

/// Creates unconnected execution sessions for targets
pub trait SessionProvider: Send + Sync {
    /// Build a session for `target` without connecting it
    fn open(&self, target: &Target) -> Box<dyn ExecutionSession>;
}
