//! Scripted execution session for unit tests

use std::time::Duration;

use async_trait::async_trait;
use hw_core::traits::ExecutionSession;
use hw_core::{ConnectError, RawExecutionResult};

/// Answers commands by prefix match and records what was run
#[derive(Default)]
pub struct FakeSession {
    responses: Vec<(String, RawExecutionResult)>,
    pub commands: Vec<String>,
    pub closed: bool,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to commands starting with `prefix` with `stdout` and exit 0
    pub fn respond(mut self, prefix: &str, stdout: &str) -> Self {
        self.responses
            .push((prefix.to_string(), RawExecutionResult::completed(stdout, "", 0)));
        self
    }

    /// Reply to commands starting with `prefix` with a transport failure
    pub fn fail(mut self, prefix: &str, error: &str) -> Self {
        self.responses
            .push((prefix.to_string(), RawExecutionResult::failed(error)));
        self
    }
}

#[async_trait]
impl ExecutionSession for FakeSession {
    async fn connect(&mut self) -> Result<(), ConnectError> {
        Ok(())
    }

    async fn run(&mut self, command: &str, _timeout: Duration) -> RawExecutionResult {
        self.commands.push(command.to_string());
        self.responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, raw)| raw.clone())
            .unwrap_or_else(|| RawExecutionResult::completed("", "", 0))
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}
