//! SSH-backed execution session

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Config, Handle};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::{KeyPair, PublicKey};

use hw_core::config::SshConfig;
use hw_core::traits::{ExecutionSession, SessionProvider};
use hw_core::{ConnectError, RawExecutionResult, Target};

use crate::credentials::decode_credential;
use crate::retry::ConnectRetries;

/// Stream id of stderr in SSH extended data
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

/// An execution session to one target over SSH
///
/// Each command runs on its own exec channel of a single authenticated
/// connection. The connection is released by [`ExecutionSession::close`], or
/// on drop if the caller never got that far.
pub struct SshSession {
    host: String,
    user: String,
    credential: String,
    config: SshConfig,
    handle: Option<Handle<ClientHandler>>,
}

impl SshSession {
    /// Create an unconnected session for `target`
    pub fn new(target: &Target, config: SshConfig) -> Self {
        Self {
            host: target.host.trim().to_string(),
            user: target.user.clone(),
            credential: target.credential.clone(),
            config,
            handle: None,
        }
    }

    /// Whether an authenticated connection is currently held
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// One connect + authenticate attempt, bounded by the connect timeout
    async fn try_connect(&self, key: Arc<KeyPair>) -> Result<Handle<ClientHandler>, ConnectError> {
        let ssh_config = Arc::new(Config::default());
        let handler = ClientHandler {
            host: self.host.clone(),
        };
        let address = (self.host.as_str(), self.config.port);
        let timeout = self.config.connect_timeout;

        let attempt = async {
            tracing::debug!("Connecting to {}:{}", self.host, self.config.port);
            let mut session = client::connect(ssh_config, address, handler)
                .await
                .map_err(|e| ConnectError::Transport(e.to_string()))?;

            tracing::debug!("Authenticating to {} as '{}'", self.host, self.user);
            let authenticated = session
                .authenticate_publickey(&self.user, key)
                .await
                .map_err(|e| ConnectError::Transport(format!("Authentication error: {}", e)))?;

            if !authenticated {
                return Err(ConnectError::AuthenticationFailed(self.user.clone()));
            }
            Ok(session)
        };

        tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| ConnectError::Timeout(timeout))?
    }
}

#[async_trait]
impl ExecutionSession for SshSession {
    async fn connect(&mut self) -> Result<(), ConnectError> {
        if self.handle.is_some() {
            return Ok(());
        }

        let key = Arc::new(decode_credential(&self.credential)?);
        let mut retries = ConnectRetries::new(&self.config.backoff, self.config.connect_attempts);
        let attempts = retries.attempts();
        let mut attempt = 1;

        loop {
            let error = match self.try_connect(Arc::clone(&key)).await {
                Ok(handle) => {
                    tracing::debug!("Connected to {} (attempt {})", self.host, attempt);
                    self.handle = Some(handle);
                    return Ok(());
                }
                // A rejected key will not start working on retry
                Err(e @ ConnectError::AuthenticationFailed(_)) => return Err(e),
                Err(e) => e,
            };

            let Some(delay) = retries.next() else {
                return Err(error);
            };
            tracing::warn!(
                "Connection to {} failed: {}. Retrying in {:?} ({}/{})",
                self.host,
                error,
                delay,
                attempt,
                attempts
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn run(&mut self, command: &str, timeout: Duration) -> RawExecutionResult {
        if self.handle.is_none() {
            if let Err(e) = self.connect().await {
                return RawExecutionResult::failed(e.to_string());
            }
        }
        let Some(handle) = self.handle.as_ref() else {
            return RawExecutionResult::failed("Not connected");
        };

        tracing::debug!("Running on {} (timeout {:?}): {}", self.host, timeout, command);
        match tokio::time::timeout(timeout, exec(handle, command)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => RawExecutionResult::failed(e.to_string()),
            Err(_) => RawExecutionResult::failed(format!("Command timed out after {:?}", timeout)),
        }
    }

    async fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle
                .disconnect(Disconnect::ByApplication, "scan complete", "en")
                .await
            {
                tracing::debug!("Error disconnecting from {}: {}", self.host, e);
            }
        }
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!("Session to {} dropped without close", self.host);
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(async move {
                    let _ = handle
                        .disconnect(Disconnect::ByApplication, "session dropped", "en")
                        .await;
                });
            }
        }
    }
}

/// Run `command` on a fresh exec channel and collect its output
async fn exec(
    handle: &Handle<ClientHandler>,
    command: &str,
) -> Result<RawExecutionResult, russh::Error> {
    let mut channel = handle.channel_open_session().await?;
    channel.exec(true, command).await?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_code = None;

    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
            ChannelMsg::ExtendedData { ref data, ext } if ext == SSH_EXTENDED_DATA_STDERR => {
                stderr.extend_from_slice(data)
            }
            ChannelMsg::ExitStatus { exit_status } => exit_code = Some(exit_status as i32),
            _ => {}
        }
    }

    Ok(RawExecutionResult::completed(
        String::from_utf8_lossy(&stdout),
        String::from_utf8_lossy(&stderr),
        exit_code.unwrap_or(-1),
    ))
}

/// russh client handler for scan connections
struct ClientHandler {
    host: String,
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    /// Targets are addressed by operator-supplied hosts; any host key is
    /// accepted and its fingerprint logged.
    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        tracing::debug!(
            "Host key for {}: {}",
            self.host,
            server_public_key.fingerprint()
        );
        Ok(true)
    }
}

/// Builds [`SshSession`]s from a shared SSH configuration
#[derive(Debug, Clone, Default)]
pub struct SshSessionProvider {
    config: SshConfig,
}

impl SshSessionProvider {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }
}

impl SessionProvider for SshSessionProvider {
    fn open(&self, target: &Target) -> Box<dyn ExecutionSession> {
        Box::new(SshSession::new(target, self.config.clone()))
    }
}
