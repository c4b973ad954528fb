//! Core error types for hostwarden

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors establishing an execution session with a target
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// Key material could not be decoded or parsed
    #[error("Invalid key format: {0}")]
    InvalidCredential(String),

    /// The connection attempt did not complete in time
    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    /// The target rejected the supplied credential
    #[error("Authentication failed for user '{0}'")]
    AuthenticationFailed(String),

    /// Network or protocol failure
    #[error("{0}")]
    Transport(String),
}

/// Malformed caller requests, surfaced synchronously
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A scan was submitted without any targets
    #[error("At least one server required")]
    NoTargets,

    /// A report filename contained path components
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_messages() {
        let err = ConnectError::AuthenticationFailed("ubuntu".to_string());
        assert_eq!(err.to_string(), "Authentication failed for user 'ubuntu'");

        let err = ConnectError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Connection timed out after 30s");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::NoTargets.to_string(), "At least one server required");
        let err = ValidationError::InvalidFilename("../x".to_string());
        assert_eq!(err.to_string(), "Invalid filename: ../x");
    }
}
