//! Provisioning error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level errors of a provisioning run
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<vpcflow_config::ConfigError> for CloudError {
    fn from(err: vpcflow_config::ConfigError) -> Self {
        CloudError::InvalidConfig(err.to_string())
    }
}

/// A remote call was rejected, or a prerequisite of one was missing
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Operation {operation} failed: {message}")]
    OperationFailed { operation: String, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Could not resolve image family {project}/{family}: {message}")]
    ImageResolution {
        project: String,
        family: String,
        message: String,
    },

    #[error("SSH public key unavailable at {}: {reason}", .path.display())]
    KeySource { path: PathBuf, reason: String },

    #[error("Timed out after {timeout:?} waiting for {resource} to become ready")]
    ReadinessTimeout { resource: String, timeout: Duration },
}

impl ProvisionError {
    /// Whether the remote side refused because the name is taken
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ProvisionError::AlreadyExists(_) | ProvisionError::Api { status: 409, .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Result of a single remote call
pub type ApiResult<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_detection() {
        assert!(ProvisionError::AlreadyExists("test-vpc".to_string()).is_conflict());
        assert!(
            ProvisionError::Api {
                status: 409,
                message: "exists".to_string()
            }
            .is_conflict()
        );
        assert!(
            !ProvisionError::Api {
                status: 403,
                message: "quota".to_string()
            }
            .is_conflict()
        );
    }

    #[test]
    fn test_provision_error_is_transparent() {
        let err: CloudError = ProvisionError::AlreadyExists("allow-ssh".to_string()).into();
        assert_eq!(err.to_string(), "Resource already exists: allow-ssh");
    }
}
