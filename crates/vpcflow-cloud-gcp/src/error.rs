//! Compute Engine backend error types

use thiserror::Error;
use vpcflow_cloud::CloudError;

#[derive(Error, Debug)]
pub enum GcpError {
    #[error("gcloud not found. Please install the Google Cloud CLI")]
    GcloudNotFound,

    #[error("gcloud command failed: {0}")]
    CommandFailed(String),

    #[error("No access token available: {0}")]
    NoCredentials(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<GcpError> for CloudError {
    fn from(err: GcpError) -> Self {
        match err {
            GcpError::IoError(e) => CloudError::Io(e),
            other => CloudError::AuthenticationFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GcpError>;
