//! SSH public key loading

use crate::error::{ApiResult, ProvisionError};
use std::path::Path;

/// A login entry for the `ssh-keys` metadata item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshKeyEntry {
    pub username: String,
    pub public_key: String,
}

impl SshKeyEntry {
    pub fn new(username: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            public_key: public_key.into(),
        }
    }

    /// `username:key`
    pub fn metadata_value(&self) -> String {
        format!("{}:{}", self.username, self.public_key)
    }

    /// Read the key file and pair it with `username`
    pub async fn load(username: &str, path: &Path) -> ApiResult<Self> {
        let public_key = read_public_key(path).await?;
        Ok(Self::new(username, public_key))
    }
}

/// First line of a public key file; `~/` is expanded
///
/// A missing, unreadable or empty file is a `KeySource` error.
pub async fn read_public_key(path: &Path) -> ApiResult<String> {
    let path = vpcflow_config::expand_home(path);

    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ProvisionError::KeySource {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    let key = content.lines().next().map(str::trim).unwrap_or_default();
    if key.is_empty() {
        return Err(ProvisionError::KeySource {
            path,
            reason: "file is empty".to_string(),
        });
    }

    tracing::debug!("Read public key from {}", path.display());
    Ok(key.to_string())
}
