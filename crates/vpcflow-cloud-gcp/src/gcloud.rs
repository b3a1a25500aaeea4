//! gcloud CLI wrapper
//!
//! Only used to mint access tokens from the credentials the CLI manages.

use crate::error::{GcpError, Result};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;

/// gcloud CLI wrapper
pub struct Gcloud {
    program: String,
}

impl Gcloud {
    pub fn new() -> Self {
        Self::with_program("gcloud")
    }

    /// Use another executable in place of `gcloud`
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run a gcloud command and return trimmed stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {}", self.program, args.join(" "));

        let output = cmd.output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => GcpError::GcloudNotFound,
            _ => GcpError::IoError(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GcpError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Token for the application default credentials
    pub async fn application_default_token(&self) -> Result<String> {
        self.run_command(&["auth", "application-default", "print-access-token"])
            .await
    }

    /// Token for the active user account
    pub async fn user_token(&self) -> Result<String> {
        self.run_command(&["auth", "print-access-token"]).await
    }
}

impl Default for Gcloud {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program() {
        let gcloud = Gcloud::with_program("vpcflow-no-such-gcloud");
        let err = gcloud.user_token().await.unwrap_err();
        assert!(matches!(err, GcpError::GcloudNotFound));
    }

    #[tokio::test]
    async fn test_stdout_is_trimmed() {
        // `echo` prints its arguments back
        let gcloud = Gcloud::with_program("echo");
        let token = gcloud.user_token().await.unwrap();
        assert_eq!(token, "auth print-access-token");
    }

    #[tokio::test]
    async fn test_failed_command() {
        let gcloud = Gcloud::with_program("false");
        let err = gcloud.application_default_token().await.unwrap_err();
        assert!(matches!(err, GcpError::CommandFailed(_)));
    }
}
