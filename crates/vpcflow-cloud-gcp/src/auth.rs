//! Access token acquisition

use crate::error::{GcpError, Result};
use crate::gcloud::Gcloud;
use tracing::{debug, info};

/// Environment variable holding a ready-made OAuth access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Obtain a bearer token for the Compute API
///
/// Tried in order: `GOOGLE_OAUTH_ACCESS_TOKEN`, the application default
/// credentials, then the active gcloud account.
pub async fn acquire_access_token() -> Result<String> {
    acquire_with(&Gcloud::new()).await
}

pub async fn acquire_with(gcloud: &Gcloud) -> Result<String> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        let token = token.trim();
        if !token.is_empty() {
            info!("Using access token from {}", ACCESS_TOKEN_ENV);
            return Ok(token.to_string());
        }
    }

    match gcloud.application_default_token().await {
        Ok(token) if !token.is_empty() => {
            info!("Using application default credentials");
            return Ok(token);
        }
        Ok(_) => debug!("Application default credentials returned an empty token"),
        Err(e) => debug!("Application default credentials unavailable: {}", e),
    }

    match gcloud.user_token().await {
        Ok(token) if !token.is_empty() => {
            info!("Using active gcloud account");
            Ok(token)
        }
        Ok(_) => Err(GcpError::NoCredentials(
            "gcloud returned an empty token".to_string(),
        )),
        Err(e) => Err(GcpError::NoCredentials(format!(
            "set {} or run `gcloud auth login` ({})",
            ACCESS_TOKEN_ENV, e
        ))),
    }
}
