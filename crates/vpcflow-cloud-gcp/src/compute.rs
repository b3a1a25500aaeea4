//! Compute Engine v1 REST client
//!
//! Bearer-authenticated JSON calls against the collections the orchestrator
//! needs.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use vpcflow_cloud::descriptor::{
    FirewallRuleDescriptor, InstanceDescriptor, NetworkDescriptor, SubnetDescriptor,
};
use vpcflow_cloud::{
    ApiResult, COMPUTE_API_BASE, ComputeApi, Image, Operation, ProvisionError, ResourcePaths,
};

/// Default timeout for API requests
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Compute Engine client bound to one project
pub struct GcpCompute {
    client: Client,
    token: String,
    paths: ResourcePaths,
    base_url: String,
}

impl GcpCompute {
    pub fn new(project: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            paths: ResourcePaths::new(project),
            base_url: COMPUTE_API_BASE.to_string(),
        })
    }

    /// Send requests to another endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = ResourcePaths::url(&self.base_url, path);
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport)?;

        handle_response(response).await
    }

    async fn post<B: serde::Serialize>(&self, path: &str, body: &B) -> ApiResult<Operation> {
        let url = ResourcePaths::url(&self.base_url, path);
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        handle_response(response).await
    }
}

fn transport(err: reqwest::Error) -> ProvisionError {
    ProvisionError::Transport(err.to_string())
}

/// `{"error": {"code": 409, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();
    let text = response.text().await.map_err(transport)?;

    if status.is_success() {
        return serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse response");
            ProvisionError::Transport(format!("invalid response body: {}", e))
        });
    }

    let message = serde_json::from_str::<ErrorEnvelope>(&text)
        .map(|envelope| envelope.error.message)
        .unwrap_or(text);

    if status == StatusCode::CONFLICT {
        Err(ProvisionError::AlreadyExists(message))
    } else {
        Err(ProvisionError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ComputeApi for GcpCompute {
    fn project(&self) -> &str {
        self.paths.project()
    }

    async fn insert_network(&self, body: &NetworkDescriptor) -> ApiResult<Operation> {
        self.post(&self.paths.networks(), body).await
    }

    async fn insert_subnetwork(
        &self,
        region: &str,
        body: &SubnetDescriptor,
    ) -> ApiResult<Operation> {
        self.post(&self.paths.subnetworks(region), body).await
    }

    async fn insert_firewall(&self, body: &FirewallRuleDescriptor) -> ApiResult<Operation> {
        self.post(&self.paths.firewalls(), body).await
    }

    async fn insert_instance(
        &self,
        zone: &str,
        body: &InstanceDescriptor,
    ) -> ApiResult<Operation> {
        self.post(&self.paths.instances(zone), body).await
    }

    async fn get_image_from_family(&self, project: &str, family: &str) -> ApiResult<Image> {
        self.get(&ResourcePaths::image_family(project, family)).await
    }

    async fn get_operation(&self, operation: &Operation) -> ApiResult<Operation> {
        self.get(&self.paths.operation(&operation.scope(), &operation.name))
            .await
    }
}
