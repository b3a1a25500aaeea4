//! Leaf provisioning steps
//!
//! Each provisioner issues one kind of creation call and hands back a handle
//! carrying the canonical path of the resource. Handles are the only way a
//! dependent step learns the path of its dependency.

mod firewall;
mod instance;
mod network;
mod subnet;

pub use firewall::FirewallProvisioner;
pub use instance::InstanceProvisioner;
pub use network::NetworkProvisioner;
pub use subnet::SubnetProvisioner;

use crate::error::ApiResult;
use crate::ledger::{CompletedStep, ResourceKind};
use crate::operation::Operation;
use crate::paths::ResourcePaths;
use crate::provider::ComputeApi;
use crate::readiness::ReadinessWaiter;
use tracing::warn;
use vpcflow_config::{ConflictPolicy, ProvisionConfig};

/// Shared inputs of every provisioner
pub struct ProvisionContext<'a> {
    pub api: &'a dyn ComputeApi,
    pub config: &'a ProvisionConfig,
    pub paths: ResourcePaths,
    pub waiter: ReadinessWaiter,
}

impl<'a> ProvisionContext<'a> {
    pub fn new(api: &'a dyn ComputeApi, config: &'a ProvisionConfig) -> Self {
        Self {
            api,
            config,
            paths: ResourcePaths::new(&config.project_id),
            waiter: ReadinessWaiter::from_config(&config.readiness),
        }
    }

    pub fn with_waiter(mut self, waiter: ReadinessWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Apply the conflict policy to the result of an insert
    fn accept(
        &self,
        kind: ResourceKind,
        name: &str,
        result: ApiResult<Operation>,
    ) -> ApiResult<Option<Operation>> {
        match result {
            Ok(operation) => Ok(Some(operation)),
            Err(e) if e.is_conflict() && self.config.on_conflict == ConflictPolicy::Adopt => {
                warn!(%kind, name, "Resource already exists, adopting it");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Canonical path: the operation's target link, or the constructed path
    /// for an adopted resource
    fn canonical_path(operation: Option<&Operation>, fallback: String) -> String {
        operation
            .and_then(|op| op.target_link.clone())
            .unwrap_or(fallback)
    }
}

/// A handle whose creation operation may still be running
#[derive(Debug, Clone)]
pub struct Pending<H> {
    pub handle: H,
    /// `None` when an existing resource was adopted
    pub operation: Option<Operation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHandle {
    pub name: String,
    pub path: String,
    pub operation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetHandle {
    pub name: String,
    pub region: String,
    pub path: String,
    pub operation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallHandle {
    pub name: String,
    pub path: String,
    pub operation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceHandle {
    pub name: String,
    pub zone: String,
    pub path: String,
    /// Creation operation to track; the instance may still be booting
    pub operation: Option<String>,
    pub target_id: Option<String>,
}

fn step(kind: ResourceKind, name: &str, path: &str, operation: &Option<String>) -> CompletedStep {
    match operation {
        Some(op) => CompletedStep::created(kind, name, path, op.as_str()),
        None => CompletedStep::adopted(kind, name, path),
    }
}

impl NetworkHandle {
    pub fn step(&self) -> CompletedStep {
        step(ResourceKind::Network, &self.name, &self.path, &self.operation)
    }
}

impl SubnetHandle {
    pub fn step(&self) -> CompletedStep {
        step(ResourceKind::Subnetwork, &self.name, &self.path, &self.operation)
    }
}

impl FirewallHandle {
    pub fn step(&self) -> CompletedStep {
        step(ResourceKind::Firewall, &self.name, &self.path, &self.operation)
    }
}

impl InstanceHandle {
    pub fn step(&self) -> CompletedStep {
        step(ResourceKind::Instance, &self.name, &self.path, &self.operation)
    }
}
