//! Compute API trait definition

use crate::descriptor::{
    FirewallRuleDescriptor, InstanceDescriptor, NetworkDescriptor, SubnetDescriptor,
};
use crate::error::ApiResult;
use crate::operation::{Image, Operation};
use async_trait::async_trait;

/// The remote resource collections the orchestrator drives
///
/// Every insert returns as soon as the provider has accepted the request.
/// The returned operation has to be polled before dependents may reference
/// the resource. Implementations are stateless from the caller's side and are
/// shared by reference across all steps of a run.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Project every call is scoped to
    fn project(&self) -> &str;

    async fn insert_network(&self, body: &NetworkDescriptor) -> ApiResult<Operation>;

    async fn insert_subnetwork(&self, region: &str, body: &SubnetDescriptor)
    -> ApiResult<Operation>;

    async fn insert_firewall(&self, body: &FirewallRuleDescriptor) -> ApiResult<Operation>;

    async fn insert_instance(&self, zone: &str, body: &InstanceDescriptor)
    -> ApiResult<Operation>;

    /// Latest non-deprecated image of `family` in `project`
    async fn get_image_from_family(&self, project: &str, family: &str) -> ApiResult<Image>;

    /// Fresh view of a previously returned operation
    async fn get_operation(&self, operation: &Operation) -> ApiResult<Operation>;
}
