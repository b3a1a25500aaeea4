use super::{NetworkHandle, Pending, ProvisionContext, SubnetHandle};
use crate::descriptor::SubnetDescriptor;
use crate::error::Result;
use crate::ledger::ResourceKind;
use tracing::info;

/// Creates the regional subnetwork inside the network
pub struct SubnetProvisioner<'a> {
    ctx: &'a ProvisionContext<'a>,
}

impl<'a> SubnetProvisioner<'a> {
    pub fn new(ctx: &'a ProvisionContext<'a>) -> Self {
        Self { ctx }
    }

    /// `network` must already be ready; the orchestrator guarantees it by
    /// only handing out settled network handles.
    pub async fn create_subnet(&self, network: &NetworkHandle) -> Result<SubnetHandle> {
        let pending = self.submit(network).await?;
        self.settle(pending).await
    }

    pub async fn submit(&self, network: &NetworkHandle) -> Result<Pending<SubnetHandle>> {
        let config = self.ctx.config;
        let body = SubnetDescriptor::new(config, &network.path);
        info!(
            subnet = %body.name,
            region = %body.region,
            cidr = %body.ip_cidr_range,
            "Creating subnetwork"
        );

        let result = self.ctx.api.insert_subnetwork(&config.region, &body).await;
        let operation = self
            .ctx
            .accept(ResourceKind::Subnetwork, &body.name, result)?;

        let path = ProvisionContext::canonical_path(
            operation.as_ref(),
            self.ctx.paths.subnetwork(&config.region, &body.name),
        );

        Ok(Pending {
            handle: SubnetHandle {
                name: body.name,
                region: body.region,
                path,
                operation: operation.as_ref().map(|op| op.name.clone()),
            },
            operation,
        })
    }

    /// Wait for the subnetwork when `readiness.wait_for_subnet` is set
    pub async fn settle(&self, pending: Pending<SubnetHandle>) -> Result<SubnetHandle> {
        if !self.ctx.config.readiness.wait_for_subnet {
            return Ok(pending.handle);
        }
        if let Some(operation) = pending.operation {
            self.ctx
                .waiter
                .wait(self.ctx.api, &pending.handle.name, operation)
                .await?;
        }
        Ok(pending.handle)
    }
}
