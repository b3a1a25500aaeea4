use super::{NetworkHandle, Pending, ProvisionContext};
use crate::descriptor::NetworkDescriptor;
use crate::error::Result;
use crate::ledger::ResourceKind;
use tracing::info;

/// Creates the virtual network every other resource hangs off
pub struct NetworkProvisioner<'a> {
    ctx: &'a ProvisionContext<'a>,
}

impl<'a> NetworkProvisioner<'a> {
    pub fn new(ctx: &'a ProvisionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Create the network and wait until dependents may reference it
    pub async fn create_network(&self) -> Result<NetworkHandle> {
        let pending = self.submit().await?;
        self.settle(pending).await
    }

    /// Issue the insert without waiting for it
    pub async fn submit(&self) -> Result<Pending<NetworkHandle>> {
        let body = NetworkDescriptor::from_config(self.ctx.config);
        info!(network = %body.name, mtu = body.mtu, "Creating network");

        let result = self.ctx.api.insert_network(&body).await;
        let operation = self.ctx.accept(ResourceKind::Network, &body.name, result)?;

        let path = ProvisionContext::canonical_path(
            operation.as_ref(),
            self.ctx.paths.network(&body.name),
        );

        Ok(Pending {
            handle: NetworkHandle {
                name: body.name,
                path,
                operation: operation.as_ref().map(|op| op.name.clone()),
            },
            operation,
        })
    }

    /// Block until the network's creation operation is done
    ///
    /// Never skipped for a freshly created network, however quickly the
    /// insert itself returned.
    pub async fn settle(&self, pending: Pending<NetworkHandle>) -> Result<NetworkHandle> {
        if let Some(operation) = pending.operation {
            self.ctx
                .waiter
                .wait(self.ctx.api, &pending.handle.name, operation)
                .await?;
        }
        info!(network = %pending.handle.name, path = %pending.handle.path, "Network is ready");
        Ok(pending.handle)
    }
}
