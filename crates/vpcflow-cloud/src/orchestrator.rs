//! Dependency-ordered provisioning run
//!
//! Network, subnetwork, firewall rules, instance. A step is issued only once
//! the resources it references are ready, and every reference is taken from
//! the handle the dependency's step returned.

use crate::error::{CloudError, Result};
use crate::ledger::{RunLedger, RunPhase};
use crate::provider::ComputeApi;
use crate::provisioner::{
    FirewallHandle, FirewallProvisioner, InstanceHandle, InstanceProvisioner, NetworkHandle,
    NetworkProvisioner, ProvisionContext, SubnetHandle, SubnetProvisioner,
};
use crate::readiness::ReadinessWaiter;
use tracing::{error, info};
use vpcflow_config::ProvisionConfig;

/// Handles of everything a successful run created or adopted
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub network: NetworkHandle,
    pub subnet: SubnetHandle,
    pub ssh_rule: FirewallHandle,
    pub web_rule: FirewallHandle,
    pub instance: InstanceHandle,
}

pub struct Orchestrator<'a> {
    ctx: ProvisionContext<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(api: &'a dyn ComputeApi, config: &'a ProvisionConfig) -> Self {
        Self {
            ctx: ProvisionContext::new(api, config),
        }
    }

    pub fn with_waiter(mut self, waiter: ReadinessWaiter) -> Self {
        self.ctx = self.ctx.with_waiter(waiter);
        self
    }

    /// Run the whole sequence, recording progress in `ledger`
    ///
    /// The first failure stops the run. Resources created before it stay in
    /// place and stay recorded.
    pub async fn run(&self, ledger: &mut RunLedger) -> Result<ProvisionReport> {
        match self.execute(ledger).await {
            Ok(report) => {
                ledger.finish();
                info!("Provisioning finished: {}", ledger.summary());
                Ok(report)
            }
            Err(e) => {
                error!(phase = %ledger.phase, "Provisioning failed: {}", e);
                ledger.fail(&e);
                Err(e)
            }
        }
    }

    fn preflight(&self) -> Result<()> {
        let config = self.ctx.config;
        config.validate()?;

        if self.ctx.api.project() != config.project_id {
            return Err(CloudError::InvalidConfig(format!(
                "client is bound to project '{}' but the configuration targets '{}'",
                self.ctx.api.project(),
                config.project_id
            )));
        }
        Ok(())
    }

    async fn execute(&self, ledger: &mut RunLedger) -> Result<ProvisionReport> {
        self.preflight()?;
        let ctx = &self.ctx;

        let networks = NetworkProvisioner::new(ctx);
        let pending = networks.submit().await?;
        ledger.record(pending.handle.step());
        ledger.advance(RunPhase::NetworkCreated);
        let network = networks.settle(pending).await?;
        ledger.advance(RunPhase::NetworkSettled);

        let subnets = SubnetProvisioner::new(ctx);
        let pending = subnets.submit(&network).await?;
        ledger.record(pending.handle.step());
        let subnet = subnets.settle(pending).await?;
        ledger.advance(RunPhase::SubnetCreated);

        // The two rules only reference the network.
        let firewalls = FirewallProvisioner::new(ctx);
        let (ssh_rule, web_rule) = tokio::join!(
            firewalls.create_ssh_ingress_rule(&network),
            firewalls.create_web_ingress_rule(&network),
        );
        for rule in [&ssh_rule, &web_rule].into_iter().flatten() {
            ledger.record(rule.step());
        }
        let (ssh_rule, web_rule) = (ssh_rule?, web_rule?);
        ledger.advance(RunPhase::FirewallRulesCreated);

        let instances = InstanceProvisioner::new(ctx);
        let image = instances.resolve_image().await?;
        ledger.advance(RunPhase::ImageResolved);
        let ssh_key = instances.load_key().await?;
        ledger.advance(RunPhase::KeyLoaded);

        let pending = instances.request(&subnet, &image, &ssh_key).await?;
        ledger.record(pending.handle.step());
        ledger.advance(RunPhase::InstanceRequested);
        let instance = instances.settle(pending).await?;

        Ok(ProvisionReport {
            network,
            subnet,
            ssh_rule,
            web_rule,
            instance,
        })
    }
}
