use super::{FirewallHandle, NetworkHandle, ProvisionContext};
use crate::descriptor::FirewallRuleDescriptor;
use crate::error::Result;
use crate::ledger::ResourceKind;
use tracing::info;

/// Creates the ingress rules of the network
///
/// The two rules only depend on the network, never on each other.
pub struct FirewallProvisioner<'a> {
    ctx: &'a ProvisionContext<'a>,
}

impl<'a> FirewallProvisioner<'a> {
    pub fn new(ctx: &'a ProvisionContext<'a>) -> Self {
        Self { ctx }
    }

    /// tcp/22
    pub async fn create_ssh_ingress_rule(&self, network: &NetworkHandle) -> Result<FirewallHandle> {
        self.create(FirewallRuleDescriptor::ssh(self.ctx.config, &network.path))
            .await
    }

    /// tcp/80 and tcp/443
    pub async fn create_web_ingress_rule(&self, network: &NetworkHandle) -> Result<FirewallHandle> {
        self.create(FirewallRuleDescriptor::web(self.ctx.config, &network.path))
            .await
    }

    async fn create(&self, body: FirewallRuleDescriptor) -> Result<FirewallHandle> {
        let ports: Vec<&str> = body
            .allowed
            .iter()
            .flat_map(|a| a.ports.iter().map(String::as_str))
            .collect();
        info!(rule = %body.name, ports = ?ports, "Creating firewall rule");

        let result = self.ctx.api.insert_firewall(&body).await;
        let operation = self.ctx.accept(ResourceKind::Firewall, &body.name, result)?;

        let path = ProvisionContext::canonical_path(
            operation.as_ref(),
            self.ctx.paths.firewall(&body.name),
        );

        Ok(FirewallHandle {
            name: body.name,
            path,
            operation: operation.map(|op| op.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeCompute};
    use vpcflow_config::ProvisionConfig;

    fn network() -> NetworkHandle {
        NetworkHandle {
            name: "test-vpc".to_string(),
            path: "projects/p/global/networks/test-vpc".to_string(),
            operation: None,
        }
    }

    fn inserted_rules(api: &FakeCompute) -> Vec<FirewallRuleDescriptor> {
        let mut rules: Vec<_> = api
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::InsertFirewall(body) => Some(body),
                _ => None,
            })
            .collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));
        rules
    }

    #[tokio::test]
    async fn test_rule_order_does_not_matter() {
        let config = ProvisionConfig::default();

        let forward = FakeCompute::new("p");
        let ctx = ProvisionContext::new(&forward, &config);
        let firewalls = FirewallProvisioner::new(&ctx);
        firewalls.create_ssh_ingress_rule(&network()).await.unwrap();
        firewalls.create_web_ingress_rule(&network()).await.unwrap();

        let backward = FakeCompute::new("p");
        let ctx = ProvisionContext::new(&backward, &config);
        let firewalls = FirewallProvisioner::new(&ctx);
        firewalls.create_web_ingress_rule(&network()).await.unwrap();
        firewalls.create_ssh_ingress_rule(&network()).await.unwrap();

        let rules = inserted_rules(&forward);
        assert_eq!(rules, inserted_rules(&backward));
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "allow-custom");
        assert_eq!(rules[0].allowed[0].ports, vec!["80", "443"]);
        assert_eq!(rules[1].name, "allow-ssh");
        assert_eq!(rules[1].allowed[0].ports, vec!["22"]);
        assert!(rules.iter().all(|r| r.network == network().path));
    }

    #[tokio::test]
    async fn test_duplicate_rule_name_fails() {
        let api = FakeCompute::new("p").with_existing("allow-ssh");
        let config = ProvisionConfig::default();
        let ctx = ProvisionContext::new(&api, &config);

        let result = FirewallProvisioner::new(&ctx)
            .create_ssh_ingress_rule(&network())
            .await;
        assert!(result.is_err());
    }
}
