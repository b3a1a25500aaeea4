//! Provisioning configuration value object
//!
//! One `ProvisionConfig` is loaded at the entry point and handed to every
//! provisioner by reference. `Default` is the built-in parameter table.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

/// Everything a provisioning run needs to know
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Project that owns every created resource
    pub project_id: String,

    /// Region of the subnetwork
    pub region: String,

    /// Zone of the instance
    pub zone: String,

    pub network: NetworkSettings,
    pub subnet: SubnetSettings,
    pub firewall: FirewallSettings,
    pub instance: InstanceSettings,
    pub readiness: ReadinessConfig,

    /// What to do when a resource with the same name already exists
    pub on_conflict: ConflictPolicy,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            project_id: "cse5333-lab-1".to_string(),
            region: "us-central1".to_string(),
            zone: "us-central1-a".to_string(),
            network: NetworkSettings::default(),
            subnet: SubnetSettings::default(),
            firewall: FirewallSettings::default(),
            instance: InstanceSettings::default(),
            readiness: ReadinessConfig::default(),
            on_conflict: ConflictPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub name: String,
    pub description: String,
    pub mtu: u32,
    /// `REGIONAL` or `GLOBAL`
    pub routing_mode: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            name: "test-vpc".to_string(),
            description: "Testing vpc automation".to_string(),
            mtu: 1460,
            routing_mode: "REGIONAL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubnetSettings {
    pub name: String,
    pub description: String,
    pub cidr: String,
}

impl Default for SubnetSettings {
    fn default() -> Self {
        Self {
            name: "test-subnet".to_string(),
            description: "Testing subnet".to_string(),
            cidr: "10.0.0.0/24".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallSettings {
    pub ssh_rule_name: String,
    pub web_rule_name: String,
    pub priority: u32,
    /// Source ranges allowed by both rules. Open to the world by default,
    /// which only suits disposable test environments.
    pub source_ranges: Vec<String>,
}

impl Default for FirewallSettings {
    fn default() -> Self {
        Self {
            ssh_rule_name: "allow-ssh".to_string(),
            web_rule_name: "allow-custom".to_string(),
            priority: 65534,
            source_ranges: vec!["0.0.0.0/0".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceSettings {
    pub name: String,
    pub machine_type: String,
    pub disk_type: String,
    pub disk_size_gb: u32,
    pub image_family: String,
    pub image_project: String,
    /// Login name written in front of the public key (`username:key`)
    pub username: String,
    /// Public key file; a leading `~/` is expanded
    pub public_key_path: PathBuf,
    /// Service account email, or `default` for the project's compute account
    pub service_account: String,
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            name: "test-instance-1".to_string(),
            machine_type: "e2-micro".to_string(),
            disk_type: "pd-balanced".to_string(),
            disk_size_gb: 10,
            image_family: "debian-11".to_string(),
            image_project: "debian-cloud".to_string(),
            username: "vpcflow".to_string(),
            public_key_path: PathBuf::from("~/.ssh/id_rsa.pub"),
            service_account: "default".to_string(),
        }
    }
}

/// How long and how often to poll a creation operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Upper bound for one readiness wait
    pub timeout_secs: u64,

    /// Delay between two operation polls
    pub poll_interval_ms: u64,

    /// Extra delay after the operation reports done
    pub settle_secs: u64,

    /// Wait for the subnetwork before touching the instance
    pub wait_for_subnet: bool,

    /// Wait for the instance operation before returning
    pub wait_for_instance: bool,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            poll_interval_ms: 2000,
            settle_secs: 0,
            wait_for_subnet: true,
            wait_for_instance: false,
        }
    }
}

impl ReadinessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

/// Behaviour when a creation call reports that the resource already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Stop the run with the conflict error
    #[default]
    Fail,
    /// Keep going with the existing resource
    Adopt,
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictPolicy::Fail => write!(f, "fail"),
            ConflictPolicy::Adopt => write!(f, "adopt"),
        }
    }
}

impl ProvisionConfig {
    /// Reject values the remote API would refuse anyway, before any call is made
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("project_id", &self.project_id),
            ("region", &self.region),
            ("zone", &self.zone),
            ("network.name", &self.network.name),
            ("subnet.name", &self.subnet.name),
            ("firewall.ssh_rule_name", &self.firewall.ssh_rule_name),
            ("firewall.web_rule_name", &self.firewall.web_rule_name),
            ("instance.name", &self.instance.name),
            ("instance.machine_type", &self.instance.machine_type),
            ("instance.disk_type", &self.instance.disk_type),
            ("instance.image_family", &self.instance.image_family),
            ("instance.image_project", &self.instance.image_project),
            ("instance.username", &self.instance.username),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
        }

        if self.firewall.ssh_rule_name == self.firewall.web_rule_name {
            return Err(ConfigError::Invalid(
                "firewall rule names must differ".to_string(),
            ));
        }

        validate_cidr(&self.subnet.cidr)?;
        for range in &self.firewall.source_ranges {
            validate_cidr(range)?;
        }

        if self.instance.disk_size_gb == 0 {
            return Err(ConfigError::Invalid(
                "instance.disk_size_gb must be positive".to_string(),
            ));
        }
        if self.readiness.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "readiness.timeout_secs must be positive".to_string(),
            ));
        }
        if self.readiness.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "readiness.poll_interval_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check an IPv4 `a.b.c.d/n` block
fn validate_cidr(cidr: &str) -> Result<()> {
    let invalid = || ConfigError::Invalid(format!("invalid CIDR block: {}", cidr));

    let (addr, prefix) = cidr.split_once('/').ok_or_else(invalid)?;
    addr.parse::<Ipv4Addr>().map_err(|_| invalid())?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_builtin_table() {
        let config = ProvisionConfig::default();
        assert_eq!(config.region, "us-central1");
        assert_eq!(config.zone, "us-central1-a");
        assert_eq!(config.network.name, "test-vpc");
        assert_eq!(config.subnet.cidr, "10.0.0.0/24");
        assert_eq!(config.instance.machine_type, "e2-micro");
        assert_eq!(config.instance.image_family, "debian-11");
        assert_eq!(config.on_conflict, ConflictPolicy::Fail);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
project_id: my-project
subnet:
  cidr: 10.1.0.0/20
on_conflict: adopt
"#;
        let config: ProvisionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.project_id, "my-project");
        assert_eq!(config.subnet.cidr, "10.1.0.0/20");
        assert_eq!(config.subnet.name, "test-subnet");
        assert_eq!(config.network.mtu, 1460);
        assert_eq!(config.on_conflict, ConflictPolicy::Adopt);
    }

    #[test]
    fn test_validate_rejects_bad_cidr() {
        let mut config = ProvisionConfig::default();
        config.subnet.cidr = "10.0.0.0".to_string();
        assert!(config.validate().is_err());

        config.subnet.cidr = "10.0.0.0/33".to_string();
        assert!(config.validate().is_err());

        config.subnet.cidr = "10.0.300.0/24".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut config = ProvisionConfig::default();
        config.network.name = "  ".to_string();

        match config.validate() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("network.name")),
            other => panic!("Expected Invalid error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_rule_names() {
        let mut config = ProvisionConfig::default();
        config.firewall.web_rule_name = config.firewall.ssh_rule_name.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = ProvisionConfig::default();
        config.readiness.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_readiness_durations() {
        let readiness = ReadinessConfig {
            timeout_secs: 30,
            poll_interval_ms: 500,
            settle_secs: 5,
            ..Default::default()
        };
        assert_eq!(readiness.timeout(), Duration::from_secs(30));
        assert_eq!(readiness.poll_interval(), Duration::from_millis(500));
        assert_eq!(readiness.settle(), Duration::from_secs(5));
    }
}
