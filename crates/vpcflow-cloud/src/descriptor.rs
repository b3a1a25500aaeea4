//! Request bodies of the creation calls
//!
//! Descriptors are plain data. Cross-resource references are passed in as
//! already-resolved paths; nothing here formats a path on its own.

use crate::keys::SshKeyEntry;
use serde::{Deserialize, Serialize};
use vpcflow_config::ProvisionConfig;

/// Scopes granted to the instance's service account
pub const INSTANCE_SCOPES: [&str; 5] = [
    "https://www.googleapis.com/auth/devstorage.read_only",
    "https://www.googleapis.com/auth/logging.write",
    "https://www.googleapis.com/auth/monitoring.write",
    "https://www.googleapis.com/auth/servicecontrol",
    "https://www.googleapis.com/auth/trace.append",
];

/// Metadata key the guest agent reads SSH keys from
pub const SSH_KEYS_METADATA_KEY: &str = "ssh-keys";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    pub name: String,
    pub description: String,
    pub auto_create_subnetworks: bool,
    pub mtu: u32,
    pub routing_config: RoutingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    pub routing_mode: String,
}

impl NetworkDescriptor {
    pub fn from_config(config: &ProvisionConfig) -> Self {
        Self {
            name: config.network.name.clone(),
            description: config.network.description.clone(),
            auto_create_subnetworks: false,
            mtu: config.network.mtu,
            routing_config: RoutingConfig {
                routing_mode: config.network.routing_mode.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetDescriptor {
    pub name: String,
    pub description: String,
    pub ip_cidr_range: String,
    pub region: String,
    /// Path of the parent network
    pub network: String,
    pub enable_flow_logs: bool,
    pub private_ip_google_access: bool,
}

impl SubnetDescriptor {
    pub fn new(config: &ProvisionConfig, network_path: &str) -> Self {
        Self {
            name: config.subnet.name.clone(),
            description: config.subnet.description.clone(),
            ip_cidr_range: config.subnet.cidr.clone(),
            region: config.region.clone(),
            network: network_path.to_string(),
            enable_flow_logs: false,
            private_ip_google_access: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ingress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedTraffic {
    #[serde(rename = "IPProtocol")]
    pub ip_protocol: String,
    pub ports: Vec<String>,
}

impl AllowedTraffic {
    pub fn tcp(ports: &[u16]) -> Self {
        Self {
            ip_protocol: "tcp".to_string(),
            ports: ports.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRuleDescriptor {
    pub name: String,
    pub description: String,
    pub direction: Direction,
    pub allowed: Vec<AllowedTraffic>,
    pub source_ranges: Vec<String>,
    /// Path of the network the rule applies to
    pub network: String,
    pub priority: u32,
}

impl FirewallRuleDescriptor {
    /// tcp/22 from the configured source ranges
    pub fn ssh(config: &ProvisionConfig, network_path: &str) -> Self {
        Self::ingress(
            config,
            &config.firewall.ssh_rule_name,
            "Allows TCP connections from any source to any instance on the network using port 22.",
            AllowedTraffic::tcp(&[22]),
            network_path,
        )
    }

    /// tcp/80 and tcp/443 from the configured source ranges
    pub fn web(config: &ProvisionConfig, network_path: &str) -> Self {
        Self::ingress(
            config,
            &config.firewall.web_rule_name,
            "Allows connection from any source to any instance on the network using HTTP and HTTPS.",
            AllowedTraffic::tcp(&[80, 443]),
            network_path,
        )
    }

    fn ingress(
        config: &ProvisionConfig,
        name: &str,
        description: &str,
        allowed: AllowedTraffic,
        network_path: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            direction: Direction::Ingress,
            allowed: vec![allowed],
            source_ranges: config.firewall.source_ranges.clone(),
            network: network_path.to_string(),
            priority: config.firewall.priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDescriptor {
    pub name: String,
    pub machine_type: String,
    pub disks: Vec<AttachedDisk>,
    pub network_interfaces: Vec<NetworkInterface>,
    pub metadata: Metadata,
    pub service_accounts: Vec<ServiceAccount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    pub auto_delete: bool,
    pub boot: bool,
    pub initialize_params: InitializeParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// int64 fields travel as strings in the Compute API
    pub disk_size_gb: String,
    pub disk_type: String,
    pub source_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub subnetwork: String,
    pub access_configs: Vec<AccessConfig>,
    pub stack_type: String,
}

/// Ephemeral external address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub network_tier: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            name: "External NAT".to_string(),
            kind: "ONE_TO_ONE_NAT".to_string(),
            network_tier: "STANDARD".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub items: Vec<MetadataItem>,
}

impl Metadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub email: String,
    pub scopes: Vec<String>,
}

/// Resolved inputs of an instance body
#[derive(Debug, Clone)]
pub struct InstanceRefs<'a> {
    pub machine_type: String,
    pub disk_type: String,
    pub source_image: &'a str,
    pub subnetwork: &'a str,
}

impl InstanceDescriptor {
    pub fn new(config: &ProvisionConfig, refs: InstanceRefs<'_>, ssh_key: &SshKeyEntry) -> Self {
        let instance = &config.instance;
        Self {
            name: instance.name.clone(),
            machine_type: refs.machine_type,
            disks: vec![AttachedDisk {
                auto_delete: true,
                boot: true,
                initialize_params: InitializeParams {
                    disk_size_gb: instance.disk_size_gb.to_string(),
                    disk_type: refs.disk_type,
                    source_image: refs.source_image.to_string(),
                },
            }],
            network_interfaces: vec![NetworkInterface {
                subnetwork: refs.subnetwork.to_string(),
                access_configs: vec![AccessConfig::default()],
                stack_type: "IPV4_ONLY".to_string(),
            }],
            metadata: Metadata {
                items: vec![MetadataItem {
                    key: SSH_KEYS_METADATA_KEY.to_string(),
                    value: ssh_key.metadata_value(),
                }],
            },
            service_accounts: vec![ServiceAccount {
                email: instance.service_account.clone(),
                scopes: INSTANCE_SCOPES.iter().map(|s| s.to_string()).collect(),
            }],
        }
    }
}
