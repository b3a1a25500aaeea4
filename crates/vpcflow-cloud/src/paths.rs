//! Resource path construction
//!
//! Every cross-resource reference and API URL is built here from the project
//! id, so a renamed project, region or zone only changes one input.

use crate::operation::OperationScope;

/// Base URL of the Compute Engine v1 REST API
pub const COMPUTE_API_BASE: &str = "https://compute.googleapis.com/compute/v1";

/// Builds `projects/...` paths for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    project: String,
}

impl ResourcePaths {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn networks(&self) -> String {
        format!("projects/{}/global/networks", self.project)
    }

    pub fn network(&self, name: &str) -> String {
        format!("{}/{}", self.networks(), name)
    }

    pub fn subnetworks(&self, region: &str) -> String {
        format!("projects/{}/regions/{}/subnetworks", self.project, region)
    }

    pub fn subnetwork(&self, region: &str, name: &str) -> String {
        format!("{}/{}", self.subnetworks(region), name)
    }

    pub fn firewalls(&self) -> String {
        format!("projects/{}/global/firewalls", self.project)
    }

    pub fn firewall(&self, name: &str) -> String {
        format!("{}/{}", self.firewalls(), name)
    }

    pub fn instances(&self, zone: &str) -> String {
        format!("projects/{}/zones/{}/instances", self.project, zone)
    }

    pub fn instance(&self, zone: &str, name: &str) -> String {
        format!("{}/{}", self.instances(zone), name)
    }

    pub fn machine_type(&self, zone: &str, machine_type: &str) -> String {
        format!(
            "projects/{}/zones/{}/machineTypes/{}",
            self.project, zone, machine_type
        )
    }

    pub fn disk_type(&self, zone: &str, disk_type: &str) -> String {
        format!(
            "projects/{}/zones/{}/diskTypes/{}",
            self.project, zone, disk_type
        )
    }

    /// Image families usually live in a public image project, not ours
    pub fn image_family(image_project: &str, family: &str) -> String {
        format!("projects/{}/global/images/family/{}", image_project, family)
    }

    pub fn operation(&self, scope: &OperationScope, name: &str) -> String {
        match scope {
            OperationScope::Global => {
                format!("projects/{}/global/operations/{}", self.project, name)
            }
            OperationScope::Region(region) => format!(
                "projects/{}/regions/{}/operations/{}",
                self.project, region, name
            ),
            OperationScope::Zone(zone) => format!(
                "projects/{}/zones/{}/operations/{}",
                self.project, zone, name
            ),
        }
    }

    /// Join a relative path onto an API base URL
    pub fn url(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }
}

/// Last segment of a path or URL (`.../zones/us-central1-a` -> `us-central1-a`)
pub fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}
