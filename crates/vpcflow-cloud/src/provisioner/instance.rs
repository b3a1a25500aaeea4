use super::{InstanceHandle, Pending, ProvisionContext, SubnetHandle};
use crate::descriptor::{InstanceDescriptor, InstanceRefs};
use crate::error::{ProvisionError, Result};
use crate::keys::SshKeyEntry;
use crate::ledger::ResourceKind;
use crate::operation::Image;
use tracing::info;

/// Creates the compute instance attached to the subnetwork
pub struct InstanceProvisioner<'a> {
    ctx: &'a ProvisionContext<'a>,
}

impl<'a> InstanceProvisioner<'a> {
    pub fn new(ctx: &'a ProvisionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Resolve the image, load the key, then request the instance
    ///
    /// The key is read before the insert is issued, so a missing key never
    /// leaves a reachable instance without a login.
    pub async fn create_instance(&self, subnet: &SubnetHandle) -> Result<InstanceHandle> {
        let image = self.resolve_image().await?;
        let ssh_key = self.load_key().await?;
        let pending = self.request(subnet, &image, &ssh_key).await?;
        self.settle(pending).await
    }

    /// Latest image of the configured family
    pub async fn resolve_image(&self) -> Result<Image> {
        let instance = &self.ctx.config.instance;
        let (project, family) = (&instance.image_project, &instance.image_family);

        let image_error = |message: String| ProvisionError::ImageResolution {
            project: project.clone(),
            family: family.clone(),
            message,
        };

        let image = self
            .ctx
            .api
            .get_image_from_family(project, family)
            .await
            .map_err(|e| image_error(e.to_string()))?;

        if image.self_link.is_empty() {
            return Err(image_error("image has no self link".to_string()).into());
        }
        if let Some(status) = image.status.as_deref() {
            if status != "READY" {
                return Err(image_error(format!("image {} is {}", image.name, status)).into());
            }
        }

        info!(image = %image.name, family = %family, "Resolved boot image");
        Ok(image)
    }

    pub async fn load_key(&self) -> Result<SshKeyEntry> {
        let instance = &self.ctx.config.instance;
        Ok(SshKeyEntry::load(&instance.username, &instance.public_key_path).await?)
    }

    /// Instance body for the given dependencies
    pub fn describe(
        &self,
        subnet: &SubnetHandle,
        image: &Image,
        ssh_key: &SshKeyEntry,
    ) -> InstanceDescriptor {
        let config = self.ctx.config;
        let paths = &self.ctx.paths;
        let refs = InstanceRefs {
            machine_type: paths.machine_type(&config.zone, &config.instance.machine_type),
            disk_type: paths.disk_type(&config.zone, &config.instance.disk_type),
            source_image: &image.self_link,
            subnetwork: &subnet.path,
        };
        InstanceDescriptor::new(config, refs, ssh_key)
    }

    /// Issue the instance insert
    pub async fn request(
        &self,
        subnet: &SubnetHandle,
        image: &Image,
        ssh_key: &SshKeyEntry,
    ) -> Result<Pending<InstanceHandle>> {
        let zone = &self.ctx.config.zone;
        let body = self.describe(subnet, image, ssh_key);
        info!(
            instance = %body.name,
            zone = %zone,
            machine_type = %body.machine_type,
            "Creating instance"
        );

        let result = self.ctx.api.insert_instance(zone, &body).await;
        let operation = self.ctx.accept(ResourceKind::Instance, &body.name, result)?;

        let path = ProvisionContext::canonical_path(
            operation.as_ref(),
            self.ctx.paths.instance(zone, &body.name),
        );

        Ok(Pending {
            handle: InstanceHandle {
                name: body.name,
                zone: zone.clone(),
                path,
                operation: operation.as_ref().map(|op| op.name.clone()),
                target_id: operation.as_ref().and_then(|op| op.target_id.clone()),
            },
            operation,
        })
    }

    /// Wait for the instance when `readiness.wait_for_instance` is set
    pub async fn settle(&self, pending: Pending<InstanceHandle>) -> Result<InstanceHandle> {
        if !self.ctx.config.readiness.wait_for_instance {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SSH_KEYS_METADATA_KEY;
    use crate::error::CloudError;
    use crate::testing::{Call, FakeCompute};
    use tempfile::TempDir;
    use vpcflow_config::ProvisionConfig;

    fn subnet() -> SubnetHandle {
        SubnetHandle {
            name: "test-subnet".to_string(),
            region: "us-central1".to_string(),
            path: "projects/p/regions/us-central1/subnetworks/test-subnet".to_string(),
            operation: Some("operation-2".to_string()),
        }
    }

    fn config_with_key(dir: &TempDir, content: Option<&str>) -> ProvisionConfig {
        let path = dir.path().join("id_rsa.pub");
        if let Some(content) = content {
            std::fs::write(&path, content).unwrap();
        }
        let mut config = ProvisionConfig {
            project_id: "p".to_string(),
            ..Default::default()
        };
        config.instance.username = "alice".to_string();
        config.instance.public_key_path = path;
        config
    }

    #[tokio::test]
    async fn test_create_instance() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_key(&dir, Some("ssh-rsa AAAA... user@host\n"));
        let api = FakeCompute::new("p");
        let ctx = ProvisionContext::new(&api, &config);

        let handle = InstanceProvisioner::new(&ctx)
            .create_instance(&subnet())
            .await
            .unwrap();
        assert_eq!(handle.zone, "us-central1-a");
        assert!(handle.operation.is_some());
        assert!(handle.target_id.is_some());

        let calls = api.calls();
        assert_eq!(
            calls[0],
            Call::GetImage("debian-cloud".to_string(), "debian-11".to_string())
        );
        match &calls[1] {
            Call::InsertInstance(zone, body) => {
                assert_eq!(zone, "us-central1-a");
                assert_eq!(
                    body.machine_type,
                    "projects/p/zones/us-central1-a/machineTypes/e2-micro"
                );
                assert_eq!(
                    body.disks[0].initialize_params.disk_type,
                    "projects/p/zones/us-central1-a/diskTypes/pd-balanced"
                );
                assert!(
                    body.disks[0]
                        .initialize_params
                        .source_image
                        .ends_with("projects/debian-cloud/global/images/debian-11-bullseye-v20240110")
                );
                assert_eq!(body.network_interfaces[0].subnetwork, subnet().path);
                assert_eq!(
                    body.metadata.get(SSH_KEYS_METADATA_KEY),
                    Some("alice:ssh-rsa AAAA... user@host")
                );
            }
            other => panic!("Expected instance insert, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_key_issues_no_insert() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_key(&dir, None);
        let api = FakeCompute::new("p");
        let ctx = ProvisionContext::new(&api, &config);

        let err = InstanceProvisioner::new(&ctx)
            .create_instance(&subnet())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CloudError::Provision(ProvisionError::KeySource { .. })
        ));
        assert!(
            api.position(|c| matches!(c, Call::InsertInstance(..)))
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_empty_key_issues_no_insert() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_key(&dir, Some("\n"));
        let api = FakeCompute::new("p");
        let ctx = ProvisionContext::new(&api, &config);

        let result = InstanceProvisioner::new(&ctx)
            .create_instance(&subnet())
            .await;
        assert!(result.is_err());
        assert!(
            api.position(|c| matches!(c, Call::InsertInstance(..)))
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_unknown_image_family() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_key(&dir, Some("ssh-rsa AAAA"));
        let api = FakeCompute::new("p").without_images();
        let ctx = ProvisionContext::new(&api, &config);

        match InstanceProvisioner::new(&ctx).resolve_image().await {
            Err(CloudError::Provision(ProvisionError::ImageResolution { family, .. })) => {
                assert_eq!(family, "debian-11");
            }
            other => panic!("Expected ImageResolution, got {:?}", other),
        }
    }
}
