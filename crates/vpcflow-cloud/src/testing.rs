//! In-memory Compute API for tests

use crate::descriptor::{
    FirewallRuleDescriptor, InstanceDescriptor, NetworkDescriptor, SubnetDescriptor,
};
use crate::error::{ApiResult, ProvisionError};
use crate::operation::{Image, Operation, OperationError, OperationErrorItem, OperationStatus};
use crate::paths::ResourcePaths;
use crate::provider::ComputeApi;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

const LINK_BASE: &str = "https://www.googleapis.com/compute/v1";

/// A call received by the fake, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    InsertNetwork(NetworkDescriptor),
    InsertSubnetwork(String, SubnetDescriptor),
    InsertFirewall(FirewallRuleDescriptor),
    InsertInstance(String, InstanceDescriptor),
    GetImage(String, String),
    GetOperation(String),
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    existing: HashSet<String>,
    polls: HashMap<String, u32>,
    counter: u32,
}

pub struct FakeCompute {
    paths: ResourcePaths,
    polls_until_done: u32,
    images: HashMap<(String, String), Image>,
    inner: Mutex<Inner>,
}

impl FakeCompute {
    pub fn new(project: &str) -> Self {
        let mut images = HashMap::new();
        images.insert(
            ("debian-cloud".to_string(), "debian-11".to_string()),
            Image {
                name: "debian-11-bullseye-v20240110".to_string(),
                self_link: format!(
                    "{}/projects/debian-cloud/global/images/debian-11-bullseye-v20240110",
                    LINK_BASE
                ),
                family: Some("debian-11".to_string()),
                status: Some("READY".to_string()),
            },
        );

        Self {
            paths: ResourcePaths::new(project),
            polls_until_done: 0,
            images,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Inserts return running operations that finish after `polls` polls
    pub fn with_polls_until_done(mut self, polls: u32) -> Self {
        self.polls_until_done = polls;
        self
    }

    /// A resource with this name already exists in the project
    pub fn with_existing(self, name: &str) -> Self {
        self.inner.lock().unwrap().existing.insert(name.to_string());
        self
    }

    pub fn without_images(mut self) -> Self {
        self.images.clear();
        self
    }

    pub fn done_operation(name: &str, error: Option<(&str, &str)>) -> Operation {
        Operation {
            name: name.to_string(),
            status: OperationStatus::Done,
            error: error.map(|(code, message)| OperationError {
                errors: vec![OperationErrorItem {
                    code: code.to_string(),
                    message: message.to_string(),
                }],
            }),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn operation_polls(&self, name: &str) -> u32 {
        self.inner
            .lock()
            .unwrap()
            .polls
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Index of the first call matching `pred`
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }

    fn accept(
        &self,
        call: Call,
        name: &str,
        target_path: String,
        scope: (Option<String>, Option<String>),
    ) -> ApiResult<Operation> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);

        if !inner.existing.insert(name.to_string()) {
            return Err(ProvisionError::AlreadyExists(format!(
                "The resource '{}' already exists",
                target_path
            )));
        }

        inner.counter += 1;
        let status = if self.polls_until_done == 0 {
            OperationStatus::Done
        } else {
            OperationStatus::Running
        };

        Ok(Operation {
            name: format!("operation-{}-{}", inner.counter, name),
            operation_type: Some("insert".to_string()),
            target_link: Some(format!("{}/{}", LINK_BASE, target_path)),
            target_id: Some(format!("{}", 1000 + inner.counter)),
            status,
            zone: scope.0,
            region: scope.1,
            ..Default::default()
        })
    }
}

#[async_trait]
impl ComputeApi for FakeCompute {
    fn project(&self) -> &str {
        self.paths.project()
    }

    async fn insert_network(&self, body: &NetworkDescriptor) -> ApiResult<Operation> {
        self.accept(
            Call::InsertNetwork(body.clone()),
            &body.name,
            self.paths.network(&body.name),
            (None, None),
        )
    }

    async fn insert_subnetwork(
        &self,
        region: &str,
        body: &SubnetDescriptor,
    ) -> ApiResult<Operation> {
        self.accept(
            Call::InsertSubnetwork(region.to_string(), body.clone()),
            &body.name,
            self.paths.subnetwork(region, &body.name),
            (None, Some(format!("{}/projects/{}/regions/{}", LINK_BASE, self.project(), region))),
        )
    }

    async fn insert_firewall(&self, body: &FirewallRuleDescriptor) -> ApiResult<Operation> {
        self.accept(
            Call::InsertFirewall(body.clone()),
            &body.name,
            self.paths.firewall(&body.name),
            (None, None),
        )
    }

    async fn insert_instance(
        &self,
        zone: &str,
        body: &InstanceDescriptor,
    ) -> ApiResult<Operation> {
        self.accept(
            Call::InsertInstance(zone.to_string(), body.clone()),
            &body.name,
            self.paths.instance(zone, &body.name),
            (Some(format!("{}/projects/{}/zones/{}", LINK_BASE, self.project(), zone)), None),
        )
    }

    async fn get_image_from_family(&self, project: &str, family: &str) -> ApiResult<Image> {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(Call::GetImage(project.to_string(), family.to_string()));

        self.images
            .get(&(project.to_string(), family.to_string()))
            .cloned()
            .ok_or_else(|| ProvisionError::Api {
                status: 404,
                message: format!(
                    "The resource 'projects/{}/global/images/family/{}' was not found",
                    project, family
                ),
            })
    }

    async fn get_operation(&self, operation: &Operation) -> ApiResult<Operation> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::GetOperation(operation.name.clone()));

        let polls = inner.polls.entry(operation.name.clone()).or_insert(0);
        *polls += 1;

        let mut next = operation.clone();
        next.status = if *polls >= self.polls_until_done {
            OperationStatus::Done
        } else {
            OperationStatus::Running
        };
        Ok(next)
    }
}
