//! Ordered record of what a provisioning run created

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const LEDGER_VERSION: u32 = 1;

/// Phases of a run, in the only order they can be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Start,
    NetworkCreated,
    NetworkSettled,
    SubnetCreated,
    FirewallRulesCreated,
    ImageResolved,
    KeyLoaded,
    InstanceRequested,
    Done,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::Start => write!(f, "start"),
            RunPhase::NetworkCreated => write!(f, "network-created"),
            RunPhase::NetworkSettled => write!(f, "network-settled"),
            RunPhase::SubnetCreated => write!(f, "subnet-created"),
            RunPhase::FirewallRulesCreated => write!(f, "firewall-rules-created"),
            RunPhase::ImageResolved => write!(f, "image-resolved"),
            RunPhase::KeyLoaded => write!(f, "key-loaded"),
            RunPhase::InstanceRequested => write!(f, "instance-requested"),
            RunPhase::Done => write!(f, "done"),
        }
    }
}

/// Kind of remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Network,
    Subnetwork,
    Firewall,
    Instance,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Network => write!(f, "network"),
            ResourceKind::Subnetwork => write!(f, "subnetwork"),
            ResourceKind::Firewall => write!(f, "firewall"),
            ResourceKind::Instance => write!(f, "instance"),
        }
    }
}

/// One resource the run created or adopted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedStep {
    pub kind: ResourceKind,

    pub name: String,

    /// Canonical path or URL of the resource
    pub path: String,

    /// Creation operation; `None` when an existing resource was adopted
    pub operation: Option<String>,

    /// The resource existed before the run
    pub adopted: bool,

    pub completed_at: DateTime<Utc>,
}

impl CompletedStep {
    pub fn created(
        kind: ResourceKind,
        name: impl Into<String>,
        path: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
            operation: Some(operation.into()),
            adopted: false,
            completed_at: Utc::now(),
        }
    }

    pub fn adopted(kind: ResourceKind, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
            operation: None,
            adopted: true,
            completed_at: Utc::now(),
        }
    }
}

/// The run as an ordered list of completed steps
///
/// Steps are appended in the order the resources were requested, so walking
/// them backwards gives a valid deletion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLedger {
    pub version: u32,

    pub project_id: String,

    /// Last phase reached
    pub phase: RunPhase,

    pub steps: Vec<CompletedStep>,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Error that stopped the run
    pub failure: Option<String>,
}

impl RunLedger {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            version: LEDGER_VERSION,
            project_id: project_id.into(),
            phase: RunPhase::Start,
            steps: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            failure: None,
        }
    }

    pub fn advance(&mut self, phase: RunPhase) {
        tracing::debug!("Run phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    pub fn record(&mut self, step: CompletedStep) {
        self.steps.push(step);
    }

    pub fn finish(&mut self) {
        self.advance(RunPhase::Done);
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl std::fmt::Display) {
        self.failure = Some(error.to_string());
        self.finished_at = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        self.phase == RunPhase::Done && self.failure.is_none()
    }

    /// Steps that created a resource, newest first
    pub fn teardown_order(&self) -> impl Iterator<Item = &CompletedStep> {
        self.steps.iter().rev().filter(|s| !s.adopted)
    }

    pub fn steps_of(&self, kind: ResourceKind) -> Vec<&CompletedStep> {
        self.steps.iter().filter(|s| s.kind == kind).collect()
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            created: self.steps.iter().filter(|s| !s.adopted).count(),
            adopted: self.steps.iter().filter(|s| s.adopted).count(),
            phase: self.phase,
        }
    }
}

/// Counts for the final status line
#[derive(Debug, Clone)]
pub struct LedgerSummary {
    pub created: usize,
    pub adopted: usize,
    pub phase: RunPhase,
}

impl std::fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} adopted, reached {}",
            self.created, self.adopted, self.phase
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        assert!(RunPhase::Start < RunPhase::NetworkCreated);
        assert!(RunPhase::NetworkSettled < RunPhase::SubnetCreated);
        assert!(RunPhase::KeyLoaded < RunPhase::InstanceRequested);
        assert!(RunPhase::InstanceRequested < RunPhase::Done);
    }

    #[test]
    fn test_teardown_order_skips_adopted() {
        let mut ledger = RunLedger::new("p");
        ledger.record(CompletedStep::adopted(ResourceKind::Network, "test-vpc", "n"));
        ledger.record(CompletedStep::created(
            ResourceKind::Subnetwork,
            "test-subnet",
            "s",
            "op-1",
        ));
        ledger.record(CompletedStep::created(
            ResourceKind::Firewall,
            "allow-ssh",
            "f",
            "op-2",
        ));

        let names: Vec<_> = ledger.teardown_order().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["allow-ssh", "test-subnet"]);

        let summary = ledger.summary();
        assert_eq!(summary.created, 2);
        assert_eq!(summary.adopted, 1);
    }

    #[test]
    fn test_finish_and_fail() {
        let mut ledger = RunLedger::new("p");
        ledger.advance(RunPhase::NetworkCreated);
        ledger.fail("boom");
        assert!(!ledger.is_success());
        assert_eq!(ledger.phase, RunPhase::NetworkCreated);
        assert_eq!(ledger.failure.as_deref(), Some("boom"));

        let mut ok = RunLedger::new("p");
        ok.finish();
        assert!(ok.is_success());
        assert!(ok.finished_at.is_some());
    }
}
