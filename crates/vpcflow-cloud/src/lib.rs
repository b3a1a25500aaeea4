//! vpcflow provisioning core
//!
//! This crate sequences the creation of a small network topology and one
//! compute instance against an asynchronous, eventually-consistent compute
//! API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   vpcflow CLI                   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 vpcflow-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Orchestrator                            │   │
//! │  │  network → subnet → rules → instance     │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │  Readiness   │  │  Run ledger  │             │
//! │  └──────────────┘  └──────────────┘             │
//! │  trait ComputeApi { ... }                       │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │  vpcflow-     │
//!           │  cloud-gcp    │
//!           └───────────────┘
//! ```

pub mod descriptor;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod operation;
pub mod orchestrator;
pub mod paths;
pub mod provider;
pub mod provisioner;
pub mod readiness;
pub mod state;

#[cfg(test)]
mod testing;

// Re-exports
pub use descriptor::{
    FirewallRuleDescriptor, InstanceDescriptor, NetworkDescriptor, SubnetDescriptor,
};
pub use error::{ApiResult, CloudError, ProvisionError, Result};
pub use keys::{SshKeyEntry, read_public_key};
pub use ledger::{CompletedStep, LedgerSummary, ResourceKind, RunLedger, RunPhase};
pub use operation::{Image, Operation, OperationScope, OperationStatus};
pub use orchestrator::{Orchestrator, ProvisionReport};
pub use paths::{COMPUTE_API_BASE, ResourcePaths};
pub use provider::ComputeApi;
pub use provisioner::{
    FirewallHandle, InstanceHandle, NetworkHandle, ProvisionContext, SubnetHandle,
};
pub use readiness::ReadinessWaiter;
pub use state::StateManager;
