//! Google Compute Engine backend for vpcflow
//!
//! This crate implements the `ComputeApi` trait over the Compute Engine v1
//! REST API.
//!
//! # Requirements
//!
//! - An OAuth access token in `GOOGLE_OAUTH_ACCESS_TOKEN`, or
//! - the `gcloud` CLI installed and logged in
//!
//! # Example
//!
//! ```ignore
//! use vpcflow_cloud_gcp::{GcpCompute, acquire_access_token};
//! use vpcflow_cloud::Orchestrator;
//!
//! let token = acquire_access_token().await?;
//! let api = GcpCompute::new(&config.project_id, token)?;
//!
//! let report = Orchestrator::new(&api, &config).run(&mut ledger).await?;
//! ```

pub mod auth;
pub mod compute;
pub mod error;
pub mod gcloud;

pub use auth::{ACCESS_TOKEN_ENV, acquire_access_token};
pub use compute::GcpCompute;
pub use error::{GcpError, Result};
pub use gcloud::Gcloud;
