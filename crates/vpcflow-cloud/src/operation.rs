//! Asynchronous operation and image responses of the Compute API

use crate::paths::last_segment;
use serde::{Deserialize, Serialize};

/// A long-running operation returned by every insert call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,

    /// Canonical URL of the resource being created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_link: Option<String>,

    /// Numeric id of the target resource, as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,

    #[serde(default)]
    pub status: OperationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,

    /// Zone URL for zonal operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    /// Region URL for regional operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl Operation {
    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }

    /// Joined messages of a failed operation
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        if error.errors.is_empty() {
            return Some("operation finished with an unspecified error".to_string());
        }
        Some(
            error
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Where the operation lives, derived from its zone/region fields
    pub fn scope(&self) -> OperationScope {
        if let Some(zone) = &self.zone {
            OperationScope::Zone(last_segment(zone).to_string())
        } else if let Some(region) = &self.region {
            OperationScope::Region(last_segment(region).to_string())
        } else {
            OperationScope::Global
        }
    }
}

/// Status of an operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    #[default]
    Pending,
    Running,
    Done,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::Pending => write!(f, "pending"),
            OperationStatus::Running => write!(f, "running"),
            OperationStatus::Done => write!(f, "done"),
            OperationStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub errors: Vec<OperationErrorItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationErrorItem {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Collection an operation belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationScope {
    Global,
    Region(String),
    Zone(String),
}

/// Boot image, as returned by `images.getFromFamily`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: String,

    #[serde(default)]
    pub self_link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// `READY`, `PENDING`, `FAILED`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
