//! # Reconcile Status
//!
//! Status shape shared by every custom resource the controller serves.
//! The sync hook returns it and the orchestrator writes it to `.status` verbatim.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names of [`ReconcileStatus`] that flattened metadata must not reuse
pub const RESERVED_STATUS_KEYS: [&str; 3] = ["status", "description", "error"];

/// Outcome of the most recent sync as seen by `kubectl get -o yaml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ReconcileStatus {
    /// Ready, Pending or Error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Human readable summary, usually the serialized provider object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Error detail, only present when status is Error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Provider identifiers and diagnostics, flattened into the status object
    #[serde(flatten, default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}
