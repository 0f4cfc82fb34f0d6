//! # On-prem References
//!
//! Custom resources pointing at pre-existing libvirt objects (networks and data disks)
//! that on-prem instances attach to. The controller only verifies that the referenced
//! object exists; it never creates or deletes it.

use crate::crd::{ReconcileStatus, TargetSelected};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Reference to a libvirt network
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "NetworkRef",
    group = "hpcr.hyper-protect.io",
    version = "v1",
    namespaced,
    status = "ReconcileStatus",
    printcolumn = r#"{"name":"Status", "type":"string", "jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRefSpec {
    /// Name of the libvirt network
    #[serde(default)]
    pub network_name: Option<String>,
    /// Selects the config maps and secrets carrying the libvirt connection settings
    #[serde(default)]
    pub target_selector: Option<LabelSelector>,
}

/// Reference to a volume in a libvirt storage pool
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "DataDiskRef",
    group = "hpcr.hyper-protect.io",
    version = "v1",
    namespaced,
    status = "ReconcileStatus",
    printcolumn = r#"{"name":"Status", "type":"string", "jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DataDiskRefSpec {
    /// Name of the storage volume
    #[serde(default)]
    pub volume_name: Option<String>,
    /// Storage pool holding the volume.
    /// Falls back to `LIBVIRT_STORAGE_POOL`, then to `default`
    #[serde(default)]
    pub storage_pool: Option<String>,
    #[serde(default)]
    pub target_selector: Option<LabelSelector>,
}

impl TargetSelected for NetworkRef {
    fn target_selector(&self) -> Option<&LabelSelector> {
        self.spec.target_selector.as_ref()
    }
}

impl TargetSelected for DataDiskRef {
    fn target_selector(&self) -> Option<&LabelSelector> {
        self.spec.target_selector.as_ref()
    }
}
