//! # HyperProtectInstance Spec
//!
//! The custom resource describing one Hyper Protect Container Runtime instance on IBM Cloud VPC.

use crate::crd::{ReconcileStatus, TargetSelected};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// HyperProtectInstance Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: hpcr.hyper-protect.io/v1
/// kind: HyperProtectInstance
/// metadata:
///   name: my-enclave
///   namespace: default
/// spec:
///   contract: "hyper-protect-basic.xxxx"
///   profileName: bz2e-4x16
///   targetSelector:
///     matchLabels:
///       app: my-enclave
/// ```
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "HyperProtectInstance",
    group = "hpcr.hyper-protect.io",
    version = "v1",
    namespaced,
    shortname = "hpi",
    status = "ReconcileStatus",
    printcolumn = r#"{"name":"Status", "type":"string", "jsonPath":".status.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HyperProtectInstanceSpec {
    /// Encrypted contract handed to the instance as user data, passed through verbatim
    pub contract: String,
    /// Subnet to attach the instance to.
    /// Falls back to `TARGET_SUBNET_ID` from the selected config maps and secrets
    #[serde(default, rename = "subnetID", skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    /// Instance profile.
    /// Falls back to `TARGET_PROFILE`, then to the controller default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    /// Selects the config maps and secrets that make up the environment of this instance
    #[serde(default)]
    pub target_selector: Option<LabelSelector>,
}

impl TargetSelected for HyperProtectInstance {
    fn target_selector(&self) -> Option<&LabelSelector> {
        self.spec.target_selector.as_ref()
    }
}
