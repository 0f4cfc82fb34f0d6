//! # Custom Resource Definitions
//!
//! CRD types served by the hooks.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `HyperProtectInstance`, the VPC instance resource
//! - `onprem.rs` - `NetworkRef` and `DataDiskRef`, references to libvirt objects
//! - `status.rs` - Status shape shared by all kinds

mod onprem;
mod spec;
mod status;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;

pub use onprem::{DataDiskRef, DataDiskRefSpec, NetworkRef, NetworkRefSpec};
pub use spec::{HyperProtectInstance, HyperProtectInstanceSpec};
pub use status::{ReconcileStatus, RESERVED_STATUS_KEYS};

/// Resources whose environment is assembled from label-selected config maps and secrets
pub trait TargetSelected {
    /// Selector applied to config maps and secrets in the customize hook
    fn target_selector(&self) -> Option<&LabelSelector>;
}
