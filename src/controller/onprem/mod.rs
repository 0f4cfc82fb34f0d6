//! # On-prem References
//!
//! Hooks for `NetworkRef` and `DataDiskRef`. Sync confirms the referenced libvirt
//! object exists and reports its identity; finalize has nothing to release.

mod data_disk_ref;
mod network_ref;

pub use data_disk_ref::{resolve_data_disk_ref_options, DataDiskRefOptions, SyncDataDiskRefAction};
pub use network_ref::{resolve_network_ref_options, NetworkRefOptions, SyncNetworkRefAction};
