//! # Data Disk References

use crate::constants::{DEFAULT_STORAGE_POOL, KEY_LIBVIRT_STORAGE_POOL};
use crate::controller::action::{describe, error_action, immediate_action, Action, ResourceStatus};
use crate::controller::environment::Environment;
use crate::controller::hooks::{HookContext, HookResource};
use crate::controller::{ActionError, ResolveError};
use crate::crd::{DataDiskRef, DataDiskRefSpec};
use crate::provider::VirtualizationProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDiskRefOptions {
    pub volume_name: String,
    pub storage_pool: String,
}

/// Volume from the resource; pool from the resource, then `LIBVIRT_STORAGE_POOL`, then `default`
pub fn resolve_data_disk_ref_options(
    spec: &DataDiskRefSpec,
    env: &Environment,
) -> Result<DataDiskRefOptions, ResolveError> {
    let volume_name = spec
        .volume_name
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ResolveError::MissingField("spec.volumeName"))?;

    let storage_pool = spec
        .storage_pool
        .as_deref()
        .filter(|p| !p.is_empty())
        .or_else(|| env.get(KEY_LIBVIRT_STORAGE_POOL))
        .unwrap_or(DEFAULT_STORAGE_POOL);

    Ok(DataDiskRefOptions {
        volume_name: volume_name.to_string(),
        storage_pool: storage_pool.to_string(),
    })
}

/// Confirms the referenced volume exists in its pool
#[derive(Debug)]
pub struct SyncDataDiskRefAction {
    virt: Arc<dyn VirtualizationProvider>,
    options: DataDiskRefOptions,
}

impl SyncDataDiskRefAction {
    pub fn new(virt: Arc<dyn VirtualizationProvider>, options: DataDiskRefOptions) -> Self {
        Self { virt, options }
    }
}

#[async_trait]
impl Action for SyncDataDiskRefAction {
    async fn execute(self: Box<Self>) -> Result<ResourceStatus, ActionError> {
        let DataDiskRefOptions {
            volume_name,
            storage_pool,
        } = &self.options;
        debug!("Looking up volume [{}] in pool [{}]", volume_name, storage_pool);
        let volume = self.virt.get_storage_volume(storage_pool, volume_name).await?;

        let serialized = describe("storage volume", &volume);
        let description = serialized.as_ref().map_or_else(
            || format!("volume [{}] is available in pool [{}]", volume.name, volume.pool),
            ToString::to_string,
        );

        let mut status = ResourceStatus::ready(description)
            .with_metadata("volumeName", volume.name.as_str())
            .with_metadata("storagePool", volume.pool.as_str())
            .with_metadata("path", volume.path.as_str());
        if let Some(serialized) = serialized {
            status = status.with_metadata("volume", serialized);
        }
        Ok(status)
    }
}

#[async_trait]
impl HookResource for DataDiskRef {
    const KIND: &'static str = "DataDiskRef";

    async fn sync_action(&self, ctx: &HookContext, env: &Environment) -> Box<dyn Action> {
        let options = match resolve_data_disk_ref_options(&self.spec, env) {
            Ok(options) => options,
            Err(e) => return error_action(e),
        };
        match ctx.providers.virtualization(env) {
            Ok(virt) => Box::new(SyncDataDiskRefAction::new(virt, options)),
            Err(e) => error_action(e),
        }
    }

    async fn finalize_action(&self, _ctx: &HookContext, _env: &Environment) -> Box<dyn Action> {
        immediate_action(ResourceStatus::ready("data disk references own nothing"))
    }
}
