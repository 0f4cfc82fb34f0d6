//! # Network References

use crate::controller::action::{describe, error_action, immediate_action, Action, ResourceStatus};
use crate::controller::environment::Environment;
use crate::controller::hooks::{HookContext, HookResource};
use crate::controller::{ActionError, ResolveError};
use crate::crd::{NetworkRef, NetworkRefSpec};
use crate::provider::VirtualizationProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRefOptions {
    pub network_name: String,
}

pub fn resolve_network_ref_options(spec: &NetworkRefSpec) -> Result<NetworkRefOptions, ResolveError> {
    let network_name = spec
        .network_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or(ResolveError::MissingField("spec.networkName"))?;
    Ok(NetworkRefOptions {
        network_name: network_name.to_string(),
    })
}

/// Confirms the referenced network exists
#[derive(Debug)]
pub struct SyncNetworkRefAction {
    virt: Arc<dyn VirtualizationProvider>,
    options: NetworkRefOptions,
}

impl SyncNetworkRefAction {
    pub fn new(virt: Arc<dyn VirtualizationProvider>, options: NetworkRefOptions) -> Self {
        Self { virt, options }
    }
}

#[async_trait]
impl Action for SyncNetworkRefAction {
    async fn execute(self: Box<Self>) -> Result<ResourceStatus, ActionError> {
        debug!("Looking up network [{}]", self.options.network_name);
        let network = self.virt.get_network(&self.options.network_name).await?;

        let serialized = describe("network", &network);
        let description = serialized
            .as_ref()
            .map_or_else(|| format!("network [{}] is available", network.name), ToString::to_string);

        let mut status = ResourceStatus::ready(description)
            .with_metadata("networkName", network.name.as_str())
            .with_metadata("networkUUID", network.uuid.as_str());
        if let Some(serialized) = serialized {
            status = status.with_metadata("network", serialized);
        }
        Ok(status)
    }
}

#[async_trait]
impl HookResource for NetworkRef {
    const KIND: &'static str = "NetworkRef";

    async fn sync_action(&self, ctx: &HookContext, env: &Environment) -> Box<dyn Action> {
        let options = match resolve_network_ref_options(&self.spec) {
            Ok(options) => options,
            Err(e) => return error_action(e),
        };
        match ctx.providers.virtualization(env) {
            Ok(virt) => Box::new(SyncNetworkRefAction::new(virt, options)),
            Err(e) => error_action(e),
        }
    }

    async fn finalize_action(&self, _ctx: &HookContext, _env: &Environment) -> Box<dyn Action> {
        immediate_action(ResourceStatus::ready("network references own nothing"))
    }
}
