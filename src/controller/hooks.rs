//! # Hooks
//!
//! The sync, finalize and customize hooks, independent of the HTTP transport.
//!
//! Sync and finalize share one shape: merge the environment, let the resource kind
//! build an [`Action`] (resolving its configuration on the way), run it once and map
//! the outcome to the hook response. Customize only looks at the parent's target
//! selector.

use crate::config::SharedControllerConfig;
use crate::constants::K8S_API_VERSION;
use crate::controller::action::{run_action, Action, State};
use crate::controller::environment::{Environment, RelatedResources};
use crate::crd::{ReconcileStatus, TargetSelected};
use crate::provider::ProviderFactory;
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a hook needs besides the request itself
#[derive(Debug, Clone)]
pub struct HookContext {
    pub config: SharedControllerConfig,
    pub providers: Arc<dyn ProviderFactory>,
    /// Environment loaded at start-up; request entries are layered on top
    pub base_env: Environment,
}

impl HookContext {
    pub fn new(config: SharedControllerConfig, providers: Arc<dyn ProviderFactory>) -> Self {
        Self {
            config,
            providers,
            base_env: Environment::new(),
        }
    }

    #[must_use]
    pub fn with_base_env(mut self, base_env: Environment) -> Self {
        self.base_env = base_env;
        self
    }

    fn environment(&self, related: &RelatedResources) -> Environment {
        let env = self.base_env.layered(Environment::from_related(related));
        debug!("Merged environment keys: {:?}", env.keys().collect::<Vec<_>>());
        env
    }
}

/// A custom resource kind served by the hooks
#[async_trait]
pub trait HookResource: DeserializeOwned + TargetSelected + Send + Sync {
    /// Kind name used in logs and metrics
    const KIND: &'static str;

    /// Action bringing the provider side in line with the resource
    async fn sync_action(&self, ctx: &HookContext, env: &Environment) -> Box<dyn Action>;

    /// Action releasing whatever the resource owns; `Ready` means finalized
    async fn finalize_action(&self, ctx: &HookContext, env: &Environment) -> Box<dyn Action>;
}

/// Body of the sync and finalize hooks
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRequest<P> {
    pub parent: P,
    #[serde(default)]
    pub related: RelatedResources,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub status: ReconcileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resync_after_seconds: Option<u64>,
}

impl SyncResponse {
    pub fn is_error(&self) -> bool {
        self.status.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub finalized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resync_after_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of the customize hook
#[derive(Debug, Clone, Deserialize)]
pub struct CustomizeRequest<P> {
    pub parent: P,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizeResponse {
    pub related_resource_rules: Vec<RelatedResourceRule>,
}

/// Asks the orchestrator to attach objects of one resource type to later requests
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedResourceRule {
    pub api_version: String,
    pub resource: String,
    pub label_selector: Option<LabelSelector>,
}

pub async fn sync<K: HookResource>(ctx: &HookContext, request: SyncRequest<K>) -> SyncResponse {
    let env = ctx.environment(&request.related);
    let action = request.parent.sync_action(ctx, &env).await;
    let status = run_action(action).await;

    let resync_after_seconds = status.is_pending().then_some(ctx.config.resync_after_secs);
    match &status.state {
        State::Error { error } => warn!("Sync of {} failed: {}", K::KIND, error),
        state => info!("Sync of {} finished: {}", K::KIND, state),
    }

    SyncResponse {
        status: status.into(),
        resync_after_seconds,
    }
}

pub async fn finalize<K: HookResource>(ctx: &HookContext, request: SyncRequest<K>) -> FinalizeResponse {
    let env = ctx.environment(&request.related);
    let action = request.parent.finalize_action(ctx, &env).await;
    let status = run_action(action).await;

    match status.state {
        State::Ready => {
            info!("Finalized {}", K::KIND);
            FinalizeResponse {
                finalized: true,
                resync_after_seconds: None,
                error: None,
            }
        }
        State::Pending => FinalizeResponse {
            finalized: false,
            resync_after_seconds: Some(ctx.config.resync_after_secs),
            error: None,
        },
        State::Error { error } => {
            warn!("Finalize of {} failed: {}", K::KIND, error);
            FinalizeResponse {
                finalized: false,
                resync_after_seconds: None,
                error: Some(error),
            }
        }
    }
}

/// Config maps and secrets matching the parent's target selector
pub fn customize<K: TargetSelected>(parent: &K) -> CustomizeResponse {
    let label_selector = parent.target_selector().cloned();
    let rule = |resource: &str| RelatedResourceRule {
        api_version: K8S_API_VERSION.to_string(),
        resource: resource.to_string(),
        label_selector: label_selector.clone(),
    };

    CustomizeResponse {
        related_resource_rules: vec![rule("configmaps"), rule("secrets")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{HyperProtectInstance, HyperProtectInstanceSpec};
    use std::collections::BTreeMap;

    #[test]
    fn test_customize_uses_target_selector() {
        let selector = LabelSelector {
            match_labels: Some(BTreeMap::from([("app".to_string(), "enclave".to_string())])),
            ..Default::default()
        };
        let parent = HyperProtectInstance::new(
            "enclave",
            HyperProtectInstanceSpec {
                contract: "c".to_string(),
                subnet_id: None,
                profile_name: None,
                target_selector: Some(selector),
            },
        );

        let json = serde_json::to_value(customize(&parent)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "relatedResourceRules": [
                    { "apiVersion": "v1", "resource": "configmaps", "labelSelector": { "matchLabels": { "app": "enclave" } } },
                    { "apiVersion": "v1", "resource": "secrets", "labelSelector": { "matchLabels": { "app": "enclave" } } }
                ]
            })
        );
    }

    #[test]
    fn test_finalize_response_omits_empty_fields() {
        let response = FinalizeResponse {
            finalized: true,
            resync_after_seconds: None,
            error: None,
        };
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            serde_json::json!({ "finalized": true })
        );
    }
}
