//! # VPC Instances
//!
//! Hooks for `HyperProtectInstance`: one Hyper Protect Container Runtime instance
//! per resource on IBM Cloud VPC.

mod actions;
mod options;

pub use actions::{FinalizeInstanceAction, SyncInstanceAction};
pub use options::{
    get_image_id, get_profile_name, get_subnet_id, instance_name, instance_name_from_uid, instance_tags,
    resolve_instance_options, InstanceOptions,
};

use crate::controller::action::{error_action, Action};
use crate::controller::environment::Environment;
use crate::controller::hooks::{HookContext, HookResource};
use crate::controller::ActionError;
use crate::crd::HyperProtectInstance;
use crate::provider::VpcProvider;
use async_trait::async_trait;
use std::sync::Arc;

async fn resolve(
    parent: &HyperProtectInstance,
    ctx: &HookContext,
    env: &Environment,
) -> Result<(Arc<dyn VpcProvider>, InstanceOptions), ActionError> {
    let vpc = ctx.providers.vpc(env)?;
    let options = resolve_instance_options(&ctx.config, parent, env, vpc.as_ref()).await?;
    Ok((vpc, options))
}

#[async_trait]
impl HookResource for HyperProtectInstance {
    const KIND: &'static str = "HyperProtectInstance";

    async fn sync_action(&self, ctx: &HookContext, env: &Environment) -> Box<dyn Action> {
        let tagging = match ctx.providers.tagging(env) {
            Ok(tagging) => tagging,
            Err(e) => return error_action(e),
        };
        match resolve(self, ctx, env).await {
            Ok((vpc, options)) => Box::new(SyncInstanceAction::new(vpc, tagging, options)),
            Err(e) => error_action(e),
        }
    }

    async fn finalize_action(&self, ctx: &HookContext, env: &Environment) -> Box<dyn Action> {
        match resolve(self, ctx, env).await {
            Ok((vpc, options)) => Box::new(FinalizeInstanceAction::new(vpc, &options)),
            Err(e) => error_action(e),
        }
    }
}
