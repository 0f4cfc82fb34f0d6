//! # Instance Actions
//!
//! Sync and finalize actions for VPC instances.
//!
//! Both find the instance by its deterministic name, so repeated invocations for the
//! same resource always address the same instance.
//!
//! Sync attaches the owner tags right after creating the instance and again whenever
//! it reports the instance running, so a failed attach is retried on the next sync.

use crate::controller::action::{describe, Action, ResourceStatus};
use crate::controller::vpc::InstanceOptions;
use crate::controller::ActionError;
use crate::provider::{Instance, InstancePrototype, TaggingProvider, VpcProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

async fn find_instance(vpc: &dyn VpcProvider, name: &str) -> Result<Option<Instance>, ActionError> {
    let instances = vpc.find_instances_by_name(name).await?;
    if instances.len() > 1 {
        warn!("Found {} instances named [{}], using the first", instances.len(), name);
    }
    Ok(instances.into_iter().next())
}

fn running_status(instance: &Instance) -> ResourceStatus {
    let serialized = describe("instance", instance);
    let description = serialized
        .as_ref()
        .map_or_else(|| format!("instance [{}] is running", instance.name), ToString::to_string);

    let mut status = ResourceStatus::ready(description)
        .with_metadata("instanceID", instance.id.as_str())
        .with_metadata("instanceName", instance.name.as_str())
        .with_metadata("vpcID", instance.vpc.id.as_str())
        .with_metadata("zone", instance.zone.name.as_str());
    if let Some(serialized) = serialized {
        status = status.with_metadata("instance", serialized);
    }
    status
}

/// Creates the instance when missing and reports whether it is running
#[derive(Debug)]
pub struct SyncInstanceAction {
    vpc: Arc<dyn VpcProvider>,
    tagging: Arc<dyn TaggingProvider>,
    options: InstanceOptions,
}

impl SyncInstanceAction {
    pub fn new(vpc: Arc<dyn VpcProvider>, tagging: Arc<dyn TaggingProvider>, options: InstanceOptions) -> Self {
        Self { vpc, tagging, options }
    }

    async fn tag(&self, instance: &Instance) -> Result<(), ActionError> {
        debug!("Tagging instance [{}] with {:?}", instance.name, self.options.tags);
        self.tagging.attach_tags(&instance.crn, &self.options.tags).await?;
        Ok(())
    }
}

#[async_trait]
impl Action for SyncInstanceAction {
    async fn execute(self: Box<Self>) -> Result<ResourceStatus, ActionError> {
        let name = &self.options.name;

        let Some(instance) = find_instance(self.vpc.as_ref(), name).await? else {
            info!("Creating instance [{}]", name);
            let created = self
                .vpc
                .create_instance(&InstancePrototype::from(&self.options))
                .await?;
            self.tag(&created).await?;
            return Ok(ResourceStatus::pending(format!(
                "instance [{}] created, waiting for it to start",
                created.name
            ))
            .with_metadata("instanceID", created.id)
            .with_metadata("instanceName", created.name));
        };

        if instance.is_running() {
            self.tag(&instance).await?;
            return Ok(running_status(&instance));
        }
        if instance.is_failed() {
            return Err(ActionError::Provisioning(format!(
                "instance [{}] ({}) is in state [failed]",
                instance.name, instance.id
            )));
        }

        info!("Instance [{}] is [{}]", instance.name, instance.status);
        Ok(ResourceStatus::pending(format!(
            "instance [{}] is [{}]",
            instance.name, instance.status
        ))
        .with_metadata("instanceID", instance.id)
        .with_metadata("instanceName", instance.name))
    }
}

/// Deletes the instance and reports `Ready` once it is gone
#[derive(Debug)]
pub struct FinalizeInstanceAction {
    vpc: Arc<dyn VpcProvider>,
    name: String,
}

impl FinalizeInstanceAction {
    pub fn new(vpc: Arc<dyn VpcProvider>, options: &InstanceOptions) -> Self {
        Self {
            vpc,
            name: options.name.clone(),
        }
    }
}

#[async_trait]
impl Action for FinalizeInstanceAction {
    async fn execute(self: Box<Self>) -> Result<ResourceStatus, ActionError> {
        let Some(instance) = find_instance(self.vpc.as_ref(), &self.name).await? else {
            info!("Instance [{}] is gone", self.name);
            return Ok(ResourceStatus::ready(format!("instance [{}] has been deleted", self.name)));
        };

        if !instance.is_deleting() {
            info!("Deleting instance [{}] ({})", instance.name, instance.id);
            self.vpc.delete_instance(&instance.id).await?;
        }

        Ok(ResourceStatus::pending(format!(
            "instance [{}] is being deleted",
            instance.name
        ))
        .with_metadata("instanceID", instance.id))
    }
}
