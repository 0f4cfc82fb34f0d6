//! # Provider Modules
//!
//! Collaborators the reconciliation core talks to:
//!
//! - `VpcProvider` for IBM Cloud VPC (subnets, images, instances)
//! - `TaggingProvider` for IBM Cloud Global Tagging (user tags on created instances)
//! - `VirtualizationProvider` for on-prem libvirt (networks, storage volumes)
//!
//! Clients are built per hook invocation from the merged environment through a
//! [`ProviderFactory`], so credentials always come from the config maps and secrets
//! selected by the resource being reconciled.

use crate::controller::environment::Environment;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod libvirt;
pub mod vpc;

pub use libvirt::{Network, StorageVolume, VirshClient};
pub use vpc::{Image, Instance, InstancePrototype, Subnet, TaggingClient, VpcClient};

/// Errors raised by provider clients
///
/// Not-found and transport failures are reported separately here but the
/// reconciliation layer treats both as lookup errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// IBM Cloud VPC operations used by the instance hooks
#[async_trait]
pub trait VpcProvider: std::fmt::Debug + Send + Sync {
    /// Get a subnet by ID, including its VPC and zone
    async fn get_subnet(&self, subnet_id: &str) -> Result<Subnet>;

    /// Find an image by its exact name
    async fn find_image_by_name(&self, name: &str) -> Result<Image>;

    /// Find the newest available public Hyper Protect Container Runtime image
    async fn find_latest_stock_image(&self) -> Result<Image>;

    /// List instances with the given name (zero or one in practice, names are unique per VPC region)
    async fn find_instances_by_name(&self, name: &str) -> Result<Vec<Instance>>;

    /// Create an instance
    async fn create_instance(&self, prototype: &InstancePrototype) -> Result<Instance>;

    /// Delete an instance; deletion completes asynchronously on the provider side
    async fn delete_instance(&self, instance_id: &str) -> Result<()>;
}

/// Resource tagging used by the instance sync hook
#[async_trait]
pub trait TaggingProvider: std::fmt::Debug + Send + Sync {
    /// Attach user tags to the resource with `crn`; tags already attached are kept
    async fn attach_tags(&self, crn: &str, tags: &[String]) -> Result<()>;
}

/// On-prem virtualization lookups used by the reference hooks
#[async_trait]
pub trait VirtualizationProvider: std::fmt::Debug + Send + Sync {
    /// Look up a network by name
    async fn get_network(&self, name: &str) -> Result<Network>;

    /// Look up a volume in a storage pool
    async fn get_storage_volume(&self, pool: &str, name: &str) -> Result<StorageVolume>;
}

/// Builds provider clients from the environment of one hook invocation
pub trait ProviderFactory: std::fmt::Debug + Send + Sync {
    fn vpc(&self, env: &Environment) -> Result<Arc<dyn VpcProvider>>;

    fn tagging(&self, env: &Environment) -> Result<Arc<dyn TaggingProvider>>;

    fn virtualization(&self, env: &Environment) -> Result<Arc<dyn VirtualizationProvider>>;
}

/// Factory producing the real REST and virsh clients
#[derive(Debug, Clone, Default)]
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn vpc(&self, env: &Environment) -> Result<Arc<dyn VpcProvider>> {
        Ok(Arc::new(VpcClient::from_env(env)?))
    }

    fn tagging(&self, env: &Environment) -> Result<Arc<dyn TaggingProvider>> {
        Ok(Arc::new(TaggingClient::from_env(env)?))
    }

    fn virtualization(&self, env: &Environment) -> Result<Arc<dyn VirtualizationProvider>> {
        Ok(Arc::new(VirshClient::from_env(env)))
    }
}
