//! # Controller Errors

use crate::provider::ProviderError;
use thiserror::Error;

/// Failure to derive the desired configuration of a resource
///
/// Resolution stops at the first failure; no partially resolved options are ever
/// returned alongside one of these.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A required value is set neither on the resource nor in the environment
    #[error("unable to load the {field} from config value [{key}]")]
    MissingConfig {
        field: &'static str,
        key: &'static str,
    },

    /// A required spec field without an environment fallback is not set
    #[error("required field [{0}] is not set")]
    MissingField(&'static str),

    /// The parent carries no `metadata.uid`, so it cannot be named
    #[error("resource has no metadata.uid")]
    MissingUid,

    #[error("lookup failed: {0}")]
    Lookup(#[from] ProviderError),
}

/// Failure of an action, or of the setup that should have produced one
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The provider reports the resource as permanently broken
    #[error("provisioning failed: {0}")]
    Provisioning(String),
}
