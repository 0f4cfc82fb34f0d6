//! # Environment
//!
//! Flat key/value configuration of one hook invocation.
//!
//! The orchestrator attaches the config maps and secrets selected by the parent's
//! target selector to every sync and finalize request. They are merged into an
//! [`Environment`]: all config maps first, then all secrets, each group in
//! `namespace/name` order, with later entries overriding earlier ones.
//!
//! Empty values count as unset: they are dropped on the way in and never shadow an
//! entry merged earlier.

use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Related objects as sent by the orchestrator: `"<Kind>.<version>"` to
/// `"<namespace>/<name>"` to object
pub type RelatedResources = BTreeMap<String, BTreeMap<String, Value>>;

const RELATED_CONFIG_MAPS: &str = "ConfigMap.v1";
const RELATED_SECRETS: &str = "Secret.v1";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment(BTreeMap<String, String>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set `key`, ignoring empty values
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.0.insert(key.into(), value);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// This environment with every entry of `overrides` applied on top
    #[must_use]
    pub fn layered(&self, overrides: Environment) -> Self {
        let mut merged = self.clone();
        merged.extend(overrides.0);
        merged
    }

    /// Merge the config maps and secrets attached to a hook request
    ///
    /// Objects that do not decode are skipped with a warning.
    pub fn from_related(related: &RelatedResources) -> Self {
        let mut env = Self::new();

        for (key, object) in related.get(RELATED_CONFIG_MAPS).into_iter().flatten() {
            match serde_json::from_value::<ConfigMap>(object.clone()) {
                Ok(config_map) => {
                    debug!("Merging config map {}", key);
                    env.extend(config_map.data.unwrap_or_default());
                }
                Err(e) => warn!("Skipping config map {}: {}", key, e),
            }
        }

        for (key, object) in related.get(RELATED_SECRETS).into_iter().flatten() {
            match serde_json::from_value::<Secret>(object.clone()) {
                Ok(secret) => {
                    debug!("Merging secret {}", key);
                    for (name, value) in secret.data.unwrap_or_default() {
                        match String::from_utf8(value.0) {
                            Ok(value) => env.insert(name, value),
                            Err(_) => warn!("Skipping non UTF-8 entry {} of secret {}", name, key),
                        }
                    }
                    env.extend(secret.string_data.unwrap_or_default());
                }
                Err(e) => warn!("Skipping secret {}: {}", key, e),
            }
        }

        env
    }

    /// Load a `.env` file
    pub fn from_dotenv(path: impl AsRef<Path>) -> Result<Self, dotenvy::Error> {
        dotenvy::from_path_iter(path.as_ref())?.collect()
    }
}

impl Extend<(String, String)> for Environment {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl FromIterator<(String, String)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut env = Self::new();
        env.extend(iter);
        env
    }
}
