//! # Libvirt Client
//!
//! Wraps the `virsh` CLI for the on-prem reference lookups.
//!
//! `net-info` and `vol-info` print `Key: Value` lines, which is all the reference
//! hooks need to confirm a resource exists and report its identity.

use crate::constants::{DEFAULT_LIBVIRT_URI, KEY_LIBVIRT_URI};
use crate::controller::environment::Environment;
use crate::provider::{ProviderError, Result, VirtualizationProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A libvirt network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub name: String,
    pub uuid: String,
    pub active: bool,
    pub persistent: bool,
    pub autostart: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge: Option<String>,
}

/// A volume inside a libvirt storage pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageVolume {
    pub name: String,
    pub pool: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub capacity: String,
    pub allocation: String,
    pub path: String,
}

/// `virsh` wrapper bound to one connection URI
#[derive(Debug, Clone)]
pub struct VirshClient {
    uri: String,
}

impl VirshClient {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// Connection URI from `LIBVIRT_URI`, defaulting to the local system daemon
    pub fn from_env(env: &Environment) -> Self {
        Self::new(env.get(KEY_LIBVIRT_URI).unwrap_or(DEFAULT_LIBVIRT_URI))
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Run a virsh command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("virsh");
        cmd.arg("-c").arg(&self.uri);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!("Running: virsh -c {} {}", self.uri, args.join(" "));

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if is_not_found(stderr) {
                return Err(ProviderError::NotFound(stderr.to_string()));
            }
            return Err(ProviderError::CommandFailed(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl VirtualizationProvider for VirshClient {
    async fn get_network(&self, name: &str) -> Result<Network> {
        let output = self.run_command(&["net-info", name]).await?;
        parse_network(&output)
    }

    async fn get_storage_volume(&self, pool: &str, name: &str) -> Result<StorageVolume> {
        let info = self.run_command(&["vol-info", "--pool", pool, name]).await?;
        let path = self.run_command(&["vol-path", "--pool", pool, name]).await?;
        parse_storage_volume(name, pool, &info, path.trim())
    }
}

fn is_not_found(stderr: &str) -> bool {
    stderr.contains("Network not found")
        || stderr.contains("Storage volume not found")
        || stderr.contains("Storage pool not found")
        || stderr.contains("failed to get")
}

/// Parse `Key: Value` lines into a map; lines without a colon are skipped
pub fn parse_info(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn required(info: &HashMap<String, String>, key: &str) -> Result<String> {
    info.get(key)
        .cloned()
        .ok_or_else(|| ProviderError::CommandFailed(format!("virsh output is missing [{key}]")))
}

fn yes(info: &HashMap<String, String>, key: &str) -> bool {
    info.get(key).is_some_and(|v| v.eq_ignore_ascii_case("yes"))
}

fn parse_network(output: &str) -> Result<Network> {
    let info = parse_info(output);
    Ok(Network {
        name: required(&info, "Name")?,
        uuid: required(&info, "UUID")?,
        active: yes(&info, "Active"),
        persistent: yes(&info, "Persistent"),
        autostart: yes(&info, "Autostart"),
        bridge: info.get("Bridge").filter(|b| !b.is_empty()).cloned(),
    })
}

fn parse_storage_volume(name: &str, pool: &str, output: &str, path: &str) -> Result<StorageVolume> {
    let info = parse_info(output);
    Ok(StorageVolume {
        name: info.get("Name").cloned().unwrap_or_else(|| name.to_string()),
        pool: pool.to_string(),
        kind: required(&info, "Type")?,
        capacity: required(&info, "Capacity")?,
        allocation: required(&info, "Allocation")?,
        path: path.to_string(),
    })
}
