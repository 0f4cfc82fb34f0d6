//! # HPCR Controller
//!
//! Metacontroller hooks provisioning Hyper Protect Container Runtime instances on
//! IBM Cloud VPC, plus references to on-prem libvirt networks and data disks.
//!
//! The orchestrator calls the hooks over HTTP; every call is an independent tick that
//! resolves the desired configuration of one resource, compares it with what the
//! providers report and answers with `Ready`, `Pending` or `Error`. No state is kept
//! between calls: instances are found again through their deterministic names.
//!
//! ## Modules
//!
//! - `config`: Process-wide controller configuration
//! - `constants`: Defaults and environment keys
//! - `controller`: Outcome model, configuration resolution and hook state machine
//! - `crd`: Custom resource types
//! - `observability`: Logging and Prometheus metrics
//! - `provider`: IBM Cloud VPC and libvirt clients
//! - `server`: HTTP routing

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod provider;
pub mod server;
