//! # Controller
//!
//! Reconciliation core behind the hook endpoints.
//!
//! - `action`: Outcome model (`ResourceStatus`, `Action`)
//! - `environment`: Flat configuration merged from config maps and secrets
//! - `hooks`: Sync, finalize and customize state machine
//! - `vpc`: `HyperProtectInstance` resolution and actions
//! - `onprem`: `NetworkRef` and `DataDiskRef` resolution and actions
//!
//! Nothing here keeps state between requests. Every invocation resolves the desired
//! configuration again and compares it with what the providers report.

pub mod action;
pub mod environment;
mod error;
pub mod hooks;
pub mod onprem;
pub mod vpc;

pub use action::{error_action, run_action, Action, ResourceStatus, State};
pub use environment::Environment;
pub use error::{ActionError, ResolveError};
pub use hooks::HookContext;
