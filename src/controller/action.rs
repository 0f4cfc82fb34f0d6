//! # Actions
//!
//! The outcome model shared by every hook.
//!
//! An [`Action`] closes over everything resolved for one request and is consumed by
//! its single execution. It produces a [`ResourceStatus`] or fails with an
//! [`ActionError`]; [`run_action`] folds the failure case into an `Error` status so the
//! hook layer always has a complete outcome to report.

use crate::controller::ActionError;
use crate::crd::{ReconcileStatus, RESERVED_STATUS_KEYS};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Reconciliation state of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Ready,
    Pending,
    Error { error: String },
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Ready => "Ready",
            State::Pending => "Pending",
            State::Error { .. } => "Error",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one reconciliation attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceStatus {
    pub state: State,
    pub description: String,
    pub metadata: BTreeMap<String, Value>,
}

impl ResourceStatus {
    fn new(state: State, description: impl Into<String>) -> Self {
        Self {
            state,
            description: description.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn ready(description: impl Into<String>) -> Self {
        Self::new(State::Ready, description)
    }

    pub fn pending(description: impl Into<String>) -> Self {
        Self::new(State::Pending, description)
    }

    pub fn error(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::new(
            State::Error {
                error: error.clone(),
            },
            error,
        )
    }

    /// Error status carrying the message of `err`
    pub fn from_error(err: &(dyn std::error::Error + '_)) -> Self {
        Self::error(err.to_string())
    }

    /// Attach a metadata entry; keys of the fixed status fields are refused
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if RESERVED_STATUS_KEYS.contains(&key.as_str()) {
            warn!("Ignoring metadata [{}], it would shadow a status field", key);
            return self;
        }
        self.metadata.insert(key, value.into());
        self
    }

    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    pub fn is_pending(&self) -> bool {
        self.state == State::Pending
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            State::Error { error } => Some(error),
            _ => None,
        }
    }
}

impl From<ResourceStatus> for ReconcileStatus {
    fn from(status: ResourceStatus) -> Self {
        let error = status.error_message().map(str::to_string);
        ReconcileStatus {
            status: Some(status.state.as_str().to_string()),
            description: Some(status.description),
            error,
            metadata: status.metadata,
        }
    }
}

/// A deferred unit of reconciliation work, executed exactly once
#[async_trait]
pub trait Action: Send {
    async fn execute(self: Box<Self>) -> Result<ResourceStatus, ActionError>;
}

/// Action that fails immediately with an error raised while preparing the real one
#[derive(Debug)]
pub struct ErrorAction {
    error: ActionError,
}

#[async_trait]
impl Action for ErrorAction {
    async fn execute(self: Box<Self>) -> Result<ResourceStatus, ActionError> {
        Err(self.error)
    }
}

pub fn error_action(error: impl Into<ActionError>) -> Box<dyn Action> {
    Box::new(ErrorAction {
        error: error.into(),
    })
}

/// Action that reports a fixed outcome without touching any collaborator
#[derive(Debug)]
pub struct ImmediateAction {
    status: ResourceStatus,
}

#[async_trait]
impl Action for ImmediateAction {
    async fn execute(self: Box<Self>) -> Result<ResourceStatus, ActionError> {
        Ok(self.status)
    }
}

pub fn immediate_action(status: ResourceStatus) -> Box<dyn Action> {
    Box::new(ImmediateAction { status })
}

/// Execute an action, turning a failure into an `Error` status
pub async fn run_action(action: Box<dyn Action>) -> ResourceStatus {
    match action.execute().await {
        Ok(status) => status,
        Err(e) => {
            warn!("Action failed: {}", e);
            ResourceStatus::from_error(&e)
        }
    }
}

/// Serialize a provider object for a status, logging instead of failing
///
/// Enrichment must never downgrade a successful lookup, so callers simply leave the
/// field out when this returns `None`.
pub fn describe<T: Serialize>(what: &str, value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to serialize {} for status: {}", what, e);
            None
        }
    }
}
