//! # Configuration
//!
//! Process-wide controller configuration.

mod controller;

pub use controller::ControllerConfig;

use std::sync::Arc;

/// Configuration shared between the server and every request handler
pub type SharedControllerConfig = Arc<ControllerConfig>;
