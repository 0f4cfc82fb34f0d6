//! # Controller Configuration
//!
//! Process-wide settings loaded once from environment variables.

/// Controller-level configuration
///
/// Built once at start-up and shared read-only with every hook invocation.
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Prefix of every provider-side instance name (`<prefix>-<uid>`)
    pub service_prefix: String,
    /// Instance profile used when neither the resource nor the environment names one
    pub default_profile: String,
    /// Retry hint returned to the orchestrator for resources that are not terminal yet
    pub resync_after_secs: u64,
    /// HTTP port of the hook server
    pub port: u16,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            service_prefix: DEFAULT_SERVICE_PREFIX.to_string(),
            default_profile: DEFAULT_PROFILE_NAME.to_string(),
            resync_after_secs: DEFAULT_RESYNC_AFTER_SECS,
            port: DEFAULT_SERVER_PORT,
            log_level: "INFO".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        use crate::constants::*;
        Self {
            service_prefix: env_var_or_default_str("HPCR_SERVICE_PREFIX", DEFAULT_SERVICE_PREFIX),
            default_profile: env_var_or_default_str("HPCR_DEFAULT_PROFILE", DEFAULT_PROFILE_NAME),
            resync_after_secs: env_var_or_default("HPCR_RESYNC_AFTER_SECS", DEFAULT_RESYNC_AFTER_SECS),
            port: env_var_or_default("PORT", DEFAULT_SERVER_PORT),
            log_level: env_var_or_default_str("LOG_LEVEL", "INFO"),
            log_format: env_var_or_default_str("LOG_FORMAT", "text"),
        }
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
