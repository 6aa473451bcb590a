mod auth;
mod features;
mod llm;
mod observability;
mod server;
mod store;

pub use auth::*;
pub use features::*;
pub use llm::*;
pub use observability::*;
pub use server::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.llm.primary_model.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.primary_model".into(),
                message: "primary_model must not be empty".into(),
            });
        }

        if self.llm.fallback_model.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.fallback_model".into(),
                message: "fallback_model must not be empty".into(),
            });
        }

        if self.store.backend == StoreBackend::Rest && self.store.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "store.base_url".into(),
                message: "base_url must not be empty when backend = \"rest\"".into(),
            });
        }

        if self.features.extraction.interval == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "features.extraction.interval".into(),
                message: "interval must be greater than 0".into(),
            });
        }

        if self.features.extraction.early_window_max < self.features.extraction.min_messages {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "features.extraction.early_window_max".into(),
                message: "early window ends before min_messages; the early pass never fires"
                    .into(),
            });
        }

        if self.auth.jwt_secret_env.is_none() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "auth.jwt_secret_env".into(),
                message: "no JWT secret configured — bearer credentials are decoded \
                          without signature verification"
                    .into(),
            });
        }

        errors
    }

    /// True when any validation issue is an error (not just a warning).
    pub fn has_errors(&self) -> bool {
        self.validate()
            .iter()
            .any(|e| e.severity == ConfigSeverity::Error)
    }
}
