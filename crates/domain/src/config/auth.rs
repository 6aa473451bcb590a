use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Caller authentication
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Environment variable holding the HS256 secret used to verify
    /// bearer-credential signatures. When unset the gateway decodes
    /// credentials without verifying them and logs a warning at startup
    /// — only acceptable when a trusted proxy terminates auth upstream.
    #[serde(default)]
    pub jwt_secret_env: Option<String>,
}
