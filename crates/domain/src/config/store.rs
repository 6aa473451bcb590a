use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Persistent store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which `ContextStore` backend the gateway builds at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// PostgREST-style HTTP API (production).
    #[default]
    Rest,
    /// In-process maps. No persistence across restarts; for development
    /// and tests.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the REST store (the `/rest/v1` prefix is appended per
    /// request).
    #[serde(default = "d_store_url")]
    pub base_url: String,
    /// Environment variable holding the store service key.
    #[serde(default = "d_store_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries on transient (5xx / timeout) failures.
    #[serde(default = "d_retries")]
    pub max_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Rest,
            base_url: d_store_url(),
            api_key_env: d_store_key_env(),
            timeout_ms: d_timeout_ms(),
            max_retries: d_retries(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_store_url() -> String {
    "http://127.0.0.1:8000".into()
}
fn d_store_key_env() -> String {
    "WAYPOINT_STORE_KEY".into()
}
fn d_timeout_ms() -> u64 {
    10_000
}
fn d_retries() -> u32 {
    2
}
