use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM completion service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Gemini-compatible completion endpoint.
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Model requested first for every completion.
    #[serde(default = "d_primary_model")]
    pub primary_model: String,
    /// Model retried once when the primary reports model-not-found.
    #[serde(default = "d_fallback_model")]
    pub fallback_model: String,
    /// Sampling temperature for coach turns. Instruction calls (classifier,
    /// extraction) use their own lower fixed temperature.
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default = "d_top_p")]
    pub top_p: f32,
    /// Environment variable holding the completion-service API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            primary_model: d_primary_model(),
            fallback_model: d_fallback_model(),
            temperature: d_temperature(),
            top_p: d_top_p(),
            api_key_env: d_api_key_env(),
            timeout_ms: d_timeout_ms(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn d_primary_model() -> String {
    "gemini-3-flash-preview".into()
}
fn d_fallback_model() -> String {
    "gemini-2.5-flash".into()
}
fn d_temperature() -> f32 {
    0.7
}
fn d_top_p() -> f32 {
    0.95
}
fn d_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn d_timeout_ms() -> u64 {
    60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_gemini() {
        let cfg = LlmConfig::default();
        assert!(cfg.base_url.contains("generativelanguage"));
        assert_ne!(cfg.primary_model, cfg.fallback_model);
        assert_eq!(cfg.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: LlmConfig = toml::from_str(r#"primary_model = "gemini-exp""#).unwrap();
        assert_eq!(cfg.primary_model, "gemini-exp");
        assert_eq!(cfg.fallback_model, "gemini-2.5-flash");
        assert!((cfg.temperature - 0.7).abs() < f32::EPSILON);
    }
}
