//! Google Gemini adapter.
//!
//! Implements the Gemini `generateContent` API. Auth is via an API key
//! passed as a query parameter (`key={api_key}`).

use serde_json::Value;

use wp_domain::config::LlmConfig;
use wp_domain::error::{Error, Result};

use crate::traits::{Completion, CompletionProvider, CompletionRequest};
use crate::util::{from_reqwest, resolve_api_key};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A completion-provider adapter for the Google Gemini API.
pub struct GeminiProvider {
    id: String,
    base_url: String,
    api_key: String,
    default_model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new provider from the LLM config. Resolves the API key
    /// from the environment variable named in `cfg.api_key_env`.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.api_key_env)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: "gemini".into(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model: cfg.primary_model.clone(),
            client,
        })
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }
}

/// Build the `generateContent` request body.
pub(crate) fn build_body(req: &CompletionRequest) -> Value {
    let mut body = serde_json::json!({
        "contents": [
            {
                "role": "user",
                "parts": [{"text": req.payload}],
            }
        ],
        "systemInstruction": {
            "role": "system",
            "parts": [{"text": req.system_instruction}],
        },
    });

    let mut gen_config = serde_json::json!({});
    if let Some(temp) = req.temperature {
        gen_config["temperature"] = serde_json::json!(temp);
    }
    if let Some(top_p) = req.top_p {
        gen_config["topP"] = serde_json::json!(top_p);
    }
    if gen_config.as_object().is_some_and(|o| !o.is_empty()) {
        body["generationConfig"] = gen_config;
    }

    body
}

/// Extract the concatenated candidate text from a `generateContent`
/// response. Empty or missing text is an [`Error::EmptyCompletion`].
pub(crate) fn parse_completion_text(body: &Value) -> Result<String> {
    let parts = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array());

    let text = parts
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(Error::EmptyCompletion);
    }
    Ok(text.to_owned())
}

#[async_trait::async_trait]
impl CompletionProvider for GeminiProvider {
    async fn generate(&self, req: &CompletionRequest) -> Result<Completion> {
        let model = req
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());
        let url = self.generate_url(&model);
        let body = build_body(req);

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::ModelNotFound(model));
        }
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!(
                    "completion failed with status {status}{}",
                    if body_text.is_empty() {
                        String::new()
                    } else {
                        format!(": {body_text}")
                    }
                ),
            });
        }

        let json: Value = resp.json().await.map_err(from_reqwest)?;
        let text = parse_completion_text(&json)?;

        tracing::debug!(model = %model, chars = text.len(), "completion received");

        Ok(Completion { text, model })
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}
