use wp_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider-agnostic completion request: one system instruction plus
/// one conversation payload, generated in a single round trip.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model identifier override. `None` uses the provider default.
    pub model: Option<String>,
    /// The system instruction (persona prompt, classifier instruction,
    /// extraction instruction, ...).
    pub system_instruction: String,
    /// The user-side payload: the assembled context document or a
    /// transcript to analyze.
    pub payload: String,
    /// Sampling temperature. `None` lets the provider choose.
    pub temperature: Option<f32>,
    /// Nucleus-sampling cutoff. `None` lets the provider choose.
    pub top_p: Option<f32>,
}

/// A successful completion.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text. Guaranteed non-empty: providers reject empty
    /// candidates as `Error::EmptyCompletion`.
    pub text: String,
    /// The model that actually produced the response.
    pub model: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core provider trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trait implemented by completion-service adapters.
///
/// The contract the turn pipeline relies on:
/// - a request against a nonexistent model fails with
///   [`wp_domain::Error::ModelNotFound`] (the invoker's fallback trigger);
/// - a success always carries non-empty text.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate text for the given request and wait for the full response.
    async fn generate(&self, req: &CompletionRequest) -> Result<Completion>;

    /// A unique identifier for this provider instance.
    fn provider_id(&self) -> &str;
}
