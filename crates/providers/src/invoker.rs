//! The turn invoker: one completion call with a deterministic
//! fallback-model policy.
//!
//! When the requested model fails with model-not-found and differs from
//! the configured fallback, the call is retried exactly once against the
//! fallback model. Every other failure is fatal for the turn.

use std::sync::Arc;

use wp_domain::error::{Error, Result};

use crate::traits::{Completion, CompletionProvider, CompletionRequest};

/// Wraps a [`CompletionProvider`] with the primary/fallback model pair.
#[derive(Clone)]
pub struct TurnInvoker {
    provider: Arc<dyn CompletionProvider>,
    primary_model: String,
    fallback_model: String,
}

impl TurnInvoker {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        primary_model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            primary_model: primary_model.into(),
            fallback_model: fallback_model.into(),
        }
    }

    pub fn primary_model(&self) -> &str {
        &self.primary_model
    }

    /// Run one completion. The request's model override (or the primary
    /// model) is tried first; a model-not-found failure triggers the
    /// single fallback retry.
    pub async fn invoke(&self, req: &CompletionRequest) -> Result<Completion> {
        let model = req
            .model
            .clone()
            .unwrap_or_else(|| self.primary_model.clone());

        let mut attempt = req.clone();
        attempt.model = Some(model.clone());

        match self.provider.generate(&attempt).await {
            Err(Error::ModelNotFound(missing)) if model != self.fallback_model => {
                tracing::warn!(
                    requested = %missing,
                    fallback = %self.fallback_model,
                    "model not found, retrying once against fallback"
                );
                attempt.model = Some(self.fallback_model.clone());
                self.provider.generate(&attempt).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted provider: fails with ModelNotFound for listed models,
    /// records every requested model.
    struct ScriptedProvider {
        missing_models: Vec<String>,
        calls: AtomicUsize,
        requested: Mutex<Vec<String>>,
        error: Option<fn() -> Error>,
    }

    impl ScriptedProvider {
        fn missing(models: &[&str]) -> Self {
            Self {
                missing_models: models.iter().map(|m| m.to_string()).collect(),
                calls: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
                error: None,
            }
        }

        fn failing(error: fn() -> Error) -> Self {
            Self {
                missing_models: Vec::new(),
                calls: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
                error: Some(error),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn generate(&self, req: &CompletionRequest) -> Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let model = req.model.clone().unwrap_or_default();
            self.requested.lock().unwrap().push(model.clone());

            if let Some(make_error) = self.error {
                return Err(make_error());
            }
            if self.missing_models.contains(&model) {
                return Err(Error::ModelNotFound(model));
            }
            Ok(Completion {
                text: format!("reply from {model}"),
                model,
            })
        }

        fn provider_id(&self) -> &str {
            "scripted"
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_instruction: "sys".into(),
            payload: "hello".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn healthy_primary_needs_no_fallback() {
        let provider = Arc::new(ScriptedProvider::missing(&[]));
        let invoker = TurnInvoker::new(provider.clone(), "primary", "fallback");

        let completion = invoker.invoke(&request()).await.unwrap();
        assert_eq!(completion.model, "primary");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn model_not_found_retries_exactly_once() {
        let provider = Arc::new(ScriptedProvider::missing(&["primary"]));
        let invoker = TurnInvoker::new(provider.clone(), "primary", "fallback");

        let completion = invoker.invoke(&request()).await.unwrap();
        assert_eq!(completion.model, "fallback");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            *provider.requested.lock().unwrap(),
            vec!["primary".to_string(), "fallback".to_string()]
        );
    }

    #[tokio::test]
    async fn fallback_also_missing_is_fatal_without_looping() {
        let provider = Arc::new(ScriptedProvider::missing(&["primary", "fallback"]));
        let invoker = TurnInvoker::new(provider.clone(), "primary", "fallback");

        let err = invoker.invoke(&request()).await.unwrap_err();
        assert!(matches!(err, Error::ModelNotFound(m) if m == "fallback"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_retry_when_primary_is_the_fallback() {
        let provider = Arc::new(ScriptedProvider::missing(&["fallback"]));
        let invoker = TurnInvoker::new(provider.clone(), "fallback", "fallback");

        let err = invoker.invoke(&request()).await.unwrap_err();
        assert!(matches!(err, Error::ModelNotFound(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_provider_errors_do_not_trigger_fallback() {
        let provider = Arc::new(ScriptedProvider::failing(|| Error::Provider {
            provider: "scripted".into(),
            message: "completion failed with status 503".into(),
        }));
        let invoker = TurnInvoker::new(provider.clone(), "primary", "fallback");

        let err = invoker.invoke(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_completion_is_not_retried() {
        let provider = Arc::new(ScriptedProvider::failing(|| Error::EmptyCompletion));
        let invoker = TurnInvoker::new(provider.clone(), "primary", "fallback");

        let err = invoker.invoke(&request()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCompletion));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn explicit_model_override_is_honored() {
        let provider = Arc::new(ScriptedProvider::missing(&[]));
        let invoker = TurnInvoker::new(provider.clone(), "primary", "fallback");

        let mut req = request();
        req.model = Some("experimental".into());
        let completion = invoker.invoke(&req).await.unwrap();
        assert_eq!(completion.model, "experimental");
    }
}
