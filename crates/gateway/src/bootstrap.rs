//! Application state construction.

use std::sync::Arc;

use anyhow::Context;

use wp_domain::config::{Config, StoreBackend};
use wp_providers::{GeminiProvider, MessageClassifier, TurnInvoker};
use wp_store::{ContextStore, MemContextStore, RestContextStore};

use crate::runtime::conversation_lock::ConversationLockMap;
use crate::state::AppState;

/// Build the shared [`AppState`] from configuration: store backend,
/// completion provider, classifier, locks, and the credential secret.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    let store: Arc<dyn ContextStore> = match config.store.backend {
        StoreBackend::Rest => {
            let store = RestContextStore::new(&config.store).context("store client")?;
            tracing::info!(base_url = %config.store.base_url, "using REST store backend");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store backend, nothing will persist");
            Arc::new(MemContextStore::new())
        }
    };

    let provider = GeminiProvider::from_config(&config.llm).context("completion provider")?;
    let invoker = TurnInvoker::new(
        Arc::new(provider),
        config.llm.primary_model.clone(),
        config.llm.fallback_model.clone(),
    );
    let classifier = Arc::new(MessageClassifier::new(invoker.clone()));

    let jwt_secret = resolve_jwt_secret(&config);
    if jwt_secret.is_none() {
        tracing::warn!(
            "no JWT secret configured — bearer credentials are decoded without \
             signature verification; set [auth] jwt_secret_env for boundary verification"
        );
    }

    Ok(AppState {
        config,
        store,
        invoker,
        classifier,
        conversation_locks: Arc::new(ConversationLockMap::new()),
        jwt_secret,
    })
}

fn resolve_jwt_secret(config: &Config) -> Option<Arc<Vec<u8>>> {
    let env_var = config.auth.jwt_secret_env.as_deref()?;
    match std::env::var(env_var) {
        Ok(secret) if !secret.is_empty() => Some(Arc::new(secret.into_bytes())),
        Ok(_) => {
            tracing::warn!(env_var, "JWT secret env var is empty, running decode-only");
            None
        }
        Err(_) => {
            tracing::warn!(env_var, "JWT secret env var not set, running decode-only");
            None
        }
    }
}
