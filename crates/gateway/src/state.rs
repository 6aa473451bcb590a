use std::sync::Arc;

use wp_domain::config::Config;
use wp_providers::{MessageClassifier, TurnInvoker};
use wp_store::ContextStore;

use crate::runtime::conversation_lock::ConversationLockMap;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// The persistent-store façade (REST or in-memory backend).
    pub store: Arc<dyn ContextStore>,

    /// Completion calls with the primary/fallback model policy.
    pub invoker: TurnInvoker,

    /// Two-stage sentiment/crisis classifier.
    pub classifier: Arc<MessageClassifier>,

    /// Per-conversation turn serialization.
    pub conversation_locks: Arc<ConversationLockMap>,

    /// HS256 secret for credential verification. `None` = decode-only
    /// mode (a warning is logged at startup).
    pub jwt_secret: Option<Arc<Vec<u8>>>,
}
