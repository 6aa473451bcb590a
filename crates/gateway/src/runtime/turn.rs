//! The turn orchestrator.
//!
//! One call per user message, fully sequential: resolve persona and
//! conversation, assemble the layered prompt, invoke the completion
//! service (with model fallback), persist the exchange, then run the
//! best-effort side work (extraction, engagement) inline.
//!
//! Failure discipline: everything up to and including the coach-message
//! write is fatal and maps to a client-visible error; the user message
//! is persisted *before* the completion call so a downstream failure
//! still leaves the transcript chronologically intact. Everything after
//! the coach-message write is best-effort and can only log.

use chrono::Utc;

use wp_context::blocks;
use wp_context::{ContextDocument, TranscriptLine, RECENT_WINDOW};
use wp_domain::classify::Classification;
use wp_domain::config::FeatureMode;
use wp_domain::error::Error;
use wp_domain::model::{
    Coach, ConversationMode, MessageKind, NewMessage, Sender, SessionType, StoredMessage,
    UserContext,
};
use wp_personas::guidance::CORE_SYSTEM;
use wp_personas::CoachPersona;
use wp_providers::CompletionRequest;

use crate::api::identity::Identity;
use crate::runtime::{engagement, extract};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Input / output / errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Validated input to a single turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub conversation_id: Option<String>,
    pub coach_id: Option<String>,
    /// Trimmed, non-empty user message.
    pub message: String,
    /// Storage pointer when the message is a voice-derived transcript.
    pub voice_message_url: Option<String>,
    /// Session type for a conversation created by this turn.
    pub session_type: Option<SessionType>,
    /// Per-request override of the classification feature gate.
    pub skip_sentiment_analysis: Option<bool>,
}

/// A completed turn: the two messages persisted for it.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub conversation_id: String,
    pub user_message: StoredMessage,
    pub coach_message: StoredMessage,
}

/// Fatal turn failures, each mapping to one client-visible status.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Field 'message' must be a non-empty string")]
    EmptyMessage,

    #[error("No coach configured. Create at least one coach row in the coach catalog.")]
    NoCoachConfigured,

    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("store operation failed")]
    Store(#[source] Error),

    #[error("Failed to generate coach response")]
    Completion(#[source] Error),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// run_turn — the core orchestrator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one coaching turn for an authenticated caller.
pub async fn run_turn(
    state: &AppState,
    identity: &Identity,
    req: TurnRequest,
) -> Result<TurnOutcome, TurnError> {
    if req.message.trim().is_empty() {
        return Err(TurnError::EmptyMessage);
    }
    let message = req.message.trim().to_owned();
    let store = state.store.as_ref();
    let user_id = identity.subject.as_str();

    // 1. Profile and personalization bundle (both best-effort reads).
    let profile = match store.profile(user_id).await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load profile, continuing without it");
            None
        }
    };
    let user_ctx = match store.user_context(user_id).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load user context, continuing without it");
            UserContext::default()
        }
    };

    // 2. Coach resolution: explicit param, profile selection, then the
    //    system default. Nothing resolvable is a client error.
    let coach = resolve_coach(state, &req, profile.as_ref()).await?;
    let persona_prompt = CoachPersona::from_coach(&coach).render_prompt();

    // 3. Conversation: load by id (missing id is a 404) or create.
    //    Another user's conversation is indistinguishable from a missing
    //    one; the store client is not scoped per caller.
    let conversation = match &req.conversation_id {
        Some(id) => match store.conversation(id).await.map_err(TurnError::Store)? {
            Some(c) if c.user_id == user_id => c,
            _ => return Err(TurnError::ConversationNotFound),
        },
        None => store
            .create_conversation(
                user_id,
                &coach.id,
                ConversationMode::Text,
                req.session_type.unwrap_or_default(),
            )
            .await
            .map_err(TurnError::Store)?,
    };

    // 4. Recent-message window (before the current message is written).
    let recent = store
        .recent_messages(&conversation.id, RECENT_WINDOW)
        .await
        .map_err(TurnError::Store)?;

    // 5. Rolling conversation memory (best-effort read).
    let memory_summary = match store.conversation_memory(&conversation.id).await {
        Ok(memory) => memory.map(|m| blocks::memory_summary_block(&m)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load conversation memory, continuing");
            None
        }
    };

    // 6. Persist the user message before the completion call so the
    //    transcript stays chronologically intact on downstream failure.
    let user_metadata = match &req.voice_message_url {
        Some(url) => serde_json::json!({ "media_url": url }),
        None => serde_json::Value::Object(Default::default()),
    };
    let user_message = store
        .append_message(NewMessage {
            conversation_id: conversation.id.clone(),
            sender: Sender::User,
            kind: if req.voice_message_url.is_some() {
                MessageKind::Voice
            } else {
                MessageKind::Text
            },
            content: message.clone(),
            metadata: user_metadata,
        })
        .await
        .map_err(TurnError::Store)?;

    // 7. Classification (feature-gated, request override wins).
    let skip_classification = req
        .skip_sentiment_analysis
        .unwrap_or(state.config.features.mode == FeatureMode::Lean);
    let classification = if skip_classification {
        tracing::debug!("skipping sentiment/crisis classification");
        Classification::default()
    } else {
        state.classifier.classify(&message).await
    };

    // Record the classification snapshot on the user message (best-effort).
    if classification.crisis.is_some() || classification.sentiment.is_some() {
        let mut metadata = user_message.metadata.clone();
        if let Some(obj) = metadata.as_object_mut() {
            obj.insert(
                "sentiment".into(),
                serde_json::to_value(&classification.sentiment).unwrap_or_default(),
            );
            obj.insert(
                "crisis_detected".into(),
                serde_json::Value::Bool(classification.crisis_detected()),
            );
        }
        if let Err(e) = store
            .update_message_metadata(&user_message.id, metadata)
            .await
        {
            tracing::warn!(error = %e, "failed to record classification on user message");
        }
    }

    // 8. Assemble the prompt document.
    let now = Utc::now();
    let user_context_block = blocks::user_context_block(
        user_id,
        identity.email.as_deref(),
        profile.as_ref(),
        &user_ctx,
        now,
    );
    let session_context = blocks::enhanced_session_context(
        &blocks::session_context_block(&coach.name, &conversation),
        &classification,
    );
    let document = ContextDocument {
        persona_prompt,
        user_context: user_context_block,
        memory_summary,
        session_context,
        recent_messages: recent
            .iter()
            .map(|m| TranscriptLine::new(m.sender, m.content.clone()))
            .collect(),
        user_message: message.clone(),
    };

    // 9. Invoke the completion service (one fallback retry inside).
    let completion = state
        .invoker
        .invoke(&CompletionRequest {
            model: None,
            system_instruction: CORE_SYSTEM.to_owned(),
            payload: document.render(),
            temperature: Some(state.config.llm.temperature),
            top_p: Some(state.config.llm.top_p),
        })
        .await
        .map_err(TurnError::Completion)?;

    // 10. Persist the coach message.
    let coach_message = store
        .append_message(NewMessage {
            conversation_id: conversation.id.clone(),
            sender: Sender::Coach,
            kind: MessageKind::Text,
            content: completion.text,
            metadata: serde_json::json!({
                "sentiment_analysis": classification.sentiment,
                "crisis_detected": classification.crisis_detected(),
            }),
        })
        .await
        .map_err(TurnError::Store)?;

    // ── The turn has succeeded; everything below is best-effort. ────

    if let Err(e) = store.touch_conversation(&conversation.id, Utc::now()).await {
        tracing::warn!(error = %e, "failed to bump conversation last_active_at");
    }

    if state.config.features.mode == FeatureMode::Full {
        extract::run_extraction(
            store,
            &state.invoker,
            &state.config.features.extraction,
            &conversation.id,
            user_id,
        )
        .await;
    } else {
        tracing::debug!("extraction disabled by feature mode");
    }

    engagement::record_session(store, user_id, profile.as_ref(), Utc::now()).await;

    Ok(TurnOutcome {
        conversation_id: conversation.id,
        user_message,
        coach_message,
    })
}

/// Resolve the coach for this turn: explicit request parameter, then the
/// profile's stored selection, then the system default coach.
async fn resolve_coach(
    state: &AppState,
    req: &TurnRequest,
    profile: Option<&wp_domain::model::Profile>,
) -> Result<Coach, TurnError> {
    let store = state.store.as_ref();

    let requested = req
        .coach_id
        .clone()
        .or_else(|| profile.and_then(|p| p.selected_coach_id.clone()));

    if let Some(coach_id) = requested {
        if let Some(coach) = store.coach(&coach_id).await.map_err(TurnError::Store)? {
            return Ok(coach);
        }
        tracing::warn!(coach_id, "requested coach not found, falling back to default");
    }

    store
        .default_coach()
        .await
        .map_err(TurnError::Store)?
        .ok_or(TurnError::NoCoachConfigured)
}
