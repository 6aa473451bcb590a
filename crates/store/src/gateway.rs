//! The narrow read/write façade over the persistent store.
//!
//! The turn pipeline only ever talks to this trait. Two backends exist:
//! [`crate::rest::RestContextStore`] for the PostgREST-style HTTP API and
//! [`crate::mem::MemContextStore`] for tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use wp_domain::error::Result;
use wp_domain::model::{
    Coach, Commitment, Conversation, ConversationMemory, ConversationMode, EngagementStats,
    Insight, MemoryEntry, NewMessage, Profile, SessionSummary, SessionType, StoredMessage,
    UserContext,
};

/// Read/write operations the turn pipeline needs, nothing more.
#[async_trait]
pub trait ContextStore: Send + Sync {
    // ── Profiles ─────────────────────────────────────────────────────

    async fn profile(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Write the engagement fields back to a profile.
    async fn update_engagement(&self, user_id: &str, stats: &EngagementStats) -> Result<()>;

    // ── Coaches ──────────────────────────────────────────────────────

    async fn coach(&self, coach_id: &str) -> Result<Option<Coach>>;

    /// The coach flagged as the system default, if any.
    async fn default_coach(&self) -> Result<Option<Coach>>;

    // ── Conversations ────────────────────────────────────────────────

    async fn conversation(&self, conversation_id: &str) -> Result<Option<Conversation>>;

    async fn create_conversation(
        &self,
        user_id: &str,
        coach_id: &str,
        mode: ConversationMode,
        session_type: SessionType,
    ) -> Result<Conversation>;

    /// Bump `last_active_at`.
    async fn touch_conversation(&self, conversation_id: &str, at: DateTime<Utc>) -> Result<()>;

    // ── Messages ─────────────────────────────────────────────────────

    /// The most recent `limit` messages of a conversation, oldest first.
    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>>;

    /// The transcript from the beginning, oldest first, capped at `limit`.
    async fn transcript(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>>;

    async fn append_message(&self, message: NewMessage) -> Result<StoredMessage>;

    async fn update_message_metadata(
        &self,
        message_id: &str,
        metadata: serde_json::Value,
    ) -> Result<()>;

    // ── Personalization reads ────────────────────────────────────────

    /// Load the per-turn personalization bundle. Partial failures on the
    /// individual sub-reads degrade to empty sections, never an error.
    async fn user_context(&self, user_id: &str) -> Result<UserContext>;

    async fn conversation_memory(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationMemory>>;

    // ── Extraction writes ────────────────────────────────────────────

    async fn upsert_conversation_memory(&self, memory: &ConversationMemory) -> Result<()>;

    async fn insert_session_summary(&self, summary: &SessionSummary) -> Result<()>;

    async fn insert_commitment(&self, commitment: &Commitment) -> Result<()>;

    async fn insert_memory(&self, memory: &MemoryEntry) -> Result<()>;

    async fn insert_insight(&self, insight: &Insight) -> Result<()>;
}
