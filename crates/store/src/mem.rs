//! In-memory [`ContextStore`] backend.
//!
//! Backs the test suite and the `backend = "memory"` development mode.
//! All state lives in one `RwLock`-guarded struct; no persistence across
//! restarts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use wp_domain::error::Result;
use wp_domain::model::{
    BehaviorPattern, Coach, Commitment, CommitmentStatus, Conversation, ConversationMemory,
    ConversationMode, EngagementStats, Goal, Importance, Insight, MemoryEntry, MoodEntry,
    NewMessage, Profile, SessionSummary, SessionType, StoredMessage, UserContext,
};

// Limits mirroring the REST backend's per-section query caps.
const GOALS_LIMIT: usize = 5;
const COMMITMENTS_LIMIT: usize = 5;
const PATTERNS_LIMIT: usize = 3;
const MEMORIES_LIMIT: usize = 10;
const SUMMARIES_LIMIT: usize = 3;

#[derive(Default)]
struct Inner {
    profiles: HashMap<String, Profile>,
    coaches: Vec<Coach>,
    conversations: HashMap<String, Conversation>,
    messages: Vec<StoredMessage>,
    goals: HashMap<String, Vec<Goal>>,
    patterns: HashMap<String, Vec<BehaviorPattern>>,
    moods: HashMap<String, Vec<MoodEntry>>,
    commitments: Vec<Commitment>,
    memories: Vec<MemoryEntry>,
    summaries: Vec<SessionSummary>,
    insights: Vec<Insight>,
    conversation_memories: HashMap<String, ConversationMemory>,
}

/// In-process store over plain maps.
#[derive(Default)]
pub struct MemContextStore {
    inner: RwLock<Inner>,
}

impl MemContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Seeding helpers (dev mode & tests) ──────────────────────────

    pub fn seed_profile(&self, profile: Profile) {
        self.inner.write().profiles.insert(profile.id.clone(), profile);
    }

    pub fn seed_coach(&self, coach: Coach) {
        self.inner.write().coaches.push(coach);
    }

    pub fn seed_goal(&self, user_id: &str, goal: Goal) {
        self.inner
            .write()
            .goals
            .entry(user_id.to_owned())
            .or_default()
            .push(goal);
    }

    pub fn seed_pattern(&self, user_id: &str, pattern: BehaviorPattern) {
        self.inner
            .write()
            .patterns
            .entry(user_id.to_owned())
            .or_default()
            .push(pattern);
    }

    pub fn seed_mood(&self, user_id: &str, mood: MoodEntry) {
        self.inner
            .write()
            .moods
            .entry(user_id.to_owned())
            .or_default()
            .push(mood);
    }

    // ── Inspection helpers (test assertions) ────────────────────────

    pub fn all_messages(&self, conversation_id: &str) -> Vec<StoredMessage> {
        let inner = self.inner.read();
        let mut messages: Vec<_> = inner
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        messages
    }

    pub fn commitments(&self) -> Vec<Commitment> {
        self.inner.read().commitments.clone()
    }

    pub fn memories(&self) -> Vec<MemoryEntry> {
        self.inner.read().memories.clone()
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.inner.read().summaries.clone()
    }

    pub fn insights(&self) -> Vec<Insight> {
        self.inner.read().insights.clone()
    }

    pub fn stored_profile(&self, user_id: &str) -> Option<Profile> {
        self.inner.read().profiles.get(user_id).cloned()
    }

    pub fn stored_conversation_memory(&self, conversation_id: &str) -> Option<ConversationMemory> {
        self.inner
            .read()
            .conversation_memories
            .get(conversation_id)
            .cloned()
    }
}

#[async_trait]
impl crate::gateway::ContextStore for MemContextStore {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.inner.read().profiles.get(user_id).cloned())
    }

    async fn update_engagement(&self, user_id: &str, stats: &EngagementStats) -> Result<()> {
        let mut inner = self.inner.write();
        let profile = inner
            .profiles
            .entry(user_id.to_owned())
            .or_insert_with(|| Profile {
                id: user_id.to_owned(),
                email: None,
                display_name: None,
                coaching_style_preference: None,
                life_context: None,
                values: Vec::new(),
                selected_coach_id: None,
                streak_count: 0,
                longest_streak: 0,
                total_sessions: 0,
                last_session_at: None,
            });
        profile.streak_count = stats.streak_count;
        profile.longest_streak = stats.longest_streak;
        profile.total_sessions = stats.total_sessions;
        profile.last_session_at = Some(stats.last_session_at);
        Ok(())
    }

    async fn coach(&self, coach_id: &str) -> Result<Option<Coach>> {
        Ok(self
            .inner
            .read()
            .coaches
            .iter()
            .find(|c| c.id == coach_id)
            .cloned())
    }

    async fn default_coach(&self) -> Result<Option<Coach>> {
        Ok(self
            .inner
            .read()
            .coaches
            .iter()
            .find(|c| c.is_default)
            .cloned())
    }

    async fn conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self.inner.read().conversations.get(conversation_id).cloned())
    }

    async fn create_conversation(
        &self,
        user_id: &str,
        coach_id: &str,
        mode: ConversationMode,
        session_type: SessionType,
    ) -> Result<Conversation> {
        let now = Utc::now();
        let conversation = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            coach_id: coach_id.to_owned(),
            mode,
            session_type,
            created_at: now,
            last_active_at: now,
        };
        self.inner
            .write()
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn touch_conversation(&self, conversation_id: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(c) = self.inner.write().conversations.get_mut(conversation_id) {
            c.last_active_at = at;
        }
        Ok(())
    }

    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        let mut messages = self.all_messages(conversation_id);
        let start = messages.len().saturating_sub(limit);
        Ok(messages.split_off(start))
    }

    async fn transcript(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        let mut messages = self.all_messages(conversation_id);
        messages.truncate(limit);
        Ok(messages)
    }

    async fn append_message(&self, message: NewMessage) -> Result<StoredMessage> {
        let stored = StoredMessage {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: message.conversation_id,
            sender: message.sender,
            kind: message.kind,
            content: message.content,
            metadata: message.metadata,
            created_at: Utc::now(),
        };
        self.inner.write().messages.push(stored.clone());
        Ok(stored)
    }

    async fn update_message_metadata(
        &self,
        message_id: &str,
        metadata: serde_json::Value,
    ) -> Result<()> {
        if let Some(m) = self
            .inner
            .write()
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
        {
            m.metadata = metadata;
        }
        Ok(())
    }

    async fn user_context(&self, user_id: &str) -> Result<UserContext> {
        let inner = self.inner.read();

        let goals = inner
            .goals
            .get(user_id)
            .map(|g| g.iter().take(GOALS_LIMIT).cloned().collect())
            .unwrap_or_default();

        let mut pending: Vec<Commitment> = inner
            .commitments
            .iter()
            .filter(|c| c.user_id == user_id && c.status == CommitmentStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        pending.truncate(COMMITMENTS_LIMIT);

        let patterns = inner
            .patterns
            .get(user_id)
            .map(|p| p.iter().take(PATTERNS_LIMIT).cloned().collect())
            .unwrap_or_default();

        let important_memories: Vec<MemoryEntry> = inner
            .memories
            .iter()
            .filter(|m| m.user_id == user_id && m.active && m.importance == Importance::High)
            .rev()
            .take(MEMORIES_LIMIT)
            .cloned()
            .collect();

        let recent_mood = inner
            .moods
            .get(user_id)
            .and_then(|moods| moods.iter().max_by_key(|m| m.created_at).cloned());

        let mut recent_summaries: Vec<SessionSummary> = inner
            .summaries
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        recent_summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_summaries.truncate(SUMMARIES_LIMIT);

        Ok(UserContext {
            goals,
            pending_commitments: pending,
            patterns,
            important_memories,
            recent_mood,
            recent_summaries,
        })
    }

    async fn conversation_memory(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationMemory>> {
        Ok(self.stored_conversation_memory(conversation_id))
    }

    async fn upsert_conversation_memory(&self, memory: &ConversationMemory) -> Result<()> {
        self.inner
            .write()
            .conversation_memories
            .insert(memory.conversation_id.clone(), memory.clone());
        Ok(())
    }

    async fn insert_session_summary(&self, summary: &SessionSummary) -> Result<()> {
        self.inner.write().summaries.push(summary.clone());
        Ok(())
    }

    async fn insert_commitment(&self, commitment: &Commitment) -> Result<()> {
        self.inner.write().commitments.push(commitment.clone());
        Ok(())
    }

    async fn insert_memory(&self, memory: &MemoryEntry) -> Result<()> {
        self.inner.write().memories.push(memory.clone());
        Ok(())
    }

    async fn insert_insight(&self, insight: &Insight) -> Result<()> {
        self.inner.write().insights.push(insight.clone());
        Ok(())
    }
}
