//! Core data-model entities shared by the store, context and gateway crates.
//!
//! These mirror the persistent rows the turn pipeline reads and writes.
//! Everything is plain serde data; behavior lives in the crates that
//! consume these types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Enums
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Coach,
}

impl Sender {
    /// Label used when rendering transcript lines into prompts.
    pub fn speaker_label(self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Coach => "Coach",
        }
    }
}

/// How the message content was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    /// A transcript derived from a recorded voice message; the storage
    /// pointer lives in the message metadata under `media_url`.
    Voice,
}

/// The interaction modality a conversation was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    Text,
    Voice,
}

/// The behavioral frame for a conversation. Each variant maps to a fixed
/// instruction block injected into the session-context section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    QuickCheckin,
    #[default]
    DeepDive,
    Reflection,
    GoalReview,
    Celebration,
    Grounding,
}

impl SessionType {
    pub const ALL: [SessionType; 6] = [
        SessionType::QuickCheckin,
        SessionType::DeepDive,
        SessionType::Reflection,
        SessionType::GoalReview,
        SessionType::Celebration,
        SessionType::Grounding,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SessionType::QuickCheckin => "quick_checkin",
            SessionType::DeepDive => "deep_dive",
            SessionType::Reflection => "reflection",
            SessionType::GoalReview => "goal_review",
            SessionType::Celebration => "celebration",
            SessionType::Grounding => "grounding",
        }
    }

    /// Parse a request-supplied key. Unknown keys return `None`; callers
    /// fall back to [`SessionType::default`].
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }
}

/// Whether a coach row is a system-catalog persona or user-authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachKind {
    /// Catalog persona identified by `persona_key`.
    System,
    /// Authored by its owner for personal use.
    Private,
    /// Authored and published by a creator.
    Creator,
}

impl CoachKind {
    /// Authored coaches render their prompt from configuration knobs
    /// instead of a catalog lookup.
    pub fn is_authored(self) -> bool {
        matches!(self, CoachKind::Private | CoachKind::Creator)
    }
}

/// Lifecycle of an extracted commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentStatus {
    #[default]
    Pending,
    Completed,
    Rescheduled,
}

/// Category of a durable memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Fact,
    Preference,
    Relationship,
    Challenge,
    Win,
    Value,
}

impl MemoryKind {
    /// Parse an extraction-supplied kind string. Unknown kinds return
    /// `None` and the memory is skipped.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "fact" => Some(MemoryKind::Fact),
            "preference" => Some(MemoryKind::Preference),
            "relationship" => Some(MemoryKind::Relationship),
            "challenge" => Some(MemoryKind::Challenge),
            "win" => Some(MemoryKind::Win),
            "value" => Some(MemoryKind::Value),
            _ => None,
        }
    }
}

/// Priority of a memory entry when competing for prompt space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    #[default]
    Normal,
    High,
}

impl Importance {
    /// Lenient parse: anything that isn't `"high"` degrades to `Normal`.
    pub fn from_key(key: &str) -> Self {
        if key == "high" {
            Importance::High
        } else {
            Importance::Normal
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Profile
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A user profile row. Read once per turn for personalization, written
/// once per turn by the engagement tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Equals the authenticated user identity (`sub` claim).
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub coaching_style_preference: Option<String>,
    #[serde(default)]
    pub life_context: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub selected_coach_id: Option<String>,
    #[serde(default)]
    pub streak_count: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub last_session_at: Option<DateTime<Utc>>,
}

/// The engagement fields written back to a profile after each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementStats {
    pub streak_count: u32,
    pub longest_streak: u32,
    pub total_sessions: u32,
    pub last_session_at: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Coach
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Style knobs for an authored coach. String-typed; resolved against
/// fixed phrase tables at prompt-render time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub pacing: Option<String>,
    #[serde(default)]
    pub challenge_level: Option<String>,
}

/// Coaching-behavior knobs for an authored coach.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachingRules {
    #[serde(default)]
    pub advice_policy: Option<String>,
    #[serde(default)]
    pub question_depth: Option<String>,
    #[serde(default)]
    pub emotional_warmth: Option<String>,
}

/// A coach row. Immutable once created except by its owner (out of scope
/// for the turn pipeline, which only reads these).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coach {
    pub id: String,
    pub name: String,
    #[serde(rename = "coach_type")]
    pub kind: CoachKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub philosophy: Option<String>,
    /// Catalog key for system coaches (e.g. `"clarity"`).
    #[serde(default)]
    pub persona_key: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub style_config: Option<StyleConfig>,
    #[serde(default)]
    pub coaching_rules: Option<CoachingRules>,
    #[serde(default)]
    pub is_default: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation & messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A conversation row. Created on first turn when no id is supplied;
/// `last_active_at` is bumped on every turn. The assigned coach never
/// changes mid-conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub coach_id: String,
    pub mode: ConversationMode,
    pub session_type: SessionType,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

/// A persisted message row. Append-only; ordered by `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender: Sender,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Fields for appending a new message; the store assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub conversation_id: String,
    pub sender: Sender,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Memory-adjacent entities
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An active user goal (read-only for the turn pipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

/// A commitment the user explicitly agreed to during a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commitment {
    pub user_id: String,
    pub commitment: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: CommitmentStatus,
}

/// An observed behavioral pattern (read-only for the turn pipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorPattern {
    pub title: String,
    pub description: String,
}

/// A typed durable memory extracted from transcripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub user_id: String,
    #[serde(rename = "memory_type")]
    pub kind: MemoryKind,
    pub content: String,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default = "d_true")]
    pub active: bool,
}

fn d_true() -> bool {
    true
}

/// A self-reported mood snapshot. Only included in prompts when less
/// than 24 hours old.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    #[serde(rename = "mood_score")]
    pub score: u8,
    #[serde(rename = "mood_label", default)]
    pub label: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A per-session derived summary (append-only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub user_id: String,
    pub conversation_id: String,
    pub summary: String,
    #[serde(default)]
    pub key_topics: Vec<String>,
    #[serde(default)]
    pub emotional_tone: Option<String>,
    #[serde(default)]
    pub breakthroughs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A key realization mined from a conversation (append-only, pending
/// user approval in the surrounding app).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub user_id: String,
    pub conversation_id: String,
    pub summary: String,
    #[serde(default)]
    pub user_approved: bool,
}

/// The rolling per-conversation summary. Upserted, not appended — the
/// only mutable derived entity in the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMemory {
    pub conversation_id: String,
    pub summary: String,
    #[serde(default)]
    pub themes: Vec<String>,
    pub last_updated_at: DateTime<Utc>,
}

/// The personalization bundle loaded once per turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    pub goals: Vec<Goal>,
    pub pending_commitments: Vec<Commitment>,
    pub patterns: Vec<BehaviorPattern>,
    pub important_memories: Vec<MemoryEntry>,
    pub recent_mood: Option<MoodEntry>,
    pub recent_summaries: Vec<SessionSummary>,
}
