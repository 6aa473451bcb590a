//! Result types for the per-message sentiment and crisis classifiers.
//!
//! The classifier calls return JSON matching these shapes. Parsing is
//! lenient where the model has latitude (unknown sentiment or context
//! strings degrade to the neutral variants) and strict where safety
//! depends on it (`is_crisis` must be an explicit boolean).

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sentiment
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The closed set of emotional states the sentiment classifier may emit.
/// Deserialization is lenient: unknown strings become [`Sentiment::Neutral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Sentiment {
    Anxious,
    Hopeful,
    Frustrated,
    Calm,
    Excited,
    Overwhelmed,
    Sad,
    Angry,
    Confused,
    Motivated,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn key(self) -> &'static str {
        match self {
            Sentiment::Anxious => "anxious",
            Sentiment::Hopeful => "hopeful",
            Sentiment::Frustrated => "frustrated",
            Sentiment::Calm => "calm",
            Sentiment::Excited => "excited",
            Sentiment::Overwhelmed => "overwhelmed",
            Sentiment::Sad => "sad",
            Sentiment::Angry => "angry",
            Sentiment::Confused => "confused",
            Sentiment::Motivated => "motivated",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl From<String> for Sentiment {
    fn from(s: String) -> Self {
        match s.as_str() {
            "anxious" => Sentiment::Anxious,
            "hopeful" => Sentiment::Hopeful,
            "frustrated" => Sentiment::Frustrated,
            "calm" => Sentiment::Calm,
            "excited" => Sentiment::Excited,
            "overwhelmed" => Sentiment::Overwhelmed,
            "sad" => Sentiment::Sad,
            "angry" => Sentiment::Angry,
            "confused" => Sentiment::Confused,
            "motivated" => Sentiment::Motivated,
            _ => Sentiment::Neutral,
        }
    }
}

/// The situational context tag attached to a sentiment reading. Drives
/// which contextual questions are offered to the coach. Unknown strings
/// become [`SituationContext::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SituationContext {
    Stuck,
    Overwhelmed,
    DecisionParalysis,
    SelfDoubt,
    UnclearValues,
    AvoidingAction,
    RelationshipConflict,
    GoalClarity,
    #[default]
    Other,
}

impl SituationContext {
    pub fn key(self) -> &'static str {
        match self {
            SituationContext::Stuck => "stuck",
            SituationContext::Overwhelmed => "overwhelmed",
            SituationContext::DecisionParalysis => "decision_paralysis",
            SituationContext::SelfDoubt => "self_doubt",
            SituationContext::UnclearValues => "unclear_values",
            SituationContext::AvoidingAction => "avoiding_action",
            SituationContext::RelationshipConflict => "relationship_conflict",
            SituationContext::GoalClarity => "goal_clarity",
            SituationContext::Other => "other",
        }
    }
}

impl From<String> for SituationContext {
    fn from(s: String) -> Self {
        match s.as_str() {
            "stuck" => SituationContext::Stuck,
            "overwhelmed" => SituationContext::Overwhelmed,
            "decision_paralysis" => SituationContext::DecisionParalysis,
            "self_doubt" => SituationContext::SelfDoubt,
            "unclear_values" => SituationContext::UnclearValues,
            "avoiding_action" => SituationContext::AvoidingAction,
            "relationship_conflict" => SituationContext::RelationshipConflict,
            "goal_clarity" => SituationContext::GoalClarity,
            _ => SituationContext::Other,
        }
    }
}

/// One sentiment reading of a single user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    #[serde(default)]
    pub sentiment: Sentiment,
    /// 1–10. Out-of-range values are clamped at render time.
    #[serde(default = "d_intensity")]
    pub intensity: u8,
    #[serde(default)]
    pub context: SituationContext,
    /// Free-form needed-support tags (e.g. `"validation"`, `"clarity"`).
    #[serde(default)]
    pub needs: Vec<String>,
}

fn d_intensity() -> u8 {
    5
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Crisis
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity attached to an affirmative crisis reading. Unknown strings
/// become [`CrisisSeverity::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum CrisisSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl CrisisSeverity {
    pub fn key(self) -> &'static str {
        match self {
            CrisisSeverity::Low => "low",
            CrisisSeverity::Medium => "medium",
            CrisisSeverity::High => "high",
            CrisisSeverity::Critical => "critical",
        }
    }
}

impl From<String> for CrisisSeverity {
    fn from(s: String) -> Self {
        match s.as_str() {
            "low" => CrisisSeverity::Low,
            "high" => CrisisSeverity::High,
            "critical" => CrisisSeverity::Critical,
            _ => CrisisSeverity::Medium,
        }
    }
}

/// One crisis reading of a single user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisAssessment {
    pub is_crisis: bool,
    #[serde(default)]
    pub severity: CrisisSeverity,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default = "d_recommended_response")]
    pub recommended_response: String,
}

fn d_recommended_response() -> String {
    "validate_and_refer".into()
}

/// The combined outcome of the two-stage classification pipeline.
///
/// The crisis stage short-circuits: when `crisis.is_crisis` is set,
/// `sentiment` is always `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    pub crisis: Option<CrisisAssessment>,
    pub sentiment: Option<SentimentAnalysis>,
}

impl Classification {
    pub fn crisis_detected(&self) -> bool {
        self.crisis.as_ref().is_some_and(|c| c.is_crisis)
    }
}
