//! Coach persona resolution and prompt rendering.
//!
//! A coach is either a system-catalog persona (fixed prompt looked up by
//! key) or a user-authored persona (prompt rendered from six style knobs
//! through fixed phrase tables). Both variants expose one capability:
//! [`CoachPersona::render_prompt`].

use wp_domain::model::{Coach, CoachingRules, StyleConfig};

use crate::catalog::{catalog_persona, DEFAULT_PERSONA_KEY};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Style knobs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    Gentle,
    #[default]
    Balanced,
    Direct,
}

impl Tone {
    fn from_key(key: &str) -> Self {
        match key {
            "gentle" => Tone::Gentle,
            "direct" => Tone::Direct,
            _ => Tone::Balanced,
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Tone::Gentle => "calm, patient, supportive",
            Tone::Direct => "straightforward, action-oriented, challenging",
            Tone::Balanced => "balanced, warm but honest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl Pacing {
    fn from_key(key: &str) -> Self {
        match key {
            "slow" => Pacing::Slow,
            "fast" => Pacing::Fast,
            _ => Pacing::Medium,
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Pacing::Slow => "take time to reflect",
            Pacing::Fast => "move quickly to action",
            Pacing::Medium => "balance reflection and action",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChallengeLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ChallengeLevel {
    fn from_key(key: &str) -> Self {
        match key {
            "low" => ChallengeLevel::Low,
            "high" => ChallengeLevel::High,
            _ => ChallengeLevel::Medium,
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            ChallengeLevel::Low => "gentle guidance",
            ChallengeLevel::High => "push back respectfully",
            ChallengeLevel::Medium => "balanced support and challenge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvicePolicy {
    Never,
    #[default]
    Optional,
    Proactive,
}

impl AdvicePolicy {
    fn from_key(key: &str) -> Self {
        match key {
            "never" => AdvicePolicy::Never,
            "proactive" => AdvicePolicy::Proactive,
            _ => AdvicePolicy::Optional,
        }
    }

    fn clause(self) -> &'static str {
        match self {
            AdvicePolicy::Never => "\u{2022} Never offer direct advice. Only ask questions.",
            AdvicePolicy::Optional => {
                "\u{2022} Offer suggestions only when helpful, framed as experiments."
            }
            AdvicePolicy::Proactive => {
                "\u{2022} Provide actionable suggestions when appropriate."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionDepth {
    Surface,
    #[default]
    Moderate,
    Deep,
}

impl QuestionDepth {
    fn from_key(key: &str) -> Self {
        match key {
            "surface" => QuestionDepth::Surface,
            "deep" => QuestionDepth::Deep,
            _ => QuestionDepth::Moderate,
        }
    }

    fn clause(self) -> &'static str {
        match self {
            QuestionDepth::Surface => {
                "\u{2022} Ask clarifying questions about the immediate situation."
            }
            QuestionDepth::Moderate => "\u{2022} Explore underlying patterns and values.",
            QuestionDepth::Deep => "\u{2022} Dive deep into root causes and beliefs.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Warmth {
    Low,
    #[default]
    Medium,
    High,
}

impl Warmth {
    fn from_key(key: &str) -> Self {
        match key {
            "low" => Warmth::Low,
            "high" => Warmth::High,
            _ => Warmth::Medium,
        }
    }

    fn clause(self) -> &'static str {
        match self {
            Warmth::Low => "\u{2022} Keep responses analytical and objective.",
            Warmth::Medium => "\u{2022} Balance logic with empathy.",
            Warmth::High => "\u{2022} Show high emotional intelligence and warmth.",
        }
    }
}

/// Appended to every authored-persona prompt. Authored configuration can
/// shape tone and pacing but can never remove these boundaries.
const SAFETY_BOUNDARIES: &str = "\
SAFETY BOUNDARIES (non-negotiable):
\u{2022} Never provide medical, mental health, or crisis advice
\u{2022} Encourage professional help when appropriate
\u{2022} Maintain coaching boundaries";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Authored persona
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A user-authored persona, resolved from a coach row's knobs.
#[derive(Debug, Clone)]
pub struct AuthoredPersona {
    pub name: String,
    pub description: Option<String>,
    pub philosophy: Option<String>,
    pub tone: Tone,
    pub pacing: Pacing,
    pub challenge: ChallengeLevel,
    pub advice_policy: AdvicePolicy,
    pub question_depth: QuestionDepth,
    pub warmth: Warmth,
}

impl AuthoredPersona {
    /// Resolve knobs from a coach row. Missing or unknown knob values
    /// fall back to the middle setting of each scale. The row-level
    /// `style` column doubles as the tone when no `style_config` tone
    /// is present.
    pub fn from_coach(coach: &Coach) -> Self {
        let style = coach.style_config.clone().unwrap_or_else(StyleConfig::default);
        let rules = coach
            .coaching_rules
            .clone()
            .unwrap_or_else(CoachingRules::default);

        let tone_key = style
            .tone
            .as_deref()
            .or(coach.style.as_deref())
            .unwrap_or("balanced");

        Self {
            name: coach.name.clone(),
            description: coach.description.clone(),
            philosophy: coach.philosophy.clone(),
            tone: Tone::from_key(tone_key),
            pacing: Pacing::from_key(style.pacing.as_deref().unwrap_or("medium")),
            challenge: ChallengeLevel::from_key(
                style.challenge_level.as_deref().unwrap_or("medium"),
            ),
            advice_policy: AdvicePolicy::from_key(
                rules.advice_policy.as_deref().unwrap_or("optional"),
            ),
            question_depth: QuestionDepth::from_key(
                rules.question_depth.as_deref().unwrap_or("moderate"),
            ),
            warmth: Warmth::from_key(rules.emotional_warmth.as_deref().unwrap_or("medium")),
        }
    }

    /// Render the persona prompt from the phrase tables.
    pub fn render_prompt(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("You are {}.\n\n", self.name));

        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(desc);
            out.push_str("\n\n");
        }

        out.push_str("COACHING APPROACH:\n");
        out.push_str(&format!("\u{2022} Tone: {}\n", self.tone.phrase()));
        out.push_str(&format!("\u{2022} Pacing: {}\n", self.pacing.phrase()));
        out.push_str(&format!(
            "\u{2022} Challenge level: {}\n\n",
            self.challenge.phrase()
        ));

        out.push_str("ADVICE POLICY:\n");
        out.push_str(self.advice_policy.clause());
        out.push_str("\n\n");

        out.push_str("QUESTION DEPTH:\n");
        out.push_str(self.question_depth.clause());
        out.push_str("\n\n");

        out.push_str("EMOTIONAL WARMTH:\n");
        out.push_str(self.warmth.clause());
        out.push_str("\n\n");

        if let Some(philosophy) = self.philosophy.as_deref().filter(|p| !p.is_empty()) {
            out.push_str("PHILOSOPHY:\n");
            out.push_str(philosophy);
            out.push_str("\n\n");
        }

        out.push_str(SAFETY_BOUNDARIES);
        out
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Coach persona (tagged union)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The behavioral configuration applied to a turn, resolved from a coach
/// row exactly once per request.
#[derive(Debug, Clone)]
pub enum CoachPersona {
    /// System-catalog persona. An unknown key resolves to the default
    /// persona at render time.
    System { key: String },
    /// User-authored persona with rendered knobs.
    Authored(AuthoredPersona),
}

impl CoachPersona {
    /// Resolve the persona for a coach row.
    pub fn from_coach(coach: &Coach) -> Self {
        if coach.kind.is_authored() {
            CoachPersona::Authored(AuthoredPersona::from_coach(coach))
        } else {
            CoachPersona::System {
                key: coach
                    .persona_key
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PERSONA_KEY.to_owned()),
            }
        }
    }

    /// Render the system-instruction prompt for this persona.
    pub fn render_prompt(&self) -> String {
        match self {
            CoachPersona::System { key } => catalog_persona(key).prompt.to_owned(),
            CoachPersona::Authored(authored) => authored.render_prompt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wp_domain::model::CoachKind;

    fn authored_coach() -> Coach {
        Coach {
            id: "c1".into(),
            name: "Marathon Mentor".into(),
            kind: CoachKind::Private,
            description: Some("A running-focused accountability coach.".into()),
            philosophy: Some("Consistency beats intensity.".into()),
            persona_key: None,
            style: None,
            style_config: Some(StyleConfig {
                tone: Some("gentle".into()),
                pacing: Some("fast".into()),
                challenge_level: Some("high".into()),
            }),
            coaching_rules: Some(CoachingRules {
                advice_policy: Some("never".into()),
                question_depth: Some("deep".into()),
                emotional_warmth: Some("low".into()),
            }),
            is_default: false,
        }
    }

    #[test]
    fn authored_prompt_reflects_knobs() {
        let persona = CoachPersona::from_coach(&authored_coach());
        let prompt = persona.render_prompt();

        assert!(prompt.starts_with("You are Marathon Mentor."));
        assert!(prompt.contains("Tone: calm, patient, supportive"));
        assert!(prompt.contains("Pacing: move quickly to action"));
        assert!(prompt.contains("Challenge level: push back respectfully"));
        assert!(prompt.contains("Never offer direct advice"));
        assert!(prompt.contains("Dive deep into root causes"));
        assert!(prompt.contains("analytical and objective"));
        assert!(prompt.contains("Consistency beats intensity."));
    }

    #[test]
    fn safety_boundaries_always_terminate_authored_prompts() {
        let mut coach = authored_coach();
        coach.description = None;
        coach.philosophy = None;
        coach.style_config = None;
        coach.coaching_rules = None;

        let prompt = CoachPersona::from_coach(&coach).render_prompt();
        assert!(prompt.ends_with("\u{2022} Maintain coaching boundaries"));
        assert!(prompt.contains("SAFETY BOUNDARIES (non-negotiable):"));
    }

    #[test]
    fn unknown_knob_values_use_middle_settings() {
        let mut coach = authored_coach();
        coach.style_config = Some(StyleConfig {
            tone: Some("sparkly".into()),
            pacing: Some("warp".into()),
            challenge_level: Some("extreme".into()),
        });
        let persona = AuthoredPersona::from_coach(&coach);
        assert_eq!(persona.tone, Tone::Balanced);
        assert_eq!(persona.pacing, Pacing::Medium);
        assert_eq!(persona.challenge, ChallengeLevel::Medium);
    }

    #[test]
    fn row_style_column_feeds_tone_when_config_absent() {
        let mut coach = authored_coach();
        coach.style_config = None;
        coach.style = Some("direct".into());
        let persona = AuthoredPersona::from_coach(&coach);
        assert_eq!(persona.tone, Tone::Direct);
    }

    #[test]
    fn system_coach_resolves_catalog_prompt() {
        let coach = Coach {
            id: "c2".into(),
            name: "Growth Coach".into(),
            kind: CoachKind::System,
            description: None,
            philosophy: None,
            persona_key: Some("growth".into()),
            style: None,
            style_config: None,
            coaching_rules: None,
            is_default: true,
        };
        let prompt = CoachPersona::from_coach(&coach).render_prompt();
        assert!(prompt.starts_with("You are the Growth Coach."));
    }

    #[test]
    fn system_coach_with_missing_key_uses_default() {
        let coach = Coach {
            id: "c3".into(),
            name: "Mystery".into(),
            kind: CoachKind::System,
            description: None,
            philosophy: None,
            persona_key: None,
            style: None,
            style_config: None,
            coaching_rules: None,
            is_default: false,
        };
        let prompt = CoachPersona::from_coach(&coach).render_prompt();
        assert!(prompt.starts_with("You are the Clarity Coach."));
    }
}
