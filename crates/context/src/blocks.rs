//! Pure renderers for the individual context blocks.
//!
//! Every function here is a pure string builder over already-loaded
//! entities; `now` is always an explicit parameter so the same inputs
//! render the same bytes regardless of wall-clock time.

use chrono::{DateTime, Utc};

use wp_domain::classify::Classification;
use wp_domain::model::{Conversation, Profile, UserContext};
use wp_personas::guidance::{
    contextual_questions, tone_adjustment, CRISIS_RESPONSE_TEMPLATE, RESPONSE_TYPE_GUIDANCE,
};
use wp_personas::session_types;

/// Mood snapshots older than this are left out of the prompt.
const MOOD_MAX_AGE_HOURS: i64 = 24;

/// Contextual questions offered per detected situation.
const QUESTIONS_PER_CONTEXT: usize = 3;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// User context
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Render the user-context block: identity facts, profile preferences,
/// goals, pending commitments, observed patterns, important memories,
/// recent mood (< 24h) and recent session summaries.
pub fn user_context_block(
    user_id: &str,
    email: Option<&str>,
    profile: Option<&Profile>,
    ctx: &UserContext,
    now: DateTime<Utc>,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("USER CONTEXT:".into());
    lines.push(format!("- User id: {user_id}"));

    let effective_email = profile
        .and_then(|p| p.email.as_deref())
        .or(email)
        .unwrap_or("unknown");
    lines.push(format!("- Email: {effective_email}"));

    if let Some(profile) = profile {
        if let Some(name) = profile.display_name.as_deref() {
            lines.push(format!("- Display name: {name}"));
        }
        if let Some(pref) = profile.coaching_style_preference.as_deref() {
            lines.push(format!("- Preferred coaching style: {pref}"));
        }
        if let Some(life) = profile.life_context.as_deref() {
            lines.push(format!("- Life context: {life}"));
        }
        if !profile.values.is_empty() {
            lines.push(format!("- Core values: {}", profile.values.join(", ")));
        }
    }

    if !ctx.goals.is_empty() {
        lines.push("\nACTIVE GOALS:".into());
        for g in &ctx.goals {
            let mut line = format!("- {}", g.title);
            if let Some(cat) = g.category.as_deref() {
                line.push_str(&format!(" ({cat})"));
            }
            if let Some(target) = g.target_date {
                line.push_str(&format!(" - target: {target}"));
            }
            lines.push(line);
        }
    }

    if !ctx.pending_commitments.is_empty() {
        lines.push("\nPENDING COMMITMENTS (follow up on these!):".into());
        for c in &ctx.pending_commitments {
            let mut line = format!("- \"{}\"", c.commitment);
            if let Some(due) = c.due_date {
                line.push_str(&format!(" (due: {due})"));
            }
            lines.push(line);
        }
    }

    if !ctx.patterns.is_empty() {
        lines.push("\nOBSERVED PATTERNS:".into());
        for p in &ctx.patterns {
            lines.push(format!("- {}: {}", p.title, p.description));
        }
    }

    if !ctx.important_memories.is_empty() {
        lines.push("\nIMPORTANT THINGS TO REMEMBER:".into());
        for m in &ctx.important_memories {
            let kind = serde_json::to_value(m.kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_owned))
                .unwrap_or_else(|| "fact".into());
            lines.push(format!("- [{kind}] {}", m.content));
        }
    }

    if let Some(mood) = &ctx.recent_mood {
        let hours_ago = (now - mood.created_at).num_hours();
        if (0..MOOD_MAX_AGE_HOURS).contains(&hours_ago) {
            let label = mood.label.as_deref().unwrap_or("");
            let note = mood
                .note
                .as_deref()
                .map(|n| format!(" ({n})"))
                .unwrap_or_default();
            lines.push(format!(
                "\nRECENT MOOD ({hours_ago}h ago): {}/10 - {label}{note}",
                mood.score
            ));
        }
    }

    if !ctx.recent_summaries.is_empty() {
        lines.push("\nRECENT SESSIONS:".into());
        for s in &ctx.recent_summaries {
            lines.push(format!(
                "- {}: {}",
                s.created_at.format("%Y-%m-%d"),
                s.summary
            ));
        }
    }

    lines.join("\n")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Memory summary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Render the rolling conversation-memory block.
pub fn memory_summary_block(memory: &wp_domain::model::ConversationMemory) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("COACHING MEMORY SUMMARY:".into());
    lines.push(format!("- Last updated at: {}", memory.last_updated_at));
    lines.push(format!("- Summary: {}", memory.summary));
    if !memory.themes.is_empty() {
        lines.push(format!("- Themes: {}", memory.themes.join(", ")));
    }
    lines.join("\n")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session context
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Render the base session-context block: active coach, modality,
/// session type, and the session-type behavioral instructions.
pub fn session_context_block(coach_name: &str, conversation: &Conversation) -> String {
    let mode = match conversation.mode {
        wp_domain::model::ConversationMode::Text => "text",
        wp_domain::model::ConversationMode::Voice => "voice",
    };
    format!(
        "CURRENT SESSION:\n- Coach: {coach_name}\n- Mode: {mode}\n- Session type: {}\n\n{}",
        conversation.session_type.key(),
        session_types::instructions(conversation.session_type),
    )
}

/// Extend the base session context with classification guidance.
///
/// Crisis short-circuit: when the crisis classifier fired, the block is
/// the crisis warning plus the fixed response template, and the normal
/// sentiment/response-type guidance is suppressed entirely. Otherwise the
/// optional sentiment block and the generic response-type guidance are
/// appended (the guidance is injected even when classification was
/// skipped).
pub fn enhanced_session_context(base: &str, classification: &Classification) -> String {
    if classification.crisis_detected() {
        let warning = crisis_block(classification)
            .unwrap_or_else(|| "\u{26a0}\u{fe0f} CRISIS DETECTED".into());
        return format!("{base}\n\n{warning}\n\n{CRISIS_RESPONSE_TEMPLATE}");
    }

    let mut out = String::from(base);
    if let Some(sentiment) = sentiment_block(classification) {
        out.push_str("\n\n");
        out.push_str(&sentiment);
    }
    out.push_str("\n\n");
    out.push_str(RESPONSE_TYPE_GUIDANCE);
    out
}

/// Render the crisis warning block (without the response template).
fn crisis_block(classification: &Classification) -> Option<String> {
    let crisis = classification.crisis.as_ref().filter(|c| c.is_crisis)?;
    let indicators = if crisis.indicators.is_empty() {
        "detected".to_owned()
    } else {
        crisis.indicators.join(", ")
    };
    Some(format!(
        "\u{26a0}\u{fe0f} CRISIS DETECTED ({}):\n- Indicators: {indicators}\n- Response: {}\n\n\
         CRITICAL: Respond with care, validation, and appropriate crisis resources. Set clear \
         boundaries about being a coach, not a therapist.",
        crisis.severity.key(),
        crisis.recommended_response,
    ))
}

/// Render the sentiment guidance block: current emotional state, tone
/// adjustments, and up to three contextual questions.
fn sentiment_block(classification: &Classification) -> Option<String> {
    let sentiment = classification.sentiment.as_ref()?;

    let needs = if sentiment.needs.is_empty() {
        "support".to_owned()
    } else {
        sentiment.needs.join(", ")
    };

    let mut out = format!(
        "USER'S CURRENT STATE:\n- Emotional state: {} (intensity: {}/10)\n- Context: {}\n- Needs: {needs}",
        sentiment.sentiment.key(),
        sentiment.intensity.clamp(1, 10),
        sentiment.context.key(),
    );

    if let Some(adjustment) = tone_adjustment(sentiment.sentiment) {
        out.push_str("\n\nADJUST YOUR TONE:\n");
        out.push_str(adjustment);
    }

    let questions = contextual_questions(sentiment.context);
    if !questions.is_empty() {
        out.push_str("\n\nCONTEXTUAL QUESTIONS (use when appropriate):");
        for (i, q) in questions.iter().take(QUESTIONS_PER_CONTEXT).enumerate() {
            out.push_str(&format!("\n{}. {q}", i + 1));
        }
    }

    Some(out)
}
