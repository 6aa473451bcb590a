//! Batched transcript extraction.
//!
//! After a turn is durably persisted, the full transcript is mined for
//! durable knowledge in one combined completion call (summary,
//! commitments, memories, one insight). Everything here is best-effort:
//! call failures, parse failures and store-write failures are logged and
//! swallowed, never surfaced to the turn's caller.

use chrono::{Days, Months, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use wp_domain::config::ExtractionPolicy;
use wp_domain::model::{
    Commitment, CommitmentStatus, ConversationMemory, Importance, Insight, MemoryEntry,
    MemoryKind, SessionSummary, StoredMessage,
};
use wp_personas::guidance::COMBINED_EXTRACTION_INSTRUCTION;
use wp_providers::{strip_code_fences, CompletionRequest, TurnInvoker};
use wp_store::ContextStore;

/// Extraction analyzes at most this many transcript messages.
const TRANSCRIPT_LIMIT: usize = 50;

/// Extraction calls run cooler than coach turns.
const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// Fallback summaries truncate the raw response to this many bytes.
const FALLBACK_SUMMARY_LIMIT: usize = 500;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trigger policy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Whether extraction should run for a transcript of `message_count`
/// messages: skip below the minimum, always run inside the early window,
/// then only on exact interval multiples.
pub fn should_extract(message_count: usize, policy: &ExtractionPolicy) -> bool {
    if message_count < policy.min_messages {
        return false;
    }
    if message_count <= policy.early_window_max {
        return true;
    }
    policy.interval > 0 && message_count % policy.interval == 0
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Due-date normalization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Normalize a relative timeframe ("today", "tomorrow", "this week",
/// "this month") into an absolute date using a fixed offset table.
/// Unrecognized timeframes yield `None`.
pub fn parse_due_date(timeframe: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = timeframe.to_lowercase();
    if lower.contains("today") {
        Some(today)
    } else if lower.contains("tomorrow") {
        today.checked_add_days(Days::new(1))
    } else if lower.contains("week") {
        today.checked_add_days(Days::new(7))
    } else if lower.contains("month") {
        today.checked_add_months(Months::new(1))
    } else {
        None
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response facets
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, Deserialize)]
struct SummaryFacet {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    key_topics: Vec<String>,
    #[serde(default)]
    emotional_tone: Option<String>,
    #[serde(default)]
    breakthroughs: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CommitmentFacet {
    #[serde(default)]
    commitment: Option<String>,
    #[serde(default)]
    timeframe: Option<String>,
    #[serde(default)]
    context: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MemoryFacet {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    importance: Option<String>,
}

/// The combined extraction result, with each facet parsed independently
/// so one malformed facet never discards the others.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExtractionOutcome {
    summary: Option<SummaryFacet>,
    commitments: Vec<CommitmentFacet>,
    memories: Vec<MemoryFacet>,
    insight: Option<String>,
}

/// Parse the raw extraction response. A response that is not JSON at all
/// degrades to a plain-text summary facet; a facet that does not match
/// its expected shape is dropped with a warning.
pub(crate) fn parse_outcome(raw: &str) -> ExtractionOutcome {
    let cleaned = strip_code_fences(raw);
    let value: Value = match serde_json::from_str(cleaned) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "extraction response is not JSON, keeping plain-text summary");
            let mut end = cleaned.len().min(FALLBACK_SUMMARY_LIMIT);
            while !cleaned.is_char_boundary(end) {
                end -= 1;
            }
            return ExtractionOutcome {
                summary: Some(SummaryFacet {
                    text: Some(cleaned[..end].to_owned()),
                    ..SummaryFacet::default()
                }),
                ..ExtractionOutcome::default()
            };
        }
    };

    fn facet<T: serde::de::DeserializeOwned>(value: &Value, name: &str) -> Option<T> {
        let v = value.get(name)?;
        if v.is_null() {
            return None;
        }
        match serde_json::from_value(v.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(facet = name, error = %e, "dropping malformed extraction facet");
                None
            }
        }
    }

    ExtractionOutcome {
        summary: facet::<SummaryFacet>(&value, "summary"),
        commitments: facet::<Vec<CommitmentFacet>>(&value, "commitments").unwrap_or_default(),
        memories: facet::<Vec<MemoryFacet>>(&value, "memories").unwrap_or_default(),
        insight: facet::<String>(&value, "insight").filter(|s| !s.trim().is_empty()),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Extraction run
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn render_transcript(messages: &[StoredMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.sender.speaker_label(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mine the conversation transcript and persist whatever comes back.
/// Never returns an error; the turn has already succeeded by the time
/// this runs.
pub async fn run_extraction(
    store: &dyn ContextStore,
    invoker: &TurnInvoker,
    policy: &ExtractionPolicy,
    conversation_id: &str,
    user_id: &str,
) {
    let messages = match store.transcript(conversation_id, TRANSCRIPT_LIMIT).await {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load transcript for extraction");
            return;
        }
    };

    if !should_extract(messages.len(), policy) {
        tracing::debug!(
            count = messages.len(),
            "skipping extraction, trigger policy not met"
        );
        return;
    }

    let req = CompletionRequest {
        model: None,
        system_instruction: COMBINED_EXTRACTION_INSTRUCTION.to_owned(),
        payload: render_transcript(&messages),
        temperature: Some(EXTRACTION_TEMPERATURE),
        top_p: None,
    };
    let raw = match invoker.invoke(&req).await {
        Ok(completion) => completion.text,
        Err(e) => {
            tracing::warn!(error = %e, "combined extraction call failed");
            return;
        }
    };

    let outcome = parse_outcome(&raw);
    persist_outcome(store, outcome, conversation_id, user_id).await;
}

/// Persist each facet independently; a failed write drops that facet only.
async fn persist_outcome(
    store: &dyn ContextStore,
    outcome: ExtractionOutcome,
    conversation_id: &str,
    user_id: &str,
) {
    let now = Utc::now();
    let today = now.date_naive();

    // 1) Session summary + rolling conversation memory.
    let summary_text = outcome.summary.as_ref().and_then(|s| {
        s.text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| (s, t))
    });
    if let Some((summary, text)) = summary_text {
        let row = SessionSummary {
            user_id: user_id.to_owned(),
            conversation_id: conversation_id.to_owned(),
            summary: text.to_owned(),
            key_topics: summary.key_topics.clone(),
            emotional_tone: summary.emotional_tone.clone(),
            breakthroughs: summary.breakthroughs.clone(),
            created_at: now,
        };
        if let Err(e) = store.insert_session_summary(&row).await {
            tracing::warn!(error = %e, "failed to insert session summary");
        }

        let memory = ConversationMemory {
            conversation_id: conversation_id.to_owned(),
            summary: text.to_owned(),
            themes: summary.key_topics.clone(),
            last_updated_at: now,
        };
        if let Err(e) = store.upsert_conversation_memory(&memory).await {
            tracing::warn!(error = %e, "failed to upsert conversation memory");
        }
    }

    // 2) Commitments (explicit user agreements only; empty text skipped).
    for facet in &outcome.commitments {
        let Some(text) = facet.commitment.as_deref().filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        let row = Commitment {
            user_id: user_id.to_owned(),
            commitment: text.to_owned(),
            context: facet.context.clone(),
            due_date: facet
                .timeframe
                .as_deref()
                .and_then(|tf| parse_due_date(tf, today)),
            status: CommitmentStatus::Pending,
        };
        if let Err(e) = store.insert_commitment(&row).await {
            tracing::warn!(error = %e, "failed to insert commitment");
        }
    }

    // 3) Memories (unknown kinds skipped, importance parsed leniently).
    for facet in &outcome.memories {
        let (Some(kind_key), Some(content)) = (facet.kind.as_deref(), facet.content.as_deref())
        else {
            continue;
        };
        let Some(kind) = MemoryKind::from_key(kind_key) else {
            tracing::warn!(kind = kind_key, "skipping memory with unknown type");
            continue;
        };
        if content.trim().is_empty() {
            continue;
        }
        let row = MemoryEntry {
            user_id: user_id.to_owned(),
            kind,
            content: content.to_owned(),
            importance: facet
                .importance
                .as_deref()
                .map(Importance::from_key)
                .unwrap_or_default(),
            active: true,
        };
        if let Err(e) = store.insert_memory(&row).await {
            tracing::warn!(error = %e, "failed to insert memory");
        }
    }

    // 4) At most one insight.
    if let Some(text) = outcome.insight.as_deref() {
        let row = Insight {
            user_id: user_id.to_owned(),
            conversation_id: conversation_id.to_owned(),
            summary: text.to_owned(),
            user_approved: false,
        };
        if let Err(e) = store.insert_insight(&row).await {
            tracing::warn!(error = %e, "failed to insert insight");
        }
    }

    tracing::info!(conversation_id, "extraction complete");
}
