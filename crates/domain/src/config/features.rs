use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Feature gating
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Operating mode governing the per-turn external-call budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    /// Classification and extraction both run.
    #[default]
    Full,
    /// Cost-saving mode: per-message classification and transcript
    /// extraction are disabled; generic response guidance is still
    /// injected into prompts.
    Lean,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub mode: FeatureMode,
    #[serde(default)]
    pub extraction: ExtractionPolicy,
}

/// When the extraction engine runs, expressed over the transcript length.
///
/// Extraction fires when the message count is at least `min_messages` and
/// either falls inside the early window (`min_messages..=early_window_max`)
/// or is an exact multiple of `interval`. A cost-control heuristic, not an
/// invariant — tune freely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExtractionPolicy {
    #[serde(default = "d_min_messages")]
    pub min_messages: usize,
    #[serde(default = "d_early_window_max")]
    pub early_window_max: usize,
    #[serde(default = "d_interval")]
    pub interval: usize,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            min_messages: d_min_messages(),
            early_window_max: d_early_window_max(),
            interval: d_interval(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_min_messages() -> usize {
    6
}
fn d_early_window_max() -> usize {
    11
}
fn d_interval() -> usize {
    8
}
