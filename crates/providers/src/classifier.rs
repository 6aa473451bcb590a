//! Per-message sentiment and crisis classification.
//!
//! Two independent completion calls over the single incoming user
//! message, short-circuiting: an affirmative crisis reading skips the
//! sentiment call entirely. Classifier output is defensively parsed
//! (code fences stripped before JSON parsing); a parse failure degrades
//! to "no classification" rather than failing the turn.

use wp_domain::classify::{Classification, CrisisAssessment, SentimentAnalysis};
use wp_personas::guidance::{CRISIS_DETECTION_INSTRUCTION, SENTIMENT_ANALYSIS_INSTRUCTION};

use crate::invoker::TurnInvoker;
use crate::traits::CompletionRequest;

/// Classifier calls run cooler than coach turns.
const INSTRUCTION_TEMPERATURE: f32 = 0.2;

/// Strip a wrapping markdown code fence (` ``` ` or ` ```json `) from a
/// model response before JSON parsing.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Runs the two-stage classification pipeline through a [`TurnInvoker`].
pub struct MessageClassifier {
    invoker: TurnInvoker,
}

impl MessageClassifier {
    pub fn new(invoker: TurnInvoker) -> Self {
        Self { invoker }
    }

    /// Classify one user message. Crisis first; sentiment only when no
    /// crisis was detected. Never fails: classification errors are logged
    /// and produce an empty [`Classification`].
    pub async fn classify(&self, message: &str) -> Classification {
        let mut result = Classification::default();

        result.crisis = self.assess_crisis(message).await;
        if result.crisis_detected() {
            tracing::info!(
                severity = %result
                    .crisis
                    .as_ref()
                    .map(|c| c.severity.key())
                    .unwrap_or("unknown"),
                "crisis indicators detected, skipping sentiment analysis"
            );
            return result;
        }

        result.sentiment = self.analyze_sentiment(message).await;
        result
    }

    async fn assess_crisis(&self, message: &str) -> Option<CrisisAssessment> {
        let raw = self
            .instruction_call(CRISIS_DETECTION_INSTRUCTION, message)
            .await?;
        match serde_json::from_str::<CrisisAssessment>(strip_code_fences(&raw)) {
            Ok(assessment) => Some(assessment),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse crisis detection response");
                None
            }
        }
    }

    async fn analyze_sentiment(&self, message: &str) -> Option<SentimentAnalysis> {
        let raw = self
            .instruction_call(SENTIMENT_ANALYSIS_INSTRUCTION, message)
            .await?;
        match serde_json::from_str::<SentimentAnalysis>(strip_code_fences(&raw)) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse sentiment analysis response");
                None
            }
        }
    }

    async fn instruction_call(&self, instruction: &str, message: &str) -> Option<String> {
        let req = CompletionRequest {
            model: None,
            system_instruction: instruction.to_owned(),
            payload: format!("User message: {message}"),
            temperature: Some(INSTRUCTION_TEMPERATURE),
            top_p: None,
        };
        match self.invoker.invoke(&req).await {
            Ok(completion) => Some(completion.text),
            Err(e) => {
                tracing::warn!(error = %e, "classifier call failed, continuing without it");
                None
            }
        }
    }
}
