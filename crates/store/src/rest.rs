//! REST implementation of [`ContextStore`].
//!
//! `RestContextStore` wraps a `reqwest::Client` and translates every
//! trait method into PostgREST-style calls (`?col=eq.v` filters,
//! `order=`, `limit=`, `Prefer: return=representation`) with automatic
//! retry + exponential back-off on transient (5xx / timeout) failures.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use wp_domain::config::StoreConfig;
use wp_domain::error::{Error, Result};
use wp_domain::model::{
    Coach, Commitment, Conversation, ConversationMemory, ConversationMode, EngagementStats,
    Insight, MemoryEntry, NewMessage, Profile, SessionSummary, SessionType, StoredMessage,
    UserContext,
};

// Per-section query caps for the personalization bundle.
const GOALS_LIMIT: usize = 5;
const COMMITMENTS_LIMIT: usize = 5;
const PATTERNS_LIMIT: usize = 3;
const MEMORIES_LIMIT: usize = 10;
const SUMMARIES_LIMIT: usize = 3;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for the persistent store.
///
/// Created once at startup and reused for the process lifetime; the
/// underlying `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestContextStore {
    http: Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl RestContextStore {
    /// Build a new client from the store config. The service key is read
    /// from the environment variable named in `cfg.api_key_env`.
    pub fn new(cfg: &StoreConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
            Error::Auth(format!(
                "environment variable '{}' not set or not valid UTF-8",
                cfg.api_key_env
            ))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key,
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Build the full URL for a table path + query string.
    fn url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{table}", self.base_url)
        } else {
            format!("{}/rest/v1/{table}?{query}", self.base_url)
        }
    }

    /// Decorate a `RequestBuilder` with the standard store headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient
    /// errors.
    ///
    /// * Retries on 5xx status codes and on timeouts.
    /// * Does **not** retry on 4xx (client errors are permanent).
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let rb = self.decorate(build_request());
            match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_server_error() {
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Store(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                        continue;
                    }

                    if status.is_client_error() {
                        let body = resp.text().await.unwrap_or_default();
                        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                            return Err(Error::Auth(format!(
                                "{endpoint} auth failed ({status}): {body}"
                            )));
                        }
                        return Err(Error::Store(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    last_err = Some(if e.is_timeout() {
                        Error::Timeout(e.to_string())
                    } else {
                        Error::Http(e.to_string())
                    });
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Store(format!("{endpoint}: all retries exhausted"))))
    }

    // ── typed operations ─────────────────────────────────────────────

    /// GET rows of a table; deserializes the JSON array response.
    async fn select<T: DeserializeOwned>(&self, table: &str, query: &str) -> Result<Vec<T>> {
        let url = self.url(table, query);
        let endpoint = format!("GET /{table}");
        let resp = self
            .execute_with_retry(&endpoint, || self.http.get(&url))
            .await?;

        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|e| Error::Store(format!("failed to parse {table} response: {e}: {body}")))
    }

    /// GET at most one row of a table.
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Option<T>> {
        let query = format!("{query}&limit=1");
        let mut rows = self.select::<T>(table, &query).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    /// POST one row; returns the representation the store created.
    async fn insert_returning<T: DeserializeOwned>(
        &self,
        table: &str,
        row: &serde_json::Value,
    ) -> Result<T> {
        let url = self.url(table, "");
        let endpoint = format!("POST /{table}");
        let resp = self
            .execute_with_retry(&endpoint, || {
                self.http
                    .post(&url)
                    .header("Prefer", "return=representation")
                    .json(row)
            })
            .await?;

        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        let mut rows: Vec<T> = serde_json::from_str(&body)
            .map_err(|e| Error::Store(format!("failed to parse {table} response: {e}: {body}")))?;
        if rows.is_empty() {
            return Err(Error::Store(format!("{table} insert returned no rows")));
        }
        Ok(rows.remove(0))
    }

    /// POST one row, ignoring the response body.
    async fn insert(&self, table: &str, row: &serde_json::Value) -> Result<()> {
        let url = self.url(table, "");
        let endpoint = format!("POST /{table}");
        self.execute_with_retry(&endpoint, || self.http.post(&url).json(row))
            .await?;
        Ok(())
    }

    /// PATCH rows matching the query.
    async fn patch(&self, table: &str, query: &str, patch: &serde_json::Value) -> Result<()> {
        let url = self.url(table, query);
        let endpoint = format!("PATCH /{table}");
        self.execute_with_retry(&endpoint, || self.http.patch(&url).json(patch))
            .await?;
        Ok(())
    }

    /// Best-effort variant of [`Self::select`] for the personalization
    /// sub-reads: failures degrade to an empty list with a warning.
    async fn select_or_empty<T: DeserializeOwned>(&self, table: &str, query: &str) -> Vec<T> {
        match self.select(table, query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(table, error = %e, "personalization read failed, continuing");
                Vec::new()
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl crate::gateway::ContextStore for RestContextStore {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>> {
        self.select_one("profiles", &format!("id=eq.{user_id}")).await
    }

    async fn update_engagement(&self, user_id: &str, stats: &EngagementStats) -> Result<()> {
        self.patch(
            "profiles",
            &format!("id=eq.{user_id}"),
            &serde_json::to_value(stats)?,
        )
        .await
    }

    async fn coach(&self, coach_id: &str) -> Result<Option<Coach>> {
        self.select_one("coaches", &format!("id=eq.{coach_id}")).await
    }

    async fn default_coach(&self) -> Result<Option<Coach>> {
        self.select_one("coaches", "is_default=eq.true").await
    }

    async fn conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        self.select_one("conversations", &format!("id=eq.{conversation_id}"))
            .await
    }

    async fn create_conversation(
        &self,
        user_id: &str,
        coach_id: &str,
        mode: ConversationMode,
        session_type: SessionType,
    ) -> Result<Conversation> {
        self.insert_returning(
            "conversations",
            &serde_json::json!({
                "user_id": user_id,
                "coach_id": coach_id,
                "mode": mode,
                "session_type": session_type,
            }),
        )
        .await
    }

    async fn touch_conversation(&self, conversation_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.patch(
            "conversations",
            &format!("id=eq.{conversation_id}"),
            &serde_json::json!({ "last_active_at": at }),
        )
        .await
    }

    async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        let mut messages: Vec<StoredMessage> = self
            .select(
                "messages",
                &format!(
                    "conversation_id=eq.{conversation_id}&order=created_at.desc&limit={limit}"
                ),
            )
            .await?;
        messages.reverse();
        Ok(messages)
    }

    async fn transcript(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        self.select(
            "messages",
            &format!("conversation_id=eq.{conversation_id}&order=created_at.asc&limit={limit}"),
        )
        .await
    }

    async fn append_message(&self, message: NewMessage) -> Result<StoredMessage> {
        self.insert_returning("messages", &serde_json::to_value(&message)?)
            .await
    }

    async fn update_message_metadata(
        &self,
        message_id: &str,
        metadata: serde_json::Value,
    ) -> Result<()> {
        self.patch(
            "messages",
            &format!("id=eq.{message_id}"),
            &serde_json::json!({ "metadata": metadata }),
        )
        .await
    }

    async fn user_context(&self, user_id: &str) -> Result<UserContext> {
        let goals = self
            .select_or_empty(
                "user_goals",
                &format!("user_id=eq.{user_id}&status=eq.active&limit={GOALS_LIMIT}"),
            )
            .await;

        let pending_commitments = self
            .select_or_empty(
                "commitments",
                &format!(
                    "user_id=eq.{user_id}&status=eq.pending&order=due_date.asc.nullslast&limit={COMMITMENTS_LIMIT}"
                ),
            )
            .await;

        let patterns = self
            .select_or_empty(
                "user_patterns",
                &format!(
                    "user_id=eq.{user_id}&is_active=eq.true&order=last_observed.desc&limit={PATTERNS_LIMIT}"
                ),
            )
            .await;

        let important_memories = self
            .select_or_empty(
                "user_memory",
                &format!(
                    "user_id=eq.{user_id}&is_active=eq.true&importance=eq.high&order=created_at.desc&limit={MEMORIES_LIMIT}"
                ),
            )
            .await;

        let recent_mood = self
            .select_or_empty(
                "mood_entries",
                &format!("user_id=eq.{user_id}&order=created_at.desc&limit=1"),
            )
            .await
            .into_iter()
            .next();

        let recent_summaries = self
            .select_or_empty(
                "session_summaries",
                &format!("user_id=eq.{user_id}&order=created_at.desc&limit={SUMMARIES_LIMIT}"),
            )
            .await;

        Ok(UserContext {
            goals,
            pending_commitments,
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
        self.select_one(
            "conversation_memory",
            &format!("conversation_id=eq.{conversation_id}&order=last_updated_at.desc"),
        )
        .await
    }

    async fn upsert_conversation_memory(&self, memory: &ConversationMemory) -> Result<()> {
        let url = self.url("conversation_memory", "on_conflict=conversation_id");
        self.execute_with_retry("POST /conversation_memory", || {
            self.http
                .post(&url)
                .header("Prefer", "resolution=merge-duplicates")
                .json(memory)
        })
        .await?;
        Ok(())
    }

    async fn insert_session_summary(&self, summary: &SessionSummary) -> Result<()> {
        self.insert("session_summaries", &serde_json::to_value(summary)?)
            .await
    }

    async fn insert_commitment(&self, commitment: &Commitment) -> Result<()> {
        self.insert("commitments", &serde_json::to_value(commitment)?)
            .await
    }

    async fn insert_memory(&self, memory: &MemoryEntry) -> Result<()> {
        self.insert("user_memory", &serde_json::to_value(memory)?).await
    }

    async fn insert_insight(&self, insight: &Insight) -> Result<()> {
        self.insert("insights", &serde_json::to_value(insight)?).await
    }
}
