//! # Reverie Core
//!
//! Shared vocabulary for the behavioral core: the inbound message type,
//! emotion and personality types, configuration, and the interfaces of the
//! collaborators that live outside this workspace (transport presence,
//! relationship store).

pub mod appraisal;
pub mod config;
pub mod emotion;
pub mod profile;

pub use appraisal::appraise;
pub use config::{
    AgentConfig, CatchupConfig, ConfigError, ConversationConfig, EmotionConfig,
    PersonalityConfig, ReverieConfig, RuntimeConfig, StaminaConfig,
};
pub use emotion::{CoreEmotion, EmotionalImpact, EmotionalState, EmotionalTrigger, TriggerKind};
pub use profile::{EmotionProfile, PersonalityProfile, Trait, TraitSnapshot, TraitValues};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Guard against NaN and Infinity in state values.
/// If the value is NaN or Inf, replace with the provided fallback.
#[inline]
pub fn sanitize_f32(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf detected in state, resetting to fallback {}", fallback);
        fallback
    }
}

/// One inbound message, normalized by the transport layer.
///
/// Immutable once created: the builder methods consume `self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Transport-assigned message identifier (idempotency key)
    pub id: String,
    pub author_id: String,
    pub channel_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// The message explicitly mentions the agent
    #[serde(default)]
    pub mentions_agent: bool,
    /// The message arrived in a direct-message channel
    #[serde(default)]
    pub is_direct: bool,
}

impl MessageEvent {
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        channel_id: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            channel_id: channel_id.into(),
            content: content.into(),
            timestamp,
            mentions_agent: false,
            is_direct: false,
        }
    }

    pub fn mentioning(mut self) -> Self {
        self.mentions_agent = true;
        self
    }

    pub fn direct(mut self) -> Self {
        self.is_direct = true;
        self
    }

    /// Directly addressed: a mention or a direct message.
    pub fn is_addressed(&self) -> bool {
        self.mentions_agent || self.is_direct
    }
}

/// Read-only copy of the stamina lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaminaSnapshot {
    pub current: f32,
    pub max: f32,
    pub is_sleeping: bool,
    pub sleep_until: Option<DateTime<Utc>>,
}

impl StaminaSnapshot {
    /// current / max in [0, 1]
    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    /// Stamina expressed on a 0-100 scale regardless of the configured max.
    pub fn percent(&self) -> f32 {
        self.ratio() * 100.0
    }
}

/// Capability to read the current stamina without being able to mutate it.
///
/// Handed to the components whose decisions depend on tiredness at
/// construction time.
#[async_trait]
pub trait StaminaReader: Send + Sync {
    /// Snapshot as of `now`, after any pending recovery.
    async fn stamina_at(&self, now: DateTime<Utc>) -> StaminaSnapshot;

    async fn stamina(&self) -> StaminaSnapshot {
        self.stamina_at(Utc::now()).await
    }
}

/// Durable relationship/interest store.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Relationship strength with a user in [0, 1].
    async fn relationship_strength(&self, user_id: &str) -> anyhow::Result<f32>;
    async fn record_interaction(&self, user_id: &str) -> anyhow::Result<()>;
}

/// Presence indicator exposed through the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Awake,
    Sleeping,
}

/// Outbound presence changes (sleeping/awake indicators).
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn set_presence(&self, presence: Presence) -> anyhow::Result<()>;
}
