use crate::profile::{PersonalityProfile, TraitValues};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReverieConfig {
    pub agent: AgentConfig,
    pub emotion: EmotionConfig,
    pub stamina: StaminaConfig,
    pub personality: PersonalityConfig,
    pub conversation: ConversationConfig,
    pub catchup: CatchupConfig,
    pub runtime: RuntimeConfig,
}

/// Inconsistent configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{low} ({low_value}) must not exceed {high} ({high_value})")]
    Inverted {
        low: &'static str,
        low_value: f64,
        high: &'static str,
        high_value: f64,
    },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn check_order(
    low: &'static str,
    low_value: f64,
    high: &'static str,
    high_value: f64,
) -> Result<(), ConfigError> {
    if low_value <= high_value {
        Ok(())
    } else {
        Err(ConfigError::Inverted {
            low,
            low_value,
            high,
            high_value,
        })
    }
}

impl ReverieConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied and the result is validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: ReverieConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return
    /// defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                if let Err(e) = cfg.validate() {
                    tracing::warn!("Env overrides produced invalid config ({}), ignoring them", e);
                    cfg = Self::default();
                }
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("REVERIE_AGENT_ID") {
            self.agent.agent_id = v;
        }
        if let Ok(v) = std::env::var("REVERIE_STAMINA_MAX") {
            if let Ok(n) = v.parse() {
                self.stamina.max = n;
                self.stamina.initial = self.stamina.initial.min(n);
            }
        }
        if let Ok(v) = std::env::var("REVERIE_STAMINA_LOW_THRESHOLD") {
            if let Ok(n) = v.parse() {
                self.stamina.low_threshold = n;
            }
        }
        if let Ok(v) = std::env::var("REVERIE_TICK_SECS") {
            if let Ok(n) = v.parse() {
                self.runtime.tick_interval_secs = n;
            }
        }
        if let Ok(v) = std::env::var("REVERIE_CATCHUP_CAPACITY") {
            if let Ok(n) = v.parse() {
                self.catchup.capacity = n;
            }
        }
    }

    /// Reject values the state machines cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.agent_id.trim().is_empty() {
            return Err(ConfigError::Empty("agent.agent_id"));
        }

        let s = &self.stamina;
        check_range("stamina.max", s.max as f64, f64::EPSILON, f64::MAX)?;
        check_range("stamina.initial", s.initial as f64, 0.0, s.max as f64)?;
        check_range("stamina.low_threshold", s.low_threshold as f64, 0.0, s.max as f64)?;
        check_range("stamina.wake_ratio", s.wake_ratio as f64, 0.0, 1.0)?;
        check_order(
            "stamina.low_threshold",
            s.low_threshold as f64,
            "stamina.max * stamina.wake_ratio",
            (s.max * s.wake_ratio) as f64,
        )?;
        check_range("stamina.recovery_per_minute", s.recovery_per_minute as f64, 0.0, f64::MAX)?;
        check_range("stamina.sleep_multiplier", s.sleep_multiplier as f64, 1.0, f64::MAX)?;

        let p = &self.personality;
        check_order(
            "personality.min_trait",
            p.min_trait as f64,
            "personality.max_trait",
            p.max_trait as f64,
        )?;
        check_range("personality.adaptation_rate", p.adaptation_rate as f64, 0.0, 1.0)?;
        check_range(
            "personality.significance_threshold",
            p.significance_threshold as f64,
            0.0,
            1.0,
        )?;
        check_range(
            "personality.base_initiation_probability",
            p.base_initiation_probability as f64,
            0.0,
            1.0,
        )?;
        check_range(
            "personality.base_response_probability",
            p.base_response_probability as f64,
            0.0,
            1.0,
        )?;
        check_order(
            "personality.min_response_delay_ms",
            p.min_response_delay_ms as f64,
            "personality.max_response_delay_ms",
            p.max_response_delay_ms as f64,
        )?;

        let c = &self.conversation;
        check_range(
            "conversation.high_importance_threshold",
            c.high_importance_threshold as f64,
            0.0,
            1.0,
        )?;
        check_order(
            "conversation.idle_threshold_minutes",
            c.idle_threshold_minutes as f64,
            "conversation.idle_completion_minutes",
            c.idle_completion_minutes as f64,
        )?;
        if c.max_conversations == 0 {
            return Err(ConfigError::OutOfRange {
                field: "conversation.max_conversations",
                value: 0.0,
                min: 1.0,
                max: f64::MAX,
            });
        }

        if self.catchup.capacity == 0 || self.catchup.max_batch_size == 0 {
            return Err(ConfigError::Empty("catchup.capacity / catchup.max_batch_size"));
        }
        Ok(())
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// The agent's own user id on the transport
    pub agent_id: String,
    pub display_name: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: "reverie".to_string(),
            display_name: "Reverie".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    pub profile: PersonalityProfile,
    /// Impacts at or above this significance are logged at info level
    pub significance_log_threshold: f32,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            profile: PersonalityProfile::default(),
            significance_log_threshold: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    pub max: f32,
    pub initial: f32,
    /// Falling below this puts the agent to sleep
    pub low_threshold: f32,
    /// Fraction of max at which a sleeping agent wakes up
    pub wake_ratio: f32,
    pub recovery_per_minute: f32,
    /// Recovery multiplier while asleep
    pub sleep_multiplier: f32,
    /// Cost of processing one inbound message
    pub message_cost: f32,
    /// Additional cost of producing a response
    pub response_cost: f32,
    /// Cost of initiating a conversation
    pub initiation_cost: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            initial: 100.0,
            low_threshold: 20.0,
            wake_ratio: 0.8,
            recovery_per_minute: 0.5,
            sleep_multiplier: 3.0,
            message_cost: 0.5,
            response_cost: 2.0,
            initiation_cost: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersonalityConfig {
    pub min_trait: f32,
    pub max_trait: f32,
    pub initial_traits: TraitValues,
    /// Scale applied to every trait nudge
    pub adaptation_rate: f32,
    /// Impacts must exceed this significance to adapt traits
    pub significance_threshold: f32,

    pub base_initiation_probability: f32,
    /// A conversation silent for this long counts as dormant
    pub dormant_threshold_minutes: i64,
    /// Cool-down between two initiations
    pub min_initiation_delay_secs: i64,
    /// Per-trait weight in the initiation formula
    pub initiation_influence: TraitValues,

    pub base_response_probability: f32,
    pub relationship_weight: f32,
    pub activity_weight: f32,
    /// Window used to measure conversation activity
    pub activity_window_secs: i64,
    /// Messages within the window that saturate activity at 1.0
    pub activity_saturation: usize,
    /// Activity level at which a conversation counts as very active
    pub very_active_level: f32,

    pub min_response_delay_ms: u64,
    pub max_response_delay_ms: u64,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            min_trait: 0.0,
            max_trait: 1.0,
            initial_traits: TraitValues::default(),
            adaptation_rate: 0.5,
            significance_threshold: 0.3,

            base_initiation_probability: 0.1,
            dormant_threshold_minutes: 60,
            min_initiation_delay_secs: 1800,
            initiation_influence: TraitValues {
                formal: -0.2,
                responsive: 0.1,
                outgoing: 0.5,
                playful: 0.2,
                empathetic: 0.1,
                curious: 0.2,
            },

            base_response_probability: 0.3,
            relationship_weight: 0.4,
            activity_weight: 0.2,
            activity_window_secs: 300,
            activity_saturation: 10,
            very_active_level: 0.8,

            min_response_delay_ms: 800,
            max_response_delay_ms: 4000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Silence after which an Active conversation becomes Idle
    pub idle_threshold_minutes: i64,
    /// Silence after which an Idle conversation is completed
    pub idle_completion_minutes: i64,
    /// How long Completed conversations are kept before deletion
    pub completion_retention_minutes: i64,
    pub max_conversations: usize,
    pub high_importance_threshold: f32,
    /// Oldest messages are dropped beyond this count
    pub max_messages: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            idle_threshold_minutes: 15,
            idle_completion_minutes: 120,
            completion_retention_minutes: 60,
            max_conversations: 200,
            high_importance_threshold: 0.8,
            max_messages: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatchupConfig {
    pub capacity: usize,
    pub max_batch_size: usize,
}

impl Default for CatchupConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            max_batch_size: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How often the host should call `tick`
    pub tick_interval_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 60,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
