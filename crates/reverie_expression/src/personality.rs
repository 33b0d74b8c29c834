//! Personality adapter
//!
//! Traits drift slowly with emotional experience and shape two decisions:
//! whether to answer a message and whether to open a conversation
//! unprompted. Both decisions also read the current emotions and stamina.

use crate::pacing::Pacer;
use crate::style::ResponseStyle;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use reverie_core::{
    sanitize_f32, CoreEmotion, EmotionalImpact, EmotionalState, MessageEvent, PersonalityConfig,
    RelationshipStore, StaminaReader, Trait, TraitSnapshot,
};
use reverie_limbic::EmotionEngine;
use reverie_memory::Conversation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Adaptations kept for inspection
const HISTORY_LIMIT: usize = 50;

/// Below this stamina ratio decisions are scaled down proportionally
const TIRED_RATIO: f32 = 0.5;
const NEGATIVE_EMOTION_FACTOR: f32 = 0.7;
const DORMANT_BOOST: f32 = 1.5;

/// Trait nudges selected by the dominant emotion of an impact.
fn nudges(emotion: CoreEmotion) -> &'static [(Trait, f32)] {
    match emotion {
        CoreEmotion::Joy => &[
            (Trait::Outgoing, 0.1),
            (Trait::Playful, 0.1),
            (Trait::Responsive, 0.05),
            (Trait::Formal, -0.05),
        ],
        CoreEmotion::Sadness => &[
            (Trait::Outgoing, -0.1),
            (Trait::Playful, -0.1),
            (Trait::Empathetic, 0.1),
        ],
        CoreEmotion::Anger => &[
            (Trait::Responsive, -0.1),
            (Trait::Formal, 0.1),
            (Trait::Empathetic, -0.05),
        ],
        CoreEmotion::Fear => &[
            (Trait::Outgoing, -0.1),
            (Trait::Formal, 0.05),
            (Trait::Responsive, -0.05),
        ],
        CoreEmotion::Surprise => &[(Trait::Curious, 0.1), (Trait::Responsive, 0.05)],
        CoreEmotion::Disgust => &[
            (Trait::Responsive, -0.1),
            (Trait::Formal, 0.05),
            (Trait::Playful, -0.05),
        ],
    }
}

/// One applied trait adaptation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitAdaptation {
    pub at: DateTime<Utc>,
    pub source_id: String,
    pub content_id: String,
    pub dominant: CoreEmotion,
    pub significance: f32,
    /// Change actually applied to each trait (after clamping)
    pub changes: BTreeMap<Trait, f32>,
}

/// Outcome of the response decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseDecision {
    pub respond: bool,
    /// Probability the decision was drawn against (1.0 when addressed)
    pub probability: f32,
    /// Pause before replying; zero when not responding
    pub delay: std::time::Duration,
}

struct AdapterState {
    traits: TraitSnapshot,
    last_initiation: Option<DateTime<Utc>>,
    history: VecDeque<TraitAdaptation>,
}

pub struct PersonalityAdapter {
    config: PersonalityConfig,
    stamina: Arc<dyn StaminaReader>,
    emotions: Arc<EmotionEngine>,
    relationships: Arc<dyn RelationshipStore>,
    pacer: Pacer,
    state: Mutex<AdapterState>,
}

impl PersonalityAdapter {
    pub fn new(
        config: PersonalityConfig,
        stamina: Arc<dyn StaminaReader>,
        emotions: Arc<EmotionEngine>,
        relationships: Arc<dyn RelationshipStore>,
    ) -> Self {
        let (min, max) = trait_bounds(&config);
        let traits = Trait::ALL
            .iter()
            .map(|t| {
                let value = sanitize_f32(config.initial_traits.get(*t), 0.5);
                (*t, value.clamp(min, max))
            })
            .collect();
        let pacer = Pacer::new(config.min_response_delay_ms, config.max_response_delay_ms);
        Self {
            config,
            stamina,
            emotions,
            relationships,
            pacer,
            state: Mutex::new(AdapterState {
                traits,
                last_initiation: None,
                history: VecDeque::new(),
            }),
        }
    }

    pub fn config(&self) -> &PersonalityConfig {
        &self.config
    }

    /// Copy of the current trait values.
    pub async fn profile(&self) -> TraitSnapshot {
        self.state.lock().await.traits.clone()
    }

    /// Most recent adaptations, oldest first.
    pub async fn history(&self) -> Vec<TraitAdaptation> {
        self.state.lock().await.history.iter().cloned().collect()
    }

    /// Let a significant emotional impact nudge the traits.
    ///
    /// Returns the applied adaptation, or `None` if the impact was not
    /// significant enough or carried no positive delta.
    pub async fn adapt(
        &self,
        event: &MessageEvent,
        impact: &EmotionalImpact,
    ) -> Option<TraitAdaptation> {
        self.adapt_at(event, impact, Utc::now()).await
    }

    pub async fn adapt_at(
        &self,
        event: &MessageEvent,
        impact: &EmotionalImpact,
        now: DateTime<Utc>,
    ) -> Option<TraitAdaptation> {
        if impact.significance <= self.config.significance_threshold {
            return None;
        }
        let dominant = impact.dominant_emotion()?;
        let (min, max) = trait_bounds(&self.config);

        let mut state = self.state.lock().await;
        let mut changes = BTreeMap::new();
        for (t, delta) in nudges(dominant) {
            let old = state.traits.get(t).copied().unwrap_or(0.5);
            let step = delta * impact.significance * self.config.adaptation_rate;
            let new = sanitize_f32(old + step, old).clamp(min, max);
            state.traits.insert(*t, new);
            changes.insert(*t, new - old);
        }

        let adaptation = TraitAdaptation {
            at: now,
            source_id: event.author_id.clone(),
            content_id: event.id.clone(),
            dominant,
            significance: impact.significance,
            changes,
        };
        state.history.push_back(adaptation.clone());
        while state.history.len() > HISTORY_LIMIT {
            state.history.pop_front();
        }
        tracing::debug!(
            "Traits adapted to {} (significance {:.2}): {:?}",
            dominant,
            impact.significance,
            adaptation.changes
        );
        Some(adaptation)
    }

    /// Note that the agent just opened a conversation (starts the cool-down).
    pub async fn record_initiation(&self, now: DateTime<Utc>) {
        self.state.lock().await.last_initiation = Some(now);
    }

    pub async fn last_initiation(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_initiation
    }

    fn activity(&self, conversation: &Conversation, now: DateTime<Utc>) -> f32 {
        conversation.activity_level(
            now,
            Duration::seconds(self.config.activity_window_secs.max(0)),
            self.config.activity_saturation,
        )
    }

    /// Probability of starting a conversation unprompted, in [0, 1].
    pub async fn initiation_probability(&self, conversation: &Conversation) -> f32 {
        self.initiation_probability_at(conversation, Utc::now()).await
    }

    pub async fn initiation_probability_at(
        &self,
        conversation: &Conversation,
        now: DateTime<Utc>,
    ) -> f32 {
        let (traits, last_initiation) = {
            let state = self.state.lock().await;
            (state.traits.clone(), state.last_initiation)
        };

        if let Some(last) = last_initiation {
            if (now - last).num_seconds() < self.config.min_initiation_delay_secs {
                return 0.0;
            }
        }
        if self.activity(conversation, now) >= self.config.very_active_level {
            return 0.0;
        }

        let stamina = self.stamina.stamina_at(now).await;
        let emotions = self.emotions.current_state_at(now).await;

        let mut p = self.config.base_initiation_probability;
        if conversation.idle_for(now) >= Duration::minutes(self.config.dormant_threshold_minutes)
        {
            p *= DORMANT_BOOST;
        }
        for t in Trait::ALL {
            let value = traits.get(&t).copied().unwrap_or(0.5);
            let weight = self.config.initiation_influence.get(t);
            p *= (1.0 + weight * (value - 0.5) * 2.0).max(0.0);
        }
        p = self.mood_and_energy(p, &emotions, stamina.ratio());
        sanitize_f32(p, 0.0).clamp(0.0, 1.0)
    }

    /// Draw against the initiation probability. A positive draw starts the
    /// cool-down. Returns the outcome and the probability used.
    pub async fn try_initiate_at(
        &self,
        conversation: &Conversation,
        now: DateTime<Utc>,
    ) -> (bool, f32) {
        let roll = rand::thread_rng().gen::<f32>();
        self.try_initiate_with_roll(conversation, now, roll).await
    }

    pub async fn try_initiate_with_roll(
        &self,
        conversation: &Conversation,
        now: DateTime<Utc>,
        roll: f32,
    ) -> (bool, f32) {
        let probability = self.initiation_probability_at(conversation, now).await;
        let initiate = roll < probability;
        if initiate {
            self.record_initiation(now).await;
            tracing::info!(
                "Initiating in conversation {} (p={:.2})",
                conversation.id,
                probability
            );
        }
        (initiate, probability)
    }

    fn mood_and_energy(&self, mut p: f32, emotions: &EmotionalState, stamina_ratio: f32) -> f32 {
        if emotions.dominant_is_negative() {
            p *= NEGATIVE_EMOTION_FACTOR;
        }
        if stamina_ratio < TIRED_RATIO {
            p *= stamina_ratio;
        }
        p
    }

    async fn relationship_strength(&self, user_id: &str) -> Option<f32> {
        match self.relationships.relationship_strength(user_id).await {
            Ok(strength) => Some(sanitize_f32(strength, 0.0).clamp(0.0, 1.0)),
            Err(e) => {
                tracing::warn!("Relationship lookup for {} failed: {}", user_id, e);
                None
            }
        }
    }

    /// Probability of answering `event`, in [0, 1]. Directly addressed
    /// messages always get 1.0; anything else gets 0.0 when the relationship
    /// store cannot be reached.
    pub async fn response_probability_at(
        &self,
        event: &MessageEvent,
        conversation: &Conversation,
        now: DateTime<Utc>,
    ) -> f32 {
        if event.is_addressed() {
            return 1.0;
        }
        let Some(strength) = self.relationship_strength(&event.author_id).await else {
            return 0.0;
        };
        let stamina = self.stamina.stamina_at(now).await;
        let emotions = self.emotions.current_state_at(now).await;
        let responsive = self
            .state
            .lock()
            .await
            .traits
            .get(&Trait::Responsive)
            .copied()
            .unwrap_or(0.5);

        let mut p = self.config.base_response_probability
            + (strength - 0.5) * self.config.relationship_weight
            + self.activity(conversation, now) * self.config.activity_weight;
        p *= 0.5 + responsive;
        p = self.mood_and_energy(p, &emotions, stamina.ratio());
        sanitize_f32(p, 0.0).clamp(0.0, 1.0)
    }

    /// Decide against a caller-supplied uniform draw in [0, 1).
    pub async fn decide_response_with_roll(
        &self,
        event: &MessageEvent,
        conversation: &Conversation,
        now: DateTime<Utc>,
        roll: f32,
    ) -> ResponseDecision {
        let probability = self.response_probability_at(event, conversation, now).await;
        let respond = event.is_addressed() || roll < probability;
        let delay = if respond {
            self.pacer.response_delay()
        } else {
            std::time::Duration::ZERO
        };
        tracing::debug!(
            "Response decision for {}: {} (p={:.2}, roll={:.2})",
            event.id,
            respond,
            probability,
            roll
        );
        ResponseDecision {
            respond,
            probability,
            delay,
        }
    }

    /// Decide without waiting; the caller owns the delay.
    pub async fn decide_response(
        &self,
        event: &MessageEvent,
        conversation: &Conversation,
    ) -> ResponseDecision {
        self.decide_response_at(event, conversation, Utc::now()).await
    }

    pub async fn decide_response_at(
        &self,
        event: &MessageEvent,
        conversation: &Conversation,
        now: DateTime<Utc>,
    ) -> ResponseDecision {
        let roll = rand::thread_rng().gen::<f32>();
        self.decide_response_with_roll(event, conversation, now, roll)
            .await
    }

    /// Decide, and on a positive decision wait the randomized delay before
    /// returning.
    pub async fn should_respond(&self, event: &MessageEvent, conversation: &Conversation) -> bool {
        let decision = self.decide_response(event, conversation).await;
        if decision.respond {
            tokio::time::sleep(decision.delay).await;
        }
        decision.respond
    }

    /// Style for a reply given read-only snapshots of the emotional state
    /// and the conversation.
    pub async fn response_style(
        &self,
        emotions: &EmotionalState,
        conversation: &Conversation,
    ) -> ResponseStyle {
        self.response_style_at(emotions, conversation, Utc::now())
            .await
    }

    pub async fn response_style_at(
        &self,
        emotions: &EmotionalState,
        conversation: &Conversation,
        now: DateTime<Utc>,
    ) -> ResponseStyle {
        let traits = self.profile().await;
        ResponseStyle::derive(emotions, &traits, conversation, self.activity(conversation, now))
    }
}

fn trait_bounds(config: &PersonalityConfig) -> (f32, f32) {
    let min = sanitize_f32(config.min_trait, 0.0);
    let max = sanitize_f32(config.max_trait, 1.0);
    (min.min(max), max.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use reverie_core::{
        ConversationConfig, EmotionConfig, EmotionalTrigger, StaminaSnapshot, TraitValues,
        TriggerKind,
    };
    use reverie_memory::ConversationManager;

    struct FixedStamina(f32);

    #[async_trait]
    impl StaminaReader for FixedStamina {
        async fn stamina_at(&self, _now: DateTime<Utc>) -> StaminaSnapshot {
            StaminaSnapshot {
                current: self.0,
                max: 100.0,
                is_sleeping: false,
                sleep_until: None,
            }
        }
    }

    struct Relationships(anyhow::Result<f32>);

    #[async_trait]
    impl RelationshipStore for Relationships {
        async fn relationship_strength(&self, _user_id: &str) -> anyhow::Result<f32> {
            match &self.0 {
                Ok(v) => Ok(*v),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }

        async fn record_interaction(&self, _user_id: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn quick_config() -> PersonalityConfig {
        PersonalityConfig {
            min_response_delay_ms: 0,
            max_response_delay_ms: 0,
            ..PersonalityConfig::default()
        }
    }

    fn adapter_with(
        config: PersonalityConfig,
        stamina: f32,
        strength: anyhow::Result<f32>,
    ) -> (PersonalityAdapter, Arc<EmotionEngine>) {
        let reader: Arc<dyn StaminaReader> = Arc::new(FixedStamina(stamina));
        let emotions = Arc::new(EmotionEngine::starting_at(
            &EmotionConfig::default(),
            reader.clone(),
            t0(),
        ));
        let adapter = PersonalityAdapter::new(
            config,
            reader,
            emotions.clone(),
            Arc::new(Relationships(strength)),
        );
        (adapter, emotions)
    }

    fn adapter() -> PersonalityAdapter {
        adapter_with(quick_config(), 100.0, Ok(0.5)).0
    }

    fn msg(id: &str) -> MessageEvent {
        MessageEvent::new(id, "alice", "general", "hello", t0())
    }

    async fn conversation_at(last_active: DateTime<Utc>) -> Conversation {
        let mgr = ConversationManager::new(ConversationConfig::default());
        mgr.assign_at(
            &MessageEvent::new("c1", "alice", "general", "hello", last_active),
            last_active,
        )
        .await
    }

    fn impact(emotion: CoreEmotion, significance: f32) -> EmotionalImpact {
        let mut impact = EmotionalImpact::none(&EmotionalTrigger::new(
            TriggerKind::Message,
            "alice",
            "m1",
            significance,
        ));
        impact.deltas.insert(emotion, 10.0);
        impact
    }

    #[tokio::test]
    async fn test_profile_starts_at_initial_traits() {
        let profile = adapter().profile().await;
        assert_eq!(profile.len(), 6);
        assert!(profile.values().all(|v| *v == 0.5));
    }

    #[tokio::test]
    async fn test_adapt_joy_nudges_traits() {
        let adapter = adapter();
        let adaptation = adapter
            .adapt_at(&msg("m1"), &impact(CoreEmotion::Joy, 0.8), t0())
            .await
            .unwrap();
        assert_eq!(adaptation.dominant, CoreEmotion::Joy);

        let profile = adapter.profile().await;
        // 0.1 × 0.8 × 0.5
        assert!((profile[&Trait::Outgoing] - 0.54).abs() < 1e-5);
        assert!((profile[&Trait::Formal] - 0.48).abs() < 1e-5);
        assert_eq!(profile[&Trait::Curious], 0.5);
        assert_eq!(adapter.history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_adapt_ignores_insignificant_impacts() {
        let adapter = adapter();
        assert!(adapter
            .adapt_at(&msg("m1"), &impact(CoreEmotion::Anger, 0.3), t0())
            .await
            .is_none());
        assert!(adapter.profile().await.values().all(|v| *v == 0.5));
    }

    #[tokio::test]
    async fn test_adapt_clamps_to_trait_range() {
        let adapter = adapter_with(
            PersonalityConfig {
                max_trait: 0.52,
                ..quick_config()
            },
            100.0,
            Ok(0.5),
        )
        .0;
        for i in 0..20 {
            adapter
                .adapt_at(&msg(&format!("m{i}")), &impact(CoreEmotion::Joy, 1.0), t0())
                .await;
        }
        let profile = adapter.profile().await;
        assert!(profile.values().all(|v| (0.0..=0.52).contains(v)));
        assert_eq!(profile[&Trait::Outgoing], 0.52);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let adapter = adapter();
        for i in 0..(HISTORY_LIMIT + 10) {
            adapter
                .adapt_at(&msg(&format!("m{i}")), &impact(CoreEmotion::Surprise, 0.9), t0())
                .await;
        }
        let history = adapter.history().await;
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].content_id, "m10");
    }

    #[tokio::test]
    async fn test_initiation_zero_during_cooldown() {
        let adapter = adapter();
        let conversation = conversation_at(t0() - Duration::hours(3)).await;
        assert!(adapter.initiation_probability_at(&conversation, t0()).await > 0.0);

        adapter.record_initiation(t0()).await;
        let soon = t0() + Duration::seconds(1799);
        assert_eq!(adapter.initiation_probability_at(&conversation, soon).await, 0.0);
        let later = t0() + Duration::seconds(1800);
        assert!(adapter.initiation_probability_at(&conversation, later).await > 0.0);
    }

    #[tokio::test]
    async fn test_initiation_dormant_boost() {
        let adapter = adapter();
        let dormant = conversation_at(t0() - Duration::hours(2)).await;
        let recent = conversation_at(t0() - Duration::minutes(10)).await;
        let p_dormant = adapter.initiation_probability_at(&dormant, t0()).await;
        let p_recent = adapter.initiation_probability_at(&recent, t0()).await;
        // Neutral traits leave the base untouched
        assert!((p_recent - 0.1).abs() < 1e-5);
        assert!((p_dormant - 0.15).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_initiation_zero_when_very_active() {
        let adapter = adapter();
        let mgr = ConversationManager::new(ConversationConfig::default());
        let mut conversation = None;
        for i in 0..10 {
            conversation = Some(
                mgr.assign_at(
                    &MessageEvent::new(format!("m{i}"), "alice", "general", "hi", t0()),
                    t0(),
                )
                .await,
            );
        }
        let conversation = conversation.unwrap();
        assert_eq!(adapter.initiation_probability_at(&conversation, t0()).await, 0.0);
    }

    #[tokio::test]
    async fn test_initiation_scaled_by_mood_and_energy() {
        let (adapter, emotions) = adapter_with(quick_config(), 25.0, Ok(0.5));
        let conversation = conversation_at(t0() - Duration::minutes(10)).await;
        let tired = adapter.initiation_probability_at(&conversation, t0()).await;
        assert!((tired - 0.1 * 0.25).abs() < 1e-5);

        emotions
            .set_state(EmotionalState::from_values([(CoreEmotion::Sadness, 90.0)]))
            .await;
        let sad = adapter.initiation_probability_at(&conversation, t0()).await;
        assert!((sad - 0.1 * 0.25 * 0.7).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_initiation_trait_influence() {
        let outgoing = PersonalityConfig {
            initial_traits: TraitValues {
                outgoing: 1.0,
                ..TraitValues::default()
            },
            ..quick_config()
        };
        let (adapter, _) = adapter_with(outgoing, 100.0, Ok(0.5));
        let conversation = conversation_at(t0() - Duration::minutes(10)).await;
        let p = adapter.initiation_probability_at(&conversation, t0()).await;
        // 0.1 × (1 + 0.5 × 0.5 × 2)
        assert!((p - 0.15).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_try_initiate_starts_cooldown() {
        let adapter = adapter();
        let conversation = conversation_at(t0() - Duration::hours(2)).await;
        let (initiated, p) = adapter
            .try_initiate_with_roll(&conversation, t0(), 0.0)
            .await;
        assert!(initiated);
        assert!(p > 0.0);
        assert_eq!(adapter.last_initiation().await, Some(t0()));

        let (again, p) = adapter
            .try_initiate_with_roll(&conversation, t0() + Duration::minutes(1), 0.0)
            .await;
        assert!(!again);
        assert_eq!(p, 0.0);
    }

    #[tokio::test]
    async fn test_addressed_always_responds() {
        let (adapter, _) = adapter_with(quick_config(), 5.0, Ok(0.0));
        let conversation = conversation_at(t0()).await;
        let mention = msg("m1").mentioning();
        let dm = msg("m2").direct();
        for event in [mention, dm] {
            let decision = adapter
                .decide_response_with_roll(&event, &conversation, t0(), 0.999)
                .await;
            assert!(decision.respond);
            assert_eq!(decision.probability, 1.0);
        }
    }

    #[tokio::test]
    async fn test_response_probability_formula() {
        let (adapter, _) = adapter_with(quick_config(), 100.0, Ok(1.0));
        let conversation = conversation_at(t0()).await;
        let p = adapter
            .response_probability_at(&msg("m2"), &conversation, t0())
            .await;
        // (0.3 + 0.5 × 0.4 + 0.1 × 0.2) × (0.5 + 0.5)
        assert!((p - 0.52).abs() < 1e-5);

        let yes = adapter
            .decide_response_with_roll(&msg("m2"), &conversation, t0(), 0.5)
            .await;
        let no = adapter
            .decide_response_with_roll(&msg("m2"), &conversation, t0(), 0.6)
            .await;
        assert!(yes.respond);
        assert!(!no.respond);
        assert_eq!(no.delay, std::time::Duration::ZERO);
    }

    #[tokio::test]
    async fn test_store_failure_means_no_response() {
        let config = PersonalityConfig {
            base_response_probability: 1.0,
            ..quick_config()
        };
        let (failing, _) = adapter_with(config, 100.0, Err(anyhow::anyhow!("offline")));
        let conversation = conversation_at(t0()).await;

        let decision = failing
            .decide_response_with_roll(&msg("m2"), &conversation, t0(), 0.0)
            .await;
        assert!(!decision.respond);
        assert_eq!(decision.probability, 0.0);

        // Directly addressed messages do not consult the store
        let mention = failing
            .decide_response_with_roll(&msg("m3").mentioning(), &conversation, t0(), 0.99)
            .await;
        assert!(mention.respond);
    }

    #[tokio::test]
    async fn test_should_respond_when_mentioned() {
        let adapter = adapter();
        let conversation = conversation_at(Utc::now()).await;
        let event = MessageEvent::new("m9", "bob", "general", "hey", Utc::now()).mentioning();
        assert!(adapter.should_respond(&event, &conversation).await);
    }

    #[tokio::test]
    async fn test_response_style_reads_traits() {
        let adapter = adapter();
        let conversation = conversation_at(t0()).await;
        let style = adapter
            .response_style_at(&EmotionalState::default(), &conversation, t0())
            .await;
        // One message within the window lowers sentence count slightly
        assert!((1..=8).contains(&style.sentence_count));
        assert_eq!(style.formality, 3);
    }
}
