//! Property-based tests for reverie_expression.
//!
//! However triggers and adaptations interleave, every trait must stay inside
//! the configured [min_trait, max_trait] range.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use reverie_core::{
    CoreEmotion, EmotionConfig, EmotionalTrigger, MessageEvent, PersonalityConfig,
    RelationshipStore, StaminaReader, StaminaSnapshot, TraitValues, TriggerKind,
};
use reverie_expression::PersonalityAdapter;
use reverie_limbic::EmotionEngine;
use std::sync::Arc;

struct FullStamina;

#[async_trait]
impl StaminaReader for FullStamina {
    async fn stamina_at(&self, _now: DateTime<Utc>) -> StaminaSnapshot {
        StaminaSnapshot {
            current: 100.0,
            max: 100.0,
            is_sleeping: false,
            sleep_until: None,
        }
    }
}

struct NeutralRelationships;

#[async_trait]
impl RelationshipStore for NeutralRelationships {
    async fn relationship_strength(&self, _user_id: &str) -> anyhow::Result<f32> {
        Ok(0.5)
    }

    async fn record_interaction(&self, _user_id: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn arb_emotion() -> impl Strategy<Value = CoreEmotion> {
    prop::sample::select(CoreEmotion::ALL.to_vec())
}

fn arb_trigger() -> impl Strategy<Value = (Vec<(CoreEmotion, f32)>, f32)> {
    (
        prop::collection::vec((arb_emotion(), -200.0f32..200.0), 0..6),
        -0.5f32..1.5,
    )
}

proptest! {
    #[test]
    fn traits_stay_within_configured_bounds(
        a in 0.0f32..1.0,
        b in 0.0f32..1.0,
        initial in -1.0f32..2.0,
        adaptation_rate in 0.0f32..1.0,
        significance_threshold in 0.0f32..1.0,
        triggers in prop::collection::vec(arb_trigger(), 0..60),
    ) {
        let (min, max) = (a.min(b), a.max(b));
        let rt = runtime();
        rt.block_on(async {
            let stamina: Arc<dyn StaminaReader> = Arc::new(FullStamina);
            let emotions = Arc::new(EmotionEngine::starting_at(
                &EmotionConfig::default(),
                stamina.clone(),
                t0(),
            ));
            let adapter = PersonalityAdapter::new(
                PersonalityConfig {
                    min_trait: min,
                    max_trait: max,
                    initial_traits: TraitValues::uniform(initial),
                    adaptation_rate,
                    significance_threshold,
                    ..PersonalityConfig::default()
                },
                stamina,
                emotions.clone(),
                Arc::new(NeutralRelationships),
            );

            let mut now = t0();
            for (i, (deltas, intensity)) in triggers.into_iter().enumerate() {
                let id = format!("m{i}");
                let mut trigger =
                    EmotionalTrigger::new(TriggerKind::Message, "alice", id.clone(), intensity);
                for (emotion, delta) in deltas {
                    trigger = trigger.with_delta(emotion, delta);
                }
                let impact = emotions.apply_trigger_at(&trigger, now).await;
                let event = MessageEvent::new(id, "alice", "general", "hey", now);
                adapter.adapt_at(&event, &impact, now).await;
                now += Duration::seconds(30);

                let profile = adapter.profile().await;
                assert_eq!(profile.len(), 6);
                for (t, v) in profile {
                    assert!(
                        v >= min && v <= max,
                        "{:?} = {} outside [{}, {}]",
                        t,
                        v,
                        min,
                        max
                    );
                }
            }
        });
    }
}
