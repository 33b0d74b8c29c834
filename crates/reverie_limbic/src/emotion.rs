//! Emotional state engine
//!
//! Applies personality-weighted triggers and decays every emotion back toward
//! its baseline. Decay slows down when stamina is low: a tired agent stays
//! upset (or elated) for longer.

use chrono::{DateTime, Duration, Utc};
use reverie_core::{
    CoreEmotion, EmotionConfig, EmotionalImpact, EmotionalState, EmotionalTrigger,
    PersonalityProfile, StaminaReader,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

struct EngineState {
    state: EmotionalState,
    /// Instant up to which decay has been accounted for
    last_decay: DateTime<Utc>,
    /// Instant of the previous explicit decay call
    last_tick: DateTime<Utc>,
}

pub struct EmotionEngine {
    profile: PersonalityProfile,
    stamina: Arc<dyn StaminaReader>,
    inner: Mutex<EngineState>,
    /// Impacts at or above this significance are logged at info level
    significance_log_threshold: f32,
}

fn baseline_state(profile: &PersonalityProfile) -> EmotionalState {
    EmotionalState::from_values(CoreEmotion::ALL.iter().map(|e| (*e, profile.baseline(*e))))
}

/// Decay slowdown factor in [1, 1.5]: 1 at full stamina, 1.5 at empty.
fn slowdown(stamina_percent: f32) -> f32 {
    1.0 + (100.0 - stamina_percent.clamp(0.0, 100.0)) / 200.0
}

/// Move `value` toward `baseline` by compounding a per-minute step.
fn decay_value(value: f32, baseline: f32, rate: f32, slowdown: f32, minutes: f32) -> f32 {
    if minutes <= 0.0 {
        return value;
    }
    let per_minute = (rate / slowdown).clamp(0.0, 1.0);
    let remaining = (1.0 - per_minute).powf(minutes);
    value + (baseline - value) * (1.0 - remaining)
}

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f32 {
    let ms = (to - from).num_milliseconds();
    if ms <= 0 {
        0.0
    } else {
        ms as f32 / 60_000.0
    }
}

impl EmotionEngine {
    pub fn new(config: &EmotionConfig, stamina: Arc<dyn StaminaReader>) -> Self {
        Self::starting_at(config, stamina, Utc::now())
    }

    /// Start at the profile baselines with the decay clock anchored at `now`.
    pub fn starting_at(
        config: &EmotionConfig,
        stamina: Arc<dyn StaminaReader>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            profile: config.profile.clone(),
            stamina,
            inner: Mutex::new(EngineState {
                state: baseline_state(&config.profile),
                last_decay: now,
                last_tick: now,
            }),
            significance_log_threshold: config.significance_log_threshold,
        }
    }

    pub fn profile(&self) -> &PersonalityProfile {
        &self.profile
    }

    fn apply_decay(&self, inner: &mut EngineState, minutes: f32, stamina_percent: f32) {
        if minutes <= 0.0 {
            return;
        }
        let factor = slowdown(stamina_percent);
        for emotion in CoreEmotion::ALL {
            let p = self.profile.get(emotion);
            let value = inner.state.get(emotion);
            inner
                .state
                .set(emotion, decay_value(value, p.baseline, p.recovery_rate, factor, minutes));
        }
    }

    /// Apply decay accrued since the last anchor.
    fn catch_up(&self, inner: &mut EngineState, now: DateTime<Utc>, stamina_percent: f32) {
        let minutes = minutes_between(inner.last_decay, now);
        self.apply_decay(inner, minutes, stamina_percent);
        if now > inner.last_decay {
            inner.last_decay = now;
        }
    }

    /// Weight a trigger by the personality's sensitivity and apply it.
    ///
    /// An empty trigger leaves the state untouched and yields an empty impact.
    pub async fn apply_trigger(&self, trigger: &EmotionalTrigger) -> EmotionalImpact {
        self.apply_trigger_at(trigger, Utc::now()).await
    }

    pub async fn apply_trigger_at(
        &self,
        trigger: &EmotionalTrigger,
        now: DateTime<Utc>,
    ) -> EmotionalImpact {
        if trigger.is_empty() {
            return EmotionalImpact::none(trigger);
        }
        let stamina_percent = self.stamina.stamina_at(now).await.percent();

        let weighted: BTreeMap<CoreEmotion, f32> = trigger
            .deltas
            .iter()
            .map(|(emotion, delta)| (*emotion, delta * self.profile.sensitivity(*emotion)))
            .collect();

        let mut inner = self.inner.lock().await;
        self.catch_up(&mut inner, now, stamina_percent);
        for (emotion, delta) in &weighted {
            inner.state.adjust(*emotion, *delta);
        }
        let dominant = inner.state.dominant();
        drop(inner);

        let impact = EmotionalImpact {
            kind: trigger.kind.clone(),
            source_id: trigger.source_id.clone(),
            content_id: trigger.content_id.clone(),
            deltas: weighted,
            significance: trigger.intensity,
        };
        if impact.significance >= self.significance_log_threshold {
            tracing::info!(
                "Significant emotional impact from {} ({:?}, significance {:.2}); now {} {:.0}",
                impact.source_id,
                impact.kind,
                impact.significance,
                dominant.0,
                dominant.1
            );
        } else {
            tracing::debug!(
                "Emotional impact from {} ({:?}): {:?}",
                impact.source_id,
                impact.kind,
                impact.deltas
            );
        }
        impact
    }

    /// Current state after applying decay accrued since the last access.
    pub async fn current_state(&self) -> EmotionalState {
        self.current_state_at(Utc::now()).await
    }

    pub async fn current_state_at(&self, now: DateTime<Utc>) -> EmotionalState {
        let stamina_percent = self.stamina.stamina_at(now).await.percent();
        let mut inner = self.inner.lock().await;
        self.catch_up(&mut inner, now, stamina_percent);
        inner.state.clone()
    }

    /// Explicitly decay for `elapsed` (e.g. from a periodic tick).
    ///
    /// Wall-clock time since the previous call is already decayed lazily;
    /// only the part of `elapsed` beyond it is applied on top.
    pub async fn decay_toward_baseline(&self, elapsed: Duration) -> EmotionalState {
        self.decay_toward_baseline_at(elapsed, Utc::now()).await
    }

    pub async fn decay_toward_baseline_at(
        &self,
        elapsed: Duration,
        now: DateTime<Utc>,
    ) -> EmotionalState {
        let stamina_percent = self.stamina.stamina_at(now).await.percent();
        let elapsed = elapsed.max(Duration::zero());
        let minutes = elapsed.num_milliseconds() as f32 / 60_000.0;

        let mut inner = self.inner.lock().await;
        let covered = minutes_between(inner.last_tick, now);
        self.catch_up(&mut inner, now, stamina_percent);
        self.apply_decay(&mut inner, (minutes - covered).max(0.0), stamina_percent);
        if now > inner.last_tick {
            inner.last_tick = now;
        }
        inner.state.clone()
    }

    /// Replace the state wholesale (values are clamped).
    pub async fn set_state(&self, state: EmotionalState) {
        let mut inner = self.inner.lock().await;
        inner.state = EmotionalState::from_values(state.iter());
    }
}
