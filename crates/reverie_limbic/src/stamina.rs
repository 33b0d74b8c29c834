//! Stamina lifecycle: energy consumption, passive recovery, sleep and wake.
//!
//! States are Awake and Asleep. The agent falls asleep when stamina drops
//! below `low_threshold` or when forced to; it wakes when stamina reaches
//! `wake_ratio × max`, when a time-boxed sleep elapses, or when forced to.
//! A forced sleep is only ended by its deadline or by `force_wake`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reverie_core::{sanitize_f32, StaminaConfig, StaminaReader, StaminaSnapshot};
use tokio::sync::{watch, Mutex};

/// A sleep/wake edge produced by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepTransition {
    FellAsleep,
    WokeUp,
}

#[derive(Debug, Clone)]
struct StaminaInner {
    current: f32,
    is_sleeping: bool,
    sleep_until: Option<DateTime<Utc>>,
    /// Sleep was forced; the stamina wake rule does not apply
    forced: bool,
    /// Instant up to which recovery has been accounted for
    last_update: DateTime<Utc>,
    /// Instant of the previous explicit `recover` call
    last_tick: DateTime<Utc>,
}

impl StaminaInner {
    fn snapshot(&self, max: f32) -> StaminaSnapshot {
        StaminaSnapshot {
            current: self.current,
            max,
            is_sleeping: self.is_sleeping,
            sleep_until: self.sleep_until,
        }
    }
}

pub struct StaminaManager {
    config: StaminaConfig,
    inner: Mutex<StaminaInner>,
    /// Broadcasts a snapshot whenever the agent falls asleep or wakes up
    watch_tx: watch::Sender<StaminaSnapshot>,
    /// Kept so the channel stays open without external subscribers
    watch_rx: watch::Receiver<StaminaSnapshot>,
}

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f32 {
    let ms = (to - from).num_milliseconds();
    if ms <= 0 {
        0.0
    } else {
        ms as f32 / 60_000.0
    }
}

impl StaminaManager {
    pub fn new(config: StaminaConfig) -> Self {
        Self::starting_at(config, Utc::now())
    }

    /// Create with the recovery clock anchored at `now`.
    pub fn starting_at(config: StaminaConfig, now: DateTime<Utc>) -> Self {
        let max = sanitize_f32(config.max, 100.0).max(f32::EPSILON);
        let config = StaminaConfig { max, ..config };
        let inner = StaminaInner {
            current: sanitize_f32(config.initial, max).clamp(0.0, max),
            is_sleeping: false,
            sleep_until: None,
            forced: false,
            last_update: now,
            last_tick: now,
        };
        let (watch_tx, watch_rx) = watch::channel(inner.snapshot(max));
        Self {
            config,
            inner: Mutex::new(inner),
            watch_tx,
            watch_rx,
        }
    }

    pub fn config(&self) -> &StaminaConfig {
        &self.config
    }

    fn recovery_rate(&self, sleeping: bool) -> f32 {
        let multiplier = if sleeping {
            self.config.sleep_multiplier
        } else {
            1.0
        };
        self.config.recovery_per_minute.max(0.0) * multiplier
    }

    /// Credit `minutes` of passive recovery at the current sleep state's rate.
    fn credit(&self, inner: &mut StaminaInner, minutes: f32) {
        if minutes <= 0.0 {
            return;
        }
        let recovered = minutes * self.recovery_rate(inner.is_sleeping);
        inner.current = (inner.current + recovered).clamp(0.0, self.config.max);
    }

    /// Apply recovery accrued since the last update, then evaluate the
    /// automatic transitions.
    fn catch_up(&self, inner: &mut StaminaInner, now: DateTime<Utc>) -> Option<SleepTransition> {
        let minutes = minutes_between(inner.last_update, now);
        self.credit(inner, minutes);
        if now > inner.last_update {
            inner.last_update = now;
        }
        self.evaluate(inner, now)
    }

    fn evaluate(&self, inner: &mut StaminaInner, now: DateTime<Utc>) -> Option<SleepTransition> {
        if inner.is_sleeping {
            let deadline_passed = inner.sleep_until.is_some_and(|until| now >= until);
            let rested = !inner.forced
                && inner.current >= self.config.max * self.config.wake_ratio;
            if deadline_passed || rested {
                self.wake(inner);
                return Some(SleepTransition::WokeUp);
            }
        } else if inner.current < self.config.low_threshold {
            inner.is_sleeping = true;
            inner.sleep_until = None;
            inner.forced = false;
            tracing::info!(
                "Stamina {:.1}/{:.1} below {:.1}, falling asleep",
                inner.current,
                self.config.max,
                self.config.low_threshold
            );
            return Some(SleepTransition::FellAsleep);
        }
        None
    }

    fn wake(&self, inner: &mut StaminaInner) {
        inner.is_sleeping = false;
        inner.sleep_until = None;
        inner.forced = false;
        tracing::info!("Waking up with stamina {:.1}/{:.1}", inner.current, self.config.max);
    }

    fn publish(&self, inner: &StaminaInner, transition: Option<SleepTransition>) {
        if transition.is_some() {
            let _ = self.watch_tx.send(inner.snapshot(self.config.max));
        }
    }

    /// Spend stamina. Returns what remains (never below zero).
    pub async fn consume(&self, amount: f32) -> f32 {
        self.consume_at(amount, Utc::now()).await
    }

    pub async fn consume_at(&self, amount: f32, now: DateTime<Utc>) -> f32 {
        let amount = sanitize_f32(amount, 0.0).max(0.0);
        let mut inner = self.inner.lock().await;
        let mut transition = self.catch_up(&mut inner, now);
        inner.current = (inner.current - amount).max(0.0);
        transition = self.evaluate(&mut inner, now).or(transition);
        tracing::debug!("Consumed {:.2} stamina, {:.2} left", amount, inner.current);
        self.publish(&inner, transition);
        inner.current
    }

    /// Explicitly credit `elapsed_minutes` of recovery (e.g. from a periodic
    /// tick). Wall-clock time since the previous call is already credited by
    /// lazy catch-up; only the part of `elapsed_minutes` beyond it is added.
    pub async fn recover(&self, elapsed_minutes: f32) -> f32 {
        self.recover_at(elapsed_minutes, Utc::now()).await
    }

    pub async fn recover_at(&self, elapsed_minutes: f32, now: DateTime<Utc>) -> f32 {
        let minutes = sanitize_f32(elapsed_minutes, 0.0).max(0.0);
        let mut inner = self.inner.lock().await;
        let covered = minutes_between(inner.last_tick, now);
        let mut transition = self.catch_up(&mut inner, now);
        self.credit(&mut inner, (minutes - covered).max(0.0));
        if now > inner.last_tick {
            inner.last_tick = now;
        }
        transition = self.evaluate(&mut inner, now).or(transition);
        self.publish(&inner, transition);
        inner.current
    }

    pub async fn is_sleeping(&self) -> bool {
        self.is_sleeping_at(Utc::now()).await
    }

    pub async fn is_sleeping_at(&self, now: DateTime<Utc>) -> bool {
        self.snapshot_at(now).await.is_sleeping
    }

    /// Put the agent to sleep, optionally until `now + duration`.
    pub async fn force_sleep(&self, duration: Option<Duration>) {
        self.force_sleep_at(duration, Utc::now()).await
    }

    pub async fn force_sleep_at(&self, duration: Option<Duration>, now: DateTime<Utc>) {
        let mut inner = self.inner.lock().await;
        self.catch_up(&mut inner, now);
        let was_sleeping = inner.is_sleeping;
        inner.is_sleeping = true;
        inner.forced = true;
        inner.sleep_until = duration.map(|d| now + d);
        tracing::info!(
            "Forced sleep (until: {})",
            inner
                .sleep_until
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "woken".to_string())
        );
        let transition = (!was_sleeping).then_some(SleepTransition::FellAsleep);
        self.publish(&inner, transition);
    }

    /// Wake the agent regardless of stamina.
    pub async fn force_wake(&self) {
        self.force_wake_at(Utc::now()).await
    }

    pub async fn force_wake_at(&self, now: DateTime<Utc>) {
        let mut inner = self.inner.lock().await;
        self.catch_up(&mut inner, now);
        if inner.is_sleeping {
            self.wake(&mut inner);
            self.publish(&inner, Some(SleepTransition::WokeUp));
        }
    }

    /// Copy of the current state after applying pending recovery.
    pub async fn snapshot(&self) -> StaminaSnapshot {
        self.snapshot_at(Utc::now()).await
    }

    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> StaminaSnapshot {
        let mut inner = self.inner.lock().await;
        let transition = self.catch_up(&mut inner, now);
        self.publish(&inner, transition);
        inner.snapshot(self.config.max)
    }

    /// Subscribe to sleep/wake changes.
    pub fn subscribe(&self) -> watch::Receiver<StaminaSnapshot> {
        self.watch_rx.clone()
    }
}

#[async_trait]
impl StaminaReader for StaminaManager {
    async fn stamina_at(&self, now: DateTime<Utc>) -> StaminaSnapshot {
        self.snapshot_at(now).await
    }
}
