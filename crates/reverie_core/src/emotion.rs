//! Discrete emotion model
//!
//! Six core emotions, each a 0-100 intensity. Triggers carry raw deltas;
//! the engine weights them by the personality's sensitivity to produce an
//! impact, and decay pulls every value back toward its baseline.

use crate::sanitize_f32;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound of every emotion intensity.
pub const EMOTION_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreEmotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
}

impl CoreEmotion {
    /// Fixed order; also the tie-break order for the dominant emotion.
    pub const ALL: [CoreEmotion; 6] = [
        CoreEmotion::Joy,
        CoreEmotion::Sadness,
        CoreEmotion::Anger,
        CoreEmotion::Fear,
        CoreEmotion::Surprise,
        CoreEmotion::Disgust,
    ];

    /// Negative-valence emotions dampen sociability.
    pub fn is_negative(self) -> bool {
        matches!(self, CoreEmotion::Sadness | CoreEmotion::Anger | CoreEmotion::Fear)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CoreEmotion::Joy => "joy",
            CoreEmotion::Sadness => "sadness",
            CoreEmotion::Anger => "anger",
            CoreEmotion::Fear => "fear",
            CoreEmotion::Surprise => "surprise",
            CoreEmotion::Disgust => "disgust",
        }
    }
}

impl std::fmt::Display for CoreEmotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current intensity of every core emotion.
///
/// All six emotions are always present; values are clamped to [0, 100] on
/// every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    values: BTreeMap<CoreEmotion, f32>,
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self {
            values: CoreEmotion::ALL.iter().map(|e| (*e, 0.0)).collect(),
        }
    }
}

impl EmotionalState {
    /// Build a state from arbitrary values; missing emotions start at 0.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (CoreEmotion, f32)>,
    {
        let mut state = Self::default();
        for (emotion, value) in values {
            state.set(emotion, value);
        }
        state
    }

    pub fn get(&self, emotion: CoreEmotion) -> f32 {
        self.values.get(&emotion).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, emotion: CoreEmotion, value: f32) {
        let value = sanitize_f32(value, 0.0).clamp(0.0, EMOTION_MAX);
        self.values.insert(emotion, value);
    }

    /// Add `delta` and clamp. Returns the change actually applied.
    pub fn adjust(&mut self, emotion: CoreEmotion, delta: f32) -> f32 {
        let old = self.get(emotion);
        self.set(emotion, old + sanitize_f32(delta, 0.0));
        self.get(emotion) - old
    }

    /// The emotion with the highest intensity (first in fixed order on ties).
    pub fn dominant(&self) -> (CoreEmotion, f32) {
        let mut best = (CoreEmotion::Joy, self.get(CoreEmotion::Joy));
        for emotion in CoreEmotion::ALL.iter().skip(1) {
            let value = self.get(*emotion);
            if value > best.1 {
                best = (*emotion, value);
            }
        }
        best
    }

    pub fn dominant_is_negative(&self) -> bool {
        self.dominant().0.is_negative()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CoreEmotion, f32)> + '_ {
        self.values.iter().map(|(e, v)| (*e, *v))
    }

    /// Short natural-language summary, e.g. "strongly joyful (joy 82)".
    pub fn describe(&self) -> String {
        let (emotion, value) = self.dominant();
        let intensity_word = if value < 20.0 {
            return "emotionally flat".to_string();
        } else if value < 40.0 {
            "slightly"
        } else if value < 60.0 {
            "fairly"
        } else if value < 80.0 {
            "strongly"
        } else {
            "overwhelmingly"
        };
        let adjective = match emotion {
            CoreEmotion::Joy => "joyful",
            CoreEmotion::Sadness => "sad",
            CoreEmotion::Anger => "angry",
            CoreEmotion::Fear => "afraid",
            CoreEmotion::Surprise => "surprised",
            CoreEmotion::Disgust => "disgusted",
        };
        format!("{} {} ({} {:.0})", intensity_word, adjective, emotion, value)
    }
}

/// What kind of stimulus produced a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Message,
    Mention,
    DirectMessage,
    Praise,
    Insult,
    Custom(String),
}

/// A stimulus causing emotional change.
///
/// `intensity` is chosen by the caller; the engine never derives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalTrigger {
    pub kind: TriggerKind,
    pub source_id: String,
    pub content_id: String,
    /// 0.0 - 1.0
    pub intensity: f32,
    /// Raw, unweighted per-emotion deltas
    pub deltas: BTreeMap<CoreEmotion, f32>,
}

impl EmotionalTrigger {
    pub fn new(
        kind: TriggerKind,
        source_id: impl Into<String>,
        content_id: impl Into<String>,
        intensity: f32,
    ) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
            content_id: content_id.into(),
            intensity: sanitize_f32(intensity, 0.0).clamp(0.0, 1.0),
            deltas: BTreeMap::new(),
        }
    }

    /// Add (accumulate) a raw delta for one emotion.
    pub fn with_delta(mut self, emotion: CoreEmotion, delta: f32) -> Self {
        *self.deltas.entry(emotion).or_insert(0.0) += sanitize_f32(delta, 0.0);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// A trigger after personality weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalImpact {
    pub kind: TriggerKind,
    pub source_id: String,
    pub content_id: String,
    /// delta × sensitivity, per emotion
    pub deltas: BTreeMap<CoreEmotion, f32>,
    /// Equal to the originating trigger's intensity
    pub significance: f32,
}

impl EmotionalImpact {
    /// Impact with no effect (used for empty triggers).
    pub fn none(trigger: &EmotionalTrigger) -> Self {
        Self {
            kind: trigger.kind.clone(),
            source_id: trigger.source_id.clone(),
            content_id: trigger.content_id.clone(),
            deltas: BTreeMap::new(),
            significance: trigger.intensity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.values().all(|d| *d == 0.0)
    }

    /// Emotion with the largest positive weighted delta, if any.
    pub fn dominant_emotion(&self) -> Option<CoreEmotion> {
        self.deltas
            .iter()
            .filter(|(_, d)| **d > 0.0)
            .fold(None, |best: Option<(CoreEmotion, f32)>, (e, d)| match best {
                Some((_, bd)) if bd >= *d => best,
                _ => Some((*e, *d)),
            })
            .map(|(e, _)| e)
    }
}
