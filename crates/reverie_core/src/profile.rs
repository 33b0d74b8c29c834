//! Personality profile: static per-emotion parameters and adaptive traits.

use crate::emotion::{CoreEmotion, EMOTION_MAX};
use crate::sanitize_f32;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed per-emotion parameters for one deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionProfile {
    /// Resting intensity the emotion decays toward (0 - 100)
    pub baseline: f32,
    /// Fraction of the gap to baseline closed per minute, in (0, 1]
    pub recovery_rate: f32,
    /// Multiplier applied to raw trigger deltas (0 - 2)
    pub sensitivity: f32,
}

impl Default for EmotionProfile {
    fn default() -> Self {
        Self {
            baseline: 10.0,
            recovery_rate: 0.05,
            sensitivity: 1.0,
        }
    }
}

impl EmotionProfile {
    pub fn new(baseline: f32, recovery_rate: f32, sensitivity: f32) -> Self {
        Self {
            baseline,
            recovery_rate,
            sensitivity,
        }
        .normalized()
    }

    /// Clamp every parameter into its valid range.
    pub fn normalized(self) -> Self {
        Self {
            baseline: sanitize_f32(self.baseline, 10.0).clamp(0.0, EMOTION_MAX),
            recovery_rate: sanitize_f32(self.recovery_rate, 0.05).clamp(f32::EPSILON, 1.0),
            sensitivity: sanitize_f32(self.sensitivity, 1.0).clamp(0.0, 2.0),
        }
    }
}

/// Per-emotion parameters for all six core emotions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityProfile {
    pub joy: EmotionProfile,
    pub sadness: EmotionProfile,
    pub anger: EmotionProfile,
    pub fear: EmotionProfile,
    pub surprise: EmotionProfile,
    pub disgust: EmotionProfile,
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        Self {
            joy: EmotionProfile::new(40.0, 0.05, 1.0),
            sadness: EmotionProfile::new(10.0, 0.04, 0.8),
            anger: EmotionProfile::new(5.0, 0.08, 0.7),
            fear: EmotionProfile::new(8.0, 0.06, 0.8),
            surprise: EmotionProfile::new(15.0, 0.15, 1.2),
            disgust: EmotionProfile::new(5.0, 0.08, 0.6),
        }
    }
}

impl PersonalityProfile {
    /// Normalized parameters for one emotion.
    pub fn get(&self, emotion: CoreEmotion) -> EmotionProfile {
        let raw = match emotion {
            CoreEmotion::Joy => self.joy,
            CoreEmotion::Sadness => self.sadness,
            CoreEmotion::Anger => self.anger,
            CoreEmotion::Fear => self.fear,
            CoreEmotion::Surprise => self.surprise,
            CoreEmotion::Disgust => self.disgust,
        };
        raw.normalized()
    }

    pub fn baseline(&self, emotion: CoreEmotion) -> f32 {
        self.get(emotion).baseline
    }

    pub fn sensitivity(&self, emotion: CoreEmotion) -> f32 {
        self.get(emotion).sensitivity
    }
}

/// Adaptive behavioral parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Formal,
    Responsive,
    Outgoing,
    Playful,
    Empathetic,
    Curious,
}

impl Trait {
    pub const ALL: [Trait; 6] = [
        Trait::Formal,
        Trait::Responsive,
        Trait::Outgoing,
        Trait::Playful,
        Trait::Empathetic,
        Trait::Curious,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Trait::Formal => "formal",
            Trait::Responsive => "responsive",
            Trait::Outgoing => "outgoing",
            Trait::Playful => "playful",
            Trait::Empathetic => "empathetic",
            Trait::Curious => "curious",
        }
    }
}

/// One number per trait. Used for initial trait values and for influence
/// weights in the initiation formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitValues {
    pub formal: f32,
    pub responsive: f32,
    pub outgoing: f32,
    pub playful: f32,
    pub empathetic: f32,
    pub curious: f32,
}

impl Default for TraitValues {
    fn default() -> Self {
        Self::uniform(0.5)
    }
}

impl TraitValues {
    pub fn uniform(value: f32) -> Self {
        Self {
            formal: value,
            responsive: value,
            outgoing: value,
            playful: value,
            empathetic: value,
            curious: value,
        }
    }

    pub fn get(&self, t: Trait) -> f32 {
        match t {
            Trait::Formal => self.formal,
            Trait::Responsive => self.responsive,
            Trait::Outgoing => self.outgoing,
            Trait::Playful => self.playful,
            Trait::Empathetic => self.empathetic,
            Trait::Curious => self.curious,
        }
    }
}

/// Immutable copy of the current trait intensities.
pub type TraitSnapshot = BTreeMap<Trait, f32>;
