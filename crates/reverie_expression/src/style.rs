//! Response style derived from emotions, traits and the conversation.
//!
//! Every scalar is `base + emotion adjustments + trait adjustments`, then
//! clamped. Emotions contribute in proportion to their intensity (0-100
//! mapped to 0-1); traits contribute by their deviation from the neutral 0.5.

use reverie_core::{CoreEmotion, EmotionalState, Trait, TraitSnapshot};
use reverie_memory::{Conversation, ConversationState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseStyle {
    /// 1 (terse) - 5 (elaborate)
    pub verbosity: u8,
    /// 1 (casual) - 5 (formal)
    pub formality: u8,
    /// 1 (flat) - 5 (excited)
    pub enthusiasm: u8,
    /// Chance of an emoticon per sentence, 0.0 - 1.0
    pub emoticon_frequency: f32,
    /// 1 - 8
    pub sentence_count: u8,
}

impl Default for ResponseStyle {
    fn default() -> Self {
        Self {
            verbosity: 3,
            formality: 3,
            enthusiasm: 3,
            emoticon_frequency: 0.3,
            sentence_count: 3,
        }
    }
}

#[derive(Default)]
struct Adjustments {
    verbosity: f32,
    formality: f32,
    enthusiasm: f32,
    emoticons: f32,
    sentences: f32,
}

fn scale(value: f32, min: u8, max: u8) -> u8 {
    if !value.is_finite() {
        return min;
    }
    value.round().clamp(min as f32, max as f32) as u8
}

impl ResponseStyle {
    /// Compute the style from read-only snapshots.
    ///
    /// `activity` is the conversation's current activity level in [0, 1]:
    /// busy conversations get shorter replies.
    pub fn derive(
        emotions: &EmotionalState,
        traits: &TraitSnapshot,
        conversation: &Conversation,
        activity: f32,
    ) -> Self {
        let base = Self::default();
        let mut adj = Adjustments::default();

        for (emotion, value) in emotions.iter() {
            let e = value / 100.0;
            match emotion {
                CoreEmotion::Joy => {
                    adj.enthusiasm += 2.0 * e;
                    adj.verbosity += 1.0 * e;
                    adj.emoticons += 0.3 * e;
                }
                CoreEmotion::Sadness => {
                    adj.enthusiasm -= 1.5 * e;
                    adj.verbosity -= 1.0 * e;
                    adj.sentences -= 1.0 * e;
                    adj.emoticons -= 0.2 * e;
                }
                CoreEmotion::Anger => {
                    adj.formality += 1.0 * e;
                    adj.verbosity -= 1.5 * e;
                    adj.sentences -= 1.5 * e;
                    adj.emoticons -= 0.3 * e;
                }
                CoreEmotion::Fear => {
                    adj.formality += 0.5 * e;
                    adj.enthusiasm -= 1.0 * e;
                }
                CoreEmotion::Surprise => {
                    adj.enthusiasm += 1.0 * e;
                    adj.emoticons += 0.1 * e;
                }
                CoreEmotion::Disgust => {
                    adj.formality += 0.5 * e;
                    adj.enthusiasm -= 1.0 * e;
                    adj.emoticons -= 0.2 * e;
                }
            }
        }

        for t in Trait::ALL {
            let d = (traits.get(&t).copied().unwrap_or(0.5) - 0.5) * 2.0;
            match t {
                Trait::Formal => {
                    adj.formality += 2.0 * d;
                    adj.emoticons -= 0.3 * d;
                }
                Trait::Outgoing => {
                    adj.verbosity += 1.0 * d;
                    adj.sentences += 1.0 * d;
                }
                Trait::Playful => {
                    adj.enthusiasm += 1.0 * d;
                    adj.emoticons += 0.3 * d;
                    adj.formality -= 0.5 * d;
                }
                Trait::Empathetic => adj.sentences += 1.0 * d,
                Trait::Curious => adj.verbosity += 0.5 * d,
                Trait::Responsive => adj.enthusiasm += 0.5 * d,
            }
        }

        if conversation.is_direct {
            adj.formality -= 1.0;
        }
        if conversation.state == ConversationState::Urgent {
            adj.verbosity -= 0.5;
            adj.emoticons -= 0.2;
        }
        adj.sentences -= 2.0 * activity.clamp(0.0, 1.0);

        let emoticons = base.emoticon_frequency + adj.emoticons;
        Self {
            verbosity: scale(base.verbosity as f32 + adj.verbosity, 1, 5),
            formality: scale(base.formality as f32 + adj.formality, 1, 5),
            enthusiasm: scale(base.enthusiasm as f32 + adj.enthusiasm, 1, 5),
            emoticon_frequency: if emoticons.is_finite() {
                emoticons.clamp(0.0, 1.0)
            } else {
                0.0
            },
            sentence_count: scale(base.sentence_count as f32 + adj.sentences, 1, 8),
        }
    }

    /// One-line guidance for a text generator.
    pub fn describe(&self) -> String {
        let length = match self.verbosity {
            1 => "very brief",
            2 => "brief",
            3 => "moderate",
            4 => "detailed",
            _ => "elaborate",
        };
        let tone = match self.formality {
            1 => "very casual",
            2 => "casual",
            3 => "neutral",
            4 => "polite",
            _ => "formal",
        };
        let energy = match self.enthusiasm {
            1 => "flat",
            2 => "calm",
            3 => "warm",
            4 => "lively",
            _ => "excited",
        };
        format!(
            "{} length, {} tone, {} energy, about {} sentence(s), emoticons {:.0}%",
            length,
            tone,
            energy,
            self.sentence_count,
            self.emoticon_frequency * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reverie_core::{ConversationConfig, MessageEvent};
    use reverie_memory::ConversationManager;

    fn neutral_traits() -> TraitSnapshot {
        Trait::ALL.iter().map(|t| (*t, 0.5)).collect()
    }

    async fn conversation(direct: bool) -> Conversation {
        let mgr = ConversationManager::new(ConversationConfig::default());
        let mut event = MessageEvent::new("m1", "alice", "general", "hi", Utc::now());
        event.is_direct = direct;
        mgr.assign(&event).await
    }

    #[tokio::test]
    async fn test_neutral_inputs_give_base_style() {
        let style = ResponseStyle::derive(
            &EmotionalState::default(),
            &neutral_traits(),
            &conversation(false).await,
            0.0,
        );
        assert_eq!(style, ResponseStyle::default());
    }

    #[tokio::test]
    async fn test_joy_raises_enthusiasm() {
        let joyful = EmotionalState::from_values([(CoreEmotion::Joy, 100.0)]);
        let channel = conversation(false).await;
        let style = ResponseStyle::derive(&joyful, &neutral_traits(), &channel, 0.0);
        assert_eq!(style.enthusiasm, 5);
        assert!(style.emoticon_frequency > 0.5);
    }

    #[tokio::test]
    async fn test_anger_shortens_replies() {
        let angry = EmotionalState::from_values([(CoreEmotion::Anger, 100.0)]);
        let channel = conversation(false).await;
        let style = ResponseStyle::derive(&angry, &neutral_traits(), &channel, 0.0);
        assert!(style.verbosity < 3);
        assert!(style.sentence_count < 3);
        assert!(style.formality > 3);
    }

    #[tokio::test]
    async fn test_extremes_stay_in_range() {
        let all_max = EmotionalState::from_values(CoreEmotion::ALL.iter().map(|e| (*e, 100.0)));
        let high: TraitSnapshot = Trait::ALL.iter().map(|t| (*t, 1.0)).collect();
        let low: TraitSnapshot = Trait::ALL.iter().map(|t| (*t, 0.0)).collect();
        for traits in [high, low] {
            for activity in [0.0, 1.0, 7.0] {
                let style =
                    ResponseStyle::derive(&all_max, &traits, &conversation(true).await, activity);
                assert!((1..=5).contains(&style.verbosity));
                assert!((1..=5).contains(&style.formality));
                assert!((1..=5).contains(&style.enthusiasm));
                assert!((1..=8).contains(&style.sentence_count));
                assert!((0.0..=1.0).contains(&style.emoticon_frequency));
            }
        }
    }

    #[tokio::test]
    async fn test_direct_message_is_more_casual() {
        let formal: TraitSnapshot = Trait::ALL
            .iter()
            .map(|t| (*t, if *t == Trait::Formal { 0.75 } else { 0.5 }))
            .collect();
        let channel = ResponseStyle::derive(
            &EmotionalState::default(),
            &formal,
            &conversation(false).await,
            0.0,
        );
        let dm = ResponseStyle::derive(
            &EmotionalState::default(),
            &formal,
            &conversation(true).await,
            0.0,
        );
        assert!(dm.formality < channel.formality);
    }

    #[test]
    fn test_describe() {
        let text = ResponseStyle::default().describe();
        assert!(text.contains("moderate length"));
        assert!(text.contains("3 sentence"));
    }
}
