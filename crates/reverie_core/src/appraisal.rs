//! Keyword-based appraisal: turns an inbound message into an emotional trigger.
//!
//! Deliberately simple and deterministic. In production, this should be
//! replaced with a classifier.

use crate::emotion::{CoreEmotion, EmotionalTrigger, TriggerKind};
use crate::MessageEvent;

const JOY: &[&str] = &[
    "happy", "glad", "love", "great", "awesome", "yay", "haha", "lol", "fun", "nice",
];
const SADNESS: &[&str] = &["sad", "miss", "lonely", "cry", "sorry", "unfortunately", "lost"];
const ANGER: &[&str] = &["angry", "hate", "annoying", "furious", "stupid", "shut"];
const FEAR: &[&str] = &["scared", "afraid", "worried", "anxious", "terrified", "help"];
const SURPRISE: &[&str] = &["wow", "whoa", "omg", "really", "unexpected"];
const DISGUST: &[&str] = &["gross", "disgusting", "ew", "yuck", "nasty"];

const PRAISE: &[&str] = &["thanks", "thank", "appreciate", "brilliant", "amazing", "smart"];
const INSULT: &[&str] = &["idiot", "useless", "dumb", "worthless", "pathetic"];

const EMOJI: &[(&str, CoreEmotion)] = &[
    ("😊", CoreEmotion::Joy),
    ("😂", CoreEmotion::Joy),
    ("❤️", CoreEmotion::Joy),
    ("😢", CoreEmotion::Sadness),
    ("😡", CoreEmotion::Anger),
    ("😱", CoreEmotion::Fear),
    ("😮", CoreEmotion::Surprise),
    ("🤢", CoreEmotion::Disgust),
];

/// Raw delta per keyword hit
const HIT_DELTA: f32 = 8.0;

fn lexicon(emotion: CoreEmotion) -> &'static [&'static str] {
    match emotion {
        CoreEmotion::Joy => JOY,
        CoreEmotion::Sadness => SADNESS,
        CoreEmotion::Anger => ANGER,
        CoreEmotion::Fear => FEAR,
        CoreEmotion::Surprise => SURPRISE,
        CoreEmotion::Disgust => DISGUST,
    }
}

/// Appraise a message into a trigger.
///
/// Intensity grows with the number of emotional keywords, exclamation marks,
/// and with being directly addressed.
pub fn appraise(event: &MessageEvent) -> EmotionalTrigger {
    let lowered = event.content.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();
    let count = |list: &[&str]| words.iter().filter(|w| list.contains(*w)).count();

    let praise = count(PRAISE);
    let insult = count(INSULT);

    let kind = if insult > 0 {
        TriggerKind::Insult
    } else if praise > 0 {
        TriggerKind::Praise
    } else if event.is_direct {
        TriggerKind::DirectMessage
    } else if event.mentions_agent {
        TriggerKind::Mention
    } else {
        TriggerKind::Message
    };

    let mut hits = 0usize;
    let mut deltas: Vec<(CoreEmotion, f32)> = Vec::new();
    for emotion in CoreEmotion::ALL {
        let n = count(lexicon(emotion))
            + EMOJI
                .iter()
                .filter(|(e, em)| *em == emotion && event.content.contains(*e))
                .count();
        if n > 0 {
            hits += n;
            deltas.push((emotion, n as f32 * HIT_DELTA));
        }
    }
    if praise > 0 {
        hits += praise;
        deltas.push((CoreEmotion::Joy, praise as f32 * HIT_DELTA * 1.25));
    }
    if insult > 0 {
        hits += insult;
        deltas.push((CoreEmotion::Anger, insult as f32 * HIT_DELTA * 1.25));
        deltas.push((CoreEmotion::Sadness, insult as f32 * HIT_DELTA * 0.5));
    }
    if event.is_addressed() {
        // Being addressed is mildly pleasant on its own
        deltas.push((CoreEmotion::Joy, 3.0));
    }

    let exclamations = event.content.matches('!').count().min(3);
    let mut intensity = 0.1 + 0.15 * hits as f32 + 0.05 * exclamations as f32;
    if event.is_addressed() {
        intensity += 0.2;
    }

    let mut trigger = EmotionalTrigger::new(kind, &event.author_id, &event.id, intensity.min(1.0));
    for (emotion, delta) in deltas {
        trigger = trigger.with_delta(emotion, delta);
    }
    trigger
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn msg(content: &str) -> MessageEvent {
        MessageEvent::new("m1", "alice", "general", content, Utc::now())
    }

    #[test]
    fn test_neutral_text() {
        let trigger = appraise(&msg("the meeting is at noon"));
        assert_eq!(trigger.kind, TriggerKind::Message);
        assert!(trigger.is_empty());
        assert!((trigger.intensity - 0.1).abs() < 1e-6);
        assert_eq!(trigger.source_id, "alice");
        assert_eq!(trigger.content_id, "m1");
    }

    #[test]
    fn test_joyful_text() {
        let trigger = appraise(&msg("haha this is awesome"));
        assert!(trigger.deltas[&CoreEmotion::Joy] > 0.0);
        assert!(trigger.intensity > 0.1);
    }

    #[test]
    fn test_insult_wins_kind() {
        let trigger = appraise(&msg("thanks, you useless bot"));
        assert_eq!(trigger.kind, TriggerKind::Insult);
        assert!(trigger.deltas[&CoreEmotion::Anger] > 0.0);
    }

    #[test]
    fn test_praise_kind() {
        let trigger = appraise(&msg("Thank you so much"));
        assert_eq!(trigger.kind, TriggerKind::Praise);
    }

    #[test]
    fn test_addressing_raises_intensity() {
        let plain = appraise(&msg("hello there"));
        let dm = appraise(&msg("hello there").direct());
        let mention = appraise(&msg("hello there").mentioning());
        assert_eq!(dm.kind, TriggerKind::DirectMessage);
        assert_eq!(mention.kind, TriggerKind::Mention);
        assert!(dm.intensity > plain.intensity);
        assert!(mention.intensity > plain.intensity);
    }

    #[test]
    fn test_emoji_sentiment() {
        let trigger = appraise(&msg("😢"));
        assert!(trigger.deltas[&CoreEmotion::Sadness] > 0.0);
    }

    #[test]
    fn test_intensity_capped() {
        let trigger = appraise(&msg(
            "wow omg happy glad love great awesome scared afraid angry hate!!!!!",
        ));
        assert!(trigger.intensity <= 1.0);
    }
}
