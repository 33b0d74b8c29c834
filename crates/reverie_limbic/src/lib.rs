//! # Reverie Limbic System
//!
//! Fast, non-verbal state regulation for the agent:
//!
//! - [`EmotionEngine`]: six core emotions, pushed by triggers and pulled back
//!   toward personality-defined baselines.
//! - [`StaminaManager`]: an energy scalar that depletes with activity and
//!   recovers with rest, owning the sleep/wake state machine.
//!
//! ## Time
//!
//! Neither component runs a background task. Decay and recovery are applied
//! lazily: every access first catches up on the time elapsed since the last
//! accounted instant. Every operation has an `*_at(now)` variant so callers
//! and tests can inject time.

mod emotion;
mod stamina;

pub use emotion::EmotionEngine;
pub use stamina::{SleepTransition, StaminaManager};
