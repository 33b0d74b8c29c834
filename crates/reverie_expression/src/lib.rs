//! # Reverie Expression
//!
//! How the agent presents itself: personality traits that drift with
//! emotional experience, the decisions to respond or to start a
//! conversation, the style of a reply and the pause before sending it.

mod pacing;
mod personality;
mod style;

pub use pacing::Pacer;
pub use personality::{PersonalityAdapter, ResponseDecision, TraitAdaptation};
pub use style::ResponseStyle;
