//! # Reverie Memory
//!
//! Short-lived, in-memory working memory: which conversations are going on
//! and which messages were missed while asleep.

pub mod catchup;
pub mod conversation;

pub use catchup::{CatchupItem, CatchupQueue};
pub use conversation::{
    Conversation, ConversationManager, ConversationMessage, ConversationState, MaintenanceReport,
};
