// ============================================================================
// Decisions returned to the host
// ============================================================================

use reverie_expression::ResponseStyle;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// What to do about one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub message_id: String,
    /// None when the message was deferred
    pub conversation_id: Option<Uuid>,
    pub respond: bool,
    pub probability: f32,
    /// Present only when responding
    pub style: Option<ResponseStyle>,
    /// Pause the host should observe before sending
    pub delay_ms: u64,
    /// Queued for catch-up because the agent was asleep
    pub deferred: bool,
}

impl Decision {
    pub fn deferred(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            conversation_id: None,
            respond: false,
            probability: 0.0,
            style: None,
            delay_ms: 0,
            deferred: true,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Outcome of considering an unprompted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initiation {
    pub conversation_id: Uuid,
    pub initiate: bool,
    pub probability: f32,
    pub style: Option<ResponseStyle>,
}
