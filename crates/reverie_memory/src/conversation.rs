//! Conversation lifecycle
//!
//! ```text
//! New ──2nd message──► Active ──idle──► Idle ──idle longer──► Completed ──retention──► removed
//!                        │  ▲             │
//!                        │  └─new message─┘
//!                        └──importance / high priority──► Urgent
//! ```
//!
//! Inbound events are assigned per (channel, direct-message flag): the most
//! recently active conversation for that key is reused while it is fresh,
//! otherwise a new one is opened.

use chrono::{DateTime, Duration, Utc};
use reverie_core::{ConversationConfig, MessageEvent};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    New,
    Active,
    Idle,
    Urgent,
    Completed,
}

impl ConversationState {
    /// Still open for new messages.
    pub fn is_open(self) -> bool {
        !matches!(self, ConversationState::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub message_id: String,
    pub author_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Sent by the agent itself
    pub outgoing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub channel_id: String,
    pub is_direct: bool,
    pub state: ConversationState,
    pub participants: BTreeSet<String>,
    /// Most recent messages, oldest first (capped)
    pub messages: VecDeque<ConversationMessage>,
    /// Total messages seen, including those dropped by the cap
    pub message_count: usize,
    /// 0.0 - 1.0
    pub importance: f32,
    pub topic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Conversation {
    fn open(event: &MessageEvent, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_id: event.channel_id.clone(),
            is_direct: event.is_direct,
            state: ConversationState::New,
            participants: BTreeSet::new(),
            messages: VecDeque::new(),
            message_count: 0,
            importance: 0.0,
            topic: None,
            created_at: now,
            last_active_at: now,
            completed_at: None,
        }
    }

    fn push(&mut self, message: ConversationMessage, max_messages: usize) {
        self.messages.push_back(message);
        self.message_count += 1;
        while self.messages.len() > max_messages.max(1) {
            self.messages.pop_front();
        }
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        self.state = ConversationState::Completed;
        self.completed_at = Some(now);
    }

    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_active_at).max(Duration::zero())
    }

    /// Fraction of `saturation` messages seen within the last `window`, in [0, 1].
    pub fn activity_level(&self, now: DateTime<Utc>, window: Duration, saturation: usize) -> f32 {
        let since = now - window;
        let recent = self
            .messages
            .iter()
            .filter(|m| m.timestamp >= since && m.timestamp <= now)
            .count();
        (recent as f32 / saturation.max(1) as f32).min(1.0)
    }
}

/// Outcome of one maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// New/Active (and stale Urgent) moved to Idle
    pub idled: usize,
    /// Idle conversations completed after prolonged silence
    pub completed: usize,
    /// Completed conversations deleted after retention
    pub removed: usize,
    /// Idle conversations force-completed to get back under the cap
    pub evicted: usize,
}

impl MaintenanceReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub struct ConversationManager {
    config: ConversationConfig,
    conversations: Mutex<HashMap<Uuid, Conversation>>,
}

impl ConversationManager {
    pub fn new(config: ConversationConfig) -> Self {
        Self {
            config,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    fn idle_threshold(&self) -> Duration {
        Duration::minutes(self.config.idle_threshold_minutes.max(0))
    }

    /// Attach an inbound message to a conversation, opening one if needed.
    /// Returns a snapshot of the conversation after the update.
    pub async fn assign(&self, event: &MessageEvent) -> Conversation {
        self.assign_at(event, Utc::now()).await
    }

    pub async fn assign_at(&self, event: &MessageEvent, now: DateTime<Utc>) -> Conversation {
        let threshold = self.idle_threshold();
        let mut conversations = self.conversations.lock().await;

        let reusable = conversations
            .values()
            .filter(|c| {
                c.state.is_open()
                    && c.channel_id == event.channel_id
                    && c.is_direct == event.is_direct
            })
            .max_by_key(|c| c.last_active_at)
            .filter(|c| c.idle_for(now) <= threshold)
            .map(|c| c.id);

        let mut conversation = match reusable.and_then(|id| conversations.remove(&id)) {
            Some(existing) => existing,
            None => {
                // A fresh conversation supersedes any stale open one for the same key
                for c in conversations.values_mut() {
                    if c.channel_id == event.channel_id
                        && c.is_direct == event.is_direct
                        && matches!(c.state, ConversationState::New | ConversationState::Active)
                    {
                        c.state = ConversationState::Idle;
                    }
                }
                let opened = Conversation::open(event, now);
                tracing::debug!(
                    "Opened conversation {} in {} (direct: {})",
                    opened.id,
                    event.channel_id,
                    event.is_direct
                );
                opened
            }
        };

        if conversation.message_count > 0 {
            conversation.state = match conversation.state {
                ConversationState::New | ConversationState::Idle => ConversationState::Active,
                other => other,
            };
        }
        conversation.participants.insert(event.author_id.clone());
        conversation.push(
            ConversationMessage {
                message_id: event.id.clone(),
                author_id: event.author_id.clone(),
                content: event.content.clone(),
                timestamp: event.timestamp,
                outgoing: false,
            },
            self.config.max_messages,
        );
        conversation.last_active_at = conversation.last_active_at.max(now);
        conversations.insert(conversation.id, conversation.clone());
        conversation
    }

    /// Record a message sent by the agent. Returns false for unknown or
    /// completed conversations.
    pub async fn record_outgoing(&self, id: Uuid, content: impl Into<String>) -> bool {
        self.record_outgoing_at(id, content, Utc::now()).await
    }

    pub async fn record_outgoing_at(
        &self,
        id: Uuid,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let max_messages = self.config.max_messages;
        let mut conversations = self.conversations.lock().await;
        match conversations.get_mut(&id) {
            Some(c) if c.state.is_open() => {
                c.push(
                    ConversationMessage {
                        message_id: format!("out-{}", Uuid::new_v4()),
                        author_id: String::new(),
                        content: content.into(),
                        timestamp: now,
                        outgoing: true,
                    },
                    max_messages,
                );
                if c.state == ConversationState::Idle {
                    c.state = ConversationState::Active;
                }
                c.last_active_at = c.last_active_at.max(now);
                true
            }
            _ => false,
        }
    }

    /// Set importance (clamped to [0, 1]). An Active conversation above the
    /// high-importance threshold becomes Urgent. Returns false if unknown.
    pub async fn set_importance(&self, id: Uuid, importance: f32) -> bool {
        let importance = reverie_core::sanitize_f32(importance, 0.0).clamp(0.0, 1.0);
        let mut conversations = self.conversations.lock().await;
        let Some(c) = conversations.get_mut(&id) else {
            return false;
        };
        c.importance = importance;
        if c.state == ConversationState::Active
            && importance > self.config.high_importance_threshold
        {
            c.state = ConversationState::Urgent;
            tracing::info!("Conversation {} escalated to urgent ({:.2})", id, importance);
        }
        true
    }

    /// Escalate an Active conversation to Urgent. Returns true if the
    /// conversation is Urgent afterwards.
    pub async fn mark_high_priority(&self, id: Uuid) -> bool {
        let mut conversations = self.conversations.lock().await;
        match conversations.get_mut(&id) {
            Some(c) if c.state == ConversationState::Active => {
                c.state = ConversationState::Urgent;
                tracing::info!("Conversation {} marked high priority", id);
                true
            }
            Some(c) => c.state == ConversationState::Urgent,
            None => false,
        }
    }

    pub async fn set_topic(&self, id: Uuid, topic: impl Into<String>) -> bool {
        let mut conversations = self.conversations.lock().await;
        match conversations.get_mut(&id) {
            Some(c) => {
                c.topic = Some(topic.into());
                true
            }
            None => false,
        }
    }

    /// Close a conversation. Returns false if unknown or already completed.
    pub async fn complete(&self, id: Uuid) -> bool {
        self.complete_at(id, Utc::now()).await
    }

    pub async fn complete_at(&self, id: Uuid, now: DateTime<Utc>) -> bool {
        let mut conversations = self.conversations.lock().await;
        match conversations.get_mut(&id) {
            Some(c) if c.state.is_open() => {
                c.complete(now);
                true
            }
            _ => false,
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<Conversation> {
        self.conversations.lock().await.get(&id).cloned()
    }

    /// All tracked conversations, most recently active first.
    pub async fn list(&self) -> Vec<Conversation> {
        let conversations = self.conversations.lock().await;
        let mut all: Vec<Conversation> = conversations.values().cloned().collect();
        all.sort_by(|a, b| b.last_active_at.cmp(&a.last_active_at));
        all
    }

    pub async fn count_in_state(&self, state: ConversationState) -> usize {
        let conversations = self.conversations.lock().await;
        conversations.values().filter(|c| c.state == state).count()
    }

    pub async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.lock().await.is_empty()
    }

    /// Periodic maintenance: idle, complete, prune and evict.
    pub async fn maintain(&self) -> MaintenanceReport {
        self.maintain_at(Utc::now()).await
    }

    pub async fn maintain_at(&self, now: DateTime<Utc>) -> MaintenanceReport {
        let idle_threshold = self.idle_threshold();
        let completion = Duration::minutes(self.config.idle_completion_minutes.max(0));
        let retention = Duration::minutes(self.config.completion_retention_minutes.max(0));
        let mut report = MaintenanceReport::default();
        let mut conversations = self.conversations.lock().await;

        for c in conversations.values_mut() {
            let idle = c.idle_for(now);
            match c.state {
                ConversationState::New | ConversationState::Active if idle > idle_threshold => {
                    c.state = ConversationState::Idle;
                    report.idled += 1;
                }
                // Urgency lapses once the conversation has gone quiet for good
                ConversationState::Urgent if idle > completion => {
                    c.state = ConversationState::Idle;
                    report.idled += 1;
                }
                ConversationState::Idle if idle > completion => {
                    c.complete(now);
                    report.completed += 1;
                }
                _ => {}
            }
        }

        let before = conversations.len();
        conversations.retain(|_, c| {
            !(c.state == ConversationState::Completed
                && c.completed_at.is_some_and(|at| now - at > retention))
        });
        report.removed = before - conversations.len();

        let excess = conversations
            .len()
            .saturating_sub(self.config.max_conversations);
        if excess > 0 {
            let mut idle: Vec<(DateTime<Utc>, Uuid)> = conversations
                .values()
                .filter(|c| c.state == ConversationState::Idle)
                .map(|c| (c.last_active_at, c.id))
                .collect();
            idle.sort();
            for (_, id) in idle.into_iter().take(excess) {
                if let Some(c) = conversations.get_mut(&id) {
                    c.complete(now);
                    report.evicted += 1;
                }
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                "Conversation maintenance: {} idled, {} completed, {} removed, {} evicted",
                report.idled,
                report.completed,
                report.removed,
                report.evicted
            );
        }
        report
    }
}
