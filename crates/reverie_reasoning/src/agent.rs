//! Agent orchestrator
//!
//! Routes each inbound message through the components in order:
//!
//! 1. asleep? queue it for catch-up and stop
//! 2. assign it to a conversation
//! 3. appraise it, apply the emotional impact, let traits adapt
//! 4. pay the processing cost, decide whether to answer
//! 5. on a reply, pay the response cost and derive the style
//!
//! Each component guards its own state; the agent never holds one lock while
//! calling into another component or an external collaborator.

use crate::decision::{Decision, Initiation};
use chrono::{DateTime, Duration, Utc};
use reverie_core::{
    appraise, MessageEvent, Presence, PresenceSink, RelationshipStore, ReverieConfig,
    StaminaReader, StaminaSnapshot,
};
use reverie_expression::PersonalityAdapter;
use reverie_limbic::{EmotionEngine, StaminaManager};
use reverie_memory::{CatchupQueue, ConversationManager, MaintenanceReport};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Result of one periodic tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub stamina: StaminaSnapshot,
    pub maintenance: MaintenanceReport,
    /// Catch-up replays triggered by waking up during this tick
    pub replayed: Vec<Decision>,
}

pub struct Agent {
    config: ReverieConfig,
    stamina: Arc<StaminaManager>,
    emotions: Arc<EmotionEngine>,
    personality: PersonalityAdapter,
    conversations: ConversationManager,
    catchup: CatchupQueue,
    relationships: Arc<dyn RelationshipStore>,
    presence: Arc<dyn PresenceSink>,
    /// Presence last reported to the transport
    announced: Mutex<Presence>,
    /// Replays triggered from `handle_event`, awaiting `take_replayed`
    replayed: Mutex<Vec<Decision>>,
}

impl Agent {
    pub fn new(
        config: ReverieConfig,
        relationships: Arc<dyn RelationshipStore>,
        presence: Arc<dyn PresenceSink>,
    ) -> Self {
        Self::starting_at(config, relationships, presence, Utc::now())
    }

    /// Build every component with its clock anchored at `now`.
    pub fn starting_at(
        config: ReverieConfig,
        relationships: Arc<dyn RelationshipStore>,
        presence: Arc<dyn PresenceSink>,
        now: DateTime<Utc>,
    ) -> Self {
        let stamina = Arc::new(StaminaManager::starting_at(config.stamina.clone(), now));
        let reader: Arc<dyn StaminaReader> = stamina.clone();
        let emotions = Arc::new(EmotionEngine::starting_at(
            &config.emotion,
            reader.clone(),
            now,
        ));
        let personality = PersonalityAdapter::new(
            config.personality.clone(),
            reader,
            emotions.clone(),
            relationships.clone(),
        );
        let conversations = ConversationManager::new(config.conversation.clone());
        let catchup = CatchupQueue::new(config.catchup.clone());

        tracing::info!("Agent '{}' initialized", config.agent.agent_id);
        Self {
            config,
            stamina,
            emotions,
            personality,
            conversations,
            catchup,
            relationships,
            presence,
            announced: Mutex::new(Presence::Awake),
            replayed: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ReverieConfig {
        &self.config
    }

    pub fn stamina(&self) -> &Arc<StaminaManager> {
        &self.stamina
    }

    pub fn emotions(&self) -> &Arc<EmotionEngine> {
        &self.emotions
    }

    pub fn personality(&self) -> &PersonalityAdapter {
        &self.personality
    }

    pub fn conversations(&self) -> &ConversationManager {
        &self.conversations
    }

    pub fn catchup(&self) -> &CatchupQueue {
        &self.catchup
    }

    /// Compare the stamina state with the last announced presence and notify
    /// the transport on change. Returns the new presence if it changed.
    async fn sync_presence(&self, now: DateTime<Utc>) -> Option<Presence> {
        let snapshot = self.stamina.snapshot_at(now).await;
        let current = if snapshot.is_sleeping {
            Presence::Sleeping
        } else {
            Presence::Awake
        };
        {
            let mut announced = self.announced.lock().await;
            if *announced == current {
                return None;
            }
            *announced = current;
        }

        match current {
            Presence::Sleeping => tracing::info!(
                "Going to sleep (stamina {:.1}/{:.1})",
                snapshot.current,
                snapshot.max
            ),
            Presence::Awake => tracing::info!(
                "Woke up (stamina {:.1}/{:.1}), {} message(s) to catch up on",
                snapshot.current,
                snapshot.max,
                self.catchup.pending_count().await
            ),
        }
        if let Err(e) = self.presence.set_presence(current).await {
            tracing::warn!("Failed to publish presence {:?}: {}", current, e);
        }
        Some(current)
    }

    /// Route one inbound message.
    pub async fn handle_event(&self, event: MessageEvent) -> Decision {
        self.handle_event_at(event, Utc::now()).await
    }

    pub async fn handle_event_at(&self, event: MessageEvent, now: DateTime<Utc>) -> Decision {
        // A lazy wake-up: the backlog goes ahead of the new message
        if self.sync_presence(now).await == Some(Presence::Awake) {
            let replayed = self.replay_backlog(now).await;
            self.replayed.lock().await.extend(replayed);
        }

        if self.stamina.is_sleeping_at(now).await {
            let id = event.id.clone();
            self.catchup.enqueue_at(event, now).await;
            tracing::debug!("Asleep, deferred message {}", id);
            return Decision::deferred(id);
        }

        let decision = self.process(&event, now).await;
        self.sync_presence(now).await;
        decision
    }

    /// Decisions for backlog messages replayed while handling new events.
    pub async fn take_replayed(&self) -> Vec<Decision> {
        std::mem::take(&mut *self.replayed.lock().await)
    }

    /// The awake pipeline for one message.
    async fn process(&self, event: &MessageEvent, now: DateTime<Utc>) -> Decision {
        let conversation = self.conversations.assign_at(event, now).await;

        let trigger = appraise(event);
        let impact = self.emotions.apply_trigger_at(&trigger, now).await;
        self.personality.adapt_at(event, &impact, now).await;

        self.stamina
            .consume_at(self.config.stamina.message_cost, now)
            .await;
        let response = self
            .personality
            .decide_response_at(event, &conversation, now)
            .await;

        let style = if response.respond {
            self.stamina
                .consume_at(self.config.stamina.response_cost, now)
                .await;
            if let Err(e) = self.relationships.record_interaction(&event.author_id).await {
                tracing::warn!("Failed to record interaction with {}: {}", event.author_id, e);
            }
            let emotions = self.emotions.current_state_at(now).await;
            Some(
                self.personality
                    .response_style_at(&emotions, &conversation, now)
                    .await,
            )
        } else {
            None
        };

        Decision {
            message_id: event.id.clone(),
            conversation_id: Some(conversation.id),
            respond: response.respond,
            probability: response.probability,
            style,
            delay_ms: response.delay.as_millis() as u64,
            deferred: false,
        }
    }

    /// Replay the catch-up queue, most important first, in bounded batches
    /// until it is empty or the agent falls asleep again.
    pub async fn on_wake(&self) -> Vec<Decision> {
        self.on_wake_at(Utc::now()).await
    }

    pub async fn on_wake_at(&self, now: DateTime<Utc>) -> Vec<Decision> {
        self.sync_presence(now).await;
        self.replay_backlog(now).await
    }

    async fn replay_backlog(&self, now: DateTime<Utc>) -> Vec<Decision> {
        let batch_size = self.config.catchup.max_batch_size.max(1);
        let mut decisions = Vec::new();

        'drain: loop {
            if self.stamina.is_sleeping_at(now).await {
                break;
            }
            let batch = self.catchup.dequeue_batch_at(batch_size, now).await;
            if batch.is_empty() {
                break;
            }
            let mut items = batch.into_iter();
            while let Some(item) = items.next() {
                if self.stamina.is_sleeping_at(now).await {
                    // Put the unprocessed remainder back for the next wake-up
                    for rest in std::iter::once(item).chain(items.by_ref()) {
                        self.catchup.remove(&rest.event.id).await;
                        self.catchup.enqueue_at(rest.event, now).await;
                    }
                    break 'drain;
                }
                decisions.push(self.process(&item.event, now).await);
            }
        }

        if !decisions.is_empty() {
            tracing::info!(
                "Caught up on {} message(s), {} answered",
                decisions.len(),
                decisions.iter().filter(|d| d.respond).count()
            );
        }
        self.sync_presence(now).await;
        decisions
    }

    /// Periodic maintenance: recovery, emotional decay, conversation pruning.
    /// Replays the backlog if the agent woke up.
    pub async fn tick(&self, elapsed_minutes: f32) -> TickReport {
        self.tick_at(elapsed_minutes, Utc::now()).await
    }

    pub async fn tick_at(&self, elapsed_minutes: f32, now: DateTime<Utc>) -> TickReport {
        let minutes = if elapsed_minutes.is_finite() {
            elapsed_minutes.max(0.0)
        } else {
            0.0
        };
        self.stamina.recover_at(minutes, now).await;
        self.emotions
            .decay_toward_baseline_at(Duration::milliseconds((minutes * 60_000.0) as i64), now)
            .await;
        let maintenance = self.conversations.maintain_at(now).await;

        let replayed = if self.sync_presence(now).await == Some(Presence::Awake) {
            self.replay_backlog(now).await
        } else {
            Vec::new()
        };

        TickReport {
            stamina: self.stamina.snapshot_at(now).await,
            maintenance,
            replayed,
        }
    }

    /// Consider opening a message in a conversation unprompted. Returns
    /// `None` for an unknown conversation.
    pub async fn consider_initiation(&self, conversation_id: Uuid) -> Option<Initiation> {
        self.consider_initiation_at(conversation_id, Utc::now()).await
    }

    pub async fn consider_initiation_at(
        &self,
        conversation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Option<Initiation> {
        let conversation = self.conversations.get(conversation_id).await?;
        if self.stamina.is_sleeping_at(now).await || !conversation.state.is_open() {
            return Some(Initiation {
                conversation_id,
                initiate: false,
                probability: 0.0,
                style: None,
            });
        }

        let (initiate, probability) = self.personality.try_initiate_at(&conversation, now).await;
        let style = if initiate {
            self.stamina
                .consume_at(self.config.stamina.initiation_cost, now)
                .await;
            let emotions = self.emotions.current_state_at(now).await;
            Some(
                self.personality
                    .response_style_at(&emotions, &conversation, now)
                    .await,
            )
        } else {
            None
        };
        self.sync_presence(now).await;
        Some(Initiation {
            conversation_id,
            initiate,
            probability,
            style,
        })
    }
}
