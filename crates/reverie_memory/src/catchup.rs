//! Catch-up queue
//!
//! Buffers messages that arrive while the agent is asleep so they can be
//! replayed on wake, most important first. Items are keyed by message id,
//! so a repeated delivery overwrites rather than duplicates.
//!
//! Priority is `+100` for a mention, `+50` for a direct message, minus the
//! message age in minutes (capped at 60). Age keeps growing while an item
//! waits, so stored priorities are refreshed against the current instant by
//! every ordering-sensitive operation.

use chrono::{DateTime, Utc};
use reverie_core::{CatchupConfig, MessageEvent};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::Mutex;

const MENTION_BONUS: f32 = 100.0;
const DIRECT_BONUS: f32 = 50.0;
/// Recency penalty never exceeds this many points
const MAX_AGE_PENALTY: f32 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchupItem {
    pub event: MessageEvent,
    pub priority: f32,
    pub queued_at: DateTime<Utc>,
    pub processed: bool,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Score an event as of `now`.
pub fn score(event: &MessageEvent, now: DateTime<Utc>) -> f32 {
    let mut priority = 0.0;
    if event.mentions_agent {
        priority += MENTION_BONUS;
    }
    if event.is_direct {
        priority += DIRECT_BONUS;
    }
    let age_minutes = (now - event.timestamp).num_seconds().max(0) as f32 / 60.0;
    priority - age_minutes.min(MAX_AGE_PENALTY)
}

/// Priority descending, then queued_at ascending; id breaks exact ties.
fn queue_order(a: &CatchupItem, b: &CatchupItem) -> Ordering {
    b.priority
        .partial_cmp(&a.priority)
        .unwrap_or(Ordering::Equal)
        .then(a.queued_at.cmp(&b.queued_at))
        .then_with(|| a.event.id.cmp(&b.event.id))
}

pub struct CatchupQueue {
    config: CatchupConfig,
    items: Mutex<HashMap<String, CatchupItem>>,
}

impl CatchupQueue {
    pub fn new(config: CatchupConfig) -> Self {
        Self {
            config,
            items: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CatchupConfig {
        &self.config
    }

    /// Queue an event. Returns true if it was not already queued and is still
    /// held after any capacity trim.
    ///
    /// Re-enqueueing a pending id replaces its event and score but keeps its
    /// original queue position; ids already processed are ignored.
    pub async fn enqueue(&self, event: MessageEvent) -> bool {
        self.enqueue_at(event, Utc::now()).await
    }

    pub async fn enqueue_at(&self, event: MessageEvent, now: DateTime<Utc>) -> bool {
        let mut items = self.items.lock().await;
        let priority = score(&event, now);
        let id = event.id.clone();
        let inserted = match items.get_mut(&event.id) {
            Some(existing) if existing.processed => {
                tracing::debug!("Ignoring redelivery of processed message {}", event.id);
                false
            }
            Some(existing) => {
                existing.event = event;
                existing.priority = priority;
                false
            }
            None => {
                tracing::debug!("Queued {} for catch-up (priority {:.1})", event.id, priority);
                items.insert(
                    event.id.clone(),
                    CatchupItem {
                        event,
                        priority,
                        queued_at: now,
                        processed: false,
                        processed_at: None,
                    },
                );
                true
            }
        };
        if items.len() > self.config.capacity {
            Self::trim(&mut items, self.config.capacity, now);
        }
        inserted && items.contains_key(&id)
    }

    fn refresh(items: &mut HashMap<String, CatchupItem>, now: DateTime<Utc>) {
        for item in items.values_mut().filter(|i| !i.processed) {
            item.priority = score(&item.event, now);
        }
    }

    /// Bring the queue back to `capacity`: processed items go first (oldest
    /// first), then the lowest-priority pending items (oldest first on ties).
    fn trim(items: &mut HashMap<String, CatchupItem>, capacity: usize, now: DateTime<Utc>) {
        Self::refresh(items, now);
        let mut excess = items.len().saturating_sub(capacity);
        if excess == 0 {
            return;
        }

        let mut processed: Vec<(DateTime<Utc>, String)> = items
            .values()
            .filter(|i| i.processed)
            .map(|i| (i.processed_at.unwrap_or(i.queued_at), i.event.id.clone()))
            .collect();
        processed.sort();
        for (_, id) in processed.into_iter().take(excess) {
            items.remove(&id);
            excess -= 1;
        }

        if excess > 0 {
            let mut pending: Vec<&CatchupItem> = items.values().collect();
            pending.sort_by(|a, b| {
                a.priority
                    .partial_cmp(&b.priority)
                    .unwrap_or(Ordering::Equal)
                    .then(a.queued_at.cmp(&b.queued_at))
                    .then_with(|| a.event.id.cmp(&b.event.id))
            });
            let dropped: Vec<String> = pending
                .into_iter()
                .take(excess)
                .map(|i| i.event.id.clone())
                .collect();
            tracing::warn!(
                "Catch-up queue over capacity, dropping {} unseen messages",
                dropped.len()
            );
            for id in dropped {
                items.remove(&id);
            }
        }
    }

    /// Refresh every pending item's priority against `now`.
    pub async fn reprioritize(&self, now: DateTime<Utc>) {
        let mut items = self.items.lock().await;
        Self::refresh(&mut items, now);
    }

    /// Take up to `max_count` (bounded by `max_batch_size`) pending items in
    /// priority order and mark them processed.
    pub async fn dequeue_batch(&self, max_count: usize) -> Vec<CatchupItem> {
        self.dequeue_batch_at(max_count, Utc::now()).await
    }

    pub async fn dequeue_batch_at(&self, max_count: usize, now: DateTime<Utc>) -> Vec<CatchupItem> {
        let limit = max_count.min(self.config.max_batch_size);
        let mut items = self.items.lock().await;
        Self::refresh(&mut items, now);

        let mut pending: Vec<&CatchupItem> = items.values().filter(|i| !i.processed).collect();
        pending.sort_by(|a, b| queue_order(a, b));
        let ids: Vec<String> = pending
            .into_iter()
            .take(limit)
            .map(|i| i.event.id.clone())
            .collect();

        let mut batch = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = items.get_mut(&id) {
                item.processed = true;
                item.processed_at = Some(now);
                batch.push(item.clone());
            }
        }
        batch
    }

    /// Pending items in priority order, optionally restricted to one channel.
    pub async fn peek(&self, count: usize, channel: Option<&str>) -> Vec<CatchupItem> {
        self.peek_at(count, channel, Utc::now()).await
    }

    pub async fn peek_at(
        &self,
        count: usize,
        channel: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<CatchupItem> {
        let mut items = self.items.lock().await;
        Self::refresh(&mut items, now);
        let mut pending: Vec<CatchupItem> = items
            .values()
            .filter(|i| !i.processed)
            .filter(|i| channel.map_or(true, |c| i.event.channel_id == c))
            .cloned()
            .collect();
        pending.sort_by(queue_order);
        pending.truncate(count);
        pending
    }

    /// Drop an item regardless of state. Returns true if it existed.
    pub async fn remove(&self, message_id: &str) -> bool {
        self.items.lock().await.remove(message_id).is_some()
    }

    pub async fn clear(&self) {
        self.items.lock().await.clear();
    }

    /// Number of tracked items, processed ones included.
    pub async fn size(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn pending_count(&self) -> usize {
        self.items
            .lock()
            .await
            .values()
            .filter(|i| !i.processed)
            .count()
    }
}
