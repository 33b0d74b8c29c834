//! Property-based tests for reverie_memory.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use reverie_core::{CatchupConfig, ConversationConfig, MessageEvent};
use reverie_memory::{CatchupQueue, ConversationManager, ConversationState};
use std::collections::HashSet;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// (id, channel, mention, dm, age in minutes)
fn arb_event() -> impl Strategy<Value = MessageEvent> {
    (0u32..40, 0u8..3, any::<bool>(), any::<bool>(), 0i64..120).prop_map(
        |(id, channel, mention, dm, age)| {
            let mut event = MessageEvent::new(
                format!("m{id}"),
                "author",
                format!("c{channel}"),
                "text",
                t0() - Duration::minutes(age),
            );
            event.mentions_agent = mention;
            event.is_direct = dm;
            event
        },
    )
}

proptest! {
    /// The queue never exceeds capacity, never duplicates ids, and peeks in
    /// non-increasing priority order.
    #[test]
    fn catchup_respects_capacity_and_order(
        capacity in 1usize..20,
        events in prop::collection::vec(arb_event(), 0..60),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let q = CatchupQueue::new(CatchupConfig { capacity, max_batch_size: 50 });
            for event in events {
                q.enqueue_at(event, t0()).await;
                assert!(q.size().await <= capacity);
            }
            let peeked = q.peek_at(100, None, t0()).await;
            let ids: HashSet<_> = peeked.iter().map(|i| i.event.id.clone()).collect();
            assert_eq!(ids.len(), peeked.len());
            for pair in peeked.windows(2) {
                assert!(pair[0].priority >= pair[1].priority);
                if pair[0].priority == pair[1].priority {
                    assert!(pair[0].queued_at <= pair[1].queued_at);
                }
            }
        });
    }

    /// Enqueue N distinct, drain N: exactly N processed and nothing pending.
    #[test]
    fn catchup_drain_round_trip(n in 0usize..50) {
        let rt = runtime();
        rt.block_on(async {
            let q = CatchupQueue::new(CatchupConfig { capacity: 100, max_batch_size: 50 });
            for i in 0..n {
                q.enqueue_at(MessageEvent::new(format!("m{i}"), "a", "c", "x", t0()), t0()).await;
            }
            let batch = q.dequeue_batch_at(n, t0()).await;
            assert_eq!(batch.len(), n);
            assert!(batch.iter().all(|i| i.processed));
            assert!(q.peek_at(100, None, t0()).await.is_empty());
        });
    }

    /// At most one New/Active conversation per (channel, dm) key.
    #[test]
    fn one_live_conversation_per_key(
        steps in prop::collection::vec((arb_event(), 0i64..30), 0..40),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let mgr = ConversationManager::new(ConversationConfig::default());
            let mut now = t0();
            for (event, advance) in steps {
                now += Duration::minutes(advance);
                mgr.assign_at(&event, now).await;
                mgr.maintain_at(now).await;

                let mut live = HashSet::new();
                for c in mgr.list().await {
                    if matches!(c.state, ConversationState::New | ConversationState::Active) {
                        assert!(live.insert((c.channel_id.clone(), c.is_direct)));
                    }
                }
            }
        });
    }
}
