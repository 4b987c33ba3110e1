//! Property tests for delivery order across arbitrary subscription sets

use parking_lot::Mutex;
use proptest::prelude::*;
use pulse_bus::{handler_fn, EventBus, EventFilter, Priority};
use pulse_core::{Event, EventPayload};
use std::sync::Arc;

fn priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_delivery_is_priority_then_subscribe_order(
        priorities in prop::collection::vec(priority(), 1..24)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let delivered: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::default();
        for (index, priority) in priorities.iter().enumerate() {
            let delivered = Arc::clone(&delivered);
            bus.subscribe(
                handler_fn(format!("subscriber-{index}"), move |_event| {
                    let delivered = Arc::clone(&delivered);
                    async move {
                        delivered.lock().push(index);
                        Ok(())
                    }
                }),
                EventFilter::all(),
                *priority,
            );
        }

        runtime.block_on(bus.emit(Event::new("test.property", EventPayload::Empty)));

        let mut expected: Vec<usize> = (0..priorities.len()).collect();
        expected.sort_by(|a, b| priorities[*b].cmp(&priorities[*a]));
        prop_assert_eq!(delivered.lock().clone(), expected);
    }

    #[test]
    fn test_unsubscribed_handlers_never_run(
        count in 1usize..16,
        removed in prop::collection::btree_set(0usize..16, 0..8)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let delivered: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::default();
        let ids: Vec<_> = (0..count)
            .map(|index| {
                let delivered = Arc::clone(&delivered);
                bus.subscribe(
                    handler_fn("indexed", move |_event| {
                        let delivered = Arc::clone(&delivered);
                        async move {
                            delivered.lock().push(index);
                            Ok(())
                        }
                    }),
                    EventFilter::for_types(["test.property"]),
                    Priority::Normal,
                )
            })
            .collect();

        for index in removed.iter().filter(|index| **index < count) {
            prop_assert!(bus.unsubscribe(ids[*index]));
        }
        runtime.block_on(bus.emit(Event::new("test.property", EventPayload::Empty)));

        let expected: Vec<usize> = (0..count).filter(|index| !removed.contains(index)).collect();
        prop_assert_eq!(delivered.lock().clone(), expected);
        prop_assert_eq!(bus.subscription_count(), expected_len(count, &removed));
    }
}

fn expected_len(count: usize, removed: &std::collections::BTreeSet<usize>) -> usize {
    count - removed.iter().filter(|index| **index < count).count()
}
