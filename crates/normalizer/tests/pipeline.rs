//! Normalizer feeding a live bus through the `BatchSink` seam

use parking_lot::Mutex;
use pulse_bus::{handler_fn, EventBus, EventFilter, Priority};
use pulse_config::{BusSettings, NormalizerSettings};
use pulse_core::constants::*;
use pulse_core::events::utils::{cursor_moved, document_changed, file_created, pointer_moved};
use pulse_core::{BatchSink, Event};
use pulse_normalizer::EventNormalizer;
use std::sync::Arc;
use std::time::Duration;

struct Pipeline {
    normalizer: EventNormalizer,
    bus: Arc<EventBus>,
    sink: Arc<dyn BatchSink>,
    delivered: Arc<Mutex<Vec<Arc<Event>>>>,
}

fn pipeline(batch_size: usize) -> Pipeline {
    pulse_utils::init_for_tests();
    let bus = Arc::new(EventBus::new(BusSettings { max_buffer_size: 100 }));
    let delivered: Arc<Mutex<Vec<Arc<Event>>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let delivered = Arc::clone(&delivered);
        bus.subscribe(
            handler_fn("collector", move |event| {
                let delivered = Arc::clone(&delivered);
                async move {
                    delivered.lock().push(event);
                    Ok(())
                }
            }),
            EventFilter::all(),
            Priority::Normal,
        );
    }
    let normalizer = EventNormalizer::new(NormalizerSettings {
        batch_size,
        ..Default::default()
    });
    let sink: Arc<dyn BatchSink> = bus.clone();
    Pipeline {
        normalizer,
        bus,
        sink,
        delivered,
    }
}

#[tokio::test(start_paused = true)]
async fn test_normalized_events_reach_subscribers_in_order() {
    let pipeline = pipeline(3);
    let raw = vec![
        file_created("file:///a.ts").with_timestamp(1_000),
        pointer_moved("file:///a.ts", 1, 1).with_timestamp(1_001),
        cursor_moved("file:///a.ts", 2, 4).with_timestamp(1_002),
        cursor_moved("file:///a.ts", 2, 4).with_timestamp(1_003),
        document_changed("file:///a.ts", 2).with_timestamp(1_004),
    ];

    for event in raw {
        pipeline.normalizer.add_to_batch(event, &pipeline.sink).await;
    }

    let types: Vec<String> = pipeline
        .delivered
        .lock()
        .iter()
        .map(|event| event.event_type.clone())
        .collect();
    assert_eq!(
        types,
        vec![FS_FILE_CREATED, EDITOR_CURSOR_MOVED, EDITOR_DOCUMENT_CHANGED]
    );

    let delivered = pipeline.delivered.lock().clone();
    assert!(delivered.iter().all(|event| event.has_id()));
    assert!(delivered.iter().all(|event| event.source == DEFAULT_SOURCE));
    assert!(delivered
        .iter()
        .all(|event| event.metadata.contains_key(META_NORMALIZED_AT)));
    assert_eq!(pipeline.bus.buffer_stats().size, 3);
}

#[tokio::test(start_paused = true)]
async fn test_debounced_batch_reaches_bus() {
    let pipeline = pipeline(50);

    pipeline
        .normalizer
        .add_to_batch(file_created("file:///late.ts").with_timestamp(10), &pipeline.sink)
        .await;
    assert!(pipeline.delivered.lock().is_empty());

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(pipeline.delivered.lock().len(), 1);
    assert_eq!(pipeline.bus.metrics().emitted, 1);
    assert_eq!(pipeline.normalizer.metrics().batches_flushed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_flush_then_dispose() {
    let pipeline = pipeline(50);
    for n in 0..4u64 {
        pipeline
            .normalizer
            .add_to_batch(
                file_created(&format!("file:///{n}.ts")).with_timestamp(100 + n),
                &pipeline.sink,
            )
            .await;
    }

    let flushed = pipeline.normalizer.flush(pipeline.bus.as_ref()).await;
    pipeline.normalizer.dispose();
    pipeline.bus.dispose();

    assert_eq!(flushed, 4);
    assert_eq!(pipeline.delivered.lock().len(), 4);
    assert_eq!(pipeline.bus.subscription_count(), 0);
    assert_eq!(pipeline.normalizer.dedup_len(), 0);
}
