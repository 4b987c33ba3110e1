//! Event normalizer and batcher

use crate::dedup::{dedup_key, DedupTable, Observation};
use crate::metrics::{NormalizerCounters, NormalizerMetrics};
use crate::noise::NoisePolicy;
use parking_lot::Mutex;
use pulse_config::NormalizerSettings;
use pulse_core::constants::{META_ENVIRONMENT, META_NORMALIZED_AT, META_PLATFORM};
use pulse_core::{now_millis, BatchSink, Event};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use uuid::Uuid;

/// Length of the random suffix of generated event ids
const ID_SUFFIX_LEN: usize = 9;

/// Gatekeeper in front of the bus.
///
/// Fills in missing ids and timestamps, drops duplicates and noise, enriches
/// metadata, and collects survivors into batches that are handed to a
/// [`BatchSink`] once `batch_size` events are pending or `batch_delay_ms`
/// after the first pending event, whichever comes first.
///
/// Cloning yields another handle to the same normalizer.
#[derive(Clone)]
pub struct EventNormalizer {
    inner: Arc<Inner>,
}

struct Inner {
    settings: NormalizerSettings,
    noise: NoisePolicy,
    state: Mutex<NormalizerState>,
    counters: NormalizerCounters,
}

struct NormalizerState {
    dedup: DedupTable,
    batch: Vec<Event>,
    timer: Option<PendingTimer>,
    /// Incremented for every scheduled timer
    generation: u64,
}

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl NormalizerState {
    fn cancel_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }
}

impl EventNormalizer {
    /// Create a normalizer whose noise policy drops `settings.noise_types`
    pub fn new(settings: NormalizerSettings) -> Self {
        let noise = NoisePolicy::from(&settings);
        Self::with_noise_policy(settings, noise)
    }

    pub fn with_noise_policy(settings: NormalizerSettings, noise: NoisePolicy) -> Self {
        let dedup = DedupTable::new(settings.dedup_window_ms, settings.dedup_gc_threshold);
        Self {
            inner: Arc::new(Inner {
                settings,
                noise,
                state: Mutex::new(NormalizerState {
                    dedup,
                    batch: Vec::new(),
                    timer: None,
                    generation: 0,
                }),
                counters: NormalizerCounters::default(),
            }),
        }
    }

    pub fn settings(&self) -> &NormalizerSettings {
        &self.inner.settings
    }

    /// Normalize one event; `None` when it is a duplicate or noise.
    ///
    /// The dedup key is recorded before the noise check, so a noisy event
    /// still suppresses its own repeats.
    pub fn normalize(&self, mut event: Event) -> Option<Event> {
        let inner = &self.inner;
        inner.counters.record_seen();

        if !event.has_timestamp() {
            event.timestamp = now_millis();
        }
        if !event.has_id() {
            event.id = generate_id(&event.event_type, event.timestamp);
        }

        let key = dedup_key(&event);
        let observation = inner.state.lock().dedup.observe(key, event.timestamp);
        match observation {
            Observation::Duplicate => {
                inner.counters.record_duplicate();
                trace!(event_type = %event.event_type, event_id = %event.id, "Dropping duplicate event");
                return None;
            }
            Observation::Fresh { collected: Some(collected) } => {
                inner.counters.record_gc_pass();
                debug!(collected, "Collected stale dedup entries");
            }
            Observation::Fresh { collected: None } => {}
        }

        if inner.noise.is_noise(&event) {
            inner.counters.record_noise();
            trace!(event_type = %event.event_type, "Dropping noise event");
            return None;
        }

        enrich(&mut event, &inner.settings);
        inner.counters.record_normalized();
        Some(event)
    }

    /// Normalize a sequence, preserving order and omitting drops
    pub fn normalize_many<I>(&self, events: I) -> Vec<Event>
    where
        I: IntoIterator<Item = Event>,
    {
        events
            .into_iter()
            .filter_map(|event| self.normalize(event))
            .collect()
    }

    /// Normalize `event` and add it to the pending batch.
    ///
    /// Reaching `batch_size` flushes to `sink` before returning and cancels the
    /// pending timer. Otherwise the first pending event schedules a single
    /// timer that flushes to the `sink` it was scheduled with.
    pub async fn add_to_batch(&self, event: Event, sink: &Arc<dyn BatchSink>) {
        let Some(event) = self.normalize(event) else {
            return;
        };

        let ready = {
            let mut state = self.inner.state.lock();
            state.batch.push(event);
            if state.batch.len() >= self.inner.settings.batch_size {
                state.cancel_timer();
                Some(std::mem::take(&mut state.batch))
            } else {
                if state.timer.is_none() {
                    self.schedule_timer(&mut state, Arc::clone(sink));
                }
                None
            }
        };

        if let Some(batch) = ready {
            self.inner.deliver(batch, sink.as_ref(), "size").await;
        }
    }

    /// Hand any pending events to `sink` now. Returns the number flushed.
    pub async fn flush(&self, sink: &dyn BatchSink) -> usize {
        let batch = {
            let mut state = self.inner.state.lock();
            state.cancel_timer();
            std::mem::take(&mut state.batch)
        };
        let count = batch.len();
        if count > 0 {
            self.inner.deliver(batch, sink, "explicit").await;
        }
        count
    }

    /// Cancel the timer and forget the dedup table and pending batch.
    /// Pending events are discarded, not delivered.
    pub fn dispose(&self) {
        let mut state = self.inner.state.lock();
        let cancelled = state.cancel_timer();
        let discarded = state.batch.len();
        state.batch.clear();
        state.dedup.clear();
        debug!(discarded, cancelled_timer = cancelled, "Event normalizer disposed");
    }

    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().batch.len()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.inner.state.lock().timer.is_some()
    }

    pub fn dedup_len(&self) -> usize {
        self.inner.state.lock().dedup.len()
    }

    pub fn metrics(&self) -> NormalizerMetrics {
        self.inner.counters.snapshot()
    }

    fn schedule_timer(&self, state: &mut NormalizerState, sink: Arc<dyn BatchSink>) {
        state.generation += 1;
        let generation = state.generation;
        let delay = self.inner.settings.batch_delay();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let batch = {
                let mut state = inner.state.lock();
                match &state.timer {
                    Some(timer) if timer.generation == generation => {}
                    _ => return,
                }
                state.timer = None;
                std::mem::take(&mut state.batch)
            };
            if !batch.is_empty() {
                inner.deliver(batch, sink.as_ref(), "timer").await;
            }
        });

        trace!(generation, delay_ms = self.inner.settings.batch_delay_ms, "Scheduled batch timer");
        state.timer = Some(PendingTimer { generation, handle });
    }
}

impl Inner {
    async fn deliver(&self, batch: Vec<Event>, sink: &dyn BatchSink, trigger: &'static str) {
        self.counters.record_flush(batch.len());
        debug!(events = batch.len(), trigger, "Flushing event batch");
        sink.flush_batch(batch).await;
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.state.get_mut().cancel_timer();
    }
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self::new(NormalizerSettings::default())
    }
}

impl std::fmt::Debug for EventNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("EventNormalizer")
            .field("pending", &state.batch.len())
            .field("dedup_entries", &state.dedup.len())
            .field("timer", &state.timer.is_some())
            .field("noise", &self.inner.noise)
            .finish()
    }
}

/// `{type}_{timestamp}_{suffix}` with a random alphanumeric suffix
fn generate_id(event_type: &str, timestamp: u64) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{event_type}_{timestamp}_{}", &random[..ID_SUFFIX_LEN])
}

fn enrich(event: &mut Event, settings: &NormalizerSettings) {
    if event.source.is_empty() {
        event.source = settings.default_source.clone();
    }
    event
        .metadata
        .insert(META_NORMALIZED_AT.to_string(), now_millis().into());
    event
        .metadata
        .entry(META_PLATFORM.to_string())
        .or_insert_with(|| std::env::consts::OS.into());
    event
        .metadata
        .entry(META_ENVIRONMENT.to_string())
        .or_insert_with(|| settings.environment.clone().into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::constants::*;
    use pulse_core::events::utils::{cursor_moved, file_created, pointer_moved};
    use pulse_core::EventPayload;

    fn normalizer() -> EventNormalizer {
        EventNormalizer::new(NormalizerSettings {
            dedup_window_ms: 100,
            ..Default::default()
        })
    }

    #[test]
    fn test_assigns_missing_identity() {
        let normalizer = normalizer();
        let event = normalizer
            .normalize(Event::new("custom.signal", EventPayload::Empty))
            .unwrap();

        assert!(event.has_timestamp());
        let prefix = format!("custom.signal_{}_", event.timestamp);
        assert!(event.id.starts_with(&prefix));
        assert_eq!(event.id.len(), prefix.len() + ID_SUFFIX_LEN);
    }

    #[test]
    fn test_keeps_existing_identity() {
        let normalizer = normalizer();
        let event = normalizer
            .normalize(
                file_created("file:///a.ts")
                    .with_id("evt-1")
                    .with_timestamp(1_000)
                    .with_source("watcher"),
            )
            .unwrap();

        assert_eq!(event.id, "evt-1");
        assert_eq!(event.timestamp, 1_000);
        assert_eq!(event.source, "watcher");
    }

    #[test]
    fn test_enriches_metadata() {
        let normalizer = EventNormalizer::new(NormalizerSettings {
            environment: "ci".to_string(),
            default_source: "replay".to_string(),
            ..Default::default()
        });
        let event = normalizer
            .normalize(cursor_moved("file:///a.ts", 1, 2).with_timestamp(5))
            .unwrap();

        assert_eq!(event.source, "replay");
        assert!(event.metadata.contains_key(META_NORMALIZED_AT));
        assert_eq!(event.metadata[META_PLATFORM], std::env::consts::OS);
        assert_eq!(event.metadata[META_ENVIRONMENT], "ci");
    }

    #[test]
    fn test_producer_metadata_wins_over_tags() {
        let normalizer = normalizer();
        let event = normalizer
            .normalize(
                cursor_moved("file:///a.ts", 1, 2)
                    .with_timestamp(5)
                    .with_metadata(META_ENVIRONMENT, "remote"),
            )
            .unwrap();
        assert_eq!(event.metadata[META_ENVIRONMENT], "remote");
    }

    #[test]
    fn test_duplicates_within_window_are_dropped() {
        let normalizer = normalizer();
        let first = cursor_moved("file:///a.ts", 3, 7).with_timestamp(1_000);
        let repeat = cursor_moved("file:///a.ts", 3, 7).with_timestamp(1_050);
        let later = cursor_moved("file:///a.ts", 3, 7).with_timestamp(1_200);
        let elsewhere = cursor_moved("file:///a.ts", 4, 0).with_timestamp(1_050);

        assert!(normalizer.normalize(first).is_some());
        assert!(normalizer.normalize(repeat).is_none());
        assert!(normalizer.normalize(elsewhere).is_some());
        assert!(normalizer.normalize(later).is_some());

        let metrics = normalizer.metrics();
        assert_eq!(metrics.seen, 4);
        assert_eq!(metrics.normalized, 3);
        assert_eq!(metrics.duplicates_dropped, 1);
    }

    #[test]
    fn test_noise_is_dropped_after_dedup_is_recorded() {
        let normalizer = normalizer();
        assert!(normalizer
            .normalize(pointer_moved("file:///a.ts", 1, 1).with_timestamp(10))
            .is_none());
        assert_eq!(normalizer.dedup_len(), 1);
        assert_eq!(normalizer.metrics().noise_dropped, 1);

        assert!(normalizer
            .normalize(pointer_moved("file:///a.ts", 1, 1).with_timestamp(20))
            .is_none());
        assert_eq!(normalizer.metrics().duplicates_dropped, 1);
    }

    #[test]
    fn test_normalize_many_preserves_order() {
        let normalizer = normalizer();
        let events = vec![
            file_created("file:///a.ts").with_timestamp(1),
            file_created("file:///a.ts").with_timestamp(2),
            pointer_moved("file:///a.ts", 0, 0).with_timestamp(3),
            file_created("file:///b.ts").with_timestamp(4),
        ];

        let uris: Vec<String> = normalizer
            .normalize_many(events)
            .iter()
            .filter_map(|event| event.uri().map(str::to_string))
            .collect();
        assert_eq!(uris, vec!["file:///a.ts", "file:///b.ts"]);
    }

    #[test]
    fn test_dedup_gc_counts_passes() {
        let normalizer = EventNormalizer::new(NormalizerSettings {
            dedup_window_ms: 10,
            dedup_gc_threshold: 2,
            ..Default::default()
        });
        normalizer.normalize(file_created("file:///1").with_timestamp(1));
        normalizer.normalize(file_created("file:///2").with_timestamp(2));
        normalizer.normalize(file_created("file:///3").with_timestamp(500));

        assert_eq!(normalizer.dedup_len(), 1);
        assert_eq!(normalizer.metrics().gc_passes, 1);
    }

    #[test]
    fn test_dispose_clears_state() {
        let normalizer = normalizer();
        normalizer.normalize(file_created("file:///a.ts").with_timestamp(1));
        normalizer.dispose();
        assert_eq!(normalizer.dedup_len(), 0);
        // The same key is accepted again once the table is cleared
        assert!(normalizer
            .normalize(file_created("file:///a.ts").with_timestamp(2))
            .is_some());
    }
}
