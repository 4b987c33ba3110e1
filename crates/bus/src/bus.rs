//! The event bus: subscription registry, retention buffer and dispatch loop

use crate::buffer::RetentionBuffer;
use crate::filter::{panic_message, EventFilter};
use crate::handler::EventHandler;
use crate::metrics::{BusCounters, BusMetrics};
use crate::priority::Priority;
use crate::subscription::{Subscription, SubscriptionId, SubscriptionRegistry};
use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use pulse_config::BusSettings;
use pulse_core::{BatchSink, Event};
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, trace, warn};

static NEXT_BUS_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    /// Instance ids of every bus whose dispatch loop encloses the current task
    static DISPATCH_SCOPE: Vec<u64>;
}

/// In-memory pub/sub router with priority-ordered delivery.
///
/// Events are appended to a bounded retention buffer and pushed onto a single
/// FIFO queue. Whichever `emit` call finds the bus idle becomes the dispatch
/// loop and drains the queue; concurrent callers wait for a completion marker
/// attached to their last event, so every `emit` resolves only after its own
/// events have been delivered. Handlers emitting back into the same bus do not
/// wait; their events are delivered once the current handler chain finishes.
/// If the caller running the loop is cancelled, the earliest waiting caller
/// takes the loop over.
pub struct EventBus {
    instance: u64,
    settings: BusSettings,
    pub(crate) state: Mutex<BusState>,
    pub(crate) counters: BusCounters,
}

pub(crate) struct BusState {
    pub(crate) registry: SubscriptionRegistry,
    pub(crate) buffer: RetentionBuffer,
    queue: VecDeque<QueuedEvent>,
    processing: bool,
}

struct QueuedEvent {
    event: Arc<Event>,
    /// Signalled once this event has been dispatched; set on the last event
    /// of each `emit_batch` call
    done: Option<oneshot::Sender<Completion>>,
}

/// What a waiting `emit` caller is told through its completion marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    /// The caller's events have been dispatched
    Dispatched,
    /// The loop draining the queue was cancelled; the caller now owns it
    TakeOver,
}

/// Hands the queue to a waiting caller if the dispatch loop future is
/// dropped before the queue drains
struct ProcessingGuard<'a> {
    bus: &'a EventBus,
    armed: bool,
}

impl ProcessingGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Dispatch loop cancelled before the queue drained");
        self.bus.hand_over_queue();
    }
}

/// An `emit` caller parked on its completion marker
struct Waiter<'a> {
    bus: &'a EventBus,
    done: oneshot::Receiver<Completion>,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        // Cancelled after inheriting the loop but before running it
        if let Ok(Completion::TakeOver) = self.done.try_recv() {
            self.bus.hand_over_queue();
        }
    }
}

impl EventBus {
    pub fn new(settings: BusSettings) -> Self {
        let buffer = RetentionBuffer::new(settings.max_buffer_size);
        Self {
            instance: NEXT_BUS_ID.fetch_add(1, Ordering::Relaxed),
            settings,
            state: Mutex::new(BusState {
                registry: SubscriptionRegistry::default(),
                buffer,
                queue: VecDeque::new(),
                processing: false,
            }),
            counters: BusCounters::default(),
        }
    }

    /// Create a bus retaining at most `max_buffer_size` events
    pub fn with_max_buffer_size(max_buffer_size: usize) -> Self {
        Self::new(BusSettings { max_buffer_size })
    }

    pub fn settings(&self) -> &BusSettings {
        &self.settings
    }

    /// Register a handler. Filters are fixed for the lifetime of the
    /// subscription.
    pub fn subscribe<H>(&self, handler: H, filter: EventFilter, priority: Priority) -> SubscriptionId
    where
        H: EventHandler + 'static,
    {
        let handler: Arc<dyn EventHandler> = Arc::new(handler);
        let name = handler.name().to_string();
        let global = filter.is_global();
        let id = self.state.lock().registry.insert(handler, filter, priority);
        debug!(
            subscription_id = %id,
            handler = %name,
            priority = %priority,
            global,
            "Subscribed event handler"
        );
        id
    }

    /// Remove a subscription; false if it did not exist. An event already
    /// being dispatched is still delivered to it.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.state.lock().registry.remove(id);
        match removed {
            Some(subscription) => {
                debug!(
                    subscription_id = %id,
                    handler = %subscription.handler.name(),
                    "Unsubscribed event handler"
                );
                true
            }
            None => false,
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    /// Emit a single event
    pub async fn emit(&self, event: Event) {
        self.emit_batch(vec![event]).await;
    }

    /// Emit events in order. Resolves once they have all been dispatched,
    /// except when called from a handler of this bus.
    pub async fn emit_batch(&self, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }

        let count = events.len();
        let events: Vec<Arc<Event>> = events.into_iter().map(Arc::new).collect();
        let (done_tx, done_rx) = oneshot::channel();
        let starts_loop = {
            let mut state = self.state.lock();
            let evicted = state.buffer.extend(events.iter().cloned());
            self.counters.record_evicted(evicted);

            let mut done_tx = Some(done_tx);
            let last = count - 1;
            for (index, event) in events.into_iter().enumerate() {
                let done = if index == last { done_tx.take() } else { None };
                state.queue.push_back(QueuedEvent { event, done });
            }

            let idle = !state.processing;
            state.processing = true;
            idle
        };
        self.counters.record_emitted(count);

        if starts_loop {
            // Must not be picked as heir if this loop is cancelled
            drop(done_rx);
            self.run_dispatch_loop().await;
        } else if self.in_dispatch_scope() {
            trace!(count, "Re-entrant emit queued behind the running dispatch loop");
        } else {
            let mut waiter = Waiter {
                bus: self,
                done: done_rx,
            };
            match (&mut waiter.done).await {
                Ok(Completion::TakeOver) => {
                    debug!(count, "Taking over the dispatch loop from a cancelled caller");
                    self.run_dispatch_loop().await;
                }
                // A dropped sender means the bus was disposed
                Ok(Completion::Dispatched) | Err(_) => {}
            }
        }
    }

    /// Drop every subscription, retained event and queued event. A running
    /// dispatch loop finishes the event in hand, then finds the queue empty
    /// and exits.
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        let queued = state.queue.len();
        state.registry.clear();
        state.buffer.clear();
        state.queue.clear();
        debug!(dropped_queued = queued, "Event bus disposed");
    }

    pub fn metrics(&self) -> BusMetrics {
        self.counters.snapshot()
    }

    /// Pass ownership of the dispatch loop to the earliest caller still
    /// waiting on a marker. `processing` stays set while ownership moves, so
    /// no new caller starts a second loop in between.
    fn hand_over_queue(&self) {
        let mut state = self.state.lock();
        let pending = state.queue.len();
        let handed_over = state
            .queue
            .iter_mut()
            .filter_map(|queued| queued.done.take())
            .any(|done| done.send(Completion::TakeOver).is_ok());
        if handed_over {
            debug!(pending, "Handed the dispatch loop to a waiting caller");
        } else {
            state.processing = false;
            if pending > 0 {
                warn!(
                    pending,
                    "No caller left to take over the dispatch loop; queue resumes on the next emit"
                );
            }
        }
    }

    fn in_dispatch_scope(&self) -> bool {
        DISPATCH_SCOPE
            .try_with(|scope| scope.contains(&self.instance))
            .unwrap_or(false)
    }

    async fn run_dispatch_loop(&self) {
        let mut guard = ProcessingGuard {
            bus: self,
            armed: true,
        };
        let mut scope = DISPATCH_SCOPE
            .try_with(|ids| ids.clone())
            .unwrap_or_default();
        scope.push(self.instance);

        trace!("Dispatch loop started");
        let drained = DISPATCH_SCOPE
            .scope(scope, async {
                let mut drained = 0usize;
                loop {
                    let next = {
                        let mut state = self.state.lock();
                        match state.queue.pop_front() {
                            Some(queued) => queued,
                            None => {
                                state.processing = false;
                                break;
                            }
                        }
                    };

                    self.dispatch_event(&next.event).await;
                    drained += 1;
                    if let Some(done) = next.done {
                        let _ = done.send(Completion::Dispatched);
                    }
                }
                drained
            })
            .await;

        guard.disarm();
        trace!(drained, "Dispatch loop idle");
    }

    async fn dispatch_event(&self, event: &Arc<Event>) {
        self.counters.record_dispatched();
        let candidates = self.state.lock().registry.candidates(&event.event_type);

        let mut matched: Vec<Arc<Subscription>> = candidates
            .into_iter()
            .filter(|subscription| match subscription.filter.evaluate(event) {
                Ok(matched) => matched,
                Err(panic) => {
                    self.counters.record_predicate_failure();
                    warn!(
                        subscription_id = %subscription.id,
                        event_id = %event.id,
                        event_type = %event.event_type,
                        panic = %panic,
                        "Subscription filter panicked; skipping subscriber"
                    );
                    false
                }
            })
            .collect();
        // Stable: equal priorities keep subscribe order
        matched.sort_by(|a, b| b.priority.cmp(&a.priority));

        // Everything matched here receives this event, even if a handler
        // unsubscribes it or disposes the bus meanwhile.
        for subscription in matched {
            self.deliver(&subscription, event).await;
        }
    }

    async fn deliver(&self, subscription: &Subscription, event: &Arc<Event>) {
        let outcome = AssertUnwindSafe(subscription.handler.handle(Arc::clone(event)))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => self.counters.record_delivery(),
            Ok(Err(e)) => {
                self.counters.record_handler_failure();
                error!(
                    subscription_id = %subscription.id,
                    handler = %subscription.handler.name(),
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    "Event handler failed"
                );
            }
            Err(panic) => {
                self.counters.record_handler_failure();
                error!(
                    subscription_id = %subscription.id,
                    handler = %subscription.handler.name(),
                    event_id = %event.id,
                    event_type = %event.event_type,
                    panic = %panic_message(panic.as_ref()),
                    "Event handler panicked"
                );
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusSettings::default())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventBus")
            .field("instance", &self.instance)
            .field("max_buffer_size", &self.settings.max_buffer_size)
            .field("subscriptions", &state.registry.len())
            .field("buffered", &state.buffer.len())
            .field("queued", &state.queue.len())
            .field("processing", &state.processing)
            .finish()
    }
}

#[async_trait]
impl BatchSink for EventBus {
    async fn flush_batch(&self, events: Vec<Event>) {
        self.emit_batch(events).await;
    }
}
