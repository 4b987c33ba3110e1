//! In-process event bus for editor events.
//!
//! Subscribers register an [`EventHandler`] with an [`EventFilter`] and a
//! [`Priority`]. Emitted events are retained in a bounded buffer and
//! delivered to every matching subscriber, highest priority first, one
//! handler at a time. Handler failures are logged and never reach the
//! emitter.
//!
//! ```no_run
//! use pulse_bus::{handler_fn, EventBus, EventFilter, Priority};
//! use pulse_core::events::utils::file_created;
//!
//! # async fn demo() {
//! let bus = EventBus::default();
//! bus.subscribe(
//!     handler_fn("log-created", |event| async move {
//!         println!("created {:?}", event.uri());
//!         Ok(())
//!     }),
//!     EventFilter::for_types(["fs.file.created"]),
//!     Priority::High,
//! );
//! bus.emit(file_created("file:///src/main.rs")).await;
//! # }
//! ```

mod buffer;
mod bus;
pub mod filter;
pub mod handler;
mod metrics;
pub mod priority;
mod query;
mod subscription;


pub use buffer::BufferStats;
pub use bus::EventBus;
pub use filter::{EventFilter, Predicate, TypeFilter};
pub use handler::{handler_fn, EventHandler, FnHandler};
pub use metrics::BusMetrics;
pub use priority::Priority;
pub use query::ReplayReport;
pub use subscription::SubscriptionId;
