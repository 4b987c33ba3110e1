//! Event handler trait and closure adapter

use async_trait::async_trait;
use pulse_core::{Event, HandlerError};
use std::future::Future;
use std::sync::Arc;

/// Trait for event subscribers
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an event. Errors are logged by the bus and never reach the emitter.
    async fn handle(&self, event: Arc<Event>) -> Result<(), HandlerError>;

    /// Handler name for debugging
    fn name(&self) -> &str {
        "anonymous"
    }
}

#[async_trait]
impl<T: EventHandler + ?Sized> EventHandler for Arc<T> {
    async fn handle(&self, event: Arc<Event>) -> Result<(), HandlerError> {
        (**self).handle(event).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Handler backed by an async closure
pub struct FnHandler<F> {
    name: String,
    f: F,
}

/// Wrap an async closure as a named [`EventHandler`]
pub fn handler_fn<F, Fut>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: Fn(Arc<Event>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    FnHandler {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Arc<Event>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    async fn handle(&self, event: Arc<Event>) -> Result<(), HandlerError> {
        (self.f)(event).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
