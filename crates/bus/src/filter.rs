//! Subscription and query filters

use pulse_core::Event;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// Custom match clause evaluated after the type and source clauses
pub type Predicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Type clause of a filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeFilter {
    /// Match every event type; the subscription is tracked as global
    #[default]
    Any,
    /// Match only the listed types; the subscription is indexed per type
    Only(BTreeSet<String>),
}

impl TypeFilter {
    pub fn allows(&self, event_type: &str) -> bool {
        match self {
            TypeFilter::Any => true,
            TypeFilter::Only(types) => types.contains(event_type),
        }
    }
}

/// Conjunction of a type clause, an optional source clause and an optional
/// predicate. The default filter matches everything.
#[derive(Clone, Default)]
pub struct EventFilter {
    types: TypeFilter,
    sources: Option<BTreeSet<String>>,
    predicate: Option<Predicate>,
}

impl EventFilter {
    /// A filter that matches every event
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter restricted to the given types
    pub fn for_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_types(types)
    }

    /// Restrict to the given types. An empty list keeps `TypeFilter::Any`.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types: BTreeSet<String> = types.into_iter().map(Into::into).collect();
        self.types = if types.is_empty() {
            TypeFilter::Any
        } else {
            TypeFilter::Only(types)
        };
        self
    }

    /// Restrict to events emitted by the given sources
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    /// Add a custom predicate
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn types(&self) -> &TypeFilter {
        &self.types
    }

    /// True when the filter does not constrain the event type
    pub fn is_global(&self) -> bool {
        matches!(self.types, TypeFilter::Any)
    }

    /// Evaluate all clauses. A predicate panic is reported as `Err` with the
    /// panic message so the caller can log it against its own context.
    pub fn evaluate(&self, event: &Event) -> Result<bool, String> {
        if !self.types.allows(&event.event_type) {
            return Ok(false);
        }
        if let Some(sources) = &self.sources {
            if !sources.contains(&event.source) {
                return Ok(false);
            }
        }
        match &self.predicate {
            None => Ok(true),
            Some(predicate) => catch_unwind(AssertUnwindSafe(|| predicate(event)))
                .map_err(|payload| panic_message(payload.as_ref())),
        }
    }

    /// Evaluate all clauses; a panicking predicate counts as a non-match
    pub fn matches(&self, event: &Event) -> bool {
        match self.evaluate(event) {
            Ok(matched) => matched,
            Err(panic) => {
                warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    panic = %panic,
                    "Filter predicate panicked; treating as non-match"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for EventFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventFilter")
            .field("types", &self.types)
            .field("sources", &self.sources)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Best-effort extraction of a panic payload message
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::constants::*;
    use pulse_core::events::utils::{cursor_moved, file_created};

    #[test]
    fn test_default_filter_matches_everything() {
        let filter = EventFilter::all();
        assert!(filter.is_global());
        assert!(filter.matches(&file_created("file:///a.ts")));
        assert!(filter.matches(&cursor_moved("file:///a.ts", 1, 1)));
    }

    #[test]
    fn test_empty_type_list_stays_global() {
        let filter = EventFilter::for_types(Vec::<String>::new());
        assert!(filter.is_global());
    }

    #[test]
    fn test_clauses_are_anded() {
        let filter = EventFilter::for_types([FS_FILE_CREATED])
            .with_sources(["watcher"])
            .with_predicate(|event| event.uri().is_some_and(|uri| uri.ends_with(".ts")));

        let matching = file_created("file:///a.ts").with_source("watcher");
        let wrong_source = file_created("file:///a.ts").with_source("editor");
        let wrong_uri = file_created("file:///a.rs").with_source("watcher");
        let wrong_type = cursor_moved("file:///a.ts", 0, 0).with_source("watcher");

        assert!(filter.matches(&matching));
        assert!(!filter.matches(&wrong_source));
        assert!(!filter.matches(&wrong_uri));
        assert!(!filter.matches(&wrong_type));
    }

    #[test]
    fn test_panicking_predicate_fails_closed() {
        let filter = EventFilter::all().with_predicate(|_| panic!("predicate exploded"));
        let event = file_created("file:///a.ts");

        let outcome = filter.evaluate(&event);
        assert_eq!(outcome, Err("predicate exploded".to_string()));
        assert!(!filter.matches(&event));
    }
}
