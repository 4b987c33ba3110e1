//! Subscription registry with per-type and global indexes

use crate::filter::{EventFilter, TypeFilter};
use crate::handler::EventHandler;
use crate::priority::Priority;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Unique, monotonically assigned subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A registered `(handler, filter, priority)` tuple
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) filter: EventFilter,
    pub(crate) handler: Arc<dyn EventHandler>,
    pub(crate) priority: Priority,
}

#[derive(Default)]
pub(crate) struct SubscriptionRegistry {
    /// Last id handed out; never rewound, even by `clear`
    last_id: u64,
    subscriptions: HashMap<SubscriptionId, Arc<Subscription>>,
    by_type: HashMap<String, BTreeSet<SubscriptionId>>,
    global: BTreeSet<SubscriptionId>,
}

impl SubscriptionRegistry {
    pub(crate) fn insert(
        &mut self,
        handler: Arc<dyn EventHandler>,
        filter: EventFilter,
        priority: Priority,
    ) -> SubscriptionId {
        self.last_id += 1;
        let id = SubscriptionId(self.last_id);

        match filter.types() {
            TypeFilter::Any => {
                self.global.insert(id);
            }
            TypeFilter::Only(types) => {
                for event_type in types {
                    self.by_type.entry(event_type.clone()).or_default().insert(id);
                }
            }
        }

        self.subscriptions.insert(
            id,
            Arc::new(Subscription {
                id,
                filter,
                handler,
                priority,
            }),
        );
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> Option<Arc<Subscription>> {
        let subscription = self.subscriptions.remove(&id)?;
        match subscription.filter.types() {
            TypeFilter::Any => {
                self.global.remove(&id);
            }
            TypeFilter::Only(types) => {
                for event_type in types {
                    if let Some(ids) = self.by_type.get_mut(event_type) {
                        ids.remove(&id);
                        if ids.is_empty() {
                            self.by_type.remove(event_type);
                        }
                    }
                }
            }
        }
        Some(subscription)
    }

    pub(crate) fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Global subscriptions plus those indexed under `event_type`, in
    /// subscribe order
    pub(crate) fn candidates(&self, event_type: &str) -> Vec<Arc<Subscription>> {
        let mut ids: BTreeSet<SubscriptionId> = self.global.clone();
        if let Some(typed) = self.by_type.get(event_type) {
            ids.extend(typed.iter().copied());
        }
        ids.iter()
            .filter_map(|id| self.subscriptions.get(id).cloned())
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.subscriptions.clear();
        self.by_type.clear();
        self.global.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;

    fn noop() -> Arc<dyn EventHandler> {
        Arc::new(handler_fn("noop", |_event| async { Ok(()) }))
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut registry = SubscriptionRegistry::default();
        let first = registry.insert(noop(), EventFilter::all(), Priority::Normal);
        let second = registry.insert(noop(), EventFilter::all(), Priority::Normal);
        assert!(second > first);

        assert!(registry.remove(second).is_some());
        registry.clear();
        let third = registry.insert(noop(), EventFilter::all(), Priority::Normal);
        assert!(third > second);
    }

    #[test]
    fn test_candidates_union_global_and_typed() {
        let mut registry = SubscriptionRegistry::default();
        let global = registry.insert(noop(), EventFilter::all(), Priority::Low);
        let created = registry.insert(
            noop(),
            EventFilter::for_types(["fs.file.created", "fs.file.changed"]),
            Priority::High,
        );
        let deleted = registry.insert(noop(), EventFilter::for_types(["fs.file.deleted"]), Priority::High);

        let ids: Vec<_> = registry
            .candidates("fs.file.created")
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![global, created]);

        let ids: Vec<_> = registry
            .candidates("fs.file.deleted")
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![global, deleted]);
    }

    #[test]
    fn test_remove_cleans_every_index() {
        let mut registry = SubscriptionRegistry::default();
        let id = registry.insert(
            noop(),
            EventFilter::for_types(["a", "b"]),
            Priority::Normal,
        );
        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert!(registry.candidates("a").is_empty());
        assert!(registry.candidates("b").is_empty());
        assert!(registry.by_type.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
