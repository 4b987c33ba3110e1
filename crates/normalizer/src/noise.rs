//! Noise policy: event types that are never worth delivering

use pulse_config::NormalizerSettings;
use pulse_core::constants::EDITOR_POINTER_MOVED;
use pulse_core::Event;
use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

pub type NoisePredicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Decides which normalized events are dropped as noise
#[derive(Clone)]
pub struct NoisePolicy {
    types: BTreeSet<String>,
    predicate: Option<NoisePredicate>,
}

impl NoisePolicy {
    /// A policy that keeps everything
    pub fn none() -> Self {
        Self {
            types: BTreeSet::new(),
            predicate: None,
        }
    }

    pub fn from_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            predicate: None,
        }
    }

    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.types.insert(event_type.into());
        self
    }

    /// Also drop events for which `predicate` returns true
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    /// A panicking predicate keeps the event
    pub fn is_noise(&self, event: &Event) -> bool {
        if self.types.contains(&event.event_type) {
            return true;
        }
        let Some(predicate) = &self.predicate else {
            return false;
        };
        match catch_unwind(AssertUnwindSafe(|| predicate(event))) {
            Ok(noise) => noise,
            Err(_) => {
                warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Noise predicate panicked; keeping event"
                );
                false
            }
        }
    }
}

impl Default for NoisePolicy {
    fn default() -> Self {
        Self::from_types([EDITOR_POINTER_MOVED])
    }
}

impl From<&NormalizerSettings> for NoisePolicy {
    fn from(settings: &NormalizerSettings) -> Self {
        Self::from_types(settings.noise_types.iter().cloned())
    }
}

impl std::fmt::Debug for NoisePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoisePolicy")
            .field("types", &self.types)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::events::utils::{cursor_moved, document_changed, pointer_moved};

    #[test]
    fn test_default_drops_pointer_moves() {
        let policy = NoisePolicy::default();
        assert!(policy.is_noise(&pointer_moved("file:///a.ts", 1, 1)));
        assert!(!policy.is_noise(&cursor_moved("file:///a.ts", 1, 1)));
    }

    #[test]
    fn test_policy_follows_settings() {
        let settings = NormalizerSettings {
            noise_types: vec!["editor.cursor.moved".to_string()],
            ..Default::default()
        };
        let policy = NoisePolicy::from(&settings);
        assert!(policy.is_noise(&cursor_moved("file:///a.ts", 1, 1)));
        assert!(!policy.is_noise(&pointer_moved("file:///a.ts", 1, 1)));
    }

    #[test]
    fn test_predicate_and_panics() {
        let policy = NoisePolicy::none()
            .with_predicate(|event| event.uri().is_some_and(|uri| uri.contains("/node_modules/")));
        assert!(policy.is_noise(&document_changed("file:///app/node_modules/x.js", 1)));
        assert!(!policy.is_noise(&document_changed("file:///app/src/x.js", 1)));

        let exploding = NoisePolicy::none().with_predicate(|_| panic!("noise predicate"));
        assert!(!exploding.is_noise(&document_changed("file:///app/src/x.js", 1)));
    }
}
