//! Auxiliary data shared by all rules within one check session.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A string-keyed map of arbitrary values available to every rule.
///
/// Holds state that is not itself a validation result, such as flags or
/// configuration overrides (the default scope, the scope delimiter). Rules
/// receive it mutably, so one rule can leave data for a later one.
#[derive(Clone, Default)]
pub struct RuleData {
    map: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl RuleData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any value stored under the same key.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.map.insert(key.into(), Arc::new(value));
    }

    /// Get a value if it exists and is of type `T`.
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<&T> {
        self.map.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.map.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for RuleData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleData")
            .field("keys", &self.map.keys().collect::<Vec<_>>())
            .finish()
    }
}
