//! The outcome of one rule.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// An immutable `(key, value)` outcome produced by a rule.
///
/// The key matches the producing rule's key. The value is type-erased; the
/// rule that produced it defines its type, and consumers read it back with
/// [`RuleResult::value`].
///
/// # Example
///
/// ```rust
/// use tower_oidc_rules::checker::RuleResult;
///
/// let result = RuleResult::new("state", Some("xyz".to_string()));
/// assert_eq!(result.key(), "state");
/// assert_eq!(
///     result.value::<Option<String>>().and_then(|s| s.as_deref()),
///     Some("xyz")
/// );
/// ```
#[derive(Clone)]
pub struct RuleResult {
    key: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl RuleResult {
    /// Create a result for the given key.
    pub fn new<T: Send + Sync + 'static>(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value: Arc::new(value),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the value if it is of type `T`.
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns the value as `T`, or [`Error::UnexpectedType`].
    pub fn value_or_fail<T: Send + Sync + 'static>(&self) -> Result<&T> {
        self.value::<T>().ok_or_else(|| Error::UnexpectedType {
            key: self.key.clone(),
            expected: std::any::type_name::<T>(),
        })
    }
}

impl fmt::Debug for RuleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleResult")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
