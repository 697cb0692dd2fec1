//! Ordered collection of rule results.

use std::collections::HashMap;

use super::result::RuleResult;
use crate::error::{Error, Result};

/// Results accumulated during one validation session, keyed by rule key.
///
/// Iteration follows insertion order. Adding a result under a key that is
/// already present replaces the stored result in place, so the key keeps
/// its original position.
#[derive(Debug, Clone, Default)]
pub struct ResultBag {
    results: Vec<RuleResult>,
    index: HashMap<String, usize>,
}

impl ResultBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result, overwriting any result stored under the same key.
    pub fn add(&mut self, result: RuleResult) {
        match self.index.get(result.key()) {
            Some(&position) => self.results[position] = result,
            None => {
                self.index
                    .insert(result.key().to_string(), self.results.len());
                self.results.push(result);
            }
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Look up a result. `None` means no rule produced a result for `key`.
    pub fn get(&self, key: &str) -> Option<&RuleResult> {
        self.index.get(key).map(|&position| &self.results[position])
    }

    /// Look up a result that an earlier rule is required to have produced.
    ///
    /// A missing result here is a wiring defect, reported as
    /// [`Error::ResultNotSet`] rather than a protocol error.
    pub fn get_or_fail(&self, key: &str) -> Result<&RuleResult> {
        self.get(key)
            .ok_or_else(|| Error::ResultNotSet(key.to_string()))
    }

    /// Remove and return a result.
    pub fn remove(&mut self, key: &str) -> Option<RuleResult> {
        let position = self.index.remove(key)?;
        let removed = self.results.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(RuleResult::key)
    }

    /// Results in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, RuleResult> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a ResultBag {
    type Item = &'a RuleResult;
    type IntoIter = std::slice::Iter<'a, RuleResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut bag = ResultBag::new();
        assert!(bag.is_empty());

        bag.add(RuleResult::new("client_id", "abc".to_string()));
        assert!(bag.has("client_id"));
        assert_eq!(
            bag.get("client_id")
                .and_then(|r| r.value::<String>())
                .map(String::as_str),
            Some("abc")
        );
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_absent_differs_from_empty_value() {
        let mut bag = ResultBag::new();
        bag.add(RuleResult::new("state", None::<String>));
        bag.add(RuleResult::new("nonce", String::new()));

        assert!(bag.get("missing").is_none());
        assert!(!bag.has("missing"));

        let state = bag.get("state").unwrap();
        assert_eq!(state.value::<Option<String>>(), Some(&None));
        let nonce = bag.get("nonce").unwrap();
        assert_eq!(nonce.value::<String>().map(String::as_str), Some(""));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut bag = ResultBag::new();
        bag.add(RuleResult::new("a", 1u8));
        bag.add(RuleResult::new("b", 2u8));
        bag.add(RuleResult::new("a", 3u8));

        assert_eq!(bag.len(), 2);
        assert_eq!(bag.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(bag.get("a").and_then(|r| r.value::<u8>()), Some(&3));
    }

    #[test]
    fn test_iteration_is_ordered_and_restartable() {
        let mut bag = ResultBag::new();
        for key in ["c", "a", "b"] {
            bag.add(RuleResult::new(key, ()));
        }

        let first: Vec<&str> = bag.iter().map(|r| r.key()).collect();
        let second: Vec<&str> = (&bag).into_iter().map(|r| r.key()).collect();
        assert_eq!(first, vec!["c", "a", "b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_get_or_fail() {
        let bag = ResultBag::new();
        let err = bag.get_or_fail("client_id").unwrap_err();
        assert!(matches!(err, Error::ResultNotSet(ref key) if key == "client_id"));
    }

    #[test]
    fn test_remove_reindexes() {
        let mut bag = ResultBag::new();
        for key in ["a", "b", "c"] {
            bag.add(RuleResult::new(key, ()));
        }

        assert!(bag.remove("a").is_some());
        assert!(bag.remove("a").is_none());
        assert!(bag.has("c"));
        assert_eq!(bag.get("c").map(|r| r.key()), Some("c"));
        assert_eq!(bag.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
