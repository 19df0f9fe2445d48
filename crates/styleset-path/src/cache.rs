//! Memoized selector expansion.
//!
//! Programs use a small, static set of selector strings, so expansions are
//! cached by the literal input. The cache is unbounded unless a limit is set;
//! once full, new selectors are still expanded but no longer stored.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::expand::expand;
use crate::path::{Path, Selector};

/// Thread-safe cache of selector expansions keyed by the literal selector.
#[derive(Debug, Default)]
pub struct SelectorCache {
    entries: Mutex<HashMap<String, Arc<[Path]>>>,
    limit: Option<usize>,
}

impl SelectorCache {
    /// An unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `limit` selectors (`None` for unbounded).
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            entries: Mutex::default(),
            limit,
        }
    }

    /// Expand one selector string, reusing the cached result when present.
    ///
    /// The same input always returns the same shared slice.
    pub fn expand(&self, selector: &str) -> Arc<[Path]> {
        let mut entries = self.lock();
        if let Some(paths) = entries.get(selector) {
            tracing::trace!(selector, "selector cache hit");
            return Arc::clone(paths);
        }

        let paths: Arc<[Path]> = expand(selector).into();
        if self.limit.map_or(true, |limit| entries.len() < limit) {
            tracing::trace!(selector, paths = paths.len(), "selector cache miss");
            entries.insert(selector.to_string(), Arc::clone(&paths));
        } else {
            tracing::trace!(selector, "selector cache full, not storing");
        }
        paths
    }

    /// Expand every part of a selector and concatenate the results in order.
    pub fn expand_selector(&self, selector: &Selector) -> Vec<Path> {
        selector
            .parts()
            .into_iter()
            .flat_map(|part| self.expand(part).iter().cloned().collect::<Vec<_>>())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every cached expansion.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<[Path]>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn dotted(paths: &[Path]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_repeated_expansion_is_shared() {
        let cache = SelectorCache::new();
        let first = cache.expand("a[b c]");
        let second = cache.expand("a[b c]");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(dotted(&first), vec!["a.b", "a.c"]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keyed_by_literal_input() {
        let cache = SelectorCache::new();
        cache.expand("a b");
        cache.expand("a  b");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_limit_stops_storing() {
        let cache = SelectorCache::with_limit(Some(1));
        cache.expand("a");
        let b1 = cache.expand("b");
        let b2 = cache.expand("b");
        assert_eq!(cache.len(), 1);
        assert!(!Arc::ptr_eq(&b1, &b2));
        assert_eq!(dotted(&b2), vec!["b"]);
    }

    #[test]
    fn test_expand_selector_list() {
        let cache = SelectorCache::new();
        let paths = cache.expand_selector(&Selector::from(["x", "a[b c]", ""]));
        assert_eq!(dotted(&paths), vec!["x", "a.b", "a.c"]);
    }

    #[test]
    fn test_clear() {
        let cache = SelectorCache::new();
        cache.expand("a");
        cache.clear();
        assert!(cache.is_empty());
    }

    proptest! {
        #[test]
        fn shorthand_matches_spelled_out_paths(
            parent in "[a-z]{1,8}",
            children in prop::collection::vec("[a-z]{1,8}", 1..6),
        ) {
            let cache = SelectorCache::new();
            let shorthand = format!("{}[{}]", parent, children.join(" "));
            let spelled: Vec<String> =
                children.iter().map(|c| format!("{parent}.{c}")).collect();

            let first = cache.expand(&shorthand);
            prop_assert_eq!(dotted(&first), spelled.clone());
            let again = cache.expand(&shorthand);
            prop_assert!(Arc::ptr_eq(&first, &again));
            prop_assert_eq!(dotted(&cache.expand(&spelled.join(","))), spelled);
        }
    }
}
