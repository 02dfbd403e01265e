//! URL-keyed cache of fully built rule lists.
//!
//! The rules of a sheet carry the cascade priority of the call that built
//! them, so an entry is found only by a call with the same priority. Each
//! entry also remembers every URL its imports pulled in: a sheet reused
//! inside an import chain that runs through one of those URLs would have
//! been cut differently, so the pipeline bypasses such entries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::model::{Priority, RuleList};

type Entries = HashMap<(String, Priority), CachedSheet>;

/// The cached result of one stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedSheet {
    /// The rules, imports expanded.
    pub rules: Arc<RuleList>,
    /// Every URL the expansion fetched or took from the cache, sorted.
    pub imports: Vec<String>,
}

impl CachedSheet {
    /// Wrap `rules` that pulled in `imports`.
    #[must_use]
    pub fn new(rules: Arc<RuleList>, mut imports: Vec<String>) -> Self {
        imports.sort_unstable();
        imports.dedup();
        Self { rules, imports }
    }

    /// Whether `url` was pulled in by this sheet's imports.
    #[must_use]
    pub fn imports(&self, url: &str) -> bool {
        self.imports
            .binary_search_by(|import| import.as_str().cmp(url))
            .is_ok()
    }
}

/// Rule lists of stylesheets fetched by URL, keyed by the absolute URL and
/// the [`Priority`] the rules were built with.
///
/// Disabled by default: lookups miss and inserts are ignored until
/// [`set_enabled(true)`](Self::set_enabled). Entries are shared read-only;
/// concurrent parses of the same URL may both miss and both insert, in
/// which case the last one wins.
///
/// Entries depend on the factory, preparator and import policy of the
/// parser that built them; share a cache only between parsers configured
/// alike. The key does not include the encoding the sheet was decoded with.
#[derive(Debug, Default)]
pub struct RuleCache {
    enabled: AtomicBool,
    entries: Mutex<Entries>,
}

impl RuleCache {
    /// Create an empty, disabled cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn caching on or off. Existing entries are kept.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Whether lookups and inserts are in effect.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Look up the sheet at `url` built with `priority`. Always misses
    /// while disabled.
    #[must_use]
    pub fn get(&self, url: &str, priority: Priority) -> Option<CachedSheet> {
        if !self.is_enabled() {
            return None;
        }
        self.entries().get(&(url.to_string(), priority)).cloned()
    }

    /// Store the sheet at `url` built with `priority`. Ignored while
    /// disabled.
    pub fn insert(&self, url: impl Into<String>, priority: Priority, sheet: CachedSheet) {
        if self.is_enabled() {
            let _ = self.entries().insert((url.into(), priority), sheet);
        }
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        // Entries are replaced whole; a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Origin;

    fn empty() -> CachedSheet {
        CachedSheet::new(Arc::new(Vec::new()), Vec::new())
    }

    #[test]
    fn disabled_cache_neither_stores_nor_serves() {
        let author = Priority::new(Origin::Author);
        let cache = RuleCache::new();
        cache.insert("http://a/", author, empty());
        assert!(cache.is_empty());

        cache.set_enabled(true);
        cache.insert("http://a/", author, empty());
        assert_eq!(cache.len(), 1);

        cache.set_enabled(false);
        assert!(cache.get("http://a/", author).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn entries_are_separated_by_priority() {
        let cache = RuleCache::new();
        cache.set_enabled(true);
        cache.insert("http://a/", Priority::new(Origin::UserAgent), empty());

        assert!(cache.get("http://a/", Priority::new(Origin::UserAgent)).is_some());
        assert!(cache.get("http://a/", Priority::new(Origin::Author)).is_none());
    }

    #[test]
    fn imports_are_sorted_and_searchable() {
        let sheet = CachedSheet::new(
            Arc::new(Vec::new()),
            vec!["http://t/c.css".into(), "http://t/b.css".into(), "http://t/c.css".into()],
        );
        assert_eq!(sheet.imports, vec!["http://t/b.css", "http://t/c.css"]);
        assert!(sheet.imports("http://t/b.css"));
        assert!(!sheet.imports("http://t/a.css"));
    }
}
