//! Ephemeral session store
//!
//! Workflow steps stash their outputs here and guards read them back.
//! The store lives exactly as long as the session that owns it; nothing
//! is persisted. Callers receive an explicit handle rather than reading
//! ambient state, so tests can inject isolated stores.

use std::collections::{BTreeMap, HashMap};

/// Key/value storage scoped to a single session.
///
/// Reads observe the most recent write within the session. There is one
/// logical writer at a time; operations are synchronous and complete
/// before the next event is handled.
pub trait SessionStore {
    /// Get a value by key
    fn get(&self, key: &str) -> Option<&str>;

    /// Set a value, overwriting any previous one
    fn set(&mut self, key: &str, value: &str);

    /// Remove a key
    fn remove(&mut self, key: &str);

    /// Remove every key
    fn clear(&mut self);

    /// Ordered snapshot of the current contents
    fn snapshot(&self) -> BTreeMap<String, String>;

    /// Whether a key is present with a non-empty value.
    ///
    /// Guards treat a blank value the same as an absent key, matching how
    /// an empty form field never reaches the store in the first place.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

/// In-memory session store.
///
/// The process plays the role of the browser tab: one session per run,
/// gone when the run ends.
#[derive(Debug, Default)]
pub struct InMemorySession {
    values: HashMap<String, String>,
}

impl InMemorySession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySession {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut store = InMemorySession::new();
        assert_eq!(store.get("email"), None);

        store.set("email", "a@b.com");
        assert_eq!(store.get("email"), Some("a@b.com"));
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = InMemorySession::new();
        store.set("email", "a@b.com");
        store.set("email", "c@d.com");
        assert_eq!(store.get("email"), Some("c@d.com"));
    }

    #[test]
    fn test_remove_makes_key_absent() {
        let mut store = InMemorySession::new();
        store.set("code", "123456");
        store.remove("code");
        assert_eq!(store.get("code"), None);
        assert!(!store.contains("code"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut store = InMemorySession::new();
        store.set("email", "a@b.com");
        store.set("code", "123456");
        store.clear();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_blank_value_is_not_present() {
        let mut store = InMemorySession::new();
        store.set("email", "");
        assert_eq!(store.get("email"), Some(""));
        assert!(!store.contains("email"));
    }

    #[test]
    fn test_snapshot_is_ordered_copy() {
        let mut store = InMemorySession::new();
        store.set("b", "2");
        store.set("a", "1");

        let snap = store.snapshot();
        let keys: Vec<_> = snap.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);

        // Mutations after the snapshot don't leak into it
        store.set("a", "changed");
        assert_eq!(snap["a"], "1");
    }
}
