//! Handle-keyed object store.
//!
//! Each engine kind gets its own `Registry`, so handles are unique within a
//! kind but independent across kinds.  Values are shared immutably as
//! `Arc<T>`; re-adding under an existing handle replaces the stored value.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A thread-safe map from string handles to shared, immutable values.
#[derive(Debug)]
pub struct Registry<T> {
    entries: Mutex<HashMap<String, Arc<T>>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store `value` under `handle`, replacing any previous entry.
    pub fn add(&self, handle: impl Into<String>, value: T) {
        self.lock().insert(handle.into(), Arc::new(value));
    }

    /// Look up the value stored under `handle`.
    pub fn get(&self, handle: &str) -> Option<Arc<T>> {
        self.lock().get(handle).cloned()
    }

    /// Return `true` if `handle` is registered.
    pub fn contains(&self, handle: &str) -> bool {
        self.lock().contains_key(handle)
    }

    /// Return all registered handles (unordered).
    pub fn handles(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Return `true` if the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove every entry.
    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<T>>> {
        // A poisoned lock only means another thread panicked mid-read; the
        // map itself is never left in a torn state.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get() {
        let reg: Registry<i32> = Registry::new();
        reg.add("a", 1);
        assert_eq!(*reg.get("a").unwrap(), 1);
        assert!(reg.get("b").is_none());
    }

    #[test]
    fn add_overwrites() {
        let reg: Registry<i32> = Registry::new();
        reg.add("a", 1);
        reg.add("a", 2);
        assert_eq!(*reg.get("a").unwrap(), 2);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn reset_clears() {
        let reg: Registry<i32> = Registry::new();
        reg.add("a", 1);
        reg.add("b", 2);
        reg.reset();
        assert!(reg.is_empty());
        assert!(reg.handles().is_empty());
    }

    #[test]
    fn handles_lists_all() {
        let reg: Registry<&str> = Registry::new();
        reg.add("x", "one");
        reg.add("y", "two");
        let mut hs = reg.handles();
        hs.sort();
        assert_eq!(hs, vec!["x", "y"]);
    }
}
