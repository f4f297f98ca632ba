//! Persistent storage that degrades to a session-scoped store.

use crate::{KeyValueStore, StorageResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Wraps a persistent store and switches to a session-scoped fallback the
/// first time the persistent store fails.
///
/// Once degraded the store stays degraded for the rest of the process: the
/// host gave no persistence guarantee, so values written after the switch
/// live only in the fallback.
pub struct FallbackStore {
    primary: Arc<dyn KeyValueStore>,
    fallback: Arc<dyn KeyValueStore>,
    degraded: AtomicBool,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn KeyValueStore>, fallback: Arc<dyn KeyValueStore>) -> Self {
        Self {
            primary,
            fallback,
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether reads and writes now go to the session-scoped fallback.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    fn degrade(&self, operation: &str, error: &dyn std::fmt::Display) {
        if !self.degraded.swap(true, Ordering::AcqRel) {
            warn!(
                operation,
                error = %error,
                "Persistent storage unavailable, continuing with session-scoped storage"
            );
        }
    }
}

impl KeyValueStore for FallbackStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if !self.is_degraded() {
            match self.primary.set(key, value) {
                Ok(()) => return Ok(()),
                Err(e) => self.degrade("set", &e),
            }
        }
        self.fallback.set(key, value)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if !self.is_degraded() {
            match self.primary.get(key) {
                Ok(value) => return Ok(value),
                Err(e) => self.degrade("get", &e),
            }
        }
        self.fallback.get(key)
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        if !self.is_degraded() {
            match self.primary.remove(key) {
                Ok(existed) => return Ok(existed),
                Err(e) => self.degrade("remove", &e),
            }
        }
        self.fallback.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StorageError};

    /// Store that rejects every operation, like storage disabled by the host.
    struct DisabledStore;

    impl KeyValueStore for DisabledStore {
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("blocked".to_string()))
        }

        fn remove(&self, _key: &str) -> StorageResult<bool> {
            Err(StorageError::Unavailable("blocked".to_string()))
        }
    }

    #[test]
    fn test_uses_primary_when_healthy() {
        let primary = Arc::new(MemoryStore::new());
        let fallback = Arc::new(MemoryStore::new());
        let store = FallbackStore::new(primary.clone(), fallback.clone());

        store.set("k", "v").unwrap();
        assert_eq!(primary.get("k").unwrap(), Some("v".to_string()));
        assert!(fallback.is_empty());
        assert!(!store.is_degraded());
    }

    #[test]
    fn test_degrades_to_session_scope_on_failure() {
        let fallback = Arc::new(MemoryStore::new());
        let store = FallbackStore::new(Arc::new(DisabledStore), fallback.clone());

        store.set("k", "v").unwrap();
        assert!(store.is_degraded());
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        assert_eq!(fallback.get("k").unwrap(), Some("v".to_string()));
        assert!(store.remove("k").unwrap());
    }
}
