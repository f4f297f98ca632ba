//! Storage trait definitions.

use crate::StorageResult;

/// Trait for key-value storage backends.
///
/// Every runtime exposes one of these: browser local storage, the native
/// shell's secure store, or a session-scoped store that disappears with the
/// host container.
pub trait KeyValueStore: Send + Sync {
    /// Store a value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a value. Returns whether the key existed.
    fn remove(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
