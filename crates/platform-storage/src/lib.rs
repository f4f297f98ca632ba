//! Key-value storage abstraction for the auth layer.
//!
//! This crate provides the storage seam every runtime adapter implements,
//! plus the generic backends:
//! - **MemoryStore**: session-scoped storage, gone when the host closes
//! - **FileStore**: persistent JSON-file storage for non-browser processes
//! - **FallbackStore**: persistent storage that degrades to session scope
//!
//! `SessionStore` layers the session bookkeeping and the handshake audit
//! trail on top of any backend.

mod fallback;
mod file;
mod keys;
mod memory;
mod session;
mod traits;

pub use fallback::FallbackStore;
pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use session::{SessionRecord, SessionStore};
pub use traits::KeyValueStore;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Platform-specific storage error
    #[error("Platform storage error: {0}")]
    Platform(String),

    /// Storage exists but refuses writes (quota, private mode, host policy)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
