//! Durable key-value slots.
//!
//! The cart and the credential each live under one fixed string key, the way
//! a browser keeps them in `localStorage`. [`KeyValueStore`] is that slot
//! abstraction; [`FileStore`] persists to disk and [`MemoryStore`] keeps
//! everything in process (with an optional quota for exercising write
//! failures).

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors raised by a key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file operation failed.
    #[error("I/O error on key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the value would exceed the store's capacity.
    #[error("quota exceeded writing key `{key}` ({needed} bytes, {limit} allowed)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// The key cannot be used as a slot name.
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),

    /// A lock guarding the store was poisoned.
    #[error("storage lock poisoned")]
    Lock,
}

/// A string-keyed store of string values.
///
/// All methods take `&self`; implementations use interior mutability so one
/// store can be shared by several consumers.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Succeeds when the key is already absent.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backing medium cannot be updated.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
