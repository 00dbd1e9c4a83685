//! Key-value storage collaborator.
//!
//! The storefront persists exactly two values: the cart contents and the
//! selected currency code. The medium is abstracted behind [`KvStorage`] so
//! it can be swapped (memory, file, remote) in tests. Callers treat read
//! failures and malformed content as "absent" and fall back to defaults;
//! write failures are logged and never surfaced to the user.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Storage keys used by the storefront.
///
/// These are the keys the original browser deployment persisted under;
/// changing them would orphan previously saved carts and selections.
pub mod keys {
    /// Serialized cart line items (JSON array).
    pub const CART: &str = "verdant-shop-cart";
    /// Selected currency code (plain UTF-8, e.g. `EUR`).
    pub const CURRENCY: &str = "mega-shop-currency";
}

/// Errors that can occur when talking to the storage medium.
///
/// These are always recovered from: a failed read falls back to defaults,
/// a failed write leaves the in-memory state authoritative.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing medium rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A byte-oriented key-value store.
///
/// Implementations must tolerate unknown keys (`get` returns `Ok(None)`)
/// and overwrites (`set` replaces any existing value).
pub trait KvStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium could not be read at all. Absence of
    /// the key is not an error.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be written.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium could not be modified.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
