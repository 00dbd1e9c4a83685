//! Unified error handling.
//!
//! The storefront distinguishes three recoverable error classes:
//! validation errors (shown inline, block submission), storage errors
//! (recovered silently with defaults), and external service errors
//! (payment and recommendations). No error here is fatal to the process.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::services::upsell::UpsellError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Checkout failed (validation, empty cart, payment).
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Storage operation failed. Recovered with defaults; never user-facing.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Upsell recommendation request failed. Advisory only.
    #[error("Upsell error: {0}")]
    Upsell(#[from] UpsellError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Whether this error must be surfaced to the user and block the
    /// current action. Storage and upsell failures are best-effort and
    /// never block; checkout and config errors do.
    #[must_use]
    pub const fn is_user_blocking(&self) -> bool {
        match self {
            Self::Checkout(_) | Self::Config(_) => true,
            Self::Storage(_) | Self::Upsell(_) => false,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
