//! Verdant Core - Shared types library.
//!
//! This crate provides common types used across all Verdant Shop components:
//! - `storefront` - The storefront core (catalog, cart, currency, checkout)
//! - `integration-tests` - End-to-end tests against fake collaborators
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
