//! Verdant Shop storefront core.
//!
//! This crate implements the storefront's state and flow logic as a library:
//! the product catalog, the cart store with best-effort persistence, the
//! currency selector with price formatting, and the checkout orchestrator.
//!
//! # Architecture
//!
//! - All state lives in an explicitly owned [`state::AppState`]; there are
//!   no process-wide singletons, so tests can instantiate isolated instances.
//! - Rendering, the payment provider's confirmation UI, and the physical
//!   key-value medium are external collaborators behind traits
//!   ([`storage::KvStorage`], [`services::payments::PaymentGateway`],
//!   [`services::upsell::Recommender`]).
//! - Cart transitions are a pure reducer plus a thin persisting dispatcher,
//!   keeping the state machine testable without any rendering layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod currency;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;
