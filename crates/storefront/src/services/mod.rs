//! External service collaborators.
//!
//! Each collaborator sits behind a single-method capability trait so the
//! checkout orchestrator and cart views can be tested with fakes returning
//! deterministic canned responses.

pub mod payments;
pub mod upsell;
