//! Core business logic module
//!
//! This module contains the ledger update protocol and its components:
//! - `guard` - Pure balance validation
//! - `ledger` - Transactional balance mutation with bounded retry
//! - `cards` - Virtual card issuance and status toggling

pub mod cards;
pub mod guard;
pub mod ledger;

pub use cards::CardDesk;
pub use ledger::{Ledger, Receipt, MAX_COMMIT_ATTEMPTS};
