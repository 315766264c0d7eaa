//! Types module
//!
//! Contains core data structures used throughout the crate.
//! This module organizes types into logical submodules:
//! - `account`: Account identifier and wallet state
//! - `entry`: Immutable ledger history records
//! - `card`: Virtual card state
//! - `error`: Error taxonomy for the ledger protocol

pub mod account;
pub mod card;
pub mod entry;
pub mod error;

pub use account::{AccountId, Wallet};
pub use card::{CardStatus, VirtualCard, DEFAULT_SPENDING_LIMIT};
pub use entry::{EntryId, LedgerEntry};
pub use error::LedgerError;
