//! Ledger history records
//!
//! This module defines the immutable entry appended to an account's history
//! alongside every accepted balance mutation. Entries are created exactly
//! once, inside the same atomic commit as the wallet update, and are never
//! modified or deleted afterwards.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger entry identifier
///
/// Random v4 UUID generated when the entry is staged.
pub type EntryId = Uuid;

/// One immutable record of an accepted balance mutation
///
/// Many entries reference one account; together they form the account's
/// append-only history. The signed amount is the delta that was applied to
/// the balance, in minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry id
    pub id: EntryId,

    /// The owning account
    pub account: AccountId,

    /// Human-readable label supplied by the caller
    pub label: String,

    /// Signed amount in minor currency units
    ///
    /// Positive for credits, negative for debits. Never zero; zero deltas
    /// are rejected before the protocol touches the store.
    pub amount: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create a new entry with a fresh id and the current timestamp
    pub fn new(account: AccountId, label: impl Into<String>, amount: i64) -> Self {
        LedgerEntry {
            id: Uuid::new_v4(),
            account,
            label: label.into(),
            amount,
            created_at: Utc::now(),
        }
    }
}
