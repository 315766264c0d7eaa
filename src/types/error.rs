//! Error types for the wallet ledger
//!
//! This module defines the error taxonomy of the ledger update protocol.
//! Every store-originated failure is classified into one of these variants
//! at the protocol boundary; raw store errors never reach callers, and
//! user-facing messages are derived from the variant, not from provider
//! error text.
//!
//! # Error Categories
//!
//! - **Input Errors**: blank labels, zero amounts - rejected before any
//!   store interaction.
//! - **Guard Rejections**: insufficient funds, balance overflow - the
//!   mutation is aborted with nothing written.
//! - **Transient Errors**: commit conflicts that survived the bounded
//!   retry policy; the caller may retry the whole operation.
//! - **Store Errors**: the backing store is unreachable or failing.

use super::account::AccountId;
use crate::store::StoreError;
use thiserror::Error;

/// Main error type for the wallet ledger
///
/// This enum represents all possible errors that can surface from a ledger
/// or card operation. Each variant carries the context needed to build a
/// user-actionable message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Malformed caller input
    ///
    /// Rejected before any store interaction takes place.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// No wallet exists for the account
    ///
    /// Wallets are created exactly once by `open_account`; mutating or
    /// reading a wallet that was never opened is a caller error.
    #[error("No wallet found for account {account}")]
    AccountNotFound {
        /// The account that has no wallet
        account: AccountId,
    },

    /// The mutation would drive the balance negative
    ///
    /// This is a recoverable guard rejection - the balance is unchanged
    /// and no history entry is written.
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Balance observed by the transaction snapshot
        balance: i64,
        /// Debit magnitude that was requested
        requested: i64,
    },

    /// Applying the delta would overflow the balance arithmetic
    ///
    /// This is a recoverable guard rejection - the mutation is discarded.
    #[error("Balance overflow applying delta {delta} to balance {balance}")]
    BalanceOverflow {
        /// Balance observed by the transaction snapshot
        balance: i64,
        /// The delta that could not be applied
        delta: i64,
    },

    /// Commit conflicts persisted through every retry
    ///
    /// A concurrent writer kept mutating the account between snapshot and
    /// commit. Transient: the caller may retry the whole operation.
    #[error("Commit conflict persisted after {attempts} attempts")]
    ConcurrencyConflict {
        /// How many commit attempts were made
        attempts: u32,
    },

    /// Toggle attempted on an account with no virtual card
    #[error("No virtual card for account {account}")]
    NoCard {
        /// The account without a card
        account: AccountId,
    },

    /// The backing store is unreachable or failing
    ///
    /// The message is a cleaned description, never raw provider text.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the store failure
        message: String,
    },
}

// Classification of store-layer errors. Commit conflicts are handled by the
// retry loop before `?` ever sees them, so a conflict reaching this
// conversion means the bounded policy was bypassed by a read path; it is
// reported as a single-attempt conflict.
impl From<StoreError> for LedgerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict => LedgerError::ConcurrencyConflict { attempts: 1 },
            StoreError::Unavailable { message } => LedgerError::StoreUnavailable { message },
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidInput error
    pub fn invalid_input(message: &str) -> Self {
        LedgerError::InvalidInput {
            message: message.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account: &AccountId) -> Self {
        LedgerError::AccountNotFound {
            account: account.clone(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(balance: i64, requested: i64) -> Self {
        LedgerError::InsufficientFunds { balance, requested }
    }

    /// Create a BalanceOverflow error
    pub fn balance_overflow(balance: i64, delta: i64) -> Self {
        LedgerError::BalanceOverflow { balance, delta }
    }

    /// Create a ConcurrencyConflict error
    pub fn concurrency_conflict(attempts: u32) -> Self {
        LedgerError::ConcurrencyConflict { attempts }
    }

    /// Create a NoCard error
    pub fn no_card(account: &AccountId) -> Self {
        LedgerError::NoCard {
            account: account.clone(),
        }
    }

    /// Create a StoreUnavailable error
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        LedgerError::StoreUnavailable {
            message: message.into(),
        }
    }
}
