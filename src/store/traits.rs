//! Store and transaction contracts
//!
//! This module defines the trait abstractions the ledger protocol is
//! written against, so the in-memory reference store and any hosted
//! backend adapter are interchangeable.
//!
//! The transactional model is scoped rather than callback-based: `begin`
//! hands out a handle carrying a consistent snapshot of one account, writes
//! are staged on the handle, and `commit` applies them all-or-nothing.
//! Dropping the handle without committing discards every staged write.

use crate::types::{AccountId, LedgerEntry, VirtualCard, Wallet};
use thiserror::Error;

/// Errors surfaced by the store layer
///
/// These are classified into [`crate::types::LedgerError`] at the protocol
/// boundary and never reach callers directly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A concurrent writer mutated the account between snapshot and commit
    #[error("conflicting concurrent write detected at commit")]
    Conflict,

    /// The store is unreachable or failing
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of the failure
        message: String,
    },
}

impl StoreError {
    /// Create an Unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }
}

/// Document store keyed by account id
///
/// Provides read-only lookups plus transactional access to one account at a
/// time. All methods are async: every store call is a suspension point.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    /// Transaction handle type produced by [`LedgerStore::begin`]
    type Txn: StoreTransaction;

    /// Begin a transaction scoped to one account
    ///
    /// The returned handle carries a consistent snapshot of the account's
    /// documents as of this call.
    async fn begin(&self, account: &AccountId) -> Result<Self::Txn, StoreError>;

    /// Read the current wallet document, if any
    async fn wallet(&self, account: &AccountId) -> Result<Option<Wallet>, StoreError>;

    /// Read the current virtual card document, if any
    async fn card(&self, account: &AccountId) -> Result<Option<VirtualCard>, StoreError>;

    /// Read the most recent history entries, newest first
    async fn entries(
        &self,
        account: &AccountId,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, StoreError>;
}

/// Transactional handle over one account
///
/// Accessors expose the snapshot taken at `begin`; staged writes are not
/// read back through them. `commit` consumes the handle and applies every
/// staged write as a single atomic unit, or fails with
/// [`StoreError::Conflict`] when the account changed since the snapshot.
#[allow(async_fn_in_trait)]
pub trait StoreTransaction {
    /// Wallet document as of the snapshot
    fn wallet(&self) -> Option<&Wallet>;

    /// Card document as of the snapshot
    fn card(&self) -> Option<&VirtualCard>;

    /// Stage a wallet write
    fn set_wallet(&mut self, wallet: Wallet);

    /// Stage a card write
    fn set_card(&mut self, card: VirtualCard);

    /// Stage an append to the account history
    fn append_entry(&mut self, entry: LedgerEntry);

    /// Atomically apply every staged write
    ///
    /// # Errors
    ///
    /// * [`StoreError::Conflict`] - a concurrent writer committed to this
    ///   account after the snapshot was taken; nothing was applied
    /// * [`StoreError::Unavailable`] - the store failed; nothing was applied
    async fn commit(self) -> Result<(), StoreError>;
}
