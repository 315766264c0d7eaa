//! Ledger update protocol
//!
//! This module provides the `Ledger` struct, the transactional heart of the
//! crate. A mutation runs as a small state machine: snapshot the wallet,
//! validate the delta through the balance guard, then commit the updated
//! wallet together with exactly one history entry as a single atomic unit.
//! A commit conflict restarts the whole protocol from a fresh snapshot, up
//! to a bounded number of attempts.
//!
//! The protocol enforces:
//! - Input validation before any store interaction
//! - A never-negative committed balance
//! - One immutable history entry per accepted mutation, never a partial
//!   application of one without the other

use crate::core::guard;
use crate::store::{LedgerStore, StoreError, StoreTransaction};
use crate::types::{AccountId, LedgerEntry, LedgerError, Wallet};
use serde::Serialize;

/// Upper bound on commit attempts per mutation
///
/// After this many conflicting commits the mutation fails with
/// [`LedgerError::ConcurrencyConflict`] and the caller decides whether to
/// retry the whole operation.
pub const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Outcome of an accepted mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    /// The history entry that was committed
    pub entry: LedgerEntry,

    /// The balance after the mutation, in minor currency units
    pub balance: i64,
}

/// The ledger update protocol over a store
///
/// Generic over the store so the in-memory reference store and hosted
/// backend adapters are interchangeable. Cheap to clone when the store is.
#[derive(Debug, Clone)]
pub struct Ledger<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Create a ledger over the given store
    pub fn new(store: S) -> Self {
        Ledger { store }
    }

    /// Open a wallet with a zero balance
    ///
    /// Idempotent: if the account already has a wallet it is returned
    /// untouched, whatever its balance. Creation itself goes through a
    /// transaction so two racing opens cannot produce two wallets.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::ConcurrencyConflict`] - commit conflicts exhausted
    ///   the retry budget
    /// * [`LedgerError::StoreUnavailable`] - the store failed
    pub async fn open_account(
        &self,
        account: &AccountId,
        currency: &str,
    ) -> Result<Wallet, LedgerError> {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let mut txn = self.store.begin(account).await?;
            if let Some(existing) = txn.wallet() {
                return Ok(existing.clone());
            }

            let wallet = Wallet::open(account.clone(), currency);
            txn.set_wallet(wallet.clone());

            match txn.commit().await {
                Ok(()) => return Ok(wallet),
                Err(StoreError::Conflict) => {
                    tracing::debug!(%account, attempt, "open conflicted, retrying");
                }
                Err(StoreError::Unavailable { message }) => {
                    return Err(LedgerError::store_unavailable(message));
                }
            }
        }

        tracing::warn!(%account, attempts = MAX_COMMIT_ATTEMPTS, "open retries exhausted");
        Err(LedgerError::concurrency_conflict(MAX_COMMIT_ATTEMPTS))
    }

    /// Record a balance mutation
    ///
    /// Runs the full update protocol: validate the input, snapshot the
    /// wallet, evaluate the delta through the balance guard, and commit the
    /// new balance together with one history entry atomically. A guard
    /// rejection aborts the transaction with nothing written.
    ///
    /// # Arguments
    ///
    /// * `account` - The wallet to mutate
    /// * `label` - Human-readable label for the history entry
    /// * `amount` - Signed delta in minor currency units, non-zero
    ///
    /// # Errors
    ///
    /// * [`LedgerError::InvalidInput`] - blank label or zero amount,
    ///   rejected before any store call
    /// * [`LedgerError::AccountNotFound`] - the wallet was never opened
    /// * [`LedgerError::InsufficientFunds`] - the delta would drive the
    ///   balance negative; nothing is written
    /// * [`LedgerError::BalanceOverflow`] - the delta overflows the balance
    /// * [`LedgerError::ConcurrencyConflict`] - concurrent writers kept
    ///   conflicting through every retry
    /// * [`LedgerError::StoreUnavailable`] - the store failed
    pub async fn record(
        &self,
        account: &AccountId,
        label: &str,
        amount: i64,
    ) -> Result<Receipt, LedgerError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(LedgerError::invalid_input("label must not be blank"));
        }
        if amount == 0 {
            return Err(LedgerError::invalid_input("amount must be non-zero"));
        }

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let mut txn = self.store.begin(account).await?;
            let wallet = txn
                .wallet()
                .cloned()
                .ok_or_else(|| LedgerError::account_not_found(account))?;

            // Guard rejection drops the transaction: nothing was staged.
            let balance = guard::evaluate(wallet.balance, amount)?;

            let entry = LedgerEntry::new(account.clone(), label, amount);
            txn.set_wallet(Wallet {
                balance,
                updated_at: entry.created_at,
                ..wallet
            });
            txn.append_entry(entry.clone());

            match txn.commit().await {
                Ok(()) => {
                    tracing::debug!(%account, amount, balance, "mutation committed");
                    return Ok(Receipt { entry, balance });
                }
                Err(StoreError::Conflict) => {
                    tracing::debug!(%account, attempt, "commit conflicted, retrying");
                }
                Err(StoreError::Unavailable { message }) => {
                    return Err(LedgerError::store_unavailable(message));
                }
            }
        }

        tracing::warn!(%account, attempts = MAX_COMMIT_ATTEMPTS, "commit retries exhausted");
        Err(LedgerError::concurrency_conflict(MAX_COMMIT_ATTEMPTS))
    }

    /// Read the current wallet
    ///
    /// # Errors
    ///
    /// * [`LedgerError::AccountNotFound`] - the wallet was never opened
    /// * [`LedgerError::StoreUnavailable`] - the store failed
    pub async fn balance(&self, account: &AccountId) -> Result<Wallet, LedgerError> {
        self.store
            .wallet(account)
            .await?
            .ok_or_else(|| LedgerError::account_not_found(account))
    }

    /// Read the most recent history entries, newest first
    ///
    /// Returns an empty vector for an account with no history.
    pub async fn recent_entries(
        &self,
        account: &AccountId,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.store.entries(account, limit).await?)
    }
}
