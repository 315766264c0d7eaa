//! Virtual card operations
//!
//! This module provides `CardDesk`, which manages the single virtual card
//! an account may hold: idempotent issuance and the active/frozen toggle.
//!
//! The toggle runs through the same transactional snapshot-then-commit
//! pattern as the balance protocol. A plain read-then-write would let two
//! concurrent toggles both observe "active" and both write "frozen",
//! collapsing into a surprising no-op; with the versioned commit one of
//! them conflicts and retries against the flipped status instead.

use crate::store::{LedgerStore, StoreError, StoreTransaction};
use crate::types::{AccountId, CardStatus, LedgerError, VirtualCard};
use chrono::Utc;

use super::ledger::MAX_COMMIT_ATTEMPTS;

/// Card issuance and status management over a store
#[derive(Debug, Clone)]
pub struct CardDesk<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> CardDesk<S> {
    /// Create a card desk over the given store
    pub fn new(store: S) -> Self {
        CardDesk { store }
    }

    /// Issue a virtual card for the account
    ///
    /// Idempotent upsert under the single-card model: if a card already
    /// exists it is returned unchanged, keeping its masked identifier and
    /// status. A new card is issued Active, with a random `last4` and the
    /// owning wallet's currency.
    ///
    /// # Arguments
    ///
    /// * `account` - The owning account; its wallet must already exist
    /// * `limit` - Spending limit in minor currency units, positive
    ///
    /// # Errors
    ///
    /// * [`LedgerError::InvalidInput`] - non-positive limit
    /// * [`LedgerError::AccountNotFound`] - the wallet was never opened
    /// * [`LedgerError::ConcurrencyConflict`] - commit conflicts exhausted
    ///   the retry budget
    /// * [`LedgerError::StoreUnavailable`] - the store failed
    pub async fn issue(&self, account: &AccountId, limit: i64) -> Result<VirtualCard, LedgerError> {
        if limit <= 0 {
            return Err(LedgerError::invalid_input("spending limit must be positive"));
        }

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let mut txn = self.store.begin(account).await?;
            if let Some(existing) = txn.card() {
                return Ok(existing.clone());
            }

            let wallet = txn
                .wallet()
                .cloned()
                .ok_or_else(|| LedgerError::account_not_found(account))?;

            let card = VirtualCard::issue(account.clone(), limit, wallet.currency);
            txn.set_card(card.clone());

            match txn.commit().await {
                Ok(()) => {
                    tracing::debug!(%account, last4 = %card.last4, "card issued");
                    return Ok(card);
                }
                Err(StoreError::Conflict) => {
                    tracing::debug!(%account, attempt, "issue conflicted, retrying");
                }
                Err(StoreError::Unavailable { message }) => {
                    return Err(LedgerError::store_unavailable(message));
                }
            }
        }

        tracing::warn!(%account, attempts = MAX_COMMIT_ATTEMPTS, "issue retries exhausted");
        Err(LedgerError::concurrency_conflict(MAX_COMMIT_ATTEMPTS))
    }

    /// Flip the card between Active and Frozen
    ///
    /// Reads the card inside a transaction, writes the flipped status with
    /// an updated timestamp, and commits; a conflict restarts from a fresh
    /// snapshot so the flip always applies to the latest observed status.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::NoCard`] - the account has no card
    /// * [`LedgerError::ConcurrencyConflict`] - commit conflicts exhausted
    ///   the retry budget
    /// * [`LedgerError::StoreUnavailable`] - the store failed
    pub async fn toggle(&self, account: &AccountId) -> Result<CardStatus, LedgerError> {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let mut txn = self.store.begin(account).await?;
            let card = txn
                .card()
                .cloned()
                .ok_or_else(|| LedgerError::no_card(account))?;

            let status = card.status.flipped();
            txn.set_card(VirtualCard {
                status,
                updated_at: Utc::now(),
                ..card
            });

            match txn.commit().await {
                Ok(()) => {
                    tracing::debug!(%account, ?status, "card toggled");
                    return Ok(status);
                }
                Err(StoreError::Conflict) => {
                    tracing::debug!(%account, attempt, "toggle conflicted, retrying");
                }
                Err(StoreError::Unavailable { message }) => {
                    return Err(LedgerError::store_unavailable(message));
                }
            }
        }

        tracing::warn!(%account, attempts = MAX_COMMIT_ATTEMPTS, "toggle retries exhausted");
        Err(LedgerError::concurrency_conflict(MAX_COMMIT_ATTEMPTS))
    }

    /// Read the account's card, if any
    pub async fn card(&self, account: &AccountId) -> Result<Option<VirtualCard>, LedgerError> {
        Ok(self.store.card(account).await?)
    }
}
