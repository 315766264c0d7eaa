//! In-memory reference store
//!
//! This module provides `MemoryStore`, a DashMap-backed implementation of
//! the store contract with real optimistic conflict detection. It exists so
//! the protocol's correctness properties are testable without a hosted
//! backend, and doubles as the reference for backend adapters.
//!
//! # Versioning
//!
//! Each account maps to a slot carrying its wallet, card, entry log and a
//! version counter. `begin` snapshots the slot together with its version;
//! `commit` re-locks the slot, compares versions, and either applies every
//! staged write and bumps the version, or fails with `Conflict`. Two
//! overlapping transactions on the same account can therefore never both
//! commit from the same snapshot.
//!
//! # Thread Safety
//!
//! The slot map lives behind an `Arc`, so the store is cheaply cloneable
//! and shareable across tasks. DashMap's entry lock serializes commits on
//! the same account while leaving other accounts untouched.

use crate::store::traits::{LedgerStore, StoreError, StoreTransaction};
use crate::types::{AccountId, LedgerEntry, VirtualCard, Wallet};
use dashmap::DashMap;
use std::sync::Arc;

/// Everything the store holds for one account
#[derive(Debug, Default)]
struct AccountSlot {
    /// Bumped on every committed write transaction; absent slots are version 0
    version: u64,
    wallet: Option<Wallet>,
    card: Option<VirtualCard>,
    /// Append-only, in commit order
    entries: Vec<LedgerEntry>,
}

/// DashMap-backed store with optimistic per-account versioning
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<DashMap<AccountId, AccountSlot>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    type Txn = MemoryTransaction;

    async fn begin(&self, account: &AccountId) -> Result<MemoryTransaction, StoreError> {
        // Snapshot under the entry lock; an account that was never written
        // snapshots as an empty slot at version 0.
        let (version, wallet, card) = match self.slots.get(account) {
            Some(slot) => (slot.version, slot.wallet.clone(), slot.card.clone()),
            None => (0, None, None),
        };

        Ok(MemoryTransaction {
            slots: Arc::clone(&self.slots),
            account: account.clone(),
            version,
            wallet,
            card,
            staged_wallet: None,
            staged_card: None,
            staged_entries: Vec::new(),
        })
    }

    async fn wallet(&self, account: &AccountId) -> Result<Option<Wallet>, StoreError> {
        Ok(self.slots.get(account).and_then(|slot| slot.wallet.clone()))
    }

    async fn card(&self, account: &AccountId) -> Result<Option<VirtualCard>, StoreError> {
        Ok(self.slots.get(account).and_then(|slot| slot.card.clone()))
    }

    async fn entries(
        &self,
        account: &AccountId,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .slots
            .get(account)
            .map(|slot| slot.entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// Transaction handle over one account of a [`MemoryStore`]
///
/// Holds the snapshot taken at `begin` plus the staged writes. Dropping the
/// handle without committing leaves the store untouched.
#[derive(Debug)]
pub struct MemoryTransaction {
    slots: Arc<DashMap<AccountId, AccountSlot>>,
    account: AccountId,
    version: u64,
    wallet: Option<Wallet>,
    card: Option<VirtualCard>,
    staged_wallet: Option<Wallet>,
    staged_card: Option<VirtualCard>,
    staged_entries: Vec<LedgerEntry>,
}

impl StoreTransaction for MemoryTransaction {
    fn wallet(&self) -> Option<&Wallet> {
        self.wallet.as_ref()
    }

    fn card(&self) -> Option<&VirtualCard> {
        self.card.as_ref()
    }

    fn set_wallet(&mut self, wallet: Wallet) {
        self.staged_wallet = Some(wallet);
    }

    fn set_card(&mut self, card: VirtualCard) {
        self.staged_card = Some(card);
    }

    fn append_entry(&mut self, entry: LedgerEntry) {
        self.staged_entries.push(entry);
    }

    async fn commit(self) -> Result<(), StoreError> {
        // Read-only transactions have nothing to apply and cannot conflict.
        if self.staged_wallet.is_none() && self.staged_card.is_none() && self.staged_entries.is_empty()
        {
            return Ok(());
        }

        // Entry lock: concurrent commits on the same account serialize here.
        let mut slot = self.slots.entry(self.account).or_default();
        if slot.version != self.version {
            return Err(StoreError::Conflict);
        }

        if let Some(wallet) = self.staged_wallet {
            slot.wallet = Some(wallet);
        }
        if let Some(card) = self.staged_card {
            slot.card = Some(card);
        }
        slot.entries.extend(self.staged_entries);
        slot.version += 1;

        Ok(())
    }
}
