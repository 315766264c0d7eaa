//! Wallet Ledger Library
//! # Overview
//!
//! This library implements the ledger update protocol of a consumer wallet:
//! atomic balance mutation with an append-only history, plus the virtual
//! card lifecycle, over a pluggable document store with optimistic
//! conflict detection.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Wallet, LedgerEntry, VirtualCard, errors)
//! - [`store`] - The store seam:
//!   - [`store::traits`] - Store and transaction contracts
//!   - [`store::memory`] - DashMap-backed reference store with versioned commits
//! - [`core`] - Business logic components:
//!   - [`core::guard`] - Pure balance validation
//!   - [`core::ledger`] - Transactional mutation with bounded retry
//!   - [`core::cards`] - Card issuance and status toggling
//!
//! # The Protocol
//!
//! A balance mutation moves through a fixed sequence:
//!
//! - **Validate**: blank labels and zero amounts are rejected before any
//!   store interaction
//! - **Snapshot**: a transaction is opened and the wallet is read from a
//!   consistent snapshot of the account
//! - **Guard**: the signed delta is evaluated against the snapshot balance;
//!   a result below zero rejects with `InsufficientFunds`
//! - **Commit**: the updated balance and exactly one history entry are
//!   applied as a single all-or-nothing unit; a conflicting concurrent
//!   writer forces a restart from a fresh snapshot, bounded by
//!   [`core::ledger::MAX_COMMIT_ATTEMPTS`]
//!
//! # Invariants
//!
//! - A committed balance is never negative
//! - Each accepted mutation produces exactly one immutable history entry
//! - Two writers never both commit from the same snapshot of an account

pub mod core;
pub mod store;
pub mod types;

pub use crate::core::{CardDesk, Ledger, Receipt, MAX_COMMIT_ATTEMPTS};
pub use store::{LedgerStore, MemoryStore, StoreError, StoreTransaction};
pub use types::{
    AccountId, CardStatus, EntryId, LedgerEntry, LedgerError, VirtualCard, Wallet,
    DEFAULT_SPENDING_LIMIT,
};
