//! End-to-end protocol tests
//!
//! These tests exercise the public surface of the crate the way a wallet
//! backend would: open a wallet, record mutations, manage the card. Two
//! store wrappers inject failures the in-memory store never produces on
//! its own:
//!
//! - `FlakyStore` fails a configured number of commits with `Conflict`,
//!   driving the bounded retry policy
//! - `YieldingStore` suspends once at commit, so two in-flight mutations
//!   genuinely overlap and one of them commits from a stale snapshot
//! - `OutageStore` fails every call, driving `StoreUnavailable`
//!   classification

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use wallet_ledger::store::MemoryTransaction;
use wallet_ledger::{
    AccountId, CardDesk, CardStatus, Ledger, LedgerEntry, LedgerError, LedgerStore, MemoryStore,
    StoreError, StoreTransaction, VirtualCard, Wallet, DEFAULT_SPENDING_LIMIT,
    MAX_COMMIT_ATTEMPTS,
};

fn acct(id: &str) -> AccountId {
    AccountId::from(id)
}

/// Store wrapper that fails the next `failures` commits with `Conflict`
#[derive(Clone)]
struct FlakyStore {
    inner: MemoryStore,
    failures: Arc<AtomicU32>,
}

impl FlakyStore {
    fn new(failures: u32) -> Self {
        FlakyStore {
            inner: MemoryStore::new(),
            failures: Arc::new(AtomicU32::new(failures)),
        }
    }
}

impl LedgerStore for FlakyStore {
    type Txn = FlakyTransaction;

    async fn begin(&self, account: &AccountId) -> Result<FlakyTransaction, StoreError> {
        Ok(FlakyTransaction {
            inner: self.inner.begin(account).await?,
            failures: Arc::clone(&self.failures),
        })
    }

    async fn wallet(&self, account: &AccountId) -> Result<Option<Wallet>, StoreError> {
        self.inner.wallet(account).await
    }

    async fn card(&self, account: &AccountId) -> Result<Option<VirtualCard>, StoreError> {
        self.inner.card(account).await
    }

    async fn entries(
        &self,
        account: &AccountId,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        self.inner.entries(account, limit).await
    }
}

struct FlakyTransaction {
    inner: MemoryTransaction,
    failures: Arc<AtomicU32>,
}

impl StoreTransaction for FlakyTransaction {
    fn wallet(&self) -> Option<&Wallet> {
        self.inner.wallet()
    }

    fn card(&self) -> Option<&VirtualCard> {
        self.inner.card()
    }

    fn set_wallet(&mut self, wallet: Wallet) {
        self.inner.set_wallet(wallet);
    }

    fn set_card(&mut self, card: VirtualCard) {
        self.inner.set_card(card);
    }

    fn append_entry(&mut self, entry: LedgerEntry) {
        self.inner.append_entry(entry);
    }

    async fn commit(self) -> Result<(), StoreError> {
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            // The inner transaction is dropped uncommitted.
            return Err(StoreError::Conflict);
        }
        self.inner.commit().await
    }
}

/// Store wrapper that suspends once at commit
///
/// Every commit yields back to the executor before applying, so two
/// mutations driven concurrently both take their snapshots before either
/// commit lands: the second one must hit `Conflict` and retry against the
/// committed state.
#[derive(Clone)]
struct YieldingStore {
    inner: MemoryStore,
}

impl YieldingStore {
    fn new() -> Self {
        YieldingStore {
            inner: MemoryStore::new(),
        }
    }
}

impl LedgerStore for YieldingStore {
    type Txn = YieldingTransaction;

    async fn begin(&self, account: &AccountId) -> Result<YieldingTransaction, StoreError> {
        Ok(YieldingTransaction {
            inner: self.inner.begin(account).await?,
        })
    }

    async fn wallet(&self, account: &AccountId) -> Result<Option<Wallet>, StoreError> {
        self.inner.wallet(account).await
    }

    async fn card(&self, account: &AccountId) -> Result<Option<VirtualCard>, StoreError> {
        self.inner.card(account).await
    }

    async fn entries(
        &self,
        account: &AccountId,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        self.inner.entries(account, limit).await
    }
}

struct YieldingTransaction {
    inner: MemoryTransaction,
}

impl StoreTransaction for YieldingTransaction {
    fn wallet(&self) -> Option<&Wallet> {
        self.inner.wallet()
    }

    fn card(&self) -> Option<&VirtualCard> {
        self.inner.card()
    }

    fn set_wallet(&mut self, wallet: Wallet) {
        self.inner.set_wallet(wallet);
    }

    fn set_card(&mut self, card: VirtualCard) {
        self.inner.set_card(card);
    }

    fn append_entry(&mut self, entry: LedgerEntry) {
        self.inner.append_entry(entry);
    }

    async fn commit(self) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.inner.commit().await
    }
}

/// Store whose every call fails, as an unreachable backend would
#[derive(Clone)]
struct OutageStore;

impl LedgerStore for OutageStore {
    type Txn = MemoryTransaction;

    async fn begin(&self, _account: &AccountId) -> Result<MemoryTransaction, StoreError> {
        Err(StoreError::unavailable("backend offline"))
    }

    async fn wallet(&self, _account: &AccountId) -> Result<Option<Wallet>, StoreError> {
        Err(StoreError::unavailable("backend offline"))
    }

    async fn card(&self, _account: &AccountId) -> Result<Option<VirtualCard>, StoreError> {
        Err(StoreError::unavailable("backend offline"))
    }

    async fn entries(
        &self,
        _account: &AccountId,
        _limit: usize,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        Err(StoreError::unavailable("backend offline"))
    }
}

// Core scenarios

#[tokio::test]
async fn test_credit_from_zero_balance() {
    let ledger = Ledger::new(MemoryStore::new());
    ledger.open_account(&acct("acct-1"), "XAF").await.unwrap();

    let receipt = ledger.record(&acct("acct-1"), "salary", 5000).await.unwrap();

    assert_eq!(receipt.balance, 5000);
    assert_eq!(receipt.entry.amount, 5000);

    let entries = ledger.recent_entries(&acct("acct-1"), 20).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 5000);
}

#[tokio::test]
async fn test_overdraw_rejected_with_balance_intact() {
    let ledger = Ledger::new(MemoryStore::new());
    ledger.open_account(&acct("acct-1"), "XAF").await.unwrap();
    ledger.record(&acct("acct-1"), "top-up", 1000).await.unwrap();

    let result = ledger.record(&acct("acct-1"), "groceries", -1500).await;

    assert_eq!(result, Err(LedgerError::insufficient_funds(1000, 1500)));
    assert_eq!(ledger.balance(&acct("acct-1")).await.unwrap().balance, 1000);
    assert_eq!(
        ledger.recent_entries(&acct("acct-1"), 20).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_toggle_without_card() {
    let store = MemoryStore::new();
    Ledger::new(store.clone())
        .open_account(&acct("acct-1"), "XAF")
        .await
        .unwrap();

    let desk = CardDesk::new(store);
    assert_eq!(
        desk.toggle(&acct("acct-1")).await,
        Err(LedgerError::no_card(&acct("acct-1")))
    );
}

#[tokio::test]
async fn test_toggle_cycle_active_frozen_active() {
    let store = MemoryStore::new();
    Ledger::new(store.clone())
        .open_account(&acct("acct-1"), "XAF")
        .await
        .unwrap();

    let desk = CardDesk::new(store);
    desk.issue(&acct("acct-1"), DEFAULT_SPENDING_LIMIT)
        .await
        .unwrap();

    assert_eq!(desk.toggle(&acct("acct-1")).await, Ok(CardStatus::Frozen));
    assert_eq!(desk.toggle(&acct("acct-1")).await, Ok(CardStatus::Active));
}

// Concurrency properties

#[tokio::test]
async fn test_joint_overdraw_commits_exactly_once() {
    let ledger = Ledger::new(YieldingStore::new());
    let account = acct("acct-1");
    ledger.open_account(&account, "XAF").await.unwrap();
    ledger.record(&account, "top-up", 5000).await.unwrap();

    // Each debit fits alone; together they would overdraw. The yielding
    // store parks both mutations at commit, so both snapshot balance 5000
    // before either write lands.
    let (a, b) = tokio::join!(
        ledger.record(&account, "debit-a", -3000),
        ledger.record(&account, "debit-b", -3000),
    );

    let committed = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);

    // The loser conflicted, retried against the committed balance of 2000,
    // and was rejected by the guard there.
    let rejection = [&a, &b].iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(*rejection, LedgerError::insufficient_funds(2000, 3000));

    assert_eq!(ledger.balance(&account).await.unwrap().balance, 2000);
    assert_eq!(ledger.recent_entries(&account, 20).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_credits_never_lose_updates() {
    let ledger = Ledger::new(MemoryStore::new());
    ledger.open_account(&acct("acct-1"), "XAF").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.record(&acct("acct-1"), format!("credit-{i}").as_str(), 100).await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        // Under heavy contention an attempt may exhaust its retry budget;
        // that is the bounded policy working, not a lost update.
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(LedgerError::ConcurrencyConflict { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(committed >= 1);
    let wallet = ledger.balance(&acct("acct-1")).await.unwrap();
    assert_eq!(wallet.balance, committed * 100);
    assert_eq!(
        ledger.recent_entries(&acct("acct-1"), 20).await.unwrap().len() as i64,
        committed
    );
}

// Retry policy

#[tokio::test]
async fn test_single_conflict_retries_to_success() {
    let store = FlakyStore::new(0);
    let ledger = Ledger::new(store.clone());
    ledger.open_account(&acct("acct-1"), "XAF").await.unwrap();

    // Fail exactly one commit; the retry must land exactly one entry.
    store.failures.store(1, Ordering::SeqCst);
    let receipt = ledger.record(&acct("acct-1"), "salary", 5000).await.unwrap();

    assert_eq!(receipt.balance, 5000);
    assert_eq!(
        ledger.recent_entries(&acct("acct-1"), 20).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_persistent_conflicts_exhaust_retries() {
    let store = FlakyStore::new(0);
    let ledger = Ledger::new(store.clone());
    ledger.open_account(&acct("acct-1"), "XAF").await.unwrap();

    store.failures.store(u32::MAX, Ordering::SeqCst);
    let result = ledger.record(&acct("acct-1"), "salary", 5000).await;

    assert_eq!(
        result,
        Err(LedgerError::concurrency_conflict(MAX_COMMIT_ATTEMPTS))
    );
    // Nothing was committed by any attempt.
    assert_eq!(ledger.balance(&acct("acct-1")).await.unwrap().balance, 0);
    assert!(ledger
        .recent_entries(&acct("acct-1"), 20)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_toggle_exhausts_retries_under_persistent_conflicts() {
    let store = FlakyStore::new(0);
    let ledger = Ledger::new(store.clone());
    let desk = CardDesk::new(store.clone());

    ledger.open_account(&acct("acct-1"), "XAF").await.unwrap();
    desk.issue(&acct("acct-1"), DEFAULT_SPENDING_LIMIT)
        .await
        .unwrap();

    store.failures.store(u32::MAX, Ordering::SeqCst);
    let result = desk.toggle(&acct("acct-1")).await;

    assert_eq!(
        result,
        Err(LedgerError::concurrency_conflict(MAX_COMMIT_ATTEMPTS))
    );
    // The card keeps its pre-toggle status.
    let card = desk.card(&acct("acct-1")).await.unwrap().unwrap();
    assert_eq!(card.status, CardStatus::Active);
}

// Store failure classification

#[tokio::test]
async fn test_store_outage_is_classified() {
    let ledger = Ledger::new(OutageStore);
    let desk = CardDesk::new(OutageStore);

    assert!(matches!(
        ledger.record(&acct("acct-1"), "salary", 5000).await,
        Err(LedgerError::StoreUnavailable { .. })
    ));
    assert!(matches!(
        ledger.balance(&acct("acct-1")).await,
        Err(LedgerError::StoreUnavailable { .. })
    ));
    assert!(matches!(
        desk.toggle(&acct("acct-1")).await,
        Err(LedgerError::StoreUnavailable { .. })
    ));
}

// Full wallet session

#[tokio::test]
async fn test_full_wallet_session() {
    let store = MemoryStore::new();
    let ledger = Ledger::new(store.clone());
    let desk = CardDesk::new(store);
    let account = acct("uid-4242");

    // Signup.
    let wallet = ledger.open_account(&account, "XAF").await.unwrap();
    assert_eq!(wallet.balance, 0);

    // A few operations.
    ledger.record(&account, "salary", 150_000).await.unwrap();
    ledger.record(&account, "rent", -60_000).await.unwrap();
    ledger.record(&account, "groceries", -12_500).await.unwrap();

    let wallet = ledger.balance(&account).await.unwrap();
    assert_eq!(wallet.balance, 77_500);

    let entries = ledger.recent_entries(&account, 2).await.unwrap();
    let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["groceries", "rent"]);

    // Card lifecycle.
    let card = desk.issue(&account, DEFAULT_SPENDING_LIMIT).await.unwrap();
    assert_eq!(card.currency, "XAF");
    assert_eq!(desk.toggle(&account).await, Ok(CardStatus::Frozen));

    // The frozen card does not interfere with the ledger.
    ledger.record(&account, "refund", 500).await.unwrap();
    assert_eq!(ledger.balance(&account).await.unwrap().balance, 78_000);
}
