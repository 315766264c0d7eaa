//! Store module
//!
//! The external-collaborator seam of the ledger: a document store keyed by
//! account id, with optimistic conflict detection at commit time.
//! - `traits` - Store and transaction contracts the protocol is written against
//! - `memory` - DashMap-backed in-memory reference implementation

pub mod memory;
pub mod traits;

pub use memory::{MemoryStore, MemoryTransaction};
pub use traits::{LedgerStore, StoreError, StoreTransaction};
