//! Account-related types for the wallet ledger
//!
//! This module defines the account identifier and the wallet document
//! that carries an account's authoritative balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque account identifier
///
/// The id issued by the identity provider is used verbatim as the wallet
/// key. Every ledger operation takes it as an explicit parameter; there is
/// no ambient "current user" anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    /// View the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        AccountId(id.to_string())
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        AccountId(id)
    }
}

/// Wallet state for one account
///
/// Represents the authoritative balance document of an account. The balance
/// is a signed integer in minor currency units; it must never be negative
/// after an accepted mutation. Wallets are created once with a zero balance
/// and are only ever modified through the ledger update protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// The owning account
    pub account: AccountId,

    /// Current balance in minor currency units
    ///
    /// Signed so that the guard arithmetic is closed over deltas, but a
    /// committed value is always >= 0.
    pub balance: i64,

    /// Currency code, e.g. "XAF"
    pub currency: String,

    /// Timestamp of the last committed mutation
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a fresh wallet with a zero balance
    ///
    /// # Arguments
    ///
    /// * `account` - The owning account id
    /// * `currency` - Currency code for the wallet
    pub fn open(account: AccountId, currency: impl Into<String>) -> Self {
        Wallet {
            account,
            balance: 0,
            currency: currency.into(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_zero_balance_wallet() {
        let wallet = Wallet::open(AccountId::from("acct-1"), "XAF");

        assert_eq!(wallet.account, AccountId::from("acct-1"));
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.currency, "XAF");
    }

    #[test]
    fn test_account_id_display_matches_inner() {
        let id = AccountId::new("uid-42");
        assert_eq!(id.to_string(), "uid-42");
        assert_eq!(id.as_str(), "uid-42");
    }
}
