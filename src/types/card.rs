//! Virtual card types
//!
//! This module defines the single virtual card an account may hold and its
//! two-state status. The card is a mock: only the masked identifier, the
//! spending limit and the status are tracked, never a full PAN.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default spending limit for newly issued cards, in minor currency units
pub const DEFAULT_SPENDING_LIMIT: i64 = 200_000;

/// Virtual card status
///
/// A card is either usable or frozen by its owner. Toggling flips between
/// the two; there is no third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    /// Card is usable
    Active,

    /// Card is frozen by the owner
    Frozen,
}

impl CardStatus {
    /// The opposite status
    pub fn flipped(self) -> Self {
        match self {
            CardStatus::Active => CardStatus::Frozen,
            CardStatus::Frozen => CardStatus::Active,
        }
    }
}

/// Virtual card state for one account
///
/// At most one card exists per account (single-card model). Cards are
/// created on demand and never deleted; only the status and `updated_at`
/// change after issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualCard {
    /// The owning account
    pub account: AccountId,

    /// Masked identifier: the last four digits only
    pub last4: String,

    /// Current status
    pub status: CardStatus,

    /// Spending limit in minor currency units
    pub limit: i64,

    /// Currency code, matching the owning wallet
    pub currency: String,

    /// Issuance timestamp
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last status change
    pub updated_at: DateTime<Utc>,
}

impl VirtualCard {
    /// Issue a new active card with a random masked identifier
    pub fn issue(account: AccountId, limit: i64, currency: impl Into<String>) -> Self {
        let last4 = format!("{:04}", rand::thread_rng().gen_range(0..10_000));
        let now = Utc::now();
        VirtualCard {
            account,
            last4,
            status: CardStatus::Active,
            limit,
            currency: currency.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
