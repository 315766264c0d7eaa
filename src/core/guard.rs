//! Balance guard
//!
//! Pure validation of a requested balance mutation against the snapshot
//! balance. The guard has no side effects and no store access, which keeps
//! the accept/reject algebra unit-testable in isolation.

use crate::types::LedgerError;

/// Evaluate a signed delta against the current balance
///
/// Computes `current_balance + delta` with checked arithmetic and decides
/// accept or reject. The committed balance must never be negative, so any
/// result below zero is rejected.
///
/// # Arguments
///
/// * `current_balance` - The latest committed balance as observed at
///   transaction start, in minor currency units
/// * `delta` - Signed mutation amount in minor currency units; must be
///   non-zero
///
/// # Returns
///
/// * `Ok(new_balance)` - The mutation is accepted
/// * `Err(LedgerError::InvalidInput)` - `delta` is zero
/// * `Err(LedgerError::BalanceOverflow)` - the addition overflows
/// * `Err(LedgerError::InsufficientFunds)` - the result would be negative
pub fn evaluate(current_balance: i64, delta: i64) -> Result<i64, LedgerError> {
    if delta == 0 {
        return Err(LedgerError::invalid_input("amount must be non-zero"));
    }

    let new_balance = current_balance
        .checked_add(delta)
        .ok_or_else(|| LedgerError::balance_overflow(current_balance, delta))?;

    if new_balance < 0 {
        return Err(LedgerError::insufficient_funds(
            current_balance,
            delta.saturating_neg(),
        ));
    }

    Ok(new_balance)
}
