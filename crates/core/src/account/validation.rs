//! Amount validation.
//!
//! Balances and transfer amounts arrive as loosely typed JSON values. Only
//! JSON integers that fit in an `i64` count as amounts; `5.0`, `"5"`, `true`
//! and `null` are all rejected.

use serde_json::Value;

use super::error::AccountError;

/// Returns the value as a whole amount, if it is one.
#[must_use]
pub fn whole_amount(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        _ => None,
    }
}

/// Validates an opening balance: a whole amount of zero or more.
///
/// # Errors
///
/// Returns `InvalidInitialBalance` carrying the submitted value.
pub fn initial_balance(value: &Value) -> Result<i64, AccountError> {
    match whole_amount(value) {
        Some(balance) if balance >= 0 => Ok(balance),
        _ => Err(AccountError::InvalidInitialBalance {
            balance: value.clone(),
        }),
    }
}

/// Validates a transfer amount against the current source balance.
///
/// # Errors
///
/// Returns `IllegalTransferAmount` for zero, negative, non-integral and
/// overdrawing amounts.
pub fn transfer_amount(value: &Value, balance: i64) -> Result<i64, AccountError> {
    match whole_amount(value) {
        Some(amount) if amount > 0 && amount <= balance => Ok(amount),
        _ => Err(AccountError::IllegalTransferAmount {
            amount: value.clone(),
            balance,
        }),
    }
}
