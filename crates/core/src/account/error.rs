//! Account error types.
//!
//! Client input errors (4xx) are raised where they are detected. Repository
//! failures are logged at the service/engine boundary and surface here as
//! 5xx variants carrying only identifiers, never the underlying cause.

use serde::Serialize;
use serde_json::{Map, Value, json};
use tally_shared::{AccountId, ErrorBody, UserId};
use thiserror::Error;

/// How far a failed transfer got before it was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    /// The source debit was never written.
    NotApplied,
    /// The source was debited, the credit failed and the debit was undone.
    RolledBack,
    /// The source was debited, the credit failed and the debit could not be
    /// undone. Funds are missing from the ledger.
    Inconsistent,
}

impl TransferState {
    /// Returns the snake_case name used in error payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotApplied => "not_applied",
            Self::RolledBack => "rolled_back",
            Self::Inconsistent => "inconsistent",
        }
    }
}

impl std::fmt::Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during account operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccountError {
    // ========== Client Errors ==========
    /// Initial balance is not a non-negative integer.
    #[error("Submitted balance must be an integer of zero or above")]
    InvalidInitialBalance {
        /// The rejected value, as submitted.
        balance: Value,
    },

    /// Account does not exist or is not visible to the caller.
    #[error("Account not found")]
    AccountNotFound {
        /// The requested account.
        account_id: AccountId,
    },

    /// Source and destination are the same account.
    #[error("Account not allowed to transfer to itself")]
    SelfTransfer {
        /// The account used on both sides.
        account_id: AccountId,
    },

    /// Amount is not a positive integer or exceeds the source balance.
    #[error("Transfer amount must be an integer above zero, and not leave the account negative")]
    IllegalTransferAmount {
        /// The rejected amount, as submitted.
        amount: Value,
        /// Source balance at the time of the check.
        balance: i64,
    },

    /// The source account changed between read and write.
    #[error("Account changed during the transfer, please retry")]
    TransferConflict {
        /// Source account.
        from_account_id: AccountId,
        /// Destination account.
        to_account_id: AccountId,
    },

    // ========== Infrastructure Errors ==========
    /// Repository failed to create the account.
    #[error("Unexpected error. Unable to create account")]
    AccountCreate,

    /// Repository failed to look up an account.
    #[error("Unexpected error. Unable to look up account")]
    AccountLookup {
        /// The requested account.
        account_id: AccountId,
    },

    /// Repository failed to list a user's accounts.
    #[error("Unexpected error. Unable to look up accounts")]
    AccountListLookup {
        /// The user whose accounts were requested.
        user_id: UserId,
    },

    /// A write failed during the transfer.
    #[error("Unexpected error. Transfer failed")]
    Transfer {
        /// Source account.
        from_account_id: AccountId,
        /// Destination account.
        to_account_id: AccountId,
        /// What was left behind.
        state: TransferState,
    },
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInitialBalance { .. } => "INVALID_INITIAL_BALANCE",
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::SelfTransfer { .. } => "SELF_TRANSFER",
            Self::IllegalTransferAmount { .. } => "ILLEGAL_TRANSFER_AMOUNT",
            Self::TransferConflict { .. } => "TRANSFER_CONFLICT",
            Self::AccountCreate => "ACCOUNT_CREATE_ERROR",
            Self::AccountLookup { .. } => "ACCOUNT_LOOKUP_ERROR",
            Self::AccountListLookup { .. } => "ACCOUNT_LIST_LOOKUP_ERROR",
            Self::Transfer { .. } => "TRANSFER_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidInitialBalance { .. }
            | Self::SelfTransfer { .. }
            | Self::IllegalTransferAmount { .. } => 400,

            // 404 Not Found
            Self::AccountNotFound { .. } => 404,

            // 409 Conflict - concurrency errors
            Self::TransferConflict { .. } => 409,

            // 500 Internal Server Error
            Self::AccountCreate
            | Self::AccountLookup { .. }
            | Self::AccountListLookup { .. }
            | Self::Transfer { .. } => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransferConflict { .. })
    }

    /// Structured payload of the identifiers and values involved.
    #[must_use]
    pub fn details(&self) -> Map<String, Value> {
        let value = match self {
            Self::InvalidInitialBalance { balance } => json!({ "balance": balance }),
            Self::AccountNotFound { account_id }
            | Self::SelfTransfer { account_id }
            | Self::AccountLookup { account_id } => json!({ "account_id": account_id }),
            Self::IllegalTransferAmount { amount, balance } => {
                json!({ "amount": amount, "balance": balance })
            }
            Self::TransferConflict {
                from_account_id,
                to_account_id,
            } => json!({
                "from_account_id": from_account_id,
                "to_account_id": to_account_id,
            }),
            Self::AccountCreate => json!({}),
            Self::AccountListLookup { user_id } => json!({ "user_id": user_id }),
            Self::Transfer {
                from_account_id,
                to_account_id,
                state,
            } => json!({
                "from_account_id": from_account_id,
                "to_account_id": to_account_id,
                "state": state,
            }),
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Renders the error for a transport layer.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        self.details().into_iter().fold(
            ErrorBody::new(self.error_code(), self.to_string(), self.http_status_code()),
            |body, (key, value)| body.with_detail(key, value),
        )
    }
}

impl From<AccountError> for ErrorBody {
    fn from(err: AccountError) -> Self {
        err.to_body()
    }
}
