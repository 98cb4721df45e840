//! Account repository port.

use std::future::Future;

use tally_shared::{AccountId, UserId};
use thiserror::Error;
use tracing::warn;

use super::error::AccountError;
use super::model::Account;

/// Failures reported by a repository implementation.
///
/// The message is kept for diagnostics only and never reaches callers of the
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Create operation failed.
    #[error("create operation failed: {0}")]
    Create(String),

    /// Lookup operation failed.
    #[error("lookup operation failed: {0}")]
    Get(String),

    /// Update operation failed.
    #[error("update operation failed: {0}")]
    Update(String),

    /// Conditional update found a different balance than expected.
    #[error("account {account_id} changed concurrently: expected balance {expected}, found {actual}")]
    Conflict {
        /// The account being updated.
        account_id: AccountId,
        /// Balance the caller based its write on.
        expected: i64,
        /// Balance actually stored.
        actual: i64,
    },
}

/// Repository trait for account persistence.
///
/// Every operation is atomic for a single account; nothing spans two accounts.
/// Implemented by the db crate.
pub trait AccountRepository: Send + Sync {
    /// Create a new account with a fresh id.
    fn create_account(
        &self,
        owner: UserId,
        initial_balance: i64,
    ) -> impl Future<Output = Result<Account, RepositoryError>> + Send;

    /// Replace the stored record with the same id.
    fn update_account(
        &self,
        account: &Account,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Replace the stored record only if its balance is still `expected_balance`.
    ///
    /// Fails with [`RepositoryError::Conflict`] otherwise.
    fn update_balance_if(
        &self,
        account: &Account,
        expected_balance: i64,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Find an account by id, optionally restricted to an owner.
    fn get_account(
        &self,
        account_id: AccountId,
        owner: Option<UserId>,
    ) -> impl Future<Output = Result<Option<Account>, RepositoryError>> + Send;

    /// List every account owned by `owner`.
    fn get_accounts(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Account>, RepositoryError>> + Send;
}

/// Looks up an account, logging and wrapping repository failures.
pub(crate) async fn lookup_account<R: AccountRepository>(
    repo: &R,
    account_id: AccountId,
    owner: Option<UserId>,
) -> Result<Option<Account>, AccountError> {
    repo.get_account(account_id, owner).await.map_err(|e| {
        warn!(
            account_id = %account_id,
            user_id = ?owner,
            error = %e,
            "Unexpected error occurred when trying to perform an account lookup"
        );
        AccountError::AccountLookup { account_id }
    })
}
