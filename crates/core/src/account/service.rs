//! Account service facade.
//!
//! Entry point for callers: validates input, scopes reads to the acting user,
//! turns repository failures into typed [`AccountError`]s and emits audit
//! records for successful writes.

use std::sync::Arc;

use serde_json::Value;
use tally_shared::config::LedgerConfig;
use tally_shared::{AccountId, UserId};
use tracing::{info, warn};

use super::audit;
use super::error::AccountError;
use super::model::Account;
use super::repository::{AccountRepository, lookup_account};
use super::transfer::TransferEngine;
use super::validation;

/// Account service for creating, reading and transferring between accounts.
pub struct AccountService<R: AccountRepository> {
    repo: Arc<R>,
    engine: TransferEngine<R>,
}

impl<R: AccountRepository> AccountService<R> {
    /// Create a new account service.
    #[must_use]
    pub fn new(repo: Arc<R>, config: &LedgerConfig) -> Self {
        let engine = TransferEngine::new(Arc::clone(&repo), config);
        Self { repo, engine }
    }

    /// Open an account for `user_id` with the given opening balance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The balance is not an integer of zero or above
    /// - The repository fails to create the account
    pub async fn create_account(
        &self,
        user_id: UserId,
        initial_balance: impl Into<Value>,
    ) -> Result<Account, AccountError> {
        let initial_balance = validation::initial_balance(&initial_balance.into())?;

        let account = self
            .repo
            .create_account(user_id, initial_balance)
            .await
            .map_err(|e| {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    "Unexpected error occurred when trying to create an account"
                );
                AccountError::AccountCreate
            })?;

        audit::account_created(&account);
        Ok(account)
    }

    /// Fetch one of the user's accounts.
    ///
    /// Accounts owned by someone else are reported as not found.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `AccountLookup`.
    pub async fn get_user_account(
        &self,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<Account, AccountError> {
        lookup_account(&*self.repo, account_id, Some(user_id))
            .await?
            .ok_or_else(|| {
                info!(user_id = %user_id, account_id = %account_id, "Account not found for user");
                AccountError::AccountNotFound { account_id }
            })
    }

    /// List all of the user's accounts.
    ///
    /// # Errors
    ///
    /// Returns `AccountListLookup` if the repository fails.
    pub async fn get_user_accounts(&self, user_id: UserId) -> Result<Vec<Account>, AccountError> {
        let mut accounts = self.repo.get_accounts(user_id).await.map_err(|e| {
            warn!(
                user_id = %user_id,
                error = %e,
                "Unexpected error occurred when trying to list accounts"
            );
            AccountError::AccountListLookup { user_id }
        })?;

        accounts.retain(|account| account.is_owned_by(user_id));
        Ok(accounts)
    }

    /// Transfer `amount` from one of the user's accounts to any other account.
    ///
    /// Returns the debited source account.
    ///
    /// # Errors
    ///
    /// See [`TransferEngine::transfer`].
    pub async fn transfer(
        &self,
        user_id: UserId,
        from: AccountId,
        to: AccountId,
        amount: impl Into<Value>,
    ) -> Result<Account, AccountError> {
        let amount = amount.into();
        let updated = self.engine.transfer(user_id, from, to, &amount).await?;

        if let Some(amount) = validation::whole_amount(&amount) {
            audit::transfer_completed(user_id, from, to, amount);
        }
        Ok(updated)
    }
}
