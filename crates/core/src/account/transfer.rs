//! Transfer engine.
//!
//! Moves an amount between two accounts with two conditional single-account
//! writes: debit the source, then credit the destination. If the credit fails
//! the debit is compensated by crediting the source back. Each write is a
//! compare-and-swap on the balance read at the start of the transfer, so a
//! concurrent writer makes the transfer fail instead of being overwritten.
//!
//! The only unrecoverable case is a failed compensation. It is reported as
//! [`TransferState::Inconsistent`] and logged as data corruption.

use std::sync::Arc;

use serde_json::Value;
use tally_shared::config::LedgerConfig;
use tally_shared::{AccountId, UserId};
use tracing::{debug, error, info, warn};

use super::error::{AccountError, TransferState};
use super::model::Account;
use super::repository::{AccountRepository, RepositoryError, lookup_account};
use super::validation;

/// A validated transfer, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Source as read from the repository.
    pub source: Account,
    /// Destination as read from the repository.
    pub destination: Account,
    /// Amount to move.
    pub amount: i64,
}

impl TransferPlan {
    fn debited_source(&self) -> Result<Account, AccountError> {
        let balance = self.source.balance() - self.amount;
        Account::new(self.source.id(), self.source.owner(), balance)
    }

    fn credited_destination(&self, raw_amount: &Value) -> Result<Account, AccountError> {
        let balance = self
            .destination
            .balance()
            .checked_add(self.amount)
            .ok_or_else(|| AccountError::IllegalTransferAmount {
                amount: raw_amount.clone(),
                balance: self.source.balance(),
            })?;
        Account::new(self.destination.id(), self.destination.owner(), balance)
    }
}

/// Validates and executes transfers against an [`AccountRepository`].
pub struct TransferEngine<R: AccountRepository> {
    repo: Arc<R>,
    compensation_retries: u32,
}

impl<R: AccountRepository> TransferEngine<R> {
    /// Create a new transfer engine.
    #[must_use]
    pub fn new(repo: Arc<R>, config: &LedgerConfig) -> Self {
        Self {
            repo,
            compensation_retries: config.compensation_retries,
        }
    }

    /// Check every precondition and read both accounts.
    ///
    /// Checks, in order:
    /// 1. source and destination differ
    /// 2. source exists and is owned by `user_id`
    /// 3. amount is a positive integer no larger than the source balance
    /// 4. destination exists (any owner)
    ///
    /// # Errors
    ///
    /// Returns the failure of the first violated check, or `AccountLookup` if
    /// the repository fails while reading.
    pub async fn plan(
        &self,
        user_id: UserId,
        from: AccountId,
        to: AccountId,
        amount: &Value,
    ) -> Result<TransferPlan, AccountError> {
        if from == to {
            return Err(AccountError::SelfTransfer { account_id: from });
        }

        let source = lookup_account(&*self.repo, from, Some(user_id))
            .await?
            .ok_or_else(|| {
                info!(user_id = %user_id, account_id = %from, "Source account not found for user");
                AccountError::AccountNotFound { account_id: from }
            })?;

        let amount = validation::transfer_amount(amount, source.balance())?;

        let destination = lookup_account(&*self.repo, to, None)
            .await?
            .ok_or_else(|| {
                info!(account_id = %to, "Destination account not found");
                AccountError::AccountNotFound { account_id: to }
            })?;

        Ok(TransferPlan {
            source,
            destination,
            amount,
        })
    }

    /// Transfer `amount` from `from` to `to` on behalf of `user_id`.
    ///
    /// Returns the debited source account.
    ///
    /// # Errors
    ///
    /// Returns any precondition failure from [`Self::plan`], then:
    /// - `TransferConflict` if the source changed before it was debited
    /// - `Transfer` if a write failed; its state tells whether the debit was
    ///   never applied, rolled back, or left in place
    pub async fn transfer(
        &self,
        user_id: UserId,
        from: AccountId,
        to: AccountId,
        amount: &Value,
    ) -> Result<Account, AccountError> {
        let plan = self.plan(user_id, from, to, amount).await?;
        let debited = plan.debited_source()?;
        let credited = plan.credited_destination(amount)?;

        if let Err(e) = self
            .repo
            .update_balance_if(&debited, plan.source.balance())
            .await
        {
            warn!(
                from_account_id = %from,
                to_account_id = %to,
                error = %e,
                "Failed to debit the source account during a transfer"
            );
            return Err(match e {
                RepositoryError::Conflict { .. } => AccountError::TransferConflict {
                    from_account_id: from,
                    to_account_id: to,
                },
                _ => AccountError::Transfer {
                    from_account_id: from,
                    to_account_id: to,
                    state: TransferState::NotApplied,
                },
            });
        }

        if let Err(e) = self
            .repo
            .update_balance_if(&credited, plan.destination.balance())
            .await
        {
            warn!(
                from_account_id = %from,
                to_account_id = %to,
                error = %e,
                "Failed to credit the destination account during a transfer, rolling back"
            );
            let state = self.compensate(&plan, &debited).await;
            return Err(AccountError::Transfer {
                from_account_id: from,
                to_account_id: to,
                state,
            });
        }

        debug!(
            from_account_id = %from,
            to_account_id = %to,
            amount = plan.amount,
            "Transfer written"
        );
        Ok(debited)
    }

    /// Undo the source debit after a failed credit.
    ///
    /// The first attempt writes the original balance back. If the source
    /// moved in the meantime, the amount is re-added on top of whatever
    /// balance the conflict reports. A conflict on the last allowed attempt
    /// is treated like any other write failure.
    async fn compensate(&self, plan: &TransferPlan, debited: &Account) -> TransferState {
        let source = &plan.source;
        let mut expected = debited.balance();
        let mut restored = source.clone();

        for attempt in 0..=self.compensation_retries {
            match self.repo.update_balance_if(&restored, expected).await {
                Ok(()) => {
                    info!(
                        from_account_id = %source.id(),
                        to_account_id = %plan.destination.id(),
                        attempt,
                        "Successfully rolled back the transfer"
                    );
                    return TransferState::RolledBack;
                }
                Err(RepositoryError::Conflict { actual, .. })
                    if attempt < self.compensation_retries =>
                {
                    warn!(
                        from_account_id = %source.id(),
                        attempt,
                        actual,
                        "Source account changed before the rollback, retrying"
                    );
                    let next = actual
                        .checked_add(plan.amount)
                        .and_then(|balance| Account::new(source.id(), source.owner(), balance).ok());
                    match next {
                        Some(account) => {
                            expected = actual;
                            restored = account;
                        }
                        None => break,
                    }
                }
                Err(e) => {
                    error!(
                        from_account_id = %source.id(),
                        error = %e,
                        "Rollback write failed"
                    );
                    break;
                }
            }
        }

        error!(
            data_corruption = true,
            from_account_id = %source.id(),
            to_account_id = %plan.destination.id(),
            amount = plan.amount,
            "Unsuccessfully rolled back the transfer. Store is in a corrupted state"
        );
        TransferState::Inconsistent
    }
}
