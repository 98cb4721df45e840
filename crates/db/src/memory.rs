//! In-memory account repository.
//!
//! Accounts live in a [`DashMap`] keyed by account id, with a second map from
//! owner to account ids. Every write to one account runs under that key's
//! shard lock, so a conditional update is atomic for that account.

use dashmap::DashMap;
use tally_core::account::{Account, AccountRepository, RepositoryError};
use tally_shared::{AccountId, UserId};
use tracing::debug;

/// Concurrency-safe in-memory implementation of [`AccountRepository`].
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: DashMap<AccountId, Account>,
    owners: DashMap<UserId, Vec<AccountId>>,
}

impl InMemoryAccountRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if no account has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of every stored balance.
    ///
    /// Not a snapshot: concurrent writes may or may not be included.
    #[must_use]
    pub fn total_balance(&self) -> i128 {
        self.accounts
            .iter()
            .map(|entry| i128::from(entry.value().balance()))
            .sum()
    }

    fn replace(stored: &mut Account, account: &Account) -> Result<(), RepositoryError> {
        if stored.owner() != account.owner() {
            return Err(RepositoryError::Update(format!(
                "owner of account {} cannot change",
                account.id()
            )));
        }
        *stored = account.clone();
        Ok(())
    }

    fn missing(account_id: AccountId) -> RepositoryError {
        RepositoryError::Update(format!("account {account_id} does not exist"))
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn create_account(
        &self,
        owner: UserId,
        initial_balance: i64,
    ) -> Result<Account, RepositoryError> {
        let account = Account::new(AccountId::new(), owner, initial_balance)
            .map_err(|e| RepositoryError::Create(e.to_string()))?;

        self.accounts.insert(account.id(), account.clone());
        self.owners.entry(owner).or_default().push(account.id());

        debug!(account_id = %account.id(), user_id = %owner, "Account stored");
        Ok(account)
    }

    async fn update_account(&self, account: &Account) -> Result<(), RepositoryError> {
        let mut stored = self
            .accounts
            .get_mut(&account.id())
            .ok_or_else(|| Self::missing(account.id()))?;
        Self::replace(&mut stored, account)
    }

    async fn update_balance_if(
        &self,
        account: &Account,
        expected_balance: i64,
    ) -> Result<(), RepositoryError> {
        let mut stored = self
            .accounts
            .get_mut(&account.id())
            .ok_or_else(|| Self::missing(account.id()))?;

        if stored.balance() != expected_balance {
            return Err(RepositoryError::Conflict {
                account_id: account.id(),
                expected: expected_balance,
                actual: stored.balance(),
            });
        }
        Self::replace(&mut stored, account)
    }

    async fn get_account(
        &self,
        account_id: AccountId,
        owner: Option<UserId>,
    ) -> Result<Option<Account>, RepositoryError> {
        Ok(self
            .accounts
            .get(&account_id)
            .map(|entry| entry.value().clone())
            .filter(|account| owner.is_none_or(|owner| account.is_owned_by(owner))))
    }

    async fn get_accounts(&self, owner: UserId) -> Result<Vec<Account>, RepositoryError> {
        let ids = self
            .owners
            .get(&owner)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        Ok(ids
            .into_iter()
            .filter_map(|id| self.accounts.get(&id).map(|entry| entry.value().clone()))
            .collect())
    }
}
