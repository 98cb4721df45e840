//! Fault-injecting repository used by the unit and property tests.

use std::collections::HashMap;
use std::sync::Mutex;

use tally_shared::{AccountId, UserId};

use super::model::Account;
use super::repository::{AccountRepository, RepositoryError};

#[derive(Default)]
struct Faults {
    create: bool,
    get: bool,
    list: bool,
    update_calls: usize,
    /// Update call number (1-based) -> error returned by that call.
    updates: HashMap<usize, RepositoryError>,
    /// Update call number (1-based) -> balance forced onto an account right
    /// before that call, simulating a concurrent writer.
    interference: HashMap<usize, (AccountId, i64)>,
}

pub(crate) struct MockAccountRepository {
    accounts: Mutex<HashMap<AccountId, Account>>,
    faults: Mutex<Faults>,
}

impl MockAccountRepository {
    pub(crate) fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            faults: Mutex::new(Faults::default()),
        }
    }

    pub(crate) fn seed(&self, owner: UserId, balance: i64) -> Account {
        let account = Account::new(AccountId::new(), owner, balance).unwrap();
        self.accounts
            .lock()
            .unwrap()
            .insert(account.id(), account.clone());
        account
    }

    pub(crate) fn balance_of(&self, id: AccountId) -> i64 {
        self.accounts.lock().unwrap()[&id].balance()
    }

    pub(crate) fn fail_creates(&self) {
        self.faults.lock().unwrap().create = true;
    }

    pub(crate) fn fail_gets(&self) {
        self.faults.lock().unwrap().get = true;
    }

    pub(crate) fn fail_lists(&self) {
        self.faults.lock().unwrap().list = true;
    }

    pub(crate) fn fail_update(&self, call: usize, error: RepositoryError) {
        self.faults.lock().unwrap().updates.insert(call, error);
    }

    pub(crate) fn interfere_before_update(&self, call: usize, id: AccountId, balance: i64) {
        self.faults
            .lock()
            .unwrap()
            .interference
            .insert(call, (id, balance));
    }

    pub(crate) fn update_calls(&self) -> usize {
        self.faults.lock().unwrap().update_calls
    }

    fn begin_update(&self) -> Result<(), RepositoryError> {
        let (fault, interference) = {
            let mut faults = self.faults.lock().unwrap();
            faults.update_calls += 1;
            let call = faults.update_calls;
            (faults.updates.remove(&call), faults.interference.remove(&call))
        };

        if let Some((id, balance)) = interference {
            let mut accounts = self.accounts.lock().unwrap();
            let owner = accounts[&id].owner();
            accounts.insert(id, Account::new(id, owner, balance).unwrap());
        }

        fault.map_or(Ok(()), Err)
    }
}

impl AccountRepository for MockAccountRepository {
    async fn create_account(
        &self,
        owner: UserId,
        initial_balance: i64,
    ) -> Result<Account, RepositoryError> {
        if self.faults.lock().unwrap().create {
            return Err(RepositoryError::Create("injected".to_string()));
        }
        Account::new(AccountId::new(), owner, initial_balance)
            .map(|account| {
                self.accounts
                    .lock()
                    .unwrap()
                    .insert(account.id(), account.clone());
                account
            })
            .map_err(|e| RepositoryError::Create(e.to_string()))
    }

    async fn update_account(&self, account: &Account) -> Result<(), RepositoryError> {
        self.begin_update()?;
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(&account.id()) {
            Some(stored) => {
                *stored = account.clone();
                Ok(())
            }
            None => Err(RepositoryError::Update("no such account".to_string())),
        }
    }

    async fn update_balance_if(
        &self,
        account: &Account,
        expected_balance: i64,
    ) -> Result<(), RepositoryError> {
        self.begin_update()?;
        let mut accounts = self.accounts.lock().unwrap();
        let stored = accounts
            .get_mut(&account.id())
            .ok_or_else(|| RepositoryError::Update("no such account".to_string()))?;
        if stored.balance() != expected_balance {
            return Err(RepositoryError::Conflict {
                account_id: account.id(),
                expected: expected_balance,
                actual: stored.balance(),
            });
        }
        *stored = account.clone();
        Ok(())
    }

    async fn get_account(
        &self,
        account_id: AccountId,
        owner: Option<UserId>,
    ) -> Result<Option<Account>, RepositoryError> {
        if self.faults.lock().unwrap().get {
            return Err(RepositoryError::Get("injected".to_string()));
        }
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&account_id)
            .filter(|account| owner.is_none_or(|owner| account.is_owned_by(owner)))
            .cloned())
    }

    async fn get_accounts(&self, owner: UserId) -> Result<Vec<Account>, RepositoryError> {
        if self.faults.lock().unwrap().list {
            return Err(RepositoryError::Get("injected".to_string()));
        }
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|account| account.is_owned_by(owner))
            .cloned()
            .collect())
    }
}
