//! Account entity.

use serde::Serialize;
use serde_json::json;
use tally_shared::{AccountId, UserId};

use super::error::AccountError;

/// A balance record owned by exactly one user.
///
/// `id` and `owner` are fixed at construction. The balance is never negative;
/// a new balance means a new `Account` value built through [`Account::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    id: AccountId,
    owner: UserId,
    balance: i64,
}

impl Account {
    /// Creates an account value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInitialBalance` if `balance` is negative.
    pub fn new(id: AccountId, owner: UserId, balance: i64) -> Result<Self, AccountError> {
        if balance < 0 {
            return Err(AccountError::InvalidInitialBalance {
                balance: json!(balance),
            });
        }
        Ok(Self { id, owner, balance })
    }

    /// The account identifier.
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// The owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> i64 {
        self.balance
    }

    /// Returns true if `user_id` owns this account.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner == user_id
    }
}
