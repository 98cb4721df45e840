//! Property-based tests for TransferEngine.
//!
//! - Conservation: a successful transfer moves exactly `amount` and keeps the total
//! - Rejection: amounts outside `1..=balance` change nothing
//! - Self-transfer: rejected regardless of amount

use std::sync::Arc;

use futures::executor::block_on;
use proptest::prelude::*;
use serde_json::json;
use tally_shared::{AccountId, UserId};
use tally_shared::config::LedgerConfig;

use super::error::AccountError;
use super::mock::MockAccountRepository;
use super::transfer::TransferEngine;

/// Strategy for opening balances.
fn balance() -> impl Strategy<Value = i64> {
    0i64..1_000_000_000
}

type Setup = (
    Arc<MockAccountRepository>,
    TransferEngine<MockAccountRepository>,
    UserId,
    AccountId,
    AccountId,
);

fn setup(from_balance: i64, to_balance: i64) -> Setup {
    let repo = Arc::new(MockAccountRepository::new());
    let user = UserId::new();
    let from = repo.seed(user, from_balance).id();
    let to = repo.seed(UserId::new(), to_balance).id();
    let engine = TransferEngine::new(Arc::clone(&repo), &LedgerConfig::default());
    (repo, engine, user, from, to)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_successful_transfer_conserves_total(
        (from_balance, amount) in (1i64..1_000_000_000).prop_flat_map(|b| (Just(b), 1..=b)),
        to_balance in balance(),
    ) {
        let (repo, engine, user, from, to) = setup(from_balance, to_balance);

        let updated = block_on(engine.transfer(user, from, to, &json!(amount))).unwrap();

        prop_assert_eq!(updated.balance(), from_balance - amount);
        prop_assert_eq!(repo.balance_of(from), from_balance - amount);
        prop_assert_eq!(repo.balance_of(to), to_balance + amount);
        prop_assert_eq!(
            repo.balance_of(from) + repo.balance_of(to),
            from_balance + to_balance
        );
    }

    #[test]
    fn prop_out_of_range_amount_is_rejected(
        from_balance in balance(),
        to_balance in balance(),
        offset in 1i64..1_000_000,
        negative in any::<bool>(),
    ) {
        let amount = if negative { 1 - offset } else { from_balance + offset };
        let (repo, engine, user, from, to) = setup(from_balance, to_balance);

        let err = block_on(engine.transfer(user, from, to, &json!(amount))).unwrap_err();

        prop_assert_eq!(
            err,
            AccountError::IllegalTransferAmount { amount: json!(amount), balance: from_balance }
        );
        prop_assert_eq!(repo.balance_of(from), from_balance);
        prop_assert_eq!(repo.balance_of(to), to_balance);
        prop_assert_eq!(repo.update_calls(), 0);
    }

    #[test]
    fn prop_self_transfer_is_rejected(
        from_balance in balance(),
        amount in any::<i64>(),
    ) {
        let (repo, engine, user, from, _) = setup(from_balance, 0);

        let err = block_on(engine.transfer(user, from, from, &json!(amount))).unwrap_err();

        prop_assert_eq!(err, AccountError::SelfTransfer { account_id: from });
        prop_assert_eq!(repo.balance_of(from), from_balance);
    }
}
