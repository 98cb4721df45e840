//! Audit records.
//!
//! Emitted as `tracing` events on the audit target; the subscriber decides
//! where they end up. Emission cannot fail the calling operation.

use tally_shared::telemetry::AUDIT_TARGET;
use tally_shared::{AccountId, UserId};
use tracing::info;

use super::model::Account;

/// Records a newly created account.
pub fn account_created(account: &Account) {
    info!(
        target: AUDIT_TARGET,
        account_id = %account.id(),
        user_id = %account.owner(),
        "Account created"
    );
}

/// Records a completed transfer.
pub fn transfer_completed(user_id: UserId, from: AccountId, to: AccountId, amount: i64) {
    info!(
        target: AUDIT_TARGET,
        from_account_id = %from,
        to_account_id = %to,
        user_id = %user_id,
        amount,
        "Transferred an amount between two accounts"
    );
}
