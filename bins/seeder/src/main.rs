//! Ledger seeder for Tally development and testing.
//!
//! Opens one account per seeded user, moves a fixed amount around the ring of
//! accounts, then reports every balance and checks the total is unchanged.
//! Audit records land in the configured audit log.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::{Context, bail};
use tally_core::account::{Account, AccountService};
use tally_db::InMemoryAccountRepository;
use tally_shared::{AppConfig, ErrorBody, UserId, telemetry};
use tracing::info;

type Service = AccountService<InMemoryAccountRepository>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let _guard = telemetry::init(&config.logging)?;

    let repo = Arc::new(InMemoryAccountRepository::new());
    let service = AccountService::new(Arc::clone(&repo), &config.ledger);

    println!("Seeding accounts...");
    let accounts = seed_accounts(&service, &config).await?;
    let opening_total = repo.total_balance();

    println!("Replaying transfers...");
    replay_ring(&service, &accounts, config.seed.transfer_amount).await?;

    println!("Rejected transfer example:");
    show_rejection(&service, &accounts).await?;

    println!("Balances:");
    for (user, account) in &accounts {
        let account = service.get_user_account(*user, account.id()).await?;
        println!("  {} (user {user}): {}", account.id(), account.balance());
    }

    let closing_total = repo.total_balance();
    println!("Total: {closing_total}");
    if closing_total != opening_total {
        bail!("total balance drifted from {opening_total} to {closing_total}");
    }

    println!("Seeding complete!");
    Ok(())
}

/// Opens one account per configured user.
async fn seed_accounts(
    service: &Service,
    config: &AppConfig,
) -> anyhow::Result<Vec<(UserId, Account)>> {
    let mut accounts = Vec::new();
    for _ in 0..config.seed.users {
        let user = UserId::new();
        let account = service
            .create_account(user, config.seed.initial_balance)
            .await?;
        info!(account_id = %account.id(), user_id = %user, "Seeded account");
        accounts.push((user, account));
    }
    Ok(accounts)
}

/// Each account sends `amount` to the next one, wrapping around.
async fn replay_ring(
    service: &Service,
    accounts: &[(UserId, Account)],
    amount: i64,
) -> anyhow::Result<()> {
    if accounts.len() < 2 {
        println!("  Fewer than two accounts, skipping...");
        return Ok(());
    }

    for (i, (user, from)) in accounts.iter().enumerate() {
        let (_, to) = &accounts[(i + 1) % accounts.len()];
        let updated = service.transfer(*user, from.id(), to.id(), amount).await?;
        println!(
            "  {} -> {}: {amount} (source now {})",
            from.id(),
            to.id(),
            updated.balance()
        );
    }
    Ok(())
}

/// Prints the error body returned for an account sending to itself.
async fn show_rejection(service: &Service, accounts: &[(UserId, Account)]) -> anyhow::Result<()> {
    let Some((user, account)) = accounts.first() else {
        return Ok(());
    };

    match service.transfer(*user, account.id(), account.id(), 1).await {
        Ok(_) => bail!("self-transfer was accepted"),
        Err(err) => {
            let body = ErrorBody::from(err);
            if !body.is_client_error() {
                bail!("self-transfer failed unexpectedly: {body}");
            }
            println!("  {body}");
            println!("  {}", serde_json::to_string(&body)?);
            Ok(())
        }
    }
}
