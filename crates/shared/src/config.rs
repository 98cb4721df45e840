//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Transfer engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Development seed data.
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Directory receiving the audit log.
    #[serde(default = "default_audit_dir")]
    pub audit_dir: String,
    /// Audit log file name (prefix when rotated).
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
    /// Audit log rotation: `hourly`, `daily` or `never`.
    #[serde(default = "default_audit_rotation")]
    pub audit_rotation: String,
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_audit_dir() -> String {
    "logs".to_string()
}

fn default_audit_file() -> String {
    "audit.log".to_string()
}

fn default_audit_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            audit_dir: default_audit_dir(),
            audit_file: default_audit_file(),
            audit_rotation: default_audit_rotation(),
        }
    }
}

/// Transfer engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// How many times compensation re-reads the source account after a
    /// write conflict before declaring the ledger inconsistent.
    #[serde(default = "default_compensation_retries")]
    pub compensation_retries: u32,
}

fn default_compensation_retries() -> u32 {
    3
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            compensation_retries: default_compensation_retries(),
        }
    }
}

/// Seed data for the development seeder.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Number of users to create, one account each.
    #[serde(default = "default_seed_users")]
    pub users: u32,
    /// Opening balance of every seeded account.
    #[serde(default = "default_seed_balance")]
    pub initial_balance: i64,
    /// Amount moved along the ring of seeded accounts.
    #[serde(default = "default_seed_transfer")]
    pub transfer_amount: i64,
}

fn default_seed_users() -> u32 {
    3
}

fn default_seed_balance() -> i64 {
    100
}

fn default_seed_transfer() -> i64 {
    10
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            users: default_seed_users(),
            initial_balance: default_seed_balance(),
            transfer_amount: default_seed_transfer(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
