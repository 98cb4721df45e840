//! Accounts and transfers.
//!
//! - Account entity and its invariants
//! - Repository port implemented by the db crate
//! - Amount validation
//! - Transfer engine with compensating rollback
//! - Service facade and audit records

pub mod audit;
pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod transfer;
pub mod validation;

#[cfg(test)]
mod log_capture;
#[cfg(test)]
mod mock;
#[cfg(test)]
mod transfer_props;

pub use error::{AccountError, TransferState};
pub use model::Account;
pub use repository::{AccountRepository, RepositoryError};
pub use service::AccountService;
pub use transfer::{TransferEngine, TransferPlan};
