//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO storage or transport
//! dependencies. Persistence is reached through the
//! [`account::AccountRepository`] port, implemented by the db crate.
//!
//! # Modules
//!
//! - `account` - Accounts, transfers with compensating rollback, and the
//!   service facade exposed to callers

pub mod account;
