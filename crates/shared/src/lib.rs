//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for users and accounts
//! - The transport-neutral error body every failure renders to
//! - Configuration management
//! - Tracing subscriber setup, including the audit log sink

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::AppConfig;
pub use error::ErrorBody;
pub use types::{AccountId, UserId};
