//! Storage layer for Tally.
//!
//! This crate provides:
//! - `InMemoryAccountRepository`, a concurrency-safe keyed account store with
//!   an owner index, implementing the core `AccountRepository` port

pub mod memory;

pub use memory::InMemoryAccountRepository;
