//! Rust Ledger Engine Library
//! # Overview
//!
//! An in-memory account ledger: open accounts, deposit, withdraw and transfer
//! funds, with every mutation gated by ownership of an authenticated caller
//! identity and applied atomically under concurrent access.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Operation, LedgerError, ...)
//! - [`core`] - Business logic components:
//!   - [`core::account_store`] - Account table, id allocation, per-account locks
//!   - [`core::authorization`] - Ownership policy
//!   - [`core::engine`] - Validation, authorization and atomic mutation
//!   - [`core::batch_processor`] - Concurrent batch application
//! - [`io`] - CSV operation scripts and account output
//! - [`strategy`] - Sync and async replay pipelines
//! - [`cli`] - Argument parsing and logging setup
//!
//! # Operations
//!
//! - **Open**: Create an account with a non-negative initial balance
//! - **Deposit**: Credit funds to an account owned by the caller
//! - **Withdraw**: Debit funds from an account owned by the caller
//! - **Transfer**: Move funds from an account owned by the caller to any account
//!
//! Checks always run in the same order: account existence, amount validity,
//! authorization, sufficiency of funds. A failed operation changes nothing.
//!
//! # Identity
//!
//! Callers are authenticated outside this crate. The engine receives a
//! [`CallerId`] with every mutating call and trusts it as given; a caller owns
//! the account whose id equals its identity.

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{AccountStore, AuthorizationGuard, LedgerEngine, OwnershipGuard};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, CallerId, LedgerError, Operation, OperationOutcome, OperationType,
};
