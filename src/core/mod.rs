//! Core business logic module
//!
//! This module contains the ledger components:
//! - `account_store` - Account table, id allocation, per-account locking
//! - `authorization` - Ownership policy deciding who may act on an account
//! - `engine` - Operation orchestration (validation, authorization, mutation)
//! - `batch_processor` - Concurrent application of operation batches

pub mod account_store;
pub mod authorization;
pub mod batch_processor;
pub mod engine;

pub use account_store::AccountStore;
pub use authorization::{AuthorizationGuard, OwnershipGuard};
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::LedgerEngine;
