//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and identifiers
//! - `operation`: Ledger commands and their outcomes
//! - `error`: Error types for the ledger

pub mod account;
pub mod error;
pub mod operation;

pub use account::{Account, AccountId, CallerId, DEFAULT_CURRENCY};
pub use error::LedgerError;
pub use operation::{Operation, OperationOutcome, OperationType};
