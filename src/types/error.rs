//! Error types for the ledger
//!
//! This module defines every failure an operation or a replay run can report.
//!
//! # Error Categories
//!
//! - **Ledger Errors**: Unknown account, invalid amount, unauthorized caller,
//!   insufficient funds. Local and recoverable; the engine stays usable and
//!   no balance changes.
//! - **Arithmetic Errors**: A credit that would overflow the decimal range
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed rows, unknown operation types, missing columns

use std::path::Path;

use rust_decimal::Decimal;
use thiserror::Error;

use super::account::{AccountId, CallerId};

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Referenced account does not exist
    #[error("Account {account} does not exist")]
    AccountNotFound {
        /// The account id that was not found
        account: AccountId,
    },

    /// Amount is missing, non-numeric, zero or negative
    #[error("Invalid amount '{amount}': the sum must be greater than 0")]
    InvalidAmount {
        /// The rejected amount as given
        amount: String,
    },

    /// Caller does not own the account being acted on
    #[error("Caller {caller} has insufficient access rights for account {account}")]
    Unauthorized {
        /// Authenticated caller
        caller: CallerId,
        /// Account the caller tried to act on
        account: AccountId,
    },

    /// Withdraw or transfer would drive the balance negative
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account being debited
        account: AccountId,
        /// Balance at the time of the check
        balance: Decimal,
        /// Requested debit
        requested: Decimal,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected and the account keeps its balance.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account whose balance would overflow
        account: AccountId,
    },

    /// Paired mutation requested on a single account
    #[error("Paired mutation requires two distinct accounts, got {account} twice")]
    SameAccount {
        /// The duplicated account id
        account: AccountId,
    },

    /// File not found at the specified path
    ///
    /// Fatal to a replay run.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// The malformed row is skipped and the run continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Unknown operation type in an input row
    #[error("Invalid operation type '{op_type}'")]
    InvalidOperationType {
        /// The unrecognized type string
        op_type: String,
    },

    /// A column required by the operation type is empty
    #[error("{op_type} operation requires the '{field}' column")]
    MissingField {
        /// Operation type being parsed
        op_type: String,
        /// Name of the missing column
        field: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            return LedgerError::IoError {
                message: error.to_string(),
            };
        }

        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountId) -> Self {
        LedgerError::AccountNotFound { account }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
        }
    }

    /// Create an Unauthorized error
    pub fn unauthorized(caller: CallerId, account: AccountId) -> Self {
        LedgerError::Unauthorized { caller, account }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a SameAccount error
    pub fn same_account(account: AccountId) -> Self {
        LedgerError::SameAccount { account }
    }

    /// Map a failure to open `path` for reading
    ///
    /// A missing file becomes `FileNotFound`; anything else is an `IoError`.
    pub fn open_failed(path: &Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            LedgerError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            LedgerError::IoError {
                message: format!("Failed to open '{}': {}", path.display(), error),
            }
        }
    }

    /// Create a ParseError for a row of the input
    pub fn parse_error(line: u64, message: impl ToString) -> Self {
        LedgerError::ParseError {
            line: Some(line),
            message: message.to_string(),
        }
    }

    /// Create an InvalidOperationType error
    pub fn invalid_operation_type(op_type: &str) -> Self {
        LedgerError::InvalidOperationType {
            op_type: op_type.to_string(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(op_type: &str, field: &str) -> Self {
        LedgerError::MissingField {
            op_type: op_type.to_string(),
            field: field.to_string(),
        }
    }

    /// Suggested HTTP status for a transport binding
    ///
    /// 404 for unknown accounts, 403 for ownership failures, 400 for every
    /// other caller mistake, 500 for I/O failures of the host process.
    pub fn status_code(&self) -> u16 {
        match self {
            LedgerError::AccountNotFound { .. } => 404,
            LedgerError::Unauthorized { .. } => 403,
            LedgerError::InvalidAmount { .. }
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::ArithmeticOverflow { .. }
            | LedgerError::SameAccount { .. }
            | LedgerError::ParseError { .. }
            | LedgerError::InvalidOperationType { .. }
            | LedgerError::MissingField { .. } => 400,
            LedgerError::FileNotFound { .. } | LedgerError::IoError { .. } => 500,
        }
    }
}
