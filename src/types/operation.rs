//! Operation types for the ledger
//!
//! This module defines the commands accepted by the engine and the outcomes
//! they produce on success.

use super::account::{Account, AccountId, CallerId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kinds of operation the ledger accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Open a new account with an initial balance
    Open,

    /// Credit funds to an account owned by the caller
    Deposit,

    /// Debit funds from an account owned by the caller
    ///
    /// Requires a balance at least equal to the amount.
    Withdraw,

    /// Move funds from an account owned by the caller to any other account
    Transfer,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Open => "open",
            OperationType::Deposit => "deposit",
            OperationType::Withdraw => "withdraw",
            OperationType::Transfer => "transfer",
        }
    }
}

/// A single ledger command with validated-shape arguments
///
/// Every mutating variant carries the authenticated caller explicitly; the
/// engine never reads identity from ambient state.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Open {
        name: String,
        initial_balance: Decimal,
    },
    Deposit {
        account: AccountId,
        amount: Decimal,
        caller: CallerId,
    },
    Withdraw {
        account: AccountId,
        amount: Decimal,
        caller: CallerId,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        caller: CallerId,
    },
}

impl Operation {
    pub fn operation_type(&self) -> OperationType {
        match self {
            Operation::Open { .. } => OperationType::Open,
            Operation::Deposit { .. } => OperationType::Deposit,
            Operation::Withdraw { .. } => OperationType::Withdraw,
            Operation::Transfer { .. } => OperationType::Transfer,
        }
    }

    /// The account this operation addresses first: the credited account for a
    /// deposit, the debited account for a withdraw or transfer.
    ///
    /// `None` for `Open`, which has no account until the store allocates one.
    pub fn primary_account(&self) -> Option<AccountId> {
        match self {
            Operation::Open { .. } => None,
            Operation::Deposit { account, .. } | Operation::Withdraw { account, .. } => {
                Some(*account)
            }
            Operation::Transfer { from, .. } => Some(*from),
        }
    }
}

/// Result of a successfully applied operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    /// The account created by `Open`
    Opened(Account),

    /// New balance after a deposit or withdraw
    Balance(Decimal),

    /// Balances of both endpoints after a transfer
    Transferred {
        from_balance: Decimal,
        to_balance: Decimal,
    },
}
