//! Account-related types for the ledger
//!
//! This module defines the Account structure and the identifiers used to
//! address accounts and the principals acting on them.

use rust_decimal::Decimal;
use std::fmt;

/// Account identifier
///
/// Allocated by the store from a monotonically increasing counter starting at 1.
/// Identifiers are never reused.
pub type AccountId = u64;

/// Currency assigned to accounts when none is configured
pub const DEFAULT_CURRENCY: &str = "USD";

/// Ledger account state
///
/// `id`, `name` and `currency` are fixed when the account is opened; only the
/// balance changes afterwards, and only through deposit, withdraw and transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Unique identifier, also the identity of the account owner
    pub id: AccountId,

    /// Display name given at creation
    pub name: String,

    /// Current balance, never negative
    pub balance: Decimal,

    /// Currency code fixed at creation (no conversion is ever performed)
    pub currency: String,
}

impl Account {
    /// Create a new account snapshot
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier allocated by the store
    /// * `name` - Display name
    /// * `balance` - Opening balance (validated by the caller to be non-negative)
    /// * `currency` - Currency code for the account
    pub fn new(
        id: AccountId,
        name: impl Into<String>,
        balance: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Account {
            id,
            name: name.into(),
            balance,
            currency: currency.into(),
        }
    }
}

/// Authenticated caller identity
///
/// Produced by an external identity provider and trusted as given. A caller
/// owns exactly the account whose id equals its own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallerId(AccountId);

impl CallerId {
    pub fn new(id: AccountId) -> Self {
        Self(id)
    }

    pub fn as_account_id(&self) -> AccountId {
        self.0
    }
}

impl From<AccountId> for CallerId {
    fn from(value: AccountId) -> Self {
        Self(value)
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
