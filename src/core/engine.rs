//! Ledger engine
//!
//! This module provides the `LedgerEngine` that orchestrates every ledger
//! operation by coordinating between the `AccountStore` and an
//! `AuthorizationGuard`.
//!
//! Every operation runs its checks in the same order:
//! 1. Every referenced account exists (`AccountNotFound`)
//! 2. The amount is strictly positive (`InvalidAmount`)
//! 3. The caller owns the account being acted on, the debited account for a
//!    transfer (`Unauthorized`)
//! 4. The debited balance covers the amount (`InsufficientFunds`)
//!
//! The funds check runs under the account lock, together with the mutation,
//! so a failed operation leaves every balance untouched. Nothing is retried.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::core::account_store::AccountStore;
use crate::core::authorization::{AuthorizationGuard, OwnershipGuard};
use crate::types::{Account, AccountId, CallerId, LedgerError, Operation, OperationOutcome};

/// Ledger operation orchestrator
///
/// Shares its `AccountStore` through an `Arc`, so an engine can be wrapped in
/// an `Arc` itself and driven from many threads or tasks at once.
#[derive(Debug)]
pub struct LedgerEngine<G: AuthorizationGuard = OwnershipGuard> {
    store: Arc<AccountStore>,
    guard: G,
}

impl LedgerEngine<OwnershipGuard> {
    /// Create an engine over a fresh store with the ownership policy
    pub fn new() -> Self {
        Self::with_store(Arc::new(AccountStore::new()))
    }

    /// Create an engine over an existing store with the ownership policy
    pub fn with_store(store: Arc<AccountStore>) -> Self {
        Self::with_guard(store, OwnershipGuard)
    }
}

impl Default for LedgerEngine<OwnershipGuard> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: AuthorizationGuard> LedgerEngine<G> {
    /// Create an engine with a custom authorization policy
    pub fn with_guard(store: Arc<AccountStore>, guard: G) -> Self {
        LedgerEngine { store, guard }
    }

    pub fn store(&self) -> &Arc<AccountStore> {
        &self.store
    }

    /// Apply a single operation
    ///
    /// Routes the operation to the matching handler.
    ///
    /// # Returns
    ///
    /// * `Ok(OperationOutcome)` describing the committed effect
    /// * `Err(LedgerError)` if any check failed; nothing was changed
    pub fn apply(&self, operation: Operation) -> Result<OperationOutcome, LedgerError> {
        match operation {
            Operation::Open {
                name,
                initial_balance,
            } => self
                .create_account(name, initial_balance)
                .map(OperationOutcome::Opened),
            Operation::Deposit {
                account,
                amount,
                caller,
            } => self
                .deposit(account, amount, caller)
                .map(OperationOutcome::Balance),
            Operation::Withdraw {
                account,
                amount,
                caller,
            } => self
                .withdraw(account, amount, caller)
                .map(OperationOutcome::Balance),
            Operation::Transfer {
                from,
                to,
                amount,
                caller,
            } => self
                .transfer(from, to, amount, caller)
                .map(|(from_balance, to_balance)| OperationOutcome::Transferred {
                    from_balance,
                    to_balance,
                }),
        }
    }

    /// Open an account
    ///
    /// The new account is owned by the caller identity equal to its id.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `initial_balance` is negative
    pub fn create_account(
        &self,
        name: impl Into<String>,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        let account = self.store.create_account(name, initial_balance)?;
        debug!(account = account.id, balance = %account.balance, "account opened");
        Ok(account)
    }

    /// Snapshot of one account
    pub fn get_account(&self, account: AccountId) -> Result<Account, LedgerError> {
        self.store.get(account)
    }

    /// Snapshot of every account, sorted by id
    pub fn get_accounts(&self) -> Vec<Account> {
        self.store.get_all_accounts()
    }

    /// Credit `amount` to `account`
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound`, then `InvalidAmount`, then `Unauthorized`
    /// * `ArithmeticOverflow` if the balance would leave the decimal range
    pub fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        caller: CallerId,
    ) -> Result<Decimal, LedgerError> {
        self.ensure_exists(account)?;
        validate_amount(amount)?;
        self.guard.authorize(caller, account)?;

        let balance = self.store.update(account, |acc| {
            acc.balance = acc
                .balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", account))?;
            Ok(acc.balance)
        })?;

        debug!(account, %amount, %balance, "deposit committed");
        Ok(balance)
    }

    /// Debit `amount` from `account`
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound`, then `InvalidAmount`, then `Unauthorized`,
    ///   then `InsufficientFunds`
    pub fn withdraw(
        &self,
        account: AccountId,
        amount: Decimal,
        caller: CallerId,
    ) -> Result<Decimal, LedgerError> {
        self.ensure_exists(account)?;
        validate_amount(amount)?;
        self.guard.authorize(caller, account)?;

        let balance = self.store.update(account, |acc| {
            acc.balance = debit(acc, amount)?;
            Ok(acc.balance)
        })?;

        debug!(account, %amount, %balance, "withdraw committed");
        Ok(balance)
    }

    /// Move `amount` from `from` to `to` as one atomic paired mutation
    ///
    /// Authorization is checked against `from` only; any existing account can
    /// be credited. A transfer onto the same account runs every check and
    /// leaves the balance unchanged.
    ///
    /// # Returns
    ///
    /// `(from_balance, to_balance)` after the transfer.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` (source checked first), then `InvalidAmount`,
    ///   then `Unauthorized`, then `InsufficientFunds`
    /// * `ArithmeticOverflow` if the credit would leave the decimal range
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        caller: CallerId,
    ) -> Result<(Decimal, Decimal), LedgerError> {
        self.ensure_exists(from)?;
        self.ensure_exists(to)?;
        validate_amount(amount)?;
        self.guard.authorize(caller, from)?;

        if from == to {
            let balance = self.store.update(from, |acc| {
                // Funds check only; debit and credit cancel out
                let _ = debit(acc, amount)?;
                Ok(acc.balance)
            })?;
            debug!(account = from, %amount, "self-transfer committed");
            return Ok((balance, balance));
        }

        let (from_balance, to_balance) = self.store.update_pair(from, to, |src, dst| {
            let new_from = debit(src, amount)?;
            let new_to = dst
                .balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", to))?;

            // Both legs validated; commit together
            src.balance = new_from;
            dst.balance = new_to;
            Ok((new_from, new_to))
        })?;

        debug!(from, to, %amount, %from_balance, %to_balance, "transfer committed");
        Ok((from_balance, to_balance))
    }

    fn ensure_exists(&self, account: AccountId) -> Result<(), LedgerError> {
        if self.store.contains(account) {
            Ok(())
        } else {
            Err(LedgerError::account_not_found(account))
        }
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(LedgerError::invalid_amount(amount))
    }
}

/// Balance after debiting `amount`, without mutating the account
fn debit(account: &Account, amount: Decimal) -> Result<Decimal, LedgerError> {
    if account.balance < amount {
        return Err(LedgerError::insufficient_funds(
            account.id,
            account.balance,
            amount,
        ));
    }
    account
        .balance
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::arithmetic_overflow("debit", account.id))
}
