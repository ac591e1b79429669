//! Thread-safe account storage
//!
//! This module provides the `AccountStore` struct, which owns every account,
//! allocates account ids and gives atomic read/mutate access to one account or
//! to a pair of accounts.
//!
//! # Design
//!
//! Accounts live in a `DashMap` keyed by id. Each entry holds its own
//! `Mutex<Account>`, so a mutation locks only the accounts it touches and
//! operations on disjoint accounts run in parallel. The map guard is released
//! before any account lock is taken; accounts are never removed, so a handle
//! obtained from the map stays valid.
//!
//! # Lock Ordering
//!
//! A paired mutation always locks the lower id first. Two transfers moving
//! funds in opposite directions between the same accounts therefore contend
//! for the same first lock instead of deadlocking.
//!
//! # Id Allocation
//!
//! Ids come from an `AtomicU64` starting at 1, independent of account locks.
//! Every allocated id is unique and larger than all earlier ones.

use crate::types::{Account, AccountId, LedgerError, DEFAULT_CURRENCY};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type AccountHandle = Arc<Mutex<Account>>;

/// Concurrent account table with per-account locking
#[derive(Debug)]
pub struct AccountStore {
    /// Account table; each value is independently lockable
    accounts: DashMap<AccountId, AccountHandle>,

    /// Next id to hand out
    next_id: AtomicU64,

    /// Currency assigned to every account this store opens
    currency: String,
}

impl AccountStore {
    /// Create an empty store opening accounts in the default currency
    pub fn new() -> Self {
        Self::with_currency(DEFAULT_CURRENCY)
    }

    /// Create an empty store opening accounts in `currency`
    pub fn with_currency(currency: impl Into<String>) -> Self {
        Self {
            accounts: DashMap::new(),
            next_id: AtomicU64::new(1),
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Open a new account
    ///
    /// Safe to call concurrently: each call receives a distinct id, larger than
    /// every id handed out before it.
    ///
    /// # Returns
    ///
    /// * `Ok(Account)` - Snapshot of the newly created account
    /// * `Err(LedgerError::InvalidAmount)` if `initial_balance` is negative;
    ///   no id is consumed in that case
    pub fn create_account(
        &self,
        name: impl Into<String>,
        initial_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        if initial_balance < Decimal::ZERO {
            return Err(LedgerError::invalid_amount(initial_balance));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let account = Account::new(id, name, initial_balance, self.currency.as_str());
        self.accounts
            .insert(id, Arc::new(Mutex::new(account.clone())));

        Ok(account)
    }

    /// Whether an account with this id exists
    pub fn contains(&self, id: AccountId) -> bool {
        self.accounts.contains_key(&id)
    }

    /// Snapshot of one account
    ///
    /// The returned value is a copy; later mutations are not reflected in it.
    pub fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        let handle = self.handle(id)?;
        let account = lock(&handle).clone();
        Ok(account)
    }

    /// Apply `f` to a single account while holding its lock
    ///
    /// The closure either mutates and returns `Ok`, or returns `Err` without
    /// mutating. No other operation on this account can interleave with it.
    pub fn update<F, R>(&self, id: AccountId, f: F) -> Result<R, LedgerError>
    where
        F: FnOnce(&mut Account) -> Result<R, LedgerError>,
    {
        let handle = self.handle(id)?;
        let mut account = lock(&handle);
        f(&mut account)
    }

    /// Apply `f` to two distinct accounts while holding both locks
    ///
    /// Locks are acquired in ascending id order regardless of argument order.
    /// The closure receives the accounts in argument order (`from`, `to`).
    /// Other operations observe either none or all of the closure's effects.
    ///
    /// # Returns
    ///
    /// * `Err(LedgerError::AccountNotFound)` if either account is absent
    /// * `Err(LedgerError::SameAccount)` if `from == to`
    /// * Otherwise whatever `f` returns
    pub fn update_pair<F, R>(&self, from: AccountId, to: AccountId, f: F) -> Result<R, LedgerError>
    where
        F: FnOnce(&mut Account, &mut Account) -> Result<R, LedgerError>,
    {
        let from_handle = self.handle(from)?;
        let to_handle = self.handle(to)?;

        if from == to {
            return Err(LedgerError::same_account(from));
        }

        if from < to {
            let mut from_account = lock(&from_handle);
            let mut to_account = lock(&to_handle);
            f(&mut from_account, &mut to_account)
        } else {
            let mut to_account = lock(&to_handle);
            let mut from_account = lock(&from_handle);
            f(&mut from_account, &mut to_account)
        }
    }

    /// Snapshot of every account, sorted by id
    ///
    /// Each account is read under its own lock; the snapshot as a whole is not
    /// taken atomically across accounts.
    pub fn get_all_accounts(&self) -> Vec<Account> {
        let handles: Vec<AccountHandle> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut accounts: Vec<Account> = handles.iter().map(|h| lock(h).clone()).collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Clone the account handle out of the map so the shard guard is dropped
    /// before the account lock is taken.
    fn handle(&self, id: AccountId) -> Result<AccountHandle, LedgerError> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::account_not_found(id))
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}

// Closures validate before they mutate, so a poisoned account is still consistent.
fn lock(handle: &Mutex<Account>) -> MutexGuard<'_, Account> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}
