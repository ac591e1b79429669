//! Authorization policy for ledger operations
//!
//! The engine asks an `AuthorizationGuard` whether an authenticated caller may
//! act on an account. The guard is a pure policy check: no I/O, no state.

use crate::types::{AccountId, CallerId, LedgerError};

/// Decides whether a caller may act on an account
pub trait AuthorizationGuard: Send + Sync {
    /// `Ok(())` when `caller` may mutate `account`, otherwise
    /// `Err(LedgerError::Unauthorized)`.
    fn authorize(&self, caller: CallerId, account: AccountId) -> Result<(), LedgerError>;
}

/// Ownership-only policy
///
/// A caller may act on an account iff its identity equals the account id.
/// No delegation, roles or shared ownership.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipGuard;

impl AuthorizationGuard for OwnershipGuard {
    fn authorize(&self, caller: CallerId, account: AccountId) -> Result<(), LedgerError> {
        if caller.as_account_id() == account {
            Ok(())
        } else {
            Err(LedgerError::unauthorized(caller, account))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::owner(1, 1, true)]
    #[case::other_account(1, 2, false)]
    #[case::reverse(2, 1, false)]
    #[case::large_ids(u64::MAX, u64::MAX, true)]
    fn test_ownership_guard(#[case] caller: u64, #[case] account: u64, #[case] allowed: bool) {
        let result = OwnershipGuard.authorize(CallerId::new(caller), account);

        if allowed {
            assert_eq!(result, Ok(()));
        } else {
            assert_eq!(
                result,
                Err(LedgerError::unauthorized(CallerId::new(caller), account))
            );
        }
    }
}
