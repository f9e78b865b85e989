//! Core business logic - the ledger engines.
//!
//! Every public operation takes the [`Ledger`](crate::context::Ledger) handle
//! and an authenticated user id, runs its read-check-write sequence inside one
//! store transaction, and returns a view from [`crate::views`].

/// Account opening: wallet, investor profile and referral code
pub mod account;
/// Deposit status records and their administrative confirmation
pub mod deposit;
/// Investment creation, accrual and encashment
pub mod investment;
/// Referral codes and attributed signups
pub mod referral;
/// VIP ladder catalog and purchases
pub mod subscription;
/// Append-only audit trail
pub mod transaction;
/// Bucket-to-bucket transfers under the lock policy
pub mod transfer;
/// Wallet accessor: lookups, debits and credits
pub mod wallet;
/// Withdrawal holds and their release
pub mod withdrawal;

use crate::errors::{Error, Result};
use rust_decimal::Decimal;

/// Rejects zero and negative amounts.
pub(crate) fn ensure_positive(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}
