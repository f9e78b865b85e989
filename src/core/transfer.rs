//! Transfer engine - moves funds from `gains` or `saleBalance` into `available`.
//!
//! Sale-balance transfers are limited by the principal of the user's active
//! investments that are older than the lock period. The limit looks at the age
//! of the investments, not at when the funds entered `saleBalance`.

use crate::{
    context::Ledger,
    core::{transaction::record_transaction, wallet},
    entities::{Investment, investment, transaction::TransactionKind, wallet::Bucket},
    errors::{Error, Result},
    views::WalletView,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{info, instrument};

/// Bucket a transfer draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferSource {
    /// Collected interest
    Gains,
    /// Sale proceeds under lock
    Sale,
}

impl TransferSource {
    /// Wallet bucket backing this source.
    #[must_use]
    pub const fn bucket(self) -> Bucket {
        match self {
            Self::Gains => Bucket::Gains,
            Self::Sale => Bucket::SaleBalance,
        }
    }

    /// Wire name of this source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gains => "gains",
            Self::Sale => "sale",
        }
    }
}

impl fmt::Display for TransferSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gains" => Ok(Self::Gains),
            "sale" => Ok(Self::Sale),
            other => Err(Error::InvalidSource {
                value: other.to_string(),
            }),
        }
    }
}

/// Principal of the user's active investments created on or before the lock cutoff.
pub async fn withdrawable_principal<C>(
    db: &C,
    user_id: i64,
    now: DateTime<Utc>,
    lock_days: i64,
) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let cutoff = now - Duration::days(lock_days);
    let active = Investment::find()
        .filter(investment::Column::UserId.eq(user_id))
        .filter(investment::Column::Active.eq(true))
        .all(db)
        .await?;

    Ok(active
        .iter()
        .filter(|inv| inv.created_at <= cutoff)
        .map(|inv| inv.amount.0)
        .sum())
}

/// Moves `amount` from `source` into `available` on a wallet the user owns.
///
/// Appends a `transfer` record. Fails with `LockedFunds` when a sale-balance
/// transfer exceeds the unlocked principal.
#[instrument(skip(ledger))]
pub async fn transfer(
    ledger: &Ledger,
    user_id: i64,
    wallet_id: i64,
    amount: Decimal,
    source: TransferSource,
) -> Result<WalletView> {
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let owned = wallet::find_owned_wallet(&txn, user_id, wallet_id).await?;
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }

    if source == TransferSource::Sale {
        if owned.sale_balance.0 <= Decimal::ZERO {
            return Err(Error::InsufficientFunds {
                bucket: Bucket::SaleBalance,
                current: owned.sale_balance.0,
                required: amount,
            });
        }

        let withdrawable =
            withdrawable_principal(&txn, user_id, now, ledger.settings().sale_lock_days).await?;
        if withdrawable < amount {
            return Err(Error::LockedFunds {
                withdrawable,
                requested: amount,
            });
        }
    }

    let updated =
        wallet::move_between(&txn, owned.id, source.bucket(), Bucket::Available, amount).await?;
    record_transaction(&txn, owned.id, amount, TransactionKind::Transfer, now).await?;

    txn.commit().await?;

    info!(wallet_id, %amount, %source, "transfer completed");
    Ok(updated.into())
}
