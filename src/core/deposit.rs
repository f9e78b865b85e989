//! Deposit records.
//!
//! A deposit is only a status record until an administrator confirms it.
//! Confirmation is the single place where inbound funds reach `available`.

use crate::{
    context::Ledger,
    core::{ensure_positive, transaction::record_transaction, wallet},
    entities::{
        Deposit, Money, deposit, deposit::DepositStatus, transaction::TransactionKind,
        wallet::Bucket,
    },
    errors::{Error, Result},
    views::DepositView,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Loads a deposit and refuses anything that is no longer pending.
async fn find_pending<C>(db: &C, deposit_id: i64) -> Result<deposit::Model>
where
    C: ConnectionTrait,
{
    let deposit = Deposit::find_by_id(deposit_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("deposit", deposit_id))?;
    if deposit.status != DepositStatus::Pending {
        return Err(Error::InvalidState {
            message: format!("deposit {deposit_id} is already {:?}", deposit.status),
        });
    }
    Ok(deposit)
}

async fn set_status<C>(
    db: &C,
    deposit: deposit::Model,
    status: DepositStatus,
    now: DateTime<Utc>,
) -> Result<deposit::Model>
where
    C: ConnectionTrait,
{
    let mut active: deposit::ActiveModel = deposit.into();
    active.status = Set(status);
    active.updated_at = Set(now);
    active.update(db).await.map_err(Into::into)
}

/// Records an inbound payment announced by the user.
///
/// Nothing is credited until [`confirm_deposit`] runs.
#[instrument(skip(ledger))]
pub async fn initiate_deposit(
    ledger: &Ledger,
    user_id: i64,
    amount: Decimal,
    currency: Option<&str>,
    external_id: Option<String>,
) -> Result<DepositView> {
    ensure_positive(amount)?;
    let currency = currency.unwrap_or(ledger.settings().default_currency.as_str());
    let now = ledger.now();

    let created = deposit::ActiveModel {
        user_id: Set(user_id),
        amount: Set(Money(amount)),
        currency: Set(currency.to_string()),
        status: Set(DepositStatus::Pending),
        external_id: Set(external_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(ledger.db())
    .await?;

    info!(deposit_id = created.id, %amount, currency, "deposit initiated");
    Ok(created.into())
}

/// Reads one of the user's deposits.
pub async fn get_deposit_status(
    ledger: &Ledger,
    user_id: i64,
    deposit_id: i64,
) -> Result<DepositView> {
    Deposit::find_by_id(deposit_id)
        .filter(deposit::Column::UserId.eq(user_id))
        .one(ledger.db())
        .await?
        .map(DepositView::from)
        .ok_or_else(|| Error::not_found("deposit", deposit_id))
}

/// Credits a pending deposit to the user's wallet for its currency.
///
/// Opens the wallet when the user has none in that currency yet.
#[instrument(skip(ledger))]
pub async fn confirm_deposit(ledger: &Ledger, deposit_id: i64) -> Result<DepositView> {
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let deposit = find_pending(&txn, deposit_id).await?;
    let target =
        wallet::get_or_create_wallet(&txn, deposit.user_id, &deposit.currency, true, now).await?;
    wallet::credit(&txn, target.id, Bucket::Available, deposit.amount.0).await?;
    record_transaction(&txn, target.id, deposit.amount.0, TransactionKind::Deposit, now).await?;
    let confirmed = set_status(&txn, deposit, DepositStatus::Confirmed, now).await?;

    txn.commit().await?;

    info!(deposit_id, wallet_id = target.id, amount = %confirmed.amount, "deposit confirmed");
    Ok(confirmed.into())
}

/// Refuses a pending deposit. No funds move.
#[instrument(skip(ledger))]
pub async fn reject_deposit(ledger: &Ledger, deposit_id: i64) -> Result<DepositView> {
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let deposit = find_pending(&txn, deposit_id).await?;
    let rejected = set_status(&txn, deposit, DepositStatus::Rejected, now).await?;

    txn.commit().await?;

    info!(deposit_id, "deposit rejected");
    Ok(rejected.into())
}
