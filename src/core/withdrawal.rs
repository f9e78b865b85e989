//! Withdrawal holds.
//!
//! Requesting a withdrawal debits `available` immediately. Completing it keeps
//! the funds out; rejecting it releases the hold back into `available`.

use crate::{
    context::Ledger,
    core::{ensure_positive, transaction::record_transaction, wallet},
    entities::{
        Money, Withdrawal, transaction::TransactionKind, wallet::Bucket, withdrawal,
        withdrawal::WithdrawalStatus,
    },
    errors::{Error, Result},
    views::WithdrawalView,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

async fn find_pending<C>(db: &C, withdrawal_id: i64) -> Result<withdrawal::Model>
where
    C: ConnectionTrait,
{
    let withdrawal = Withdrawal::find_by_id(withdrawal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("withdrawal", withdrawal_id))?;
    if withdrawal.status != WithdrawalStatus::Pending {
        return Err(Error::InvalidState {
            message: format!(
                "withdrawal {withdrawal_id} is already {:?}",
                withdrawal.status
            ),
        });
    }
    Ok(withdrawal)
}

async fn set_status<C>(
    db: &C,
    withdrawal: withdrawal::Model,
    status: WithdrawalStatus,
    now: DateTime<Utc>,
) -> Result<withdrawal::Model>
where
    C: ConnectionTrait,
{
    let mut active: withdrawal::ActiveModel = withdrawal.into();
    active.status = Set(status);
    active.updated_at = Set(now);
    active.update(db).await.map_err(Into::into)
}

/// Holds `amount` of `available` for payout.
#[instrument(skip(ledger))]
pub async fn request_withdrawal(
    ledger: &Ledger,
    user_id: i64,
    amount: Decimal,
    currency: Option<&str>,
) -> Result<WithdrawalView> {
    ensure_positive(amount)?;
    let currency = currency.unwrap_or(ledger.settings().default_currency.as_str());
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let source = wallet::get_or_create_wallet(&txn, user_id, currency, false, now).await?;
    wallet::debit(&txn, source.id, Bucket::Available, amount).await?;
    record_transaction(&txn, source.id, amount, TransactionKind::Withdraw, now).await?;

    let created = withdrawal::ActiveModel {
        user_id: Set(user_id),
        wallet_id: Set(source.id),
        amount: Set(Money(amount)),
        status: Set(WithdrawalStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(withdrawal_id = created.id, wallet_id = source.id, %amount, "withdrawal requested");
    Ok(created.into())
}

/// Lists the user's withdrawals, newest first.
pub async fn get_withdrawals(ledger: &Ledger, user_id: i64) -> Result<Vec<WithdrawalView>> {
    let withdrawals = Withdrawal::find()
        .filter(withdrawal::Column::UserId.eq(user_id))
        .order_by_desc(withdrawal::Column::CreatedAt)
        .order_by_desc(withdrawal::Column::Id)
        .all(ledger.db())
        .await?;
    Ok(withdrawals.into_iter().map(WithdrawalView::from).collect())
}

/// Marks a pending withdrawal as paid out.
#[instrument(skip(ledger))]
pub async fn complete_withdrawal(ledger: &Ledger, withdrawal_id: i64) -> Result<WithdrawalView> {
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let withdrawal = find_pending(&txn, withdrawal_id).await?;
    let completed = set_status(&txn, withdrawal, WithdrawalStatus::Completed, now).await?;

    txn.commit().await?;

    info!(withdrawal_id, "withdrawal completed");
    Ok(completed.into())
}

/// Refuses a pending withdrawal and returns the held funds to `available`.
#[instrument(skip(ledger))]
pub async fn reject_withdrawal(ledger: &Ledger, withdrawal_id: i64) -> Result<WithdrawalView> {
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let withdrawal = find_pending(&txn, withdrawal_id).await?;
    wallet::credit(&txn, withdrawal.wallet_id, Bucket::Available, withdrawal.amount.0).await?;
    record_transaction(
        &txn,
        withdrawal.wallet_id,
        withdrawal.amount.0,
        TransactionKind::Reversal,
        now,
    )
    .await?;
    let rejected = set_status(&txn, withdrawal, WithdrawalStatus::Rejected, now).await?;

    txn.commit().await?;

    info!(withdrawal_id, amount = %rejected.amount, "withdrawal rejected, hold released");
    Ok(rejected.into())
}
