//! Investment accrual engine.
//!
//! An investment is `Active` until it is encashed, then `Inactive` forever.
//! Interest is `amount * daily_rate * whole_days` where `whole_days` counts
//! complete 24-hour periods since `last_accrual`; partial days never accrue.
//! Accrued interest stays on the investment until encash sweeps it into the
//! wallet's `gains` bucket.
//!
//! Writes to an investment are guarded by its `version` column. Two accruals
//! that read the same `last_accrual` cannot both commit: the second one matches
//! zero rows and fails with `Conflict`.

use crate::{
    context::Ledger,
    core::{account, ensure_positive, transaction::record_transaction, wallet},
    entities::{Investment, Money, investment, transaction::TransactionKind, wallet::Bucket},
    errors::{Error, Result},
    views::InvestmentView,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{error, info, instrument, warn};

/// Number of complete days between `since` and `now`.
///
/// Negative spans (clock moved backwards) count as zero days.
#[must_use]
pub fn whole_days_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_days().max(0)
}

/// Interest owed for `days` whole days, truncated toward zero at `scale` decimals.
#[must_use]
pub fn interest_for(amount: Decimal, daily_rate: Decimal, days: i64, scale: u32) -> Decimal {
    (amount * daily_rate * Decimal::from(days))
        .round_dp_with_strategy(scale, RoundingStrategy::ToZero)
}

/// Loads an investment, failing with `NotFound` unless `user_id` owns it.
async fn find_owned_investment<C>(
    db: &C,
    user_id: i64,
    investment_id: i64,
) -> Result<investment::Model>
where
    C: ConnectionTrait,
{
    Investment::find_by_id(investment_id)
        .filter(investment::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("investment", investment_id))
}

/// Loads an owned investment and refuses inactive ones.
async fn find_active_investment<C>(
    db: &C,
    user_id: i64,
    investment_id: i64,
) -> Result<investment::Model>
where
    C: ConnectionTrait,
{
    let investment = find_owned_investment(db, user_id, investment_id).await?;
    if !investment.active {
        return Err(Error::InvalidState {
            message: format!("investment {investment_id} is not active"),
        });
    }
    Ok(investment)
}

/// Commits a new accrual state if nobody else wrote the row since it was read.
async fn write_guarded<C>(
    db: &C,
    observed: &investment::Model,
    accrued: Decimal,
    last_accrual: DateTime<Utc>,
    active: bool,
) -> Result<investment::Model>
where
    C: ConnectionTrait,
{
    let result = Investment::update_many()
        .col_expr(investment::Column::Accrued, Expr::value(Money(accrued)))
        .col_expr(investment::Column::LastAccrual, Expr::value(last_accrual))
        .col_expr(investment::Column::Active, Expr::value(active))
        .col_expr(
            investment::Column::Version,
            Expr::col(investment::Column::Version).add(1),
        )
        .filter(investment::Column::Id.eq(observed.id))
        .filter(investment::Column::Version.eq(observed.version))
        .filter(investment::Column::Active.eq(true))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::Conflict {
            entity: "investment",
            id: observed.id,
        });
    }

    Investment::find_by_id(observed.id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("investment", observed.id))
}

/// Commits `amount` of the user's `available` balance to a new investment.
///
/// Moves `amount` from `available` to `invested` on the wallet for `currency`
/// (the configured default when `None`), inserts the investment with a fresh
/// accrual clock, and bumps the investor's lifetime total. All in one
/// transaction.
#[instrument(skip(ledger))]
pub async fn create_investment(
    ledger: &Ledger,
    user_id: i64,
    amount: Decimal,
    currency: Option<&str>,
    daily_rate: Option<Decimal>,
) -> Result<InvestmentView> {
    ensure_positive(amount)?;
    let settings = ledger.settings();
    let daily_rate = daily_rate.unwrap_or(settings.default_daily_rate);
    if daily_rate.is_sign_negative() {
        return Err(Error::InvalidAmount { amount: daily_rate });
    }
    let currency = currency.unwrap_or(settings.default_currency.as_str());
    let now = ledger.now();

    let txn = ledger.db().begin().await?;

    let wallet = wallet::get_or_create_wallet(&txn, user_id, currency, false, now).await?;
    wallet::move_between(&txn, wallet.id, Bucket::Available, Bucket::Invested, amount).await?;

    let created = investment::ActiveModel {
        user_id: Set(user_id),
        wallet_id: Set(wallet.id),
        amount: Set(Money(amount)),
        daily_rate: Set(Money(daily_rate)),
        accrued: Set(Money::ZERO),
        last_accrual: Set(now),
        active: Set(true),
        version: Set(0),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    account::add_to_total_invested(&txn, user_id, amount, now).await?;

    txn.commit().await?;

    info!(
        investment_id = created.id,
        wallet_id = wallet.id,
        %amount,
        %daily_rate,
        "investment created"
    );
    Ok(created.into())
}

/// Posts interest for every whole day since the last accrual.
///
/// Fails with `TooEarly` when less than one day has elapsed, so the same day
/// can never be counted twice. Wallet buckets are not touched; the interest
/// stays on the investment until it is encashed.
#[instrument(skip(ledger))]
pub async fn accrue_investment(
    ledger: &Ledger,
    user_id: i64,
    investment_id: i64,
) -> Result<InvestmentView> {
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let investment = find_active_investment(&txn, user_id, investment_id).await?;

    let days = whole_days_elapsed(investment.last_accrual, now);
    if days < 1 {
        return Err(Error::TooEarly {
            next_accrual_at: investment.last_accrual + Duration::days(1),
        });
    }

    let interest = interest_for(
        investment.amount.0,
        investment.daily_rate.0,
        days,
        ledger.settings().interest_scale,
    );
    let accrued = investment.accrued.0 + interest;

    let updated = write_guarded(&txn, &investment, accrued, now, true).await?;
    record_transaction(&txn, investment.wallet_id, interest, TransactionKind::Interest, now)
        .await?;

    txn.commit().await?;

    info!(investment_id, days, %interest, %accrued, "interest accrued");
    Ok(updated.into())
}

/// Settles outstanding interest into `gains` and closes the investment.
///
/// Whole days elapsed since the last accrual are settled first, even if
/// `accrue` was never called. The investment ends inactive with `accrued`
/// reset to zero. Principal stays in the wallet's `invested` bucket.
#[instrument(skip(ledger))]
pub async fn encash_investment(
    ledger: &Ledger,
    user_id: i64,
    investment_id: i64,
) -> Result<InvestmentView> {
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let investment = find_active_investment(&txn, user_id, investment_id).await?;

    let days = whole_days_elapsed(investment.last_accrual, now);
    let (settled, last_accrual) = if days >= 1 {
        let interest = interest_for(
            investment.amount.0,
            investment.daily_rate.0,
            days,
            ledger.settings().interest_scale,
        );
        (interest, now)
    } else {
        (Decimal::ZERO, investment.last_accrual)
    };
    let final_accrued = investment.accrued.0 + settled;

    let updated = write_guarded(&txn, &investment, Decimal::ZERO, last_accrual, false).await?;

    if final_accrued > Decimal::ZERO {
        wallet::credit(&txn, investment.wallet_id, Bucket::Gains, final_accrued).await?;
    }
    record_transaction(
        &txn,
        investment.wallet_id,
        final_accrued,
        TransactionKind::Encash,
        now,
    )
    .await?;

    txn.commit().await?;

    info!(investment_id, %settled, %final_accrued, "investment encashed");
    Ok(updated.into())
}

/// Lists the user's investments, newest first.
pub async fn get_investments(ledger: &Ledger, user_id: i64) -> Result<Vec<InvestmentView>> {
    let investments = Investment::find()
        .filter(investment::Column::UserId.eq(user_id))
        .order_by_desc(investment::Column::CreatedAt)
        .order_by_desc(investment::Column::Id)
        .all(ledger.db())
        .await?;
    Ok(investments.into_iter().map(InvestmentView::from).collect())
}

/// Outcome of one accrual sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccrualSweepSummary {
    /// Active investments inspected
    pub scanned: usize,
    /// Investments that received interest
    pub accrued: usize,
    /// Investments skipped (not yet due, or raced by another writer)
    pub skipped: usize,
    /// Investments whose accrual failed for another reason
    pub failed: usize,
    /// Interest posted across all accrued investments
    pub total_interest: Decimal,
}

/// Accrues every active investment that has at least one whole day pending.
///
/// Each investment runs the regular [`accrue_investment`] in its own
/// transaction, so one failure never rolls back the others.
#[instrument(skip(ledger))]
pub async fn accrue_due_investments(ledger: &Ledger) -> Result<AccrualSweepSummary> {
    let now = ledger.now();
    let active = Investment::find()
        .filter(investment::Column::Active.eq(true))
        .order_by_asc(investment::Column::Id)
        .all(ledger.db())
        .await?;

    let mut summary = AccrualSweepSummary {
        scanned: active.len(),
        ..Default::default()
    };

    for investment in active {
        if whole_days_elapsed(investment.last_accrual, now) < 1 {
            summary.skipped += 1;
            continue;
        }

        match accrue_investment(ledger, investment.user_id, investment.id).await {
            Ok(updated) => {
                summary.accrued += 1;
                summary.total_interest += updated.accrued - investment.accrued.0;
            }
            Err(e @ (Error::TooEarly { .. } | Error::Conflict { .. })) => {
                warn!(investment_id = investment.id, "skipping accrual: {e}");
                summary.skipped += 1;
            }
            Err(e) => {
                error!(investment_id = investment.id, "accrual failed: {e}");
                summary.failed += 1;
            }
        }
    }

    info!(
        scanned = summary.scanned,
        accrued = summary.accrued,
        skipped = summary.skipped,
        failed = summary.failed,
        total_interest = %summary.total_interest,
        "accrual sweep finished"
    );
    Ok(summary)
}
