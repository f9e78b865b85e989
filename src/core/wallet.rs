//! Wallet accessor - Reads and writes a user's bucket balances.
//!
//! Balances are computed in Rust and written back with
//! `UPDATE wallets SET bucket = ?, version = version + 1 WHERE id = ? AND version = ?`.
//! A writer that read a stale row affects zero rows and gets
//! [`Error::Conflict`], so a bucket can never go negative even when two
//! writers race. All helpers accept any connection so engines can call them
//! inside their open transaction.

use crate::{
    context::Ledger,
    core::ensure_positive,
    entities::{Money, Wallet, wallet, wallet::Bucket},
    errors::{Error, Result},
    views::WalletView,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::debug;

/// Finds a wallet by its id.
pub async fn find_wallet_by_id<C>(db: &C, wallet_id: i64) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    Wallet::find_by_id(wallet_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("wallet", wallet_id))
}

/// Finds a wallet by id, failing with `NotFound` unless `user_id` owns it.
pub async fn find_owned_wallet<C>(db: &C, user_id: i64, wallet_id: i64) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    Wallet::find_by_id(wallet_id)
        .filter(wallet::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("wallet", wallet_id))
}

/// Returns the wallet for (user, currency).
///
/// When none exists, a zeroed wallet is opened if `create_if_missing` is set;
/// otherwise the lookup fails with `NotFound`.
pub async fn get_or_create_wallet<C>(
    db: &C,
    user_id: i64,
    currency: &str,
    create_if_missing: bool,
    now: DateTime<Utc>,
) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    let existing = Wallet::find()
        .filter(wallet::Column::UserId.eq(user_id))
        .filter(wallet::Column::Currency.eq(currency))
        .one(db)
        .await?;

    match existing {
        Some(wallet) => Ok(wallet),
        None if create_if_missing => {
            debug!(user_id, currency, "opening wallet");
            let wallet = wallet::ActiveModel {
                user_id: Set(user_id),
                currency: Set(currency.to_string()),
                available: Set(Money::ZERO),
                pending: Set(Money::ZERO),
                gains: Set(Money::ZERO),
                sale_balance: Set(Money::ZERO),
                invested: Set(Money::ZERO),
                version: Set(0),
                created_at: Set(now),
                ..Default::default()
            };
            wallet.insert(db).await.map_err(Into::into)
        }
        None => Err(Error::not_found("wallet", format!("{user_id}/{currency}"))),
    }
}

/// Writes `balance` into `bucket` if the wallet is still at `current.version`.
async fn write_balance<C>(
    db: &C,
    current: &wallet::Model,
    bucket: Bucket,
    balance: Decimal,
) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    let result = Wallet::update_many()
        .col_expr(bucket.column(), Expr::value(Money(balance)))
        .col_expr(
            wallet::Column::Version,
            Expr::col(wallet::Column::Version).add(1),
        )
        .filter(wallet::Column::Id.eq(current.id))
        .filter(wallet::Column::Version.eq(current.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::Conflict {
            entity: "wallet",
            id: current.id,
        });
    }
    find_wallet_by_id(db, current.id).await
}

/// Subtracts `amount` from `bucket`.
///
/// Fails with `InsufficientFunds` and leaves the bucket unchanged when its
/// balance is below `amount`, or with `Conflict` when another writer got there
/// first.
pub async fn debit<C>(
    db: &C,
    wallet_id: i64,
    bucket: Bucket,
    amount: Decimal,
) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    ensure_positive(amount)?;
    let wallet = find_wallet_by_id(db, wallet_id).await?;
    let current = bucket.balance(&wallet);
    if current < amount {
        return Err(Error::InsufficientFunds {
            bucket,
            current,
            required: amount,
        });
    }
    write_balance(db, &wallet, bucket, current - amount).await
}

/// Adds `amount` to `bucket`.
pub async fn credit<C>(
    db: &C,
    wallet_id: i64,
    bucket: Bucket,
    amount: Decimal,
) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    ensure_positive(amount)?;
    let wallet = find_wallet_by_id(db, wallet_id).await?;
    let current = bucket.balance(&wallet);
    write_balance(db, &wallet, bucket, current + amount).await
}

/// Moves `amount` from one bucket to another of the same wallet.
///
/// Both halves run on `db`; pass an open transaction to make the pair atomic.
pub async fn move_between<C>(
    db: &C,
    wallet_id: i64,
    from: Bucket,
    to: Bucket,
    amount: Decimal,
) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    debit(db, wallet_id, from, amount).await?;
    credit(db, wallet_id, to, amount).await
}

/// Lists every wallet the user owns, ordered by currency.
pub async fn get_wallets(ledger: &Ledger, user_id: i64) -> Result<Vec<WalletView>> {
    let wallets = Wallet::find()
        .filter(wallet::Column::UserId.eq(user_id))
        .order_by_asc(wallet::Column::Currency)
        .all(ledger.db())
        .await?;
    Ok(wallets.into_iter().map(WalletView::from).collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_debit_and_credit_reject_non_positive_amounts() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = debit(&db, 1, Bucket::Available, Decimal::ZERO).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount } if amount == Decimal::ZERO
        ));

        let result = credit(&db, 1, Bucket::Gains, dec!(-5)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount } if amount == dec!(-5)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_or_create_wallet() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;

        let missing = get_or_create_wallet(ledger.db(), 1, "USDT", false, ledger.now()).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::NotFound { entity: "wallet", .. }
        ));

        let created = get_or_create_wallet(ledger.db(), 1, "USDT", true, ledger.now()).await?;
        assert_eq!(created.user_id, 1);
        assert_eq!(created.currency, "USDT");
        assert_eq!(created.available, Decimal::ZERO);
        assert_eq!(created.invested, Decimal::ZERO);

        let again = get_or_create_wallet(ledger.db(), 1, "USDT", true, ledger.now()).await?;
        assert_eq!(again.id, created.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_then_debit() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        let wallet = open_test_account(&ledger, 1).await?;

        let after_credit = credit(ledger.db(), wallet.id, Bucket::Available, dec!(150)).await?;
        assert_eq!(after_credit.available, dec!(150));

        let after_debit = debit(ledger.db(), wallet.id, Bucket::Available, dec!(40)).await?;
        assert_eq!(after_debit.available, dec!(110));
        Ok(())
    }

    #[tokio::test]
    async fn test_debit_beyond_balance_leaves_bucket_unchanged() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        let wallet = open_test_account(&ledger, 1).await?;
        credit(ledger.db(), wallet.id, Bucket::Gains, dec!(20)).await?;

        let result = debit(ledger.db(), wallet.id, Bucket::Gains, dec!(20.01)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientFunds { bucket: Bucket::Gains, current, required }
                if current == dec!(20) && required == dec!(20.01)
        ));

        let unchanged = find_wallet_by_id(ledger.db(), wallet.id).await?;
        assert_eq!(unchanged.gains, dec!(20));

        // Debiting the exact balance empties the bucket
        let emptied = debit(ledger.db(), wallet.id, Bucket::Gains, dec!(20)).await?;
        assert_eq!(emptied.gains, Decimal::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_unknown_wallet_is_not_found() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        let result = credit(ledger.db(), 999, Bucket::Available, dec!(1)).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_move_between_conserves_value() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        let wallet = open_test_account(&ledger, 1).await?;
        credit(ledger.db(), wallet.id, Bucket::Available, dec!(300)).await?;

        let moved = move_between(
            ledger.db(),
            wallet.id,
            Bucket::Available,
            Bucket::Pending,
            dec!(120),
        )
        .await?;
        assert_eq!(moved.available, dec!(180));
        assert_eq!(moved.pending, dec!(120));
        assert_eq!(moved.available.0 + moved.pending.0, dec!(300));
        Ok(())
    }

    #[tokio::test]
    async fn test_small_fractions_cancel_exactly() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        let wallet = open_test_account(&ledger, 1).await?;

        credit(ledger.db(), wallet.id, Bucket::Available, dec!(0.1)).await?;
        credit(ledger.db(), wallet.id, Bucket::Available, dec!(0.2)).await?;
        let emptied = debit(ledger.db(), wallet.id, Bucket::Available, dec!(0.3)).await?;
        assert_eq!(emptied.available, Decimal::ZERO);

        // Nothing is left behind to debit
        let result = debit(ledger.db(), wallet.id, Bucket::Available, dec!(0.0000001)).await;
        assert!(matches!(result.unwrap_err(), Error::InsufficientFunds { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_large_balance_keeps_every_digit() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        let wallet = open_test_account(&ledger, 1).await?;

        credit(ledger.db(), wallet.id, Bucket::Gains, dec!(12345678901234567.89)).await?;
        let stored = find_wallet_by_id(ledger.db(), wallet.id).await?;
        assert_eq!(stored.gains, dec!(12345678901234567.89));

        let after = debit(ledger.db(), wallet.id, Bucket::Gains, dec!(0.01)).await?;
        assert_eq!(after.gains, dec!(12345678901234567.88));
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_wallet_write_is_conflict() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        let wallet = open_test_account(&ledger, 1).await?;
        credit(ledger.db(), wallet.id, Bucket::Available, dec!(100)).await?;

        let stale = find_wallet_by_id(ledger.db(), wallet.id).await?;
        let fresh = debit(ledger.db(), wallet.id, Bucket::Available, dec!(60)).await?;
        assert_eq!(fresh.version, stale.version + 1);

        // A writer still holding the old row must not overwrite the debit
        let result = write_balance(ledger.db(), &stale, Bucket::Available, dec!(100)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { entity: "wallet", id } if id == wallet.id
        ));
        assert_eq!(
            find_wallet_by_id(ledger.db(), wallet.id).await?.available,
            dec!(40)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_find_owned_wallet_rejects_other_users() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        let wallet = open_test_account(&ledger, 1).await?;

        assert_eq!(find_owned_wallet(ledger.db(), 1, wallet.id).await?.id, wallet.id);
        let result = find_owned_wallet(ledger.db(), 2, wallet.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_wallets_is_stable_across_reads() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        open_test_account(&ledger, 1).await?;
        get_or_create_wallet(ledger.db(), 1, "BTC", true, ledger.now()).await?;

        let wallets = get_wallets(&ledger, 1).await?;
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].currency, "BTC");
        assert_eq!(wallets[1].currency, "USDT");
        assert_eq!(get_wallets(&ledger, 1).await?, wallets);
        assert!(get_wallets(&ledger, 2).await?.is_empty());
        Ok(())
    }
}
