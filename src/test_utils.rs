//! Shared test utilities for the ledger.
//!
//! This module provides common helpers for setting up an in-memory ledger with
//! a controllable clock and opening accounts with sensible defaults.

use crate::{
    clock::ManualClock,
    config::settings::LedgerSettings,
    context::Ledger,
    core::{account, deposit, wallet},
    entities::{self, wallet::Bucket},
    errors::Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Instant every test ledger starts at: 2025-01-01T00:00:00Z.
pub fn test_start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default()
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a ledger over a fresh database with default settings.
///
/// The returned clock is shared with the ledger; advance it to simulate the
/// passage of time.
pub async fn setup_test_ledger() -> Result<(Ledger, Arc<ManualClock>)> {
    let db = setup_test_db().await?;
    let clock = Arc::new(ManualClock::new(test_start()));
    let shared = Arc::clone(&clock);
    let ledger = Ledger::with_clock(db, shared, LedgerSettings::default());
    Ok((ledger, clock))
}

/// Opens an account with no referral and returns its default wallet.
pub async fn open_test_account(ledger: &Ledger, user_id: i64) -> Result<entities::wallet::Model> {
    let account = account::open_account(ledger, user_id, None).await?;
    wallet::find_wallet_by_id(ledger.db(), account.wallet.id).await
}

/// Opens an account and funds `available` through a confirmed deposit.
///
/// # Defaults
/// * currency: the ledger's default currency
/// * external id: none
pub async fn open_funded_account(
    ledger: &Ledger,
    user_id: i64,
    amount: Decimal,
) -> Result<entities::wallet::Model> {
    let opened = open_test_account(ledger, user_id).await?;
    let pending = deposit::initiate_deposit(ledger, user_id, amount, None, None).await?;
    deposit::confirm_deposit(ledger, pending.id).await?;
    wallet::find_wallet_by_id(ledger.db(), opened.id).await
}

/// Credits a bucket directly, bypassing the engines.
/// Use this to stage balances (gains, sale proceeds) no operation produces yet.
pub async fn fund_bucket(
    ledger: &Ledger,
    wallet_id: i64,
    bucket: Bucket,
    amount: Decimal,
) -> Result<entities::wallet::Model> {
    wallet::credit(ledger.db(), wallet_id, bucket, amount).await
}
