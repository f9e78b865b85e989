//! Database configuration module for the ledger store.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. Composite uniqueness that the entity macros cannot express is added
//! as explicit indexes.

use crate::entities::{
    Deposit, Investment, Investor, Referral, ReferralCode, Transaction, VipLevel,
    VipSubscription, Wallet, Withdrawal, vip_subscription, wallet,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/vip_ledger.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all ledger tables and indexes if they do not exist yet.
///
/// Safe to call on every start; existing tables are left untouched.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Wallet).await?;
    create_table(db, &schema, Investment).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, Deposit).await?;
    create_table(db, &schema, Withdrawal).await?;
    create_table(db, &schema, VipLevel).await?;
    create_table(db, &schema, VipSubscription).await?;
    create_table(db, &schema, ReferralCode).await?;
    create_table(db, &schema, Referral).await?;
    create_table(db, &schema, Investor).await?;

    let wallet_owner_index = Index::create()
        .if_not_exists()
        .name("idx_wallets_user_currency")
        .table(Wallet)
        .col(wallet::Column::UserId)
        .col(wallet::Column::Currency)
        .unique()
        .to_owned();
    db.execute(builder.build(&wallet_owner_index)).await?;

    let subscription_index = Index::create()
        .if_not_exists()
        .name("idx_vip_subscriptions_user_level")
        .table(VipSubscription)
        .col(vip_subscription::Column::UserId)
        .col(vip_subscription::Column::VipLevelId)
        .unique()
        .to_owned();
    db.execute(builder.build(&subscription_index)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{InvestmentModel, Money, TransactionModel, VipLevelModel, WalletModel};
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveModelTrait, QuerySelect, Set, Statement};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<WalletModel> = Wallet::find().limit(1).all(&db).await?;
        let _: Vec<InvestmentModel> = Investment::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;
        let _: Vec<VipLevelModel> = VipLevel::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_wallet_owner_index_is_unique() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let now = chrono::Utc::now();
        let fresh = || wallet::ActiveModel {
            user_id: Set(1),
            currency: Set("USDT".to_string()),
            available: Set(Money::ZERO),
            pending: Set(Money::ZERO),
            gains: Set(Money::ZERO),
            sale_balance: Set(Money::ZERO),
            invested: Set(Money::ZERO),
            version: Set(0),
            created_at: Set(now),
            ..Default::default()
        };

        fresh().insert(&db).await?;
        assert!(fresh().insert(&db).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_amounts_are_stored_as_text() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let stored = wallet::ActiveModel {
            user_id: Set(1),
            currency: Set("USDT".to_string()),
            available: Set(Money(dec!(12345678901234567.89))),
            pending: Set(Money::ZERO),
            gains: Set(Money(dec!(0.1))),
            sale_balance: Set(Money::ZERO),
            invested: Set(Money::ZERO),
            version: Set(0),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT typeof(available) AS kind, available FROM wallets",
            ))
            .await?
            .ok_or_else(|| sea_orm::DbErr::RecordNotFound("wallets".to_string()))?;
        assert_eq!(row.try_get::<String>("", "kind")?, "text");
        assert_eq!(row.try_get::<String>("", "available")?, "12345678901234567.89");

        let read = Wallet::find_by_id(stored.id)
            .one(&db)
            .await?
            .ok_or_else(|| sea_orm::DbErr::RecordNotFound("wallets".to_string()))?;
        assert_eq!(read.available, dec!(12345678901234567.89));
        assert_eq!(read.gains, dec!(0.1));
        Ok(())
    }
}
