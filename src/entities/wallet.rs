//! Wallet entity - One balance record per (user, currency) pair.
//!
//! A wallet splits its value across five buckets. Every bucket stays
//! non-negative; mutations go through `core::wallet` which pairs debits with
//! credits so value is conserved within an operation. Balances are written
//! from Rust under a `version` check, never with SQL arithmetic.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::money::Money;
use std::fmt;

/// Wallet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    /// Unique identifier for the wallet
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner, supplied by the identity collaborator
    pub user_id: i64,
    /// Currency code (e.g., "USDT")
    pub currency: String,
    /// Spendable balance
    #[sea_orm(column_type = "Text")]
    pub available: Money,
    /// Funds awaiting external settlement
    #[sea_orm(column_type = "Text")]
    pub pending: Money,
    /// Interest swept in from encashed investments
    #[sea_orm(column_type = "Text")]
    pub gains: Money,
    /// Proceeds awaiting the lock period
    #[sea_orm(column_type = "Text")]
    pub sale_balance: Money,
    /// Principal committed to investments
    #[sea_orm(column_type = "Text")]
    pub invested: Money,
    /// Optimistic concurrency counter, bumped on every balance write
    pub version: i32,
    /// When the wallet was opened
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Wallet and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One wallet has many ledger transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One wallet funds many investments
    #[sea_orm(has_many = "super::investment::Entity")]
    Investments,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::investment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// One of the five named balances of a wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Spendable balance
    Available,
    /// Funds awaiting external settlement
    Pending,
    /// Collected interest
    Gains,
    /// Sale proceeds under lock
    SaleBalance,
    /// Principal in active investments
    Invested,
}

impl Bucket {
    /// Column backing this bucket.
    #[must_use]
    pub const fn column(self) -> Column {
        match self {
            Self::Available => Column::Available,
            Self::Pending => Column::Pending,
            Self::Gains => Column::Gains,
            Self::SaleBalance => Column::SaleBalance,
            Self::Invested => Column::Invested,
        }
    }

    /// Current balance of this bucket on `wallet`.
    #[must_use]
    pub const fn balance(self, wallet: &Model) -> Decimal {
        match self {
            Self::Available => wallet.available.0,
            Self::Pending => wallet.pending.0,
            Self::Gains => wallet.gains.0,
            Self::SaleBalance => wallet.sale_balance.0,
            Self::Invested => wallet.invested.0,
        }
    }

    /// Snake-case name used in messages and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Gains => "gains",
            Self::SaleBalance => "sale_balance",
            Self::Invested => "invested",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
