//! Investment entity - Fixed-rate principal that accrues daily interest.
//!
//! `active` moves from true to false exactly once (encash). `version` is bumped
//! on every write so concurrent accruals are detected instead of double-counted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Investment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investments")]
pub struct Model {
    /// Unique identifier for the investment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the investment
    pub user_id: i64,
    /// Wallet the principal was taken from
    pub wallet_id: i64,
    /// Principal
    #[sea_orm(column_type = "Text")]
    pub amount: Money,
    /// Daily interest as a fraction (0.025 = 2.5% per day)
    #[sea_orm(column_type = "Text")]
    pub daily_rate: Money,
    /// Interest earned but not yet swept into gains
    #[sea_orm(column_type = "Text")]
    pub accrued: Money,
    /// Instant of the last accrual computation
    pub last_accrual: DateTimeUtc,
    /// False once encashed
    pub active: bool,
    /// Optimistic concurrency counter
    pub version: i32,
    /// When the principal was committed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Investment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each investment is funded by one wallet
    #[sea_orm(
        belongs_to = "super::wallet::Entity",
        from = "Column::WalletId",
        to = "super::wallet::Column::Id"
    )]
    Wallet,
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
