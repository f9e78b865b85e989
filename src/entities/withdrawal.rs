//! Withdrawal entity - Request to pay funds out of a wallet.
//!
//! `available` is debited when the request is created. Rejection releases the
//! hold back into `available`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Lifecycle of a withdrawal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    /// Hold taken, awaiting processing
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Paid out
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Refused, hold released
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Withdrawal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    /// Unique identifier for the withdrawal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who requested the withdrawal
    pub user_id: i64,
    /// Wallet the hold was taken from
    pub wallet_id: i64,
    /// Amount held
    #[sea_orm(column_type = "Text")]
    pub amount: Money,
    /// Current status
    pub status: WithdrawalStatus,
    /// When the request was made
    pub created_at: DateTimeUtc,
    /// When the status last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Withdrawal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each withdrawal holds funds from one wallet
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
