//! Transaction entity - Append-only audit trail of value movements.
//!
//! Rows are inserted by the engines and never updated or deleted.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Kind of value movement recorded by a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Interest posted onto an investment
    #[sea_orm(string_value = "interest")]
    Interest,
    /// Accrued interest swept into gains
    #[sea_orm(string_value = "encash")]
    Encash,
    /// Bucket-to-bucket move inside a wallet
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Withdrawal hold taken from available
    #[sea_orm(string_value = "withdraw")]
    Withdraw,
    /// Confirmed deposit credited to available
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Withdrawal hold released back to available
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Wallet this movement belongs to
    pub wallet_id: i64,
    /// Amount moved (always non-negative; direction follows from `kind`)
    #[sea_orm(column_type = "Text")]
    pub amount: Money,
    /// Kind of movement
    #[sea_orm(column_name = "type")]
    pub kind: TransactionKind,
    /// When the movement was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one wallet
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
