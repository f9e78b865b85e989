//! Deposit entity - Status record of an inbound payment.
//!
//! Deposits start `pending`; an administrator confirms or rejects them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Lifecycle of a deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    /// Awaiting confirmation
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Funds credited
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Refused, nothing credited
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Deposit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deposits")]
pub struct Model {
    /// Unique identifier for the deposit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who initiated the deposit
    pub user_id: i64,
    /// Amount announced by the user
    #[sea_orm(column_type = "Text")]
    pub amount: Money,
    /// Currency of the deposit
    pub currency: String,
    /// Current status
    pub status: DepositStatus,
    /// Reference from the payment channel, if any
    pub external_id: Option<String>,
    /// When the deposit was initiated
    pub created_at: DateTimeUtc,
    /// When the status last changed
    pub updated_at: DateTimeUtc,
}

/// `Deposit` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
