//! Investor profile entity - Per-user lifetime counters kept outside the wallet.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Investor profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investors")]
pub struct Model {
    /// Unique identifier for the profile
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the profile
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Sum of every principal ever committed
    #[sea_orm(column_type = "Text")]
    pub total_invested: Money,
    /// When the profile was created
    pub created_at: DateTimeUtc,
}

/// `Investor` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
