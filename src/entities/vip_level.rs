//! VIP level entity - Immutable catalog of the subscription ladder.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// VIP level database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vip_levels")]
pub struct Model {
    /// Unique identifier for the level
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Ordinal on the ladder, starting at 1
    #[sea_orm(unique)]
    pub level: i32,
    /// Display title (e.g., "VIP 3")
    pub title: String,
    /// Listed price
    #[sea_orm(column_type = "Text")]
    pub price: Money,
    /// Advertised return percentage
    #[sea_orm(column_type = "Text")]
    pub percentage: Money,
    /// Advertised daily gains
    #[sea_orm(column_type = "Text")]
    pub daily_gains: Money,
    /// Days before gains become available
    pub delay_days: i32,
    /// Optional marketing text
    pub description: Option<String>,
}

/// Defines relationships between VIP level and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One level has many subscriptions
    #[sea_orm(has_many = "super::vip_subscription::Entity")]
    Subscriptions,
}

impl Related<super::vip_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
