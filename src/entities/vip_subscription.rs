//! VIP subscription entity - A user's hold on one level of the ladder.
//!
//! At most one row exists per (user, level); a unique index enforces it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// VIP subscription database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vip_subscriptions")]
pub struct Model {
    /// Unique identifier for the subscription
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Subscriber
    pub user_id: i64,
    /// Level held
    pub vip_level_id: i64,
    /// Whether the subscription is currently in force
    pub active: bool,
    /// When the level was (last) purchased
    pub purchased_at: DateTimeUtc,
}

/// Defines relationships between VIP subscription and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each subscription references one catalog level
    #[sea_orm(
        belongs_to = "super::vip_level::Entity",
        from = "Column::VipLevelId",
        to = "super::vip_level::Column::Id"
    )]
    VipLevel,
}

impl Related<super::vip_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VipLevel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
