//! Referral code entity - The single code a referrer shares.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Referral code database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referral_codes")]
pub struct Model {
    /// Unique identifier for the code
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Shareable code, unique system-wide
    #[sea_orm(unique)]
    pub code: String,
    /// Owner of the code
    #[sea_orm(unique)]
    pub referrer_id: i64,
    /// When the code was generated
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Referral code and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One code attributes many signups
    #[sea_orm(has_many = "super::referral::Entity")]
    Referrals,
}

impl Related<super::referral::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Referrals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
