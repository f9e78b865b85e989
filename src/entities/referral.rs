//! Referral entity - A signup attributed to a referral code.
//!
//! `generation` is the depth in the referral chain: 1 for a direct referral,
//! one more than the referrer's own referral otherwise.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a referral.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    /// Code shared, signup not yet attributed
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Signup attributed
    #[sea_orm(string_value = "used")]
    Used,
}

/// Referral database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
    /// Unique identifier for the referral
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Code the signup used
    pub referral_code_id: i64,
    /// The referred user; a user is referred at most once
    #[sea_orm(unique)]
    pub referred_user_id: i64,
    /// Depth in the referral chain
    pub generation: i32,
    /// Current status
    pub status: ReferralStatus,
    /// Referral through which the referrer joined, if any
    pub parent_referral_id: Option<i64>,
    /// When the signup was attributed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Referral and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each referral was made through one code
    #[sea_orm(
        belongs_to = "super::referral_code::Entity",
        from = "Column::ReferralCodeId",
        to = "super::referral_code::Column::Id"
    )]
    ReferralCode,
}

impl Related<super::referral_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReferralCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
