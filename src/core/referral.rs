//! Referral ledger - codes and the signups attributed to them.
//!
//! Each referrer owns exactly one code. A referred user is attributed at most
//! once. `generation` is the depth of the referral chain, capped by the
//! `max_referral_generation` setting.

use crate::{
    context::Ledger,
    entities::{Referral, ReferralCode, referral, referral::ReferralStatus, referral_code},
    errors::{Error, Result},
    views::{ReferralView, ReferralsView},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

const MAX_CODE_LEN: usize = 64;

/// Builds the code for `user_id` at `now`: `REF_<user>_<unix millis>`.
#[must_use]
pub fn format_code(user_id: i64, now: DateTime<Utc>) -> String {
    format!("REF_{user_id}_{}", now.timestamp_millis())
        .chars()
        .take(MAX_CODE_LEN)
        .collect()
}

/// Returns the user's code, generating it on first use.
pub async fn ensure_code<C>(
    db: &C,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<referral_code::Model>
where
    C: ConnectionTrait,
{
    let existing = ReferralCode::find()
        .filter(referral_code::Column::ReferrerId.eq(user_id))
        .one(db)
        .await?;
    if let Some(code) = existing {
        return Ok(code);
    }

    referral_code::ActiveModel {
        code: Set(format_code(user_id, now)),
        referrer_id: Set(user_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Attributes `referred_user_id` to the owner of `code`.
pub async fn attribute_signup<C>(
    db: &C,
    code: &str,
    referred_user_id: i64,
    max_generation: i32,
    now: DateTime<Utc>,
) -> Result<referral::Model>
where
    C: ConnectionTrait,
{
    let referral_code = ReferralCode::find()
        .filter(referral_code::Column::Code.eq(code))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("referral code", code))?;

    if referral_code.referrer_id == referred_user_id {
        return Err(Error::InvalidState {
            message: "users cannot refer themselves".to_string(),
        });
    }

    let already = Referral::find()
        .filter(referral::Column::ReferredUserId.eq(referred_user_id))
        .one(db)
        .await?;
    if already.is_some() {
        return Err(Error::InvalidState {
            message: format!("user {referred_user_id} was already referred"),
        });
    }

    // The referrer's own referral, if they joined through someone else
    let parent = Referral::find()
        .filter(referral::Column::ReferredUserId.eq(referral_code.referrer_id))
        .filter(referral::Column::Status.eq(ReferralStatus::Used))
        .one(db)
        .await?;
    let generation = parent
        .as_ref()
        .map_or(1, |p| (p.generation + 1).min(max_generation));

    referral::ActiveModel {
        referral_code_id: Set(referral_code.id),
        referred_user_id: Set(referred_user_id),
        generation: Set(generation),
        status: Set(ReferralStatus::Used),
        parent_referral_id: Set(parent.map(|p| p.id)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Returns the user's referral code, generating it if needed.
#[instrument(skip(ledger))]
pub async fn generate_code(ledger: &Ledger, user_id: i64) -> Result<String> {
    let code = ensure_code(ledger.db(), user_id, ledger.now()).await?;
    Ok(code.code)
}

/// Records a signup made with `code`.
#[instrument(skip(ledger))]
pub async fn record_referral(
    ledger: &Ledger,
    code: &str,
    referred_user_id: i64,
) -> Result<ReferralView> {
    let txn = ledger.db().begin().await?;
    let referral = attribute_signup(
        &txn,
        code,
        referred_user_id,
        ledger.settings().max_referral_generation,
        ledger.now(),
    )
    .await?;
    txn.commit().await?;

    info!(
        referral_id = referral.id,
        generation = referral.generation,
        "referral recorded"
    );
    Ok(referral.into())
}

/// The user's code and every signup attributed to it, oldest first.
///
/// A user who never generated a code gets `{ code: None, referrals: [] }`.
pub async fn get_referrals(ledger: &Ledger, user_id: i64) -> Result<ReferralsView> {
    let Some(code) = ReferralCode::find()
        .filter(referral_code::Column::ReferrerId.eq(user_id))
        .one(ledger.db())
        .await?
    else {
        return Ok(ReferralsView {
            code: None,
            referrals: Vec::new(),
        });
    };

    let referrals = Referral::find()
        .filter(referral::Column::ReferralCodeId.eq(code.id))
        .order_by_asc(referral::Column::CreatedAt)
        .order_by_asc(referral::Column::Id)
        .all(ledger.db())
        .await?;

    Ok(ReferralsView {
        code: Some(code.code),
        referrals: referrals.into_iter().map(ReferralView::from).collect(),
    })
}
