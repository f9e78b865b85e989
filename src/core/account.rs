//! Account opening and investor profile counters.
//!
//! Registration itself (credentials, tokens) belongs to the identity
//! collaborator. Once it has a user id, [`open_account`] creates everything the
//! ledger needs for that user in one transaction.

use crate::{
    context::Ledger,
    core::{referral, wallet},
    entities::{Investor, Money, Wallet, investor, wallet as wallet_entity},
    errors::{Error, Result},
    views::{AccountView, InvestorView},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Adds `amount` to the user's lifetime invested total.
///
/// Creates the profile when it does not exist yet. The sum is taken in Rust;
/// run it inside the caller's transaction.
pub async fn add_to_total_invested<C>(
    db: &C,
    user_id: i64,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = Investor::find()
        .filter(investor::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    match existing {
        Some(profile) => {
            let total = profile.total_invested + amount;
            let mut active: investor::ActiveModel = profile.into();
            active.total_invested = Set(total);
            active.update(db).await?;
        }
        None => {
            investor::ActiveModel {
                user_id: Set(user_id),
                total_invested: Set(Money(amount)),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}

/// Opens the ledger side of a newly registered user.
///
/// Creates the default-currency wallet with every bucket at zero, the investor
/// profile, and the user's referral code. When `referral_code` is given the
/// signup is attributed to its owner. Opening the same account twice fails
/// with `InvalidState`.
#[instrument(skip(ledger))]
pub async fn open_account(
    ledger: &Ledger,
    user_id: i64,
    referral_code: Option<&str>,
) -> Result<AccountView> {
    let settings = ledger.settings();
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let existing = Wallet::find()
        .filter(wallet_entity::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::InvalidState {
            message: format!("account {user_id} is already open"),
        });
    }

    let wallet =
        wallet::get_or_create_wallet(&txn, user_id, &settings.default_currency, true, now).await?;

    investor::ActiveModel {
        user_id: Set(user_id),
        total_invested: Set(Money::ZERO),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let code = referral::ensure_code(&txn, user_id, now).await?;

    let referred_by = match referral_code {
        Some(code) => Some(
            referral::attribute_signup(
                &txn,
                code,
                user_id,
                settings.max_referral_generation,
                now,
            )
            .await?,
        ),
        None => None,
    };

    txn.commit().await?;

    info!(user_id, wallet_id = wallet.id, "account opened");
    Ok(AccountView {
        user_id,
        wallet: wallet.into(),
        referral_code: code.code,
        referred_by: referred_by.map(Into::into),
    })
}

/// Reads the user's investor profile.
pub async fn get_investor_profile(ledger: &Ledger, user_id: i64) -> Result<InvestorView> {
    Investor::find()
        .filter(investor::Column::UserId.eq(user_id))
        .one(ledger.db())
        .await?
        .map(InvestorView::from)
        .ok_or_else(|| Error::not_found("investor", user_id))
}
