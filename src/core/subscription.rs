//! Subscription ladder - VIP catalog and purchases.
//!
//! Levels must be bought in order: level `n > 1` requires a subscription,
//! active or not, at level `n - 1`. A user holds at most one subscription row
//! per level. Purchases do not debit any wallet bucket.

use crate::{
    config::settings::VipLevelConfig,
    context::Ledger,
    entities::{Money, VipLevel, VipSubscription, vip_level, vip_subscription},
    errors::{Error, Result},
    views::{SubscriptionView, VipLevelView},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Inserts the catalog if the level table is empty.
///
/// Returns how many levels were inserted. A populated table is left alone so
/// the catalog stays immutable once seeded.
#[instrument(skip(ledger, catalog))]
pub async fn seed_vip_levels(ledger: &Ledger, catalog: &[VipLevelConfig]) -> Result<usize> {
    let txn = ledger.db().begin().await?;

    let existing = VipLevel::find().count(&txn).await?;
    if existing > 0 {
        debug!(existing, "VIP catalog already seeded");
        return Ok(0);
    }

    for entry in catalog {
        vip_level::ActiveModel {
            level: Set(entry.level),
            title: Set(entry.title.clone()),
            price: Set(Money(entry.price)),
            percentage: Set(Money(entry.percentage)),
            daily_gains: Set(Money(entry.daily_gains)),
            delay_days: Set(entry.delay_days),
            description: Set(entry.description.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    info!(levels = catalog.len(), "VIP catalog seeded");
    Ok(catalog.len())
}

/// Lists the catalog ordered by level.
pub async fn get_vip_levels(ledger: &Ledger) -> Result<Vec<VipLevelView>> {
    let levels = VipLevel::find()
        .order_by_asc(vip_level::Column::Level)
        .all(ledger.db())
        .await?;
    Ok(levels.into_iter().map(VipLevelView::from).collect())
}

/// Lists the user's subscriptions, lowest level first.
pub async fn get_subscriptions(ledger: &Ledger, user_id: i64) -> Result<Vec<SubscriptionView>> {
    let rows = VipSubscription::find()
        .filter(vip_subscription::Column::UserId.eq(user_id))
        .find_also_related(VipLevel)
        .order_by_asc(vip_level::Column::Level)
        .all(ledger.db())
        .await?;

    rows.into_iter()
        .map(|(subscription, level)| {
            let level_id = subscription.vip_level_id;
            level
                .map(|level| SubscriptionView::new(subscription, level))
                .ok_or_else(|| Error::not_found("VIP level", level_id))
        })
        .collect()
}

/// Buys `vip_level_id` for the user.
///
/// Fails with `NotFound` for an unknown level, `AlreadySubscribed` when the
/// user already holds it, and `LevelLocked` when the level below is missing.
/// An inactive subscription at this level is reactivated rather than duplicated.
#[instrument(skip(ledger))]
pub async fn purchase_vip_level(
    ledger: &Ledger,
    user_id: i64,
    vip_level_id: i64,
) -> Result<SubscriptionView> {
    let now = ledger.now();
    let txn = ledger.db().begin().await?;

    let level = VipLevel::find_by_id(vip_level_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("VIP level", vip_level_id))?;

    let existing = VipSubscription::find()
        .filter(vip_subscription::Column::UserId.eq(user_id))
        .filter(vip_subscription::Column::VipLevelId.eq(level.id))
        .one(&txn)
        .await?;
    if existing.as_ref().is_some_and(|s| s.active) {
        return Err(Error::AlreadySubscribed { level: level.level });
    }

    if level.level > 1 {
        let required = level.level - 1;
        let holds_previous = VipSubscription::find()
            .inner_join(VipLevel)
            .filter(vip_subscription::Column::UserId.eq(user_id))
            .filter(vip_level::Column::Level.eq(required))
            .count(&txn)
            .await?
            > 0;
        if !holds_previous {
            return Err(Error::LevelLocked {
                level: level.level,
                required,
            });
        }
    }

    let subscription = match existing {
        Some(inactive) => {
            let mut active: vip_subscription::ActiveModel = inactive.into();
            active.active = Set(true);
            active.purchased_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            vip_subscription::ActiveModel {
                user_id: Set(user_id),
                vip_level_id: Set(level.id),
                active: Set(true),
                purchased_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    info!(
        subscription_id = subscription.id,
        level = level.level,
        "VIP level purchased"
    );
    Ok(SubscriptionView::new(subscription, level))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::wallet;
    use crate::test_utils::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::sea_query::Expr;

    fn catalog() -> Vec<VipLevelConfig> {
        (1..=3)
            .map(|level| VipLevelConfig {
                level,
                title: format!("VIP {level}"),
                price: Decimal::from(level * 50),
                percentage: Decimal::from(level),
                daily_gains: Decimal::from(level * 2),
                delay_days: 0,
                description: None,
            })
            .collect()
    }

    async fn level_id(ledger: &Ledger, level: i32) -> i64 {
        get_vip_levels(ledger)
            .await
            .unwrap()
            .into_iter()
            .find(|l| l.level == level)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        assert_eq!(seed_vip_levels(&ledger, &catalog()).await?, 3);
        assert_eq!(seed_vip_levels(&ledger, &catalog()).await?, 0);

        let levels = get_vip_levels(&ledger).await?;
        let ordinals: Vec<i32> = levels.iter().map(|l| l.level).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(levels[1].price, dec!(100));
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_in_order() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        seed_vip_levels(&ledger, &catalog()).await?;

        let first = purchase_vip_level(&ledger, 1, level_id(&ledger, 1).await).await?;
        assert!(first.active);
        assert_eq!(first.vip_level.level, 1);
        assert_eq!(first.purchased_at, ledger.now());

        let second = purchase_vip_level(&ledger, 1, level_id(&ledger, 2).await).await?;
        assert_eq!(second.vip_level.level, 2);

        let subscriptions = get_subscriptions(&ledger, 1).await?;
        assert_eq!(subscriptions.len(), 2);
        assert_eq!(subscriptions[0].vip_level.level, 1);
        assert_eq!(subscriptions[1].vip_level.level, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_skipping_a_level_is_locked() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        seed_vip_levels(&ledger, &catalog()).await?;
        purchase_vip_level(&ledger, 1, level_id(&ledger, 1).await).await?;

        let result = purchase_vip_level(&ledger, 1, level_id(&ledger, 3).await).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::LevelLocked { level: 3, required: 2 }
        ));
        assert_eq!(get_subscriptions(&ledger, 1).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_twice_is_already_subscribed() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        seed_vip_levels(&ledger, &catalog()).await?;
        let id = level_id(&ledger, 1).await;
        purchase_vip_level(&ledger, 1, id).await?;

        let result = purchase_vip_level(&ledger, 1, id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AlreadySubscribed { level: 1 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_level_is_not_found() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        let result = purchase_vip_level(&ledger, 1, 42).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_subscription_is_reactivated() -> Result<()> {
        let (ledger, clock) = setup_test_ledger().await?;
        seed_vip_levels(&ledger, &catalog()).await?;
        let first = purchase_vip_level(&ledger, 1, level_id(&ledger, 1).await).await?;

        VipSubscription::update_many()
            .col_expr(vip_subscription::Column::Active, Expr::value(false))
            .filter(vip_subscription::Column::Id.eq(first.id))
            .exec(ledger.db())
            .await?;

        // An inactive lower level still unlocks the next one
        purchase_vip_level(&ledger, 1, level_id(&ledger, 2).await).await?;

        clock.advance(chrono::Duration::days(3));
        let again = purchase_vip_level(&ledger, 1, level_id(&ledger, 1).await).await?;
        assert_eq!(again.id, first.id);
        assert!(again.active);
        assert_eq!(again.purchased_at, ledger.now());
        assert_eq!(get_subscriptions(&ledger, 1).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_does_not_debit_wallet() -> Result<()> {
        let (ledger, _clock) = setup_test_ledger().await?;
        seed_vip_levels(&ledger, &catalog()).await?;
        let before = open_funded_account(&ledger, 1, dec!(500)).await?;

        purchase_vip_level(&ledger, 1, level_id(&ledger, 1).await).await?;

        let after = wallet::find_wallet_by_id(ledger.db(), before.id).await?;
        assert_eq!(after, before);
        Ok(())
    }
}
