//! Flattened projections returned across the core boundary.
//!
//! Views never expose store types. Money fields serialize as JSON numbers so
//! clients receive plain decimals; the in-process values stay fixed-point.

use crate::entities::{
    deposit::{self, DepositStatus},
    investment, investor, referral,
    referral::ReferralStatus,
    transaction::{self, TransactionKind},
    vip_level, vip_subscription, wallet,
    withdrawal::{self, WithdrawalStatus},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A wallet and its five buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletView {
    /// Wallet id
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Currency code, e.g. `USDT`
    pub currency: String,
    /// Spendable balance
    #[serde(with = "rust_decimal::serde::float")]
    pub available: Decimal,
    /// Funds awaiting settlement
    #[serde(with = "rust_decimal::serde::float")]
    pub pending: Decimal,
    /// Interest and commissions not yet transferred
    #[serde(with = "rust_decimal::serde::float")]
    pub gains: Decimal,
    /// Proceeds subject to the sale lock
    #[serde(with = "rust_decimal::serde::float")]
    pub sale_balance: Decimal,
    /// Principal committed to investments
    #[serde(with = "rust_decimal::serde::float")]
    pub invested: Decimal,
}

impl From<wallet::Model> for WalletView {
    fn from(w: wallet::Model) -> Self {
        Self {
            id: w.id,
            user_id: w.user_id,
            currency: w.currency,
            available: w.available.0,
            pending: w.pending.0,
            gains: w.gains.0,
            sale_balance: w.sale_balance.0,
            invested: w.invested.0,
        }
    }
}

/// An investment and its accrual state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvestmentView {
    /// Investment id
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Wallet the principal was taken from
    pub wallet_id: i64,
    /// Principal
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Interest per whole day, as a fraction of principal
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_rate: Decimal,
    /// Interest posted and not yet encashed
    #[serde(with = "rust_decimal::serde::float")]
    pub accrued: Decimal,
    /// Instant interest was last settled up to
    pub last_accrual: DateTime<Utc>,
    /// False once encashed
    pub active: bool,
    /// When the investment was opened
    pub created_at: DateTime<Utc>,
}

impl From<investment::Model> for InvestmentView {
    fn from(inv: investment::Model) -> Self {
        Self {
            id: inv.id,
            user_id: inv.user_id,
            wallet_id: inv.wallet_id,
            amount: inv.amount.0,
            daily_rate: inv.daily_rate.0,
            accrued: inv.accrued.0,
            last_accrual: inv.last_accrual,
            active: inv.active,
            created_at: inv.created_at,
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    /// Record id
    pub id: i64,
    /// Wallet the record belongs to
    pub wallet_id: i64,
    /// Amount moved
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// What moved the funds
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// When the record was appended
    pub created_at: DateTime<Utc>,
}

impl From<transaction::Model> for TransactionView {
    fn from(tx: transaction::Model) -> Self {
        Self {
            id: tx.id,
            wallet_id: tx.wallet_id,
            amount: tx.amount.0,
            kind: tx.kind,
            created_at: tx.created_at,
        }
    }
}

/// A catalog level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VipLevelView {
    /// Level id
    pub id: i64,
    /// Ordinal on the ladder, starting at 1
    pub level: i32,
    /// Display name
    pub title: String,
    /// Purchase price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Advertised return percentage
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    /// Advertised daily gains
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_gains: Decimal,
    /// Days before gains start
    pub delay_days: i32,
    /// Free-form description
    pub description: Option<String>,
}

impl From<vip_level::Model> for VipLevelView {
    fn from(l: vip_level::Model) -> Self {
        Self {
            id: l.id,
            level: l.level,
            title: l.title,
            price: l.price.0,
            percentage: l.percentage.0,
            daily_gains: l.daily_gains.0,
            delay_days: l.delay_days,
            description: l.description,
        }
    }
}

/// The level summary embedded in a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VipLevelSummary {
    /// Level id
    pub id: i64,
    /// Ordinal on the ladder
    pub level: i32,
    /// Display name
    pub title: String,
    /// Purchase price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// A user's subscription to one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    /// Subscription id
    pub id: i64,
    /// The subscribed level
    pub vip_level: VipLevelSummary,
    /// Whether the subscription is current
    pub active: bool,
    /// Last purchase or reactivation
    pub purchased_at: DateTime<Utc>,
}

impl SubscriptionView {
    /// Joins a subscription row with its catalog level.
    #[must_use]
    pub fn new(subscription: vip_subscription::Model, level: vip_level::Model) -> Self {
        Self {
            id: subscription.id,
            vip_level: VipLevelSummary {
                id: level.id,
                level: level.level,
                title: level.title,
                price: level.price.0,
            },
            active: subscription.active,
            purchased_at: subscription.purchased_at,
        }
    }
}

/// One attributed signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferralView {
    /// Referral id
    pub id: i64,
    /// User who signed up
    pub referred_user_id: i64,
    /// Distance from the referrer, 1 for direct signups
    pub generation: i32,
    /// Attribution status
    pub status: ReferralStatus,
    /// When the signup was attributed
    pub created_at: DateTime<Utc>,
}

impl From<referral::Model> for ReferralView {
    fn from(r: referral::Model) -> Self {
        Self {
            id: r.id,
            referred_user_id: r.referred_user_id,
            generation: r.generation,
            status: r.status,
            created_at: r.created_at,
        }
    }
}

/// A referrer's code and the signups attributed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferralsView {
    /// The referrer's own code, if one was issued
    pub code: Option<String>,
    /// Attributed signups
    pub referrals: Vec<ReferralView>,
}

/// A deposit status record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositView {
    /// Deposit id
    pub id: i64,
    /// Announced amount
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Currency code
    pub currency: String,
    /// Review status
    pub status: DepositStatus,
    /// Payment reference supplied by the user
    pub external_id: Option<String>,
    /// When the deposit was announced
    pub created_at: DateTime<Utc>,
}

impl From<deposit::Model> for DepositView {
    fn from(d: deposit::Model) -> Self {
        Self {
            id: d.id,
            amount: d.amount.0,
            currency: d.currency,
            status: d.status,
            external_id: d.external_id,
            created_at: d.created_at,
        }
    }
}

/// A withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalView {
    /// Withdrawal id
    pub id: i64,
    /// Wallet the funds are held from
    pub wallet_id: i64,
    /// Held amount
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Review status
    pub status: WithdrawalStatus,
    /// When the request was made
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl From<withdrawal::Model> for WithdrawalView {
    fn from(w: withdrawal::Model) -> Self {
        Self {
            id: w.id,
            wallet_id: w.wallet_id,
            amount: w.amount.0,
            status: w.status,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

/// Lifetime counters of an investor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvestorView {
    /// Investor
    pub user_id: i64,
    /// Lifetime principal committed
    #[serde(with = "rust_decimal::serde::float")]
    pub total_invested: Decimal,
}

impl From<investor::Model> for InvestorView {
    fn from(i: investor::Model) -> Self {
        Self {
            user_id: i.user_id,
            total_invested: i.total_invested.0,
        }
    }
}

/// Everything created when an account is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    /// Newly opened user
    pub user_id: i64,
    /// Default-currency wallet
    pub wallet: WalletView,
    /// Code the user can share
    pub referral_code: String,
    /// Attribution of this signup, when a code was used
    pub referred_by: Option<ReferralView>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wallet_view_serializes_money_as_numbers() {
        let view = WalletView {
            id: 1,
            user_id: 9,
            currency: "USDT".to_string(),
            available: dec!(12.5),
            pending: Decimal::ZERO,
            gains: dec!(0.75),
            sale_balance: Decimal::ZERO,
            invested: dec!(1000),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["available"].is_number());
        assert_eq!(json["available"].as_f64(), Some(12.5));
        assert_eq!(json["gains"].as_f64(), Some(0.75));
        assert_eq!(json["sale_balance"].as_f64(), Some(0.0));
        assert_eq!(json["currency"], "USDT");
    }

    #[test]
    fn test_transaction_view_uses_type_key() {
        let view = TransactionView {
            id: 3,
            wallet_id: 1,
            amount: dec!(75),
            kind: TransactionKind::Interest,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "interest");
        assert_eq!(json["amount"].as_f64(), Some(75.0));
    }
}
