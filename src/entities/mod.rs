//! Entity module - Contains all SeaORM entity definitions for the ledger store.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod deposit;
pub mod investment;
pub mod investor;
pub mod money;
pub mod referral;
pub mod referral_code;
pub mod transaction;
pub mod vip_level;
pub mod vip_subscription;
pub mod wallet;
pub mod withdrawal;

// Re-export specific types to avoid conflicts
pub use deposit::{Entity as Deposit, Model as DepositModel};
pub use investment::{Entity as Investment, Model as InvestmentModel};
pub use investor::{Entity as Investor, Model as InvestorModel};
pub use money::Money;
pub use referral::{Entity as Referral, Model as ReferralModel};
pub use referral_code::{Entity as ReferralCode, Model as ReferralCodeModel};
pub use transaction::{Entity as Transaction, Model as TransactionModel};
pub use vip_level::{Entity as VipLevel, Model as VipLevelModel};
pub use vip_subscription::{Entity as VipSubscription, Model as VipSubscriptionModel};
pub use wallet::{Entity as Wallet, Model as WalletModel};
pub use withdrawal::{Entity as Withdrawal, Model as WithdrawalModel};
