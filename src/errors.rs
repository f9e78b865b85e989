//! Unified error types for the ledger.
//!
//! Domain failures are terminal for the operation that raised them. Only
//! [`Error::Conflict`] may be retried by re-reading and re-applying.

use crate::entities::wallet::Bucket;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Every failure a ledger operation can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings or catalog could not be loaded or are inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The store rejected a statement
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An environment variable is set but not valid unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// The entity does not exist or is not owned by the caller
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// Identifier used for the lookup
        key: String,
    },

    /// Amount is zero or negative
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// A wallet bucket holds less than the requested amount
    #[error("Insufficient funds in {bucket}: balance {current}, required {required}")]
    InsufficientFunds {
        /// Bucket that was debited
        bucket: Bucket,
        /// Balance of the bucket when the debit was refused
        current: Decimal,
        /// Amount that was requested
        required: Decimal,
    },

    /// Accrual attempted before a whole day elapsed since the last one
    #[error("Cannot accrue before one full day has passed (next accrual at {next_accrual_at})")]
    TooEarly {
        /// Earliest instant at which the next accrual succeeds
        next_accrual_at: DateTime<Utc>,
    },

    /// Operation not allowed in the record's current state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Why the operation was refused
        message: String,
    },

    /// Sale-balance transfer exceeds the principal of investments past the lock period
    #[error(
        "Locked funds: only {withdrawable} from investments older than the lock period can be moved, requested {requested}"
    )]
    LockedFunds {
        /// Principal of investments past the lock period
        withdrawable: Decimal,
        /// Amount that was requested
        requested: Decimal,
    },

    /// The user already holds an active subscription at this level
    #[error("Already subscribed to VIP level {level}")]
    AlreadySubscribed {
        /// Ordinal of the VIP level
        level: i32,
    },

    /// The previous VIP level has not been purchased
    #[error("VIP level {level} is locked until level {required} is purchased")]
    LevelLocked {
        /// Level that was requested
        level: i32,
        /// Level that must be held first
        required: i32,
    },

    /// A concurrent writer changed the record between read and write
    #[error("Concurrent update detected on {entity} {id}")]
    Conflict {
        /// Kind of record that was contended
        entity: &'static str,
        /// Primary key of the record
        id: i64,
    },

    /// Transfer source is neither `gains` nor `sale`
    #[error("Invalid transfer source: {value}")]
    InvalidSource {
        /// The rejected source string
        value: String,
    },
}

impl Error {
    /// Builds a [`Error::NotFound`] for any displayable key.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Whether the caller may transparently re-read and re-apply the operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
