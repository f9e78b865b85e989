//! Explicit ledger context.
//!
//! The entry point builds one [`Ledger`] and hands a reference to every core
//! operation. It owns the store connection, the clock, and the settings.

use crate::clock::{Clock, SystemClock};
use crate::config::settings::LedgerSettings;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared handle passed to all engines.
pub struct Ledger {
    database: DatabaseConnection,
    clock: Arc<dyn Clock>,
    settings: LedgerSettings,
}

impl Ledger {
    /// Creates a ledger that reads the wall clock.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self::with_clock(database, Arc::new(SystemClock), settings)
    }

    /// Creates a ledger with an explicit clock.
    #[must_use]
    pub fn with_clock(
        database: DatabaseConnection,
        clock: Arc<dyn Clock>,
        settings: LedgerSettings,
    ) -> Self {
        Self {
            database,
            clock,
            settings,
        }
    }

    /// Store connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Current instant according to the ledger clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Ledger policy settings.
    #[must_use]
    pub const fn settings(&self) -> &LedgerSettings {
        &self.settings
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("now", &self.now())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
