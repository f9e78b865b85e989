/// Database connection and schema management
pub mod database;

/// Ledger settings and VIP catalog loading from config.toml
pub mod settings;
