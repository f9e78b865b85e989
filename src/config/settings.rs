//! Ledger settings and VIP catalog loading from config.toml
//!
//! The `[ledger]` table tunes policy (default currency and rate, lock period,
//! interest precision). The `[[vip_levels]]` array is the catalog seeded into
//! the store on first run.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::env::VarError;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Ledger policy
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// VIP catalog to seed
    #[serde(default)]
    pub vip_levels: Vec<VipLevelConfig>,
}

/// Policy knobs used by the engines
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Currency used when a caller does not name one
    pub default_currency: String,
    /// Daily rate used when an investment does not name one
    pub default_daily_rate: Decimal,
    /// Age an investment must reach before its principal unlocks sale balance
    pub sale_lock_days: i64,
    /// Decimal places kept on computed interest (truncated toward zero)
    pub interest_scale: u32,
    /// Deepest referral generation recorded
    pub max_referral_generation: i32,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            default_currency: "USDT".to_string(),
            default_daily_rate: Decimal::new(25, 3),
            sale_lock_days: 30,
            interest_scale: 2,
            max_referral_generation: 3,
        }
    }
}

/// Configuration for a single VIP level
#[derive(Debug, Deserialize, Clone)]
pub struct VipLevelConfig {
    /// Ordinal on the ladder, starting at 1
    pub level: i32,
    /// Display title
    pub title: String,
    /// Listed price
    pub price: Decimal,
    /// Advertised return percentage
    pub percentage: Decimal,
    /// Advertised daily gains
    pub daily_gains: Decimal,
    /// Days before gains become available
    #[serde(default)]
    pub delay_days: i32,
    /// Optional marketing text
    #[serde(default)]
    pub description: Option<String>,
}

impl Config {
    /// Checks the settings and catalog for values the engines cannot work with.
    pub fn validate(&self) -> Result<()> {
        let ledger = &self.ledger;
        if ledger.default_currency.trim().is_empty() {
            return Err(config_error("default_currency cannot be empty"));
        }
        if ledger.default_daily_rate.is_sign_negative() {
            return Err(config_error("default_daily_rate cannot be negative"));
        }
        if ledger.sale_lock_days < 0 {
            return Err(config_error("sale_lock_days cannot be negative"));
        }
        if ledger.max_referral_generation < 1 {
            return Err(config_error("max_referral_generation must be at least 1"));
        }

        let mut seen = HashSet::new();
        for vip in &self.vip_levels {
            if vip.level < 1 {
                return Err(config_error(&format!(
                    "VIP level must be at least 1, got {}",
                    vip.level
                )));
            }
            if !seen.insert(vip.level) {
                return Err(config_error(&format!("duplicate VIP level {}", vip.level)));
            }
            if vip.price.is_sign_negative() {
                return Err(config_error(&format!(
                    "VIP level {} has a negative price",
                    vip.level
                )));
            }
        }
        Ok(())
    }
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads ledger configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A setting or catalog row is out of range
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).inspect_err(|e| {
        tracing::warn!("Failed to read config file {}: {e}", path_ref.display());
    })?;
    parse_config(&contents)
}

/// Resolves the config path from a `CONFIG_PATH` lookup.
///
/// An unset variable falls back to ./config.toml; a set but non-unicode value
/// is an error rather than a silent fallback.
fn config_path(lookup: std::result::Result<String, VarError>) -> Result<String> {
    match lookup {
        Ok(path) => Ok(path),
        Err(VarError::NotPresent) => Ok("config.toml".to_string()),
        Err(e) => Err(e.into()),
    }
}

/// Loads configuration from `CONFIG_PATH`, or ./config.toml when unset
pub fn load_default_config() -> Result<Config> {
    let path = config_path(std::env::var("CONFIG_PATH"))?;
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [ledger]
            default_currency = "USDT"
            default_daily_rate = "0.03"
            sale_lock_days = 15
            interest_scale = 4
            max_referral_generation = 2

            [[vip_levels]]
            level = 1
            title = "VIP 1"
            price = "50"
            percentage = "1.5"
            daily_gains = "2"

            [[vip_levels]]
            level = 2
            title = "VIP 2"
            price = "100"
            percentage = "3"
            daily_gains = "4"
            delay_days = 7
            description = "Second rung"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.ledger.default_daily_rate, dec!(0.03));
        assert_eq!(config.ledger.sale_lock_days, 15);
        assert_eq!(config.ledger.interest_scale, 4);
        assert_eq!(config.vip_levels.len(), 2);
        assert_eq!(config.vip_levels[0].delay_days, 0);
        assert_eq!(config.vip_levels[1].price, dec!(100));
        assert_eq!(
            config.vip_levels[1].description.as_deref(),
            Some("Second rung")
        );
    }

    #[test]
    fn test_missing_tables_use_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.ledger, LedgerSettings::default());
        assert_eq!(config.ledger.default_currency, "USDT");
        assert_eq!(config.ledger.default_daily_rate, dec!(0.025));
        assert!(config.vip_levels.is_empty());
    }

    #[test]
    fn test_partial_ledger_table_keeps_other_defaults() {
        let config = parse_config("[ledger]\nsale_lock_days = 10\n").unwrap();
        assert_eq!(config.ledger.sale_lock_days, 10);
        assert_eq!(config.ledger.interest_scale, 2);
    }

    #[test]
    fn test_rejects_duplicate_levels() {
        let toml_str = r#"
            [[vip_levels]]
            level = 1
            title = "VIP 1"
            price = "50"
            percentage = "1.5"
            daily_gains = "2"

            [[vip_levels]]
            level = 1
            title = "Again"
            price = "50"
            percentage = "1.5"
            daily_gains = "2"
        "#;
        assert!(matches!(
            parse_config(toml_str),
            Err(Error::Config { message: _ })
        ));
    }

    #[test]
    fn test_rejects_negative_lock_period() {
        let result = parse_config("[ledger]\nsale_lock_days = -1\n");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(
            result,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_config_path_lookup() {
        assert_eq!(
            config_path(Err(VarError::NotPresent)).ok().as_deref(),
            Some("config.toml")
        );
        assert_eq!(
            config_path(Ok("/etc/ledger.toml".to_string())).ok().as_deref(),
            Some("/etc/ledger.toml")
        );
        let garbled = config_path(Err(VarError::NotUnicode(std::ffi::OsString::from("x"))));
        assert!(matches!(garbled, Err(Error::EnvVar(VarError::NotUnicode(_)))));
    }
}
