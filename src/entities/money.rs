//! Exact decimal column type.
//!
//! `SQLite` has no decimal storage class and the driver binds `Decimal` as a
//! float, so amounts are persisted as their canonical string and parsed back
//! with `Decimal::from_str`. Arithmetic never happens in SQL.

use rust_decimal::Decimal;
use sea_orm::sea_query::{ArrayType, ColumnType, Nullable, ValueType, ValueTypeErr};
use sea_orm::{ColIdx, DbErr, QueryResult, TryGetError, TryGetable, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A fixed-point amount stored losslessly as TEXT.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    /// Zero, at scale 0.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The wrapped decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl PartialEq<Decimal> for Money {
    fn eq(&self, other: &Decimal) -> bool {
        self.0 == *other
    }
}

impl Add<Decimal> for Money {
    type Output = Self;

    fn add(self, rhs: Decimal) -> Self {
        Self(self.0 + rhs)
    }
}

impl Sub<Decimal> for Money {
    type Output = Self;

    fn sub(self, rhs: Decimal) -> Self {
        Self(self.0 - rhs)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Money> for Value {
    fn from(money: Money) -> Self {
        Self::String(Some(Box::new(money.0.to_string())))
    }
}

impl TryGetable for Money {
    fn try_get_by<I: ColIdx>(res: &QueryResult, index: I) -> Result<Self, TryGetError> {
        let raw = String::try_get_by(res, index)?;
        Decimal::from_str(&raw).map(Self).map_err(|err| {
            TryGetError::DbErr(DbErr::Type(format!("invalid stored amount {raw:?}: {err}")))
        })
    }
}

impl ValueType for Money {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        match v {
            Value::String(Some(raw)) => Decimal::from_str(&raw).map(Self).map_err(|_| ValueTypeErr),
            _ => Err(ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "Money".to_owned()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::Text
    }
}

impl Nullable for Money {
    fn null() -> Value {
        Value::String(None)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_value_keeps_every_digit() {
        let large = Money(dec!(12345678901234567.89));
        let value: Value = large.into();
        assert_eq!(value, Value::String(Some(Box::new("12345678901234567.89".to_string()))));
        assert_eq!(<Money as ValueType>::try_from(value).unwrap(), large);
    }

    #[test]
    fn test_value_rejects_non_text() {
        assert!(<Money as ValueType>::try_from(Value::Double(Some(0.3))).is_err());
        assert!(<Money as ValueType>::try_from(Value::String(Some(Box::new("abc".into())))).is_err());
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let balance = Money::ZERO + dec!(0.1) + dec!(0.2);
        assert_eq!(balance - dec!(0.3), Decimal::ZERO);
    }
}
