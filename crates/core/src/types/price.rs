//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Convert the amount to the currency's smallest unit, rounded to the
    /// nearest integer (e.g., `12.345` USD becomes `1235` cents).
    ///
    /// Payment providers expect charge amounts in minor units.
    #[must_use]
    pub fn to_minor_units(&self) -> i64 {
        let scale = Decimal::from(10_u32.pow(u32::from(self.currency_code.decimal_places())));
        (self.amount * scale)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.currency_code.decimal_places() as usize;
        let rounded = self
            .amount
            .round_dp_with_strategy(places as u32, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{}{rounded:.places$}", self.currency_code.symbol())
    }
}

/// ISO 4217 currency codes known to the storefront.
///
/// USD is the base currency: catalog prices are authored in it and all
/// conversion rates are expressed against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    AUD,
    SLL,
}

impl CurrencyCode {
    /// All currency codes, in display order.
    pub const ALL: [Self; 6] = [
        Self::USD,
        Self::EUR,
        Self::GBP,
        Self::JPY,
        Self::AUD,
        Self::SLL,
    ];

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::JPY => "JPY",
            Self::AUD => "AUD",
            Self::SLL => "SLL",
        }
    }

    /// The display symbol, rendered before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::JPY => "¥",
            Self::AUD => "A$",
            Self::SLL => "Le",
        }
    }

    /// The human-readable currency name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::USD => "US Dollar",
            Self::EUR => "Euro",
            Self::GBP => "British Pound",
            Self::JPY => "Japanese Yen",
            Self::AUD => "Australian Dollar",
            Self::SLL => "Sierra Leonean Leone",
        }
    }

    /// Number of digits after the decimal point in rendered amounts.
    ///
    /// The yen is a zero-decimal currency; everything else here uses two.
    #[must_use]
    pub const fn decimal_places(self) -> u8 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error returned when a string is not a known currency code.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl std::str::FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCurrency(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    #[test]
    fn test_to_minor_units_rounds_to_nearest() {
        let price = Price::new(dec("12.345"), CurrencyCode::USD);
        assert_eq!(price.to_minor_units(), 1235);

        let price = Price::new(dec("10.00"), CurrencyCode::USD);
        assert_eq!(price.to_minor_units(), 1000);

        let price = Price::new(dec("0.994"), CurrencyCode::EUR);
        assert_eq!(price.to_minor_units(), 99);
    }

    #[test]
    fn test_to_minor_units_zero_decimal_currency() {
        // JPY has no minor unit: the amount itself is the charge amount.
        let price = Price::new(dec("1580"), CurrencyCode::JPY);
        assert_eq!(price.to_minor_units(), 1580);
    }

    #[test]
    fn test_display() {
        let price = Price::new(dec("9.2"), CurrencyCode::EUR);
        assert_eq!(price.to_string(), "€9.20");

        let price = Price::new(dec("1580.4"), CurrencyCode::JPY);
        assert_eq!(price.to_string(), "¥1580");
    }

    #[test]
    fn test_currency_code_from_str() {
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("XXX".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_base_currency_is_default() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::USD);
    }
}
