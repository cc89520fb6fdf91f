//! Money amounts in integer minor units

use super::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ISO 4217 codes Stripe treats as zero-decimal.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

// Keeps `major * 10^exp` well inside i64.
const MAX_MAJOR_AMOUNT: f64 = 1e12;

/// Number of decimal places of a currency's minor unit
#[must_use]
pub fn currency_exponent(currency: &str) -> u32 {
    let code = currency.trim().to_ascii_lowercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&code.as_str()) {
        0
    } else {
        2
    }
}

/// An amount of money in the currency's smallest unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in minor units (cents for USD, yen for JPY)
    pub minor_units: i64,
    /// Lowercase ISO 4217 code
    pub currency: String,
}

impl Price {
    /// Price from minor units
    #[must_use]
    pub fn new(minor_units: i64, currency: &str) -> Self {
        Self {
            minor_units,
            currency: currency.trim().to_ascii_lowercase(),
        }
    }

    /// Price from a whole number of major units
    #[must_use]
    pub fn from_whole(major: i64, currency: &str) -> Self {
        let factor = 10_i64.pow(currency_exponent(currency));
        Self::new(major * factor, currency)
    }

    /// Price from a decimal amount in major units, rounded to the minor unit.
    ///
    /// # Errors
    /// Rejects non-finite, non-positive or out-of-range amounts, and amounts
    /// that round to zero.
    pub fn from_decimal(amount: f64, currency: &str) -> Result<Self, CommerceError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CommerceError::InvalidAmount(format!(
                "amount must be a positive number, got {}",
                amount
            )));
        }
        if amount > MAX_MAJOR_AMOUNT {
            return Err(CommerceError::InvalidAmount(format!(
                "amount {} is too large",
                amount
            )));
        }

        let factor = 10_f64.powi(currency_exponent(currency) as i32);
        let minor_units = (amount * factor).round() as i64;
        if minor_units <= 0 {
            return Err(CommerceError::InvalidAmount(format!(
                "amount {} is below the smallest currency unit",
                amount
            )));
        }

        Ok(Self::new(minor_units, currency))
    }

    /// Decimal places of this price's currency
    #[must_use]
    pub fn exponent(&self) -> u32 {
        currency_exponent(&self.currency)
    }

    /// Amount in major units as a plain decimal string, e.g. `1234.50`
    #[must_use]
    pub fn to_decimal_string(&self) -> String {
        let exponent = self.exponent();
        if exponent == 0 {
            return self.minor_units.to_string();
        }
        let factor = 10_i64.pow(exponent);
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        format!(
            "{}{}.{:0width$}",
            sign,
            abs / factor as u64,
            abs % factor as u64,
            width = exponent as usize
        )
    }
}

impl fmt::Display for Price {
    /// `1,234.50 USD`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self.to_decimal_string();
        let (sign, unsigned) = match plain.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", plain.as_str()),
        };
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (unsigned, None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}{}", sign, grouped)?;
        if let Some(fraction) = fraction {
            write!(f, ".{}", fraction)?;
        }
        write!(f, " {}", self.currency.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_exponent() {
        assert_eq!(currency_exponent("usd"), 2);
        assert_eq!(currency_exponent("MXN"), 2);
        assert_eq!(currency_exponent("jpy"), 0);
        assert_eq!(currency_exponent(" KRW "), 0);
    }

    #[test]
    fn test_from_decimal_rounds_to_minor_unit() {
        assert_eq!(Price::from_decimal(19.99, "usd").unwrap().minor_units, 1999);
        assert_eq!(Price::from_decimal(0.125, "mxn").unwrap().minor_units, 13);
        assert_eq!(Price::from_decimal(1500.0, "jpy").unwrap().minor_units, 1500);
        assert_eq!(Price::from_decimal(1500.6, "JPY").unwrap().minor_units, 1501);
    }

    #[test]
    fn test_from_decimal_rejects_bad_amounts() {
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY, 0.001, 1e13] {
            assert!(
                matches!(
                    Price::from_decimal(amount, "usd"),
                    Err(CommerceError::InvalidAmount(_))
                ),
                "{} should be rejected",
                amount
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::new(123450, "usd").to_string(), "1,234.50 USD");
        assert_eq!(Price::new(5000, "usd").to_string(), "50.00 USD");
        assert_eq!(Price::new(7, "usd").to_string(), "0.07 USD");
        assert_eq!(Price::new(1500000, "jpy").to_string(), "1,500,000 JPY");
        assert_eq!(Price::from_whole(600, "usd").minor_units, 60000);
    }
}
