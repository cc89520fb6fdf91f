//! Deterministic travel pricing
//!
//! Quotes are derived from a SHA-256 digest of the lowercased destination,
//! so a destination always gets the same flight and hotel prices.
//!
//! The price bands are whole units of a two-decimal currency (350-600 for
//! a flight means USD 350.00-600.00). Zero-decimal currencies such as JPY
//! would turn them into 350-600 yen, so policies refuse them.

use super::price::{currency_exponent, Price};
use super::CommerceError;
use sha2::{Digest, Sha256};
use std::ops::RangeInclusive;

/// Flight price band, in whole major units
pub const FLIGHT_PRICE_RANGE: RangeInclusive<i64> = 350..=600;
/// Hotel nightly rate band, in whole major units
pub const HOTEL_NIGHTLY_RANGE: RangeInclusive<i64> = 150..=400;
/// Nights included in the hotel product
pub const HOTEL_NIGHTS: i64 = 3;
/// Package discount applied when none is configured
pub const DEFAULT_DISCOUNT_PERCENT: u8 = 12;
/// Allowed package discounts
pub const DISCOUNT_RANGE: RangeInclusive<u8> = 10..=15;

/// Prices for one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Flight price
    pub flight: Price,
    /// Hotel nightly rate
    pub hotel_nightly: Price,
    /// Hotel price for all nights
    pub hotel: Price,
    /// Discounted flight + hotel package
    pub package: Price,
    /// Discount applied to the package
    pub discount_percent: u8,
}

/// Pricing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingPolicy {
    currency: String,
    discount_percent: u8,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            discount_percent: DEFAULT_DISCOUNT_PERCENT,
        }
    }
}

impl PricingPolicy {
    /// Create a policy.
    ///
    /// # Errors
    /// Returns `InvalidDiscount` when the discount is outside 10-15% and
    /// `UnsupportedCurrency` for a currency without two decimal places.
    pub fn new(currency: &str, discount_percent: u8) -> Result<Self, CommerceError> {
        if !DISCOUNT_RANGE.contains(&discount_percent) {
            return Err(CommerceError::InvalidDiscount(discount_percent));
        }
        let currency = currency.trim().to_ascii_lowercase();
        if currency.is_empty() || currency_exponent(&currency) != 2 {
            return Err(CommerceError::UnsupportedCurrency(currency));
        }
        Ok(Self {
            currency,
            discount_percent,
        })
    }

    /// Currency quotes are expressed in
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Package discount
    #[must_use]
    pub fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    /// Quote flight, hotel and package prices for a destination
    #[must_use]
    pub fn quote(&self, destination: &str) -> Quote {
        let digest = Sha256::digest(destination.trim().to_lowercase().as_bytes());

        let flight_major = pick(&digest[0..8], &FLIGHT_PRICE_RANGE);
        let nightly_major = pick(&digest[8..16], &HOTEL_NIGHTLY_RANGE);

        let flight = Price::from_whole(flight_major, &self.currency);
        let hotel_nightly = Price::from_whole(nightly_major, &self.currency);
        let hotel = Price::new(hotel_nightly.minor_units * HOTEL_NIGHTS, &self.currency);

        let undiscounted = flight.minor_units + hotel.minor_units;
        let keep = i64::from(100 - self.discount_percent);
        // Half-up rounding to the minor unit.
        let package = Price::new((undiscounted * keep + 50) / 100, &self.currency);

        Quote {
            flight,
            hotel_nightly,
            hotel,
            package,
            discount_percent: self.discount_percent,
        }
    }
}

fn pick(bytes: &[u8], range: &RangeInclusive<i64>) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    let value = u64::from_be_bytes(buf);
    let span = (range.end() - range.start() + 1) as u64;
    range.start() + (value % span) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_band() {
        assert!(PricingPolicy::new("usd", 10).is_ok());
        assert!(PricingPolicy::new("usd", 15).is_ok());
        assert!(matches!(
            PricingPolicy::new("usd", 9),
            Err(CommerceError::InvalidDiscount(9))
        ));
        assert!(PricingPolicy::new("usd", 16).is_err());
    }

    #[test]
    fn test_quote_is_deterministic_and_case_insensitive() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.quote("Roma"), policy.quote("roma"));
        assert_eq!(policy.quote("Roma"), policy.quote("  ROMA "));
    }

    #[test]
    fn test_quotes_stay_in_bands() {
        let policy = PricingPolicy::default();
        for destination in ["Roma", "Cancún", "Tokio", "Paris", "Bali", "Cusco", "Lisboa"] {
            let quote = policy.quote(destination);
            let flight = quote.flight.minor_units / 100;
            let nightly = quote.hotel_nightly.minor_units / 100;

            assert!(FLIGHT_PRICE_RANGE.contains(&flight), "{}", destination);
            assert!(HOTEL_NIGHTLY_RANGE.contains(&nightly), "{}", destination);
            assert_eq!(quote.hotel.minor_units, quote.hotel_nightly.minor_units * 3);

            let total = (quote.flight.minor_units + quote.hotel.minor_units) as f64;
            let package = quote.package.minor_units as f64;
            assert!(package >= total * 0.85 - 1.0 && package <= total * 0.90 + 1.0);
        }
    }

    #[test]
    fn test_package_rounding_is_half_up() {
        let policy = PricingPolicy::new("usd", 12).unwrap();
        let quote = policy.quote("Roma");
        let total = quote.flight.minor_units + quote.hotel.minor_units;
        let exact = total as f64 * 0.88;
        assert_eq!(quote.package.minor_units, (exact + 0.5).floor() as i64);
        assert_eq!(quote.discount_percent, 12);
    }

    #[test]
    fn test_zero_decimal_currency_is_rejected() {
        assert!(matches!(
            PricingPolicy::new("JPY", 12),
            Err(CommerceError::UnsupportedCurrency(c)) if c == "jpy"
        ));
        assert!(PricingPolicy::new("krw", 12).is_err());
        assert!(PricingPolicy::new("  ", 12).is_err());

        let policy = PricingPolicy::new(" MXN ", 12).unwrap();
        assert_eq!(policy.currency(), "mxn");
        let quote = policy.quote("Cancún");
        assert_eq!(quote.flight.minor_units % 100, 0);
        assert!(FLIGHT_PRICE_RANGE.contains(&(quote.flight.minor_units / 100)));
    }
}
