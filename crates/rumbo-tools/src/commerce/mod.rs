//! Commerce - travel products and payments
//!
//! - [`price`]: currency-aware money amounts
//! - [`pricing`]: deterministic quotes per destination
//! - [`offer`]: the three-item product creation protocol
//! - [`stripe`]: the Stripe REST provider

pub mod offer;
pub mod price;
pub mod pricing;
pub mod stripe;

pub use offer::{create_travel_offer, OfferItem, TravelOffer};
pub use price::{currency_exponent, Price};
pub use pricing::{PricingPolicy, Quote, DEFAULT_DISCOUNT_PERCENT};
pub use stripe::{StripeClient, StripeConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commerce error type
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Missing credentials or invalid provider setup
    #[error("commerce provider not configured: {0}")]
    NotConfigured(String),

    /// Amount is not a positive finite number in range
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Discount outside the allowed band
    #[error("discount {0}% is outside the allowed 10-15% range")]
    InvalidDiscount(u8),

    /// Currency the pricing bands cannot be expressed in
    #[error("unsupported pricing currency: {0}")]
    UnsupportedCurrency(String),

    /// Transport failure talking to the provider
    #[error("http error: {0}")]
    Http(String),

    /// Provider rejected the request
    #[error("provider error ({status}): {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Provider message
        message: String,
    },

    /// Provider answered with an unexpected payload
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// A product to publish with the commerce provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSpec {
    /// Product name shown at checkout
    pub name: String,
    /// Short description
    pub description: String,
    /// Unit price
    pub price: Price,
}

/// Direct charge request
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentRequest {
    /// Amount to charge
    pub amount: Price,
    /// Payment description
    pub description: String,
    /// Provider payment method id
    pub payment_method: String,
    /// Where the customer lands after any redirect-based confirmation
    pub return_url: Option<String>,
}

/// A created payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider id
    pub id: String,
    /// Provider status, e.g. `succeeded` or `requires_action`
    #[serde(default)]
    pub status: String,
}

/// Payment processor interface
#[async_trait::async_trait]
pub trait CommerceProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Create the product, its price and a payment link; returns the link URL
    async fn publish_product(&self, product: &ProductSpec) -> Result<String, CommerceError>;

    /// Create and confirm a payment intent
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, CommerceError>;
}
