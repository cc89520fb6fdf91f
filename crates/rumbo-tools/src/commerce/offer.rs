//! Travel offer creation
//!
//! For a destination three products are published, in order: flight,
//! hotel, package. All three must succeed.

use super::price::Price;
use super::pricing::{PricingPolicy, HOTEL_NIGHTS};
use super::{CommerceError, CommerceProvider, ProductSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One purchasable item with its payment link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferItem {
    /// Product name
    pub name: String,
    /// Product description
    pub description: String,
    /// Price
    pub price: Price,
    /// Hosted checkout URL
    pub payment_link: String,
}

/// Flight, hotel and package offer for a destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelOffer {
    /// Destination the products were created for
    pub destination: String,
    /// Flight product
    pub flight: OfferItem,
    /// Hotel product
    pub hotel: OfferItem,
    /// Discounted package product
    pub package: OfferItem,
    /// Package discount
    pub discount_percent: u8,
}

/// Products to publish for a destination, in publishing order
#[must_use]
pub fn product_specs(policy: &PricingPolicy, destination: &str) -> [ProductSpec; 3] {
    let quote = policy.quote(destination);
    [
        ProductSpec {
            name: format!("Vuelo a {}", destination),
            description: format!("Vuelo redondo a {}", destination),
            price: quote.flight,
        },
        ProductSpec {
            name: format!("Hotel en {} ({} noches)", destination, HOTEL_NIGHTS),
            description: format!(
                "Hospedaje de {} noches en {} ({} por noche)",
                HOTEL_NIGHTS, destination, quote.hotel_nightly
            ),
            price: quote.hotel,
        },
        ProductSpec {
            name: format!("Paquete completo a {}", destination),
            description: format!(
                "Vuelo + hotel ({} noches) + 1 actividad en {} con {}% de descuento",
                HOTEL_NIGHTS, destination, quote.discount_percent
            ),
            price: quote.package,
        },
    ]
}

/// Publish flight, hotel and package products for a destination.
///
/// # Errors
/// The first provider failure aborts the offer.
pub async fn create_travel_offer(
    provider: &dyn CommerceProvider,
    policy: &PricingPolicy,
    destination: &str,
) -> Result<TravelOffer, CommerceError> {
    let [flight, hotel, package] = product_specs(policy, destination);

    let flight = publish(provider, flight).await?;
    let hotel = publish(provider, hotel).await?;
    let package = publish(provider, package).await?;

    info!(
        provider = provider.name(),
        destination,
        package = %package.price,
        "Travel offer created"
    );

    Ok(TravelOffer {
        destination: destination.to_string(),
        flight,
        hotel,
        package,
        discount_percent: policy.discount_percent(),
    })
}

async fn publish(
    provider: &dyn CommerceProvider,
    spec: ProductSpec,
) -> Result<OfferItem, CommerceError> {
    let payment_link = provider.publish_product(&spec).await?;
    debug!(product = %spec.name, link = %payment_link, "Product published");
    Ok(OfferItem {
        name: spec.name,
        description: spec.description,
        price: spec.price,
        payment_link,
    })
}
