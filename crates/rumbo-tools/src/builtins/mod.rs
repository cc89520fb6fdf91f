//! Built-in specialists
//!
//! - `get_destination_info`: places at a destination, or suggestions
//! - `create_travel_products`: flight, hotel and package offers

mod catalog;
mod destination_info;
mod travel_products;

pub use catalog::{
    suggest_destinations, DestinationSuggestions, Suggestion, SuggestionPlanner, SuggestionSource,
    Theme,
};
pub use destination_info::{DestinationInfoTool, InfoMode};
pub use travel_products::TravelProductsTool;

use crate::commerce::{CommerceProvider, PricingPolicy, TravelOffer};
use crate::maps::{DestinationReport, PlaceSearch};
use crate::registry::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Registry name of the destination-info specialist
pub const DESTINATION_INFO_TOOL: &str = "get_destination_info";
/// Registry name of the commerce specialist
pub const TRAVEL_PRODUCTS_TOOL: &str = "create_travel_products";

/// Structured output of a specialist, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecialistOutput {
    /// Places at a destination
    DestinationReport(DestinationReport),
    /// Destinations proposed for a vague request
    Suggestions(DestinationSuggestions),
    /// Purchasable products for a destination
    TravelOffer(TravelOffer),
}

impl SpecialistOutput {
    /// Serialize for a [`crate::ToolResult`] payload
    pub fn to_value(&self) -> crate::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Register both specialists
pub fn register_builtins(
    registry: &mut ToolRegistry,
    places: Arc<dyn PlaceSearch>,
    commerce: Arc<dyn CommerceProvider>,
    pricing: PricingPolicy,
) {
    registry.register(Arc::new(DestinationInfoTool::new(places)));
    registry.register(Arc::new(TravelProductsTool::new(commerce, pricing)));
}
