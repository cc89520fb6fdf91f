//! Commerce specialist

use super::{SpecialistOutput, TRAVEL_PRODUCTS_TOOL};
use crate::commerce::{create_travel_offer, CommerceProvider, PricingPolicy};
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolCategory, ToolDefinition, ToolResult};
use std::sync::Arc;
use std::time::Instant;

/// Creates flight, hotel and package products with payment links
pub struct TravelProductsTool {
    definition: ToolDefinition,
    commerce: Arc<dyn CommerceProvider>,
    pricing: PricingPolicy,
}

impl TravelProductsTool {
    /// Create the specialist
    pub fn new(commerce: Arc<dyn CommerceProvider>, pricing: PricingPolicy) -> Self {
        let definition = ToolDefinition::new(
            TRAVEL_PRODUCTS_TOOL,
            "Create travel products (flight, hotel, package) and payment links for a destination",
        )
        .with_category(ToolCategory::Commerce)
        .with_specialist("Travel Payments Specialist")
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "destination": {"type": "string", "description": "Destination to sell"}
            },
            "required": ["destination"]
        }));

        Self {
            definition,
            commerce,
            pricing,
        }
    }

    fn destination(input: &serde_json::Value) -> Result<&str> {
        input
            .get("destination")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::InvalidInput("destination is required".to_string()))
    }
}

#[async_trait::async_trait]
impl Tool for TravelProductsTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn validate_input(&self, input: &serde_json::Value) -> Result<()> {
        Self::destination(input).map(|_| ())
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let destination = Self::destination(&input)?;

        let offer = create_travel_offer(self.commerce.as_ref(), &self.pricing, destination).await?;

        Ok(ToolResult::success(
            SpecialistOutput::TravelOffer(offer).to_value()?,
            start.elapsed().as_millis() as u64,
        ))
    }
}
