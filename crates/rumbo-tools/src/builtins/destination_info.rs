//! Destination-info specialist

use super::catalog::{DestinationSuggestions, SuggestionPlanner};
use super::{SpecialistOutput, DESTINATION_INFO_TOOL};
use crate::error::{Error, Result};
use crate::maps::{DestinationReport, PlaceSearch, PlaceSearchResult};
use crate::registry::{Tool, ToolCategory, ToolDefinition, ToolResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// What the specialist is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoMode {
    /// Places at a named destination
    Details,
    /// Destination ideas for an open-ended request
    Suggest,
}

#[derive(Debug, Deserialize)]
struct Input {
    #[serde(default)]
    mode: Option<InfoMode>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    query: String,
    #[serde(default)]
    context: String,
}

impl Input {
    fn destination(&self) -> Option<&str> {
        self.destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    fn mode(&self) -> InfoMode {
        match (self.mode, self.destination()) {
            (Some(mode), _) => mode,
            (None, Some(_)) => InfoMode::Details,
            (None, None) => InfoMode::Suggest,
        }
    }
}

/// Destination information backed by a place search provider
pub struct DestinationInfoTool {
    definition: ToolDefinition,
    places: Arc<dyn PlaceSearch>,
}

impl DestinationInfoTool {
    /// Create the specialist
    pub fn new(places: Arc<dyn PlaceSearch>) -> Self {
        let definition = ToolDefinition::new(
            DESTINATION_INFO_TOOL,
            "Get information about travel destinations and notable places using Google Maps, \
             or suggest destinations for open-ended travel requests",
        )
        .with_category(ToolCategory::Information)
        .with_specialist("Maps Specialist")
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "mode": {"type": "string", "enum": ["details", "suggest"]},
                "destination": {"type": "string", "description": "Destination to describe"},
                "query": {"type": "string", "description": "Original user request"},
                "context": {"type": "string", "description": "Conversation so far"}
            }
        }));

        Self { definition, places }
    }

    async fn details(&self, destination: &str) -> Result<DestinationReport> {
        let report = match self.places.search_places(destination).await? {
            PlaceSearchResult::Places(places) => DestinationReport {
                destination: destination.to_string(),
                places,
                summary: None,
            },
            PlaceSearchResult::Text(text) => DestinationReport {
                destination: destination.to_string(),
                places: Vec::new(),
                summary: Some(text).filter(|t| !t.is_empty()),
            },
        };
        debug!(
            provider = self.places.name(),
            destination,
            places = report.places.len(),
            "Destination report ready"
        );
        Ok(report)
    }

    /// One themed destination search per theme until three are found;
    /// themes the provider has nothing usable for come from the catalog.
    async fn suggest(&self, query: &str, context: &str) -> Result<DestinationSuggestions> {
        let mut planner = SuggestionPlanner::new(query, context);
        for theme in planner.themes() {
            if planner.is_full() {
                break;
            }
            let found = match self.places.search_destinations(theme.search_query()).await? {
                PlaceSearchResult::Places(places) => planner.accept_places(theme, &places),
                PlaceSearchResult::Text(_) => false,
            };
            if !found && planner.accept_catalog(theme) {
                debug!(provider = self.places.name(), ?theme, "Catalog fallback for theme");
            }
        }

        let suggestions = planner.finish();
        debug!(
            provider = self.places.name(),
            suggestions = suggestions.suggestions.len(),
            "Suggestions ready"
        );
        Ok(suggestions)
    }
}

#[async_trait::async_trait]
impl Tool for DestinationInfoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn validate_input(&self, input: &serde_json::Value) -> Result<()> {
        let parsed: Input = serde_json::from_value(input.clone())
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        if parsed.mode() == InfoMode::Details && parsed.destination().is_none() {
            return Err(Error::InvalidInput(
                "details mode requires a destination".to_string(),
            ));
        }
        Ok(())
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let input: Input =
            serde_json::from_value(input).map_err(|e| Error::InvalidInput(e.to_string()))?;

        let output = match (input.mode(), input.destination()) {
            (InfoMode::Details, Some(destination)) => {
                SpecialistOutput::DestinationReport(self.details(destination).await?)
            }
            (InfoMode::Details, None) => {
                return Err(Error::InvalidInput(
                    "details mode requires a destination".to_string(),
                ));
            }
            (InfoMode::Suggest, _) => {
                SpecialistOutput::Suggestions(self.suggest(&input.query, &input.context).await?)
            }
        };

        Ok(ToolResult::success(
            output.to_value()?,
            start.elapsed().as_millis() as u64,
        ))
    }
}
