//! Maps - place search for destination reports
//!
//! [`PlaceSearch`] is the narrow interface the destination-info specialist
//! needs: places at a destination, and destinations for a travel theme. [`McpPlaceSearch`] implements it on top of the maps MCP server's
//! `maps_search_places` tool.

use crate::error::{Error, Result};
use crate::mcp::SharedMcpServer;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Name of the place search tool exposed by the maps server
pub const SEARCH_PLACES_TOOL: &str = "maps_search_places";

/// A point of interest at a destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Display name
    pub name: String,
    /// Formatted address
    pub address: String,
    /// Average rating (0-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Maps place identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    /// Link to the place on Google Maps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
}

impl Place {
    /// Google Maps URL for a place id
    #[must_use]
    pub fn maps_url_for(place_id: &str) -> String {
        format!("https://www.google.com/maps/place/?q=place_id:{}", place_id)
    }
}

/// Places found for one destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationReport {
    /// Destination searched for
    pub destination: String,
    /// Places found, best first
    #[serde(default)]
    pub places: Vec<Place>,
    /// Free text from the provider when it did not return structured places
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Outcome of a place search
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceSearchResult {
    /// Structured places
    Places(Vec<Place>),
    /// Unstructured provider output
    Text(String),
}

/// Place search provider
#[async_trait::async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Search for notable places at a destination
    async fn search_places(&self, destination: &str) -> Result<PlaceSearchResult>;

    /// Search for destinations matching a free-text travel theme
    async fn search_destinations(&self, query: &str) -> Result<PlaceSearchResult>;
}

/// Place search through the shared maps MCP server
#[derive(Clone)]
pub struct McpPlaceSearch {
    server: SharedMcpServer,
    max_places: usize,
    radius_m: Option<u32>,
}

impl McpPlaceSearch {
    /// Create a search provider over the shared server
    #[must_use]
    pub fn new(server: SharedMcpServer, max_places: usize) -> Self {
        Self {
            server,
            max_places,
            radius_m: None,
        }
    }

    /// Set the search radius forwarded to the server
    #[must_use]
    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = Some(radius_m);
        self
    }

    async fn search(&self, query: String) -> Result<PlaceSearchResult> {
        let client = self.server.client().await?;

        let mut arguments = serde_json::json!({ "query": query });
        if let Some(radius) = self.radius_m {
            arguments["radius"] = serde_json::json!(radius);
        }

        let result = client.call_tool(SEARCH_PLACES_TOOL, arguments).await?;
        let text = result.text();

        if result.is_error {
            return Err(Error::Execution(format!("place search failed: {}", text)));
        }
        Ok(parse_places(&text, self.max_places))
    }
}

#[async_trait::async_trait]
impl PlaceSearch for McpPlaceSearch {
    fn name(&self) -> &str {
        "google_maps"
    }

    #[instrument(skip(self))]
    async fn search_places(&self, destination: &str) -> Result<PlaceSearchResult> {
        let parsed = self
            .search(format!("top tourist attractions in {}", destination))
            .await?;
        debug!(
            destination,
            structured = matches!(parsed, PlaceSearchResult::Places(_)),
            "Place search completed"
        );
        Ok(parsed)
    }

    #[instrument(skip(self))]
    async fn search_destinations(&self, query: &str) -> Result<PlaceSearchResult> {
        let parsed = self.search(query.to_string()).await?;
        debug!(
            query,
            structured = matches!(parsed, PlaceSearchResult::Places(_)),
            "Destination search completed"
        );
        Ok(parsed)
    }
}

#[derive(Deserialize)]
struct RawSearchResult {
    places: Vec<RawPlace>,
}

#[derive(Deserialize)]
struct RawPlace {
    name: String,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    place_id: Option<String>,
}

/// Parse the maps server's JSON payload, keeping at most `max_places`.
///
/// Payloads that are not the expected JSON come back as text.
#[must_use]
pub fn parse_places(text: &str, max_places: usize) -> PlaceSearchResult {
    match serde_json::from_str::<RawSearchResult>(text) {
        Ok(raw) => PlaceSearchResult::Places(
            raw.places
                .into_iter()
                .filter(|p| !p.name.trim().is_empty())
                .take(max_places)
                .map(|p| Place {
                    maps_url: p.place_id.as_deref().map(Place::maps_url_for),
                    name: p.name.trim().to_string(),
                    address: p.formatted_address.unwrap_or_default(),
                    rating: p.rating,
                    place_id: p.place_id,
                })
                .collect(),
        ),
        Err(_) => PlaceSearchResult::Text(text.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "places": [
            {
                "name": "Colosseum",
                "formatted_address": "Piazza del Colosseo, 1, 00184 Roma RM, Italy",
                "location": {"lat": 41.89, "lng": 12.49},
                "place_id": "ChIJrRMgU7ZhLxMRxAOFkC7I8Sg",
                "rating": 4.7,
                "types": ["tourist_attraction"]
            },
            {
                "name": "Trevi Fountain",
                "formatted_address": "Piazza di Trevi, 00187 Roma RM, Italy",
                "place_id": "ChIJ1UCDJ1NgLxMRtrsCzOHxdvY"
            },
            {
                "name": "Pantheon",
                "formatted_address": "Piazza della Rotonda, 00186 Roma RM, Italy"
            }
        ]
    }"#;

    #[test]
    fn test_parse_places() {
        let PlaceSearchResult::Places(places) = parse_places(SAMPLE, 10) else {
            panic!("expected structured places");
        };

        assert_eq!(places.len(), 3);
        assert_eq!(places[0].name, "Colosseum");
        assert_eq!(places[0].rating, Some(4.7));
        assert_eq!(
            places[0].maps_url.as_deref(),
            Some("https://www.google.com/maps/place/?q=place_id:ChIJrRMgU7ZhLxMRxAOFkC7I8Sg")
        );
        assert!(places[2].place_id.is_none());
        assert!(places[2].maps_url.is_none());
    }

    #[test]
    fn test_parse_places_respects_limit() {
        let PlaceSearchResult::Places(places) = parse_places(SAMPLE, 2) else {
            panic!("expected structured places");
        };
        assert_eq!(places.len(), 2);
    }

    #[test]
    fn test_unstructured_output_is_kept_as_text() {
        assert_eq!(
            parse_places("  Rome has many sights.  ", 5),
            PlaceSearchResult::Text("Rome has many sights.".to_string())
        );
    }

    #[tokio::test]
    async fn test_search_without_connection_fails() {
        let server = SharedMcpServer::new(crate::mcp::McpServerConfig::new(
            "maps",
            "npx",
            Vec::new(),
        ));
        let search = McpPlaceSearch::new(server, 5);
        assert!(matches!(
            search.search_places("Roma").await,
            Err(Error::Mcp(crate::mcp::McpError::NotConnected))
        ));
        assert!(matches!(
            search.search_destinations("destinos de playa").await,
            Err(Error::Mcp(crate::mcp::McpError::NotConnected))
        ));
    }
}
