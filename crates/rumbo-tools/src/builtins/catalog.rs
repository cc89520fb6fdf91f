//! Destination suggestions for open-ended travel requests
//!
//! [`SuggestionPlanner`] picks one destination per theme, preferring places
//! the maps provider returns for a themed search and falling back to a
//! curated catalog.

use crate::maps::Place;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Kind of trip a destination is known for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Sun and sea
    Beach,
    /// Urban life
    City,
    /// Outdoors and nature
    Adventure,
    /// History, art and heritage
    Culture,
}

impl Theme {
    /// All themes in default presentation order
    pub const ALL: [Theme; 4] = [Theme::Beach, Theme::City, Theme::Adventure, Theme::Culture];

    /// Free-text search sent to the place search provider
    #[must_use]
    pub fn search_query(self) -> &'static str {
        match self {
            Theme::Beach => "mejores destinos de playa para vacaciones",
            Theme::City => "mejores ciudades para visitar",
            Theme::Adventure => "destinos de aventura y naturaleza",
            Theme::Culture => "destinos culturales e históricos",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Theme::Beach => &[
                "playa", "playas", "beach", "beaches", "mar", "sea", "costa", "coast", "caribe",
                "caribbean", "isla", "islas", "island", "islands", "surf", "bucear", "snorkel",
            ],
            Theme::City => &[
                "ciudad", "ciudades", "city", "cities", "urbano", "urban", "compras", "shopping",
                "nocturna", "nightlife", "restaurantes", "restaurants", "gastronomía", "food",
            ],
            Theme::Adventure => &[
                "aventura", "aventuras", "adventure", "montaña", "montañas", "mountain",
                "mountains", "senderismo", "hiking", "trekking", "naturaleza", "nature", "selva",
                "jungle", "volcán", "volcano", "safari", "escalar",
            ],
            Theme::Culture => &[
                "cultura", "cultural", "culture", "museo", "museos", "museum", "museums",
                "historia", "history", "histórico", "historic", "arte", "art", "ruinas", "ruins",
                "templo", "templos", "temple", "temples", "arquitectura", "architecture",
            ],
        }
    }
}

/// Where a suggestion came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// Found by the place search provider
    Maps,
    /// Curated catalog, used when the provider had nothing usable
    #[default]
    Catalog,
}

/// A proposed destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Destination name
    pub name: String,
    /// Country
    pub country: String,
    /// Why it fits
    pub theme: Theme,
    /// One-line pitch
    pub blurb: String,
    /// Provenance
    #[serde(default)]
    pub source: SuggestionSource,
}

/// Destinations proposed for a vague request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationSuggestions {
    /// Two or three diverse destinations
    pub suggestions: Vec<Suggestion>,
}

struct Entry {
    name: &'static str,
    country: &'static str,
    theme: Theme,
    blurb: &'static str,
}

const CATALOG: &[Entry] = &[
    Entry { name: "Cancún", country: "México", theme: Theme::Beach, blurb: "Aguas turquesa del Caribe, arena blanca y arrecifes para hacer snorkel." },
    Entry { name: "Bali", country: "Indonesia", theme: Theme::Beach, blurb: "Playas de surf, arrozales en terrazas y templos frente al mar." },
    Entry { name: "Punta Cana", country: "República Dominicana", theme: Theme::Beach, blurb: "Kilómetros de playa con palmeras y resorts todo incluido." },
    Entry { name: "Tulum", country: "México", theme: Theme::Beach, blurb: "Ruinas mayas sobre acantilados y cenotes de agua cristalina." },
    Entry { name: "Nueva York", country: "Estados Unidos", theme: Theme::City, blurb: "Rascacielos, Broadway y barrios con personalidad propia." },
    Entry { name: "Tokio", country: "Japón", theme: Theme::City, blurb: "Neón, gastronomía inigualable y tradición en cada esquina." },
    Entry { name: "Barcelona", country: "España", theme: Theme::City, blurb: "Arquitectura de Gaudí, tapas y playa dentro de la ciudad." },
    Entry { name: "Buenos Aires", country: "Argentina", theme: Theme::City, blurb: "Tango, cafés históricos y una vida nocturna que no se detiene." },
    Entry { name: "Patagonia", country: "Argentina", theme: Theme::Adventure, blurb: "Glaciares, senderos míticos y paisajes del fin del mundo." },
    Entry { name: "Costa Rica", country: "Costa Rica", theme: Theme::Adventure, blurb: "Volcanes, tirolesas sobre la selva y fauna por todas partes." },
    Entry { name: "Queenstown", country: "Nueva Zelanda", theme: Theme::Adventure, blurb: "Capital mundial de la aventura: puenting, esquí y fiordos." },
    Entry { name: "Islandia", country: "Islandia", theme: Theme::Adventure, blurb: "Auroras boreales, géiseres y cascadas entre campos de lava." },
    Entry { name: "Roma", country: "Italia", theme: Theme::Culture, blurb: "Dos mil años de historia entre el Coliseo, el Vaticano y sus plazas." },
    Entry { name: "Cusco", country: "Perú", theme: Theme::Culture, blurb: "Puerta de entrada a Machu Picchu y corazón del imperio inca." },
    Entry { name: "Kioto", country: "Japón", theme: Theme::Culture, blurb: "Templos, jardines zen y el barrio de geishas de Gion." },
    Entry { name: "Estambul", country: "Turquía", theme: Theme::Culture, blurb: "Entre Europa y Asia: bazares, mezquitas y el Bósforo." },
];

const MIN_SUGGESTIONS: usize = 2;
const MAX_SUGGESTIONS: usize = 3;

/// Themes mentioned in free text, in [`Theme::ALL`] order
#[must_use]
pub fn detect_themes(text: &str) -> Vec<Theme> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    Theme::ALL
        .into_iter()
        .filter(|theme| theme.keywords().iter().any(|kw| words.contains(kw)))
        .collect()
}

/// Builds two or three suggestions with distinct themes for one request.
///
/// Themes found in the query come first, then those found in the
/// conversation, then the remaining themes. Destinations already named in
/// the conversation are skipped unless that would leave fewer than two
/// suggestions. Catalog picks depend only on the query text.
#[derive(Debug)]
pub struct SuggestionPlanner {
    themes: Vec<Theme>,
    seed: u64,
    context: String,
    picked: Vec<Suggestion>,
}

impl SuggestionPlanner {
    /// Plan suggestions for a query in its conversation
    #[must_use]
    pub fn new(query: &str, context: &str) -> Self {
        let mut themes = detect_themes(query);
        for theme in detect_themes(context).into_iter().chain(Theme::ALL) {
            if !themes.contains(&theme) {
                themes.push(theme);
            }
        }

        let digest = Sha256::digest(query.trim().to_lowercase().as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);

        Self {
            themes,
            seed: u64::from_be_bytes(seed),
            context: context.to_lowercase(),
            picked: Vec::new(),
        }
    }

    /// Themes in preference order
    #[must_use]
    pub fn themes(&self) -> Vec<Theme> {
        self.themes.clone()
    }

    /// Whether no more suggestions are needed
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.picked.len() >= MAX_SUGGESTIONS
    }

    fn mentioned(&self, name: &str) -> bool {
        self.context.contains(&name.to_lowercase())
    }

    fn taken(&self, name: &str) -> bool {
        self.picked
            .iter()
            .any(|s| s.name.to_lowercase() == name.to_lowercase())
    }

    fn has_theme(&self, theme: Theme) -> bool {
        self.picked.iter().any(|s| s.theme == theme)
    }

    /// Take the first usable place from a themed search. Returns whether
    /// one was accepted.
    pub fn accept_places(&mut self, theme: Theme, places: &[Place]) -> bool {
        if self.is_full() || self.has_theme(theme) {
            return false;
        }
        let Some(place) = places.iter().find(|p| {
            let name = p.name.trim();
            !name.is_empty() && !self.mentioned(name) && !self.taken(name)
        }) else {
            return false;
        };

        let country = place
            .address
            .rsplit(',')
            .next()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let blurb = match (place.address.trim(), place.rating) {
            ("", _) => "Recomendado en Google Maps.".to_string(),
            (address, Some(rating)) => format!("{} · ⭐ {:.1}", address, rating),
            (address, None) => address.to_string(),
        };
        self.picked.push(Suggestion {
            name: place.name.trim().to_string(),
            country,
            theme,
            blurb,
            source: SuggestionSource::Maps,
        });
        true
    }

    /// Fill a theme from the catalog. Returns whether an entry was accepted.
    pub fn accept_catalog(&mut self, theme: Theme) -> bool {
        self.pick_catalog(theme, false)
    }

    fn pick_catalog(&mut self, theme: Theme, allow_mentioned: bool) -> bool {
        if self.is_full() || self.has_theme(theme) {
            return false;
        }
        let candidates: Vec<&Entry> = CATALOG
            .iter()
            .filter(|e| e.theme == theme)
            .filter(|e| !self.taken(e.name))
            .filter(|e| allow_mentioned || !self.mentioned(e.name))
            .collect();
        if candidates.is_empty() {
            return false;
        }

        let entry = candidates[(self.seed % candidates.len() as u64) as usize];
        self.picked.push(Suggestion {
            name: entry.name.to_string(),
            country: entry.country.to_string(),
            theme: entry.theme,
            blurb: entry.blurb.to_string(),
            source: SuggestionSource::Catalog,
        });
        true
    }

    /// The suggestions, topped up from the catalog when fewer than two
    /// were found
    #[must_use]
    pub fn finish(mut self) -> DestinationSuggestions {
        if self.picked.len() < MIN_SUGGESTIONS {
            for theme in self.themes() {
                self.pick_catalog(theme, true);
            }
        }
        DestinationSuggestions {
            suggestions: self.picked,
        }
    }
}

/// Catalog-only suggestions for a query in its conversation
#[must_use]
pub fn suggest_destinations(query: &str, context: &str) -> DestinationSuggestions {
    let mut planner = SuggestionPlanner::new(query, context);
    for theme in planner.themes() {
        planner.accept_catalog(theme);
    }
    planner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_themes() {
        assert_eq!(
            detect_themes("Recomiéndame un destino de playa"),
            vec![Theme::Beach]
        );
        assert_eq!(
            detect_themes("I love museums and hiking"),
            vec![Theme::Adventure, Theme::Culture]
        );
        assert!(detect_themes("quiero viajar").is_empty());
        // "marzo" must not read as "mar"
        assert!(detect_themes("en marzo").is_empty());
    }

    #[test]
    fn test_suggestions_are_diverse() {
        let result = suggest_destinations("quiero viajar", "");
        assert_eq!(result.suggestions.len(), 3);

        let themes: Vec<Theme> = result.suggestions.iter().map(|s| s.theme).collect();
        assert_eq!(themes, vec![Theme::Beach, Theme::City, Theme::Adventure]);
    }

    #[test]
    fn test_query_theme_comes_first() {
        let result = suggest_destinations("algo con museos", "");
        assert_eq!(result.suggestions[0].theme, Theme::Culture);
        assert_eq!(result.suggestions.len(), 3);
    }

    #[test]
    fn test_context_biases_and_excludes() {
        let context = "user: me gustan las montañas\nassistant: Te recomiendo la Patagonia";
        let result = suggest_destinations("¿a dónde voy?", context);
        assert_eq!(result.suggestions[0].theme, Theme::Adventure);
        assert!(result.suggestions.iter().all(|s| s.name != "Patagonia"));
    }

    #[test]
    fn test_long_history_still_yields_two() {
        let context = "assistant: Cancún, Bali, Punta Cana, Tulum\n\
                       assistant: Nueva York, Tokio, Barcelona, Buenos Aires";
        let result = suggest_destinations("dame otras ideas", context);

        let names: Vec<&str> = result.suggestions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(result.suggestions.len(), 2, "{:?}", names);
        assert!(names.iter().all(|name| !context.contains(name)));
        let themes: Vec<Theme> = result.suggestions.iter().map(|s| s.theme).collect();
        assert_eq!(themes, vec![Theme::Adventure, Theme::Culture]);
    }

    #[test]
    fn test_everything_mentioned_repeats_rather_than_going_empty() {
        let context = CATALOG
            .iter()
            .map(|e| e.name)
            .collect::<Vec<_>>()
            .join(", ");
        let result = suggest_destinations("otra idea", &context);
        assert_eq!(result.suggestions.len(), 3);
    }

    #[test]
    fn test_maps_places_preferred_over_catalog() {
        let mut planner = SuggestionPlanner::new("quiero viajar", "user: ya fui a Holbox");
        let places = vec![
            Place {
                name: "Holbox".to_string(),
                address: "Quintana Roo, México".to_string(),
                rating: Some(4.8),
                place_id: None,
                maps_url: None,
            },
            Place {
                name: "Bacalar".to_string(),
                address: "Quintana Roo, México".to_string(),
                rating: Some(4.7),
                place_id: None,
                maps_url: None,
            },
        ];

        assert!(planner.accept_places(Theme::Beach, &places));
        assert!(!planner.accept_places(Theme::Beach, &places));
        assert!(planner.accept_catalog(Theme::City));
        let result = planner.finish();

        let first = &result.suggestions[0];
        assert_eq!(first.name, "Bacalar");
        assert_eq!(first.country, "México");
        assert_eq!(first.source, SuggestionSource::Maps);
        assert_eq!(first.blurb, "Quintana Roo, México · ⭐ 4.7");
        assert_eq!(result.suggestions[1].source, SuggestionSource::Catalog);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            suggest_destinations("quiero viajar", ""),
            suggest_destinations("quiero viajar", "")
        );
    }
}
