//! Rule-based classifier over Spanish and English keyword sets

use super::destinations::extract_destinations;
use super::{Classification, Intent, IntentClassifier};
use crate::query::ConversationContext;

const PURCHASE_PHRASES: &[&str] = &[
    // es
    "reservar", "reserva", "reservación", "reservacion", "comprar", "compra", "pagar", "pago",
    "precio", "precios", "cuánto cuesta", "cuanto cuesta", "cuánto sale", "cuanto sale",
    "cuánto costaría", "costo", "costos", "paquete", "paquetes", "oferta", "ofertas",
    "cotización", "cotizacion", "cotizar", "boleto", "boletos", "vuelo", "vuelos", "tarifa",
    "tarifas",
    // en
    "book", "booking", "buy", "purchase", "pay", "price", "prices", "pricing", "how much",
    "cost", "costs", "package", "packages", "deal", "deals", "ticket", "tickets", "flight",
    "flights", "quote",
];

const TRAVEL_PHRASES: &[&str] = &[
    // es
    "viajar", "viaje", "viajes", "vacaciones", "destino", "destinos", "turismo", "turista",
    "recomiéndame", "recomiendame", "recomienda", "recomendación", "recomendacion", "escapada",
    "playa", "playas", "qué ver", "que ver", "qué hacer", "que hacer", "lugares",
    "atracciones", "háblame", "hablame",
    // en
    "travel", "traveling", "trip", "vacation", "holiday", "holidays", "destination",
    "destinations", "getaway", "beach", "things to do", "what to see", "attractions",
    "sightseeing", "tell me about",
];

/// Keyword-based [`IntentClassifier`]
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Create the classifier
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classify without the async trait wrapper
    #[must_use]
    pub fn classify_text(&self, text: &str) -> Classification {
        let normalized = normalize_words(text);
        let destinations = extract_destinations(text);

        let intent = if contains_any(&normalized, PURCHASE_PHRASES) {
            Intent::Purchase
        } else if !destinations.is_empty() {
            Intent::Informational
        } else if contains_any(&normalized, TRAVEL_PHRASES) {
            Intent::Vague
        } else {
            Intent::Unrelated
        };

        Classification::new(intent, destinations)
    }
}

#[async_trait::async_trait]
impl IntentClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify(&self, text: &str, _context: &ConversationContext) -> Classification {
        self.classify_text(text)
    }
}

/// Lowercase words separated by single spaces, padded with one space on
/// each side so phrases match on word boundaries
fn normalize_words(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    format!(" {} ", words.join(" "))
}

fn contains_any(normalized: &str, phrases: &[&str]) -> bool {
    phrases
        .iter()
        .any(|phrase| normalized.contains(&format!(" {} ", phrase)))
}
