//! Rendering of specialist results

use crate::intent::destination_key;
use crate::trace::OrchestrationTrace;
use rumbo_tools::builtins::{DestinationSuggestions, Theme};
use rumbo_tools::commerce::{OfferItem, TravelOffer};
use rumbo_tools::maps::{DestinationReport, Place};
use rumbo_tools::{SpecialistOutput, DESTINATION_INFO_TOOL, TRAVEL_PRODUCTS_TOOL};
use std::collections::HashSet;

/// Places and suggestions from every successful destination-info call
pub(super) fn destination_info(trace: &OrchestrationTrace) -> Option<String> {
    let mut seen_places: HashSet<String> = HashSet::new();
    let mut blocks = Vec::new();

    for output in trace.invocations().filter_map(|i| i.structured()) {
        let block = match output {
            SpecialistOutput::DestinationReport(report) => report_block(report, &mut seen_places),
            SpecialistOutput::Suggestions(suggestions) => suggestions_block(suggestions),
            SpecialistOutput::TravelOffer(_) => None,
        };
        blocks.extend(block);
    }

    (!blocks.is_empty()).then(|| blocks.join("\n\n"))
}

fn place_key(place: &Place) -> String {
    match &place.place_id {
        Some(id) if !id.is_empty() => format!("id:{}", id),
        _ => format!("name:{}", place.name.trim().to_lowercase()),
    }
}

fn report_block(report: &DestinationReport, seen: &mut HashSet<String>) -> Option<String> {
    let lines: Vec<String> = report
        .places
        .iter()
        .filter(|place| seen.insert(place_key(place)))
        .map(place_line)
        .collect();

    let body = if !lines.is_empty() {
        lines.join("\n")
    } else {
        report.summary.clone().filter(|s| !s.trim().is_empty())?
    };
    Some(format!(
        "### 📍 Lugares destacados en {}\n{}",
        report.destination, body
    ))
}

fn place_line(place: &Place) -> String {
    let mut line = format!("- **{}**", place.name);
    if let Some(rating) = place.rating {
        line.push_str(&format!(" ⭐ {:.1}", rating));
    }
    if !place.address.is_empty() {
        line.push_str(&format!(": {}", place.address));
    }
    let url = place
        .maps_url
        .clone()
        .or_else(|| place.place_id.as_deref().map(Place::maps_url_for));
    if let Some(url) = url {
        line.push_str(&format!(" ([Ver en Google Maps]({}))", url));
    }
    line
}

fn theme_label(theme: Theme) -> &'static str {
    match theme {
        Theme::Beach => "🏖️ playa",
        Theme::City => "🏙️ ciudad",
        Theme::Adventure => "🏔️ aventura",
        Theme::Culture => "🏛️ cultura",
    }
}

fn suggestions_block(suggestions: &DestinationSuggestions) -> Option<String> {
    if suggestions.suggestions.is_empty() {
        return None;
    }
    let lines: Vec<String> = suggestions
        .suggestions
        .iter()
        .map(|s| {
            format!(
                "- **{}, {}** ({}): {}",
                s.name,
                s.country,
                theme_label(s.theme),
                s.blurb
            )
        })
        .collect();
    Some(format!(
        "### 🌎 Ideas para tu próximo viaje\n{}\n\nCuando elijas uno, puedo contarte más \
         sobre el destino y prepararte paquetes con vuelo y hotel listos para reservar.",
        lines.join("\n")
    ))
}

/// Offers from every successful commerce call, one per destination
pub(super) fn offers(trace: &OrchestrationTrace) -> Option<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let blocks: Vec<String> = trace
        .invocations()
        .filter_map(|i| match i.structured() {
            Some(SpecialistOutput::TravelOffer(offer)) => Some(offer),
            _ => None,
        })
        .filter(|offer| seen.insert(destination_key(&offer.destination)))
        .map(offer_block)
        .collect();

    (!blocks.is_empty()).then(|| blocks.join("\n\n"))
}

fn offer_block(offer: &TravelOffer) -> String {
    let destination = &offer.destination;
    format!(
        "✨ **Paquete Completo a {destination}** ✨\n\
         Incluye: Vuelo ✈️ + Hotel 🏨 (3 noches) + Actividad especial 📸\n\
         Precio Total: {package} (¡Con un {discount}% de descuento!)\n\
         {package_button}\n\n\
         O si prefieres por separado:\n\
         🛫 **{flight_name}**: {flight}\n\
         {flight_button}\n\
         🏨 **{hotel_name}**: {hotel}\n\
         {hotel_button}",
        destination = destination,
        package = offer.package.price,
        discount = offer.discount_percent,
        package_button = button(
            &offer.package,
            "travel-button",
            &format!("¡Reserva tu Aventura a {} Aquí!", destination)
        ),
        flight_name = offer.flight.name,
        flight = offer.flight.price,
        flight_button = button(&offer.flight, "travel-button-small", "Reservar Vuelo"),
        hotel_name = offer.hotel.name,
        hotel = offer.hotel.price,
        hotel_button = button(&offer.hotel, "travel-button-small", "Reservar Hotel"),
    )
}

fn button(item: &OfferItem, class: &str, label: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" class="{}">{}</a>"#,
        escape_html(&item.payment_link),
        class,
        escape_html(label)
    )
}

pub(super) fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Notes for specialists that failed, one per distinct problem
pub(super) fn limitations(trace: &OrchestrationTrace) -> Option<String> {
    let mut notes: Vec<String> = Vec::new();
    for invocation in trace.invocations().filter(|i| !i.succeeded()) {
        let note = match (invocation.tool_name.as_str(), invocation.destination.as_deref()) {
            (DESTINATION_INFO_TOOL, Some(d)) => {
                format!("No pude obtener información de lugares en {} en este momento.", d)
            }
            (DESTINATION_INFO_TOOL, None) => {
                "No pude preparar sugerencias de destinos en este momento.".to_string()
            }
            (TRAVEL_PRODUCTS_TOOL, Some(d)) => format!(
                "No pude generar las opciones de reserva para {} en este momento.",
                d
            ),
            _ => "Uno de nuestros especialistas no está disponible en este momento.".to_string(),
        };
        if !notes.contains(&note) {
            notes.push(note);
        }
    }

    if notes.is_empty() {
        return None;
    }
    Some(
        notes
            .iter()
            .map(|note| format!("⚠️ {}", note))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
