//! Direct answer to the query

use super::Synthesizer;
use crate::intent::Intent;
use crate::query::{ConversationContext, Query};
use crate::trace::OrchestrationTrace;
use rumbo_llm::{CompletionRequest, Message};
use rumbo_tools::SpecialistOutput;
use tracing::warn;

const SYSTEM_PROMPT: &str = "You are Rumbo, a friendly travel assistant. Answer the user's \
message directly in two or three sentences, in the user's language, with a warm tone and at \
most two emojis. Destination details, prices and payment links are appended after your answer, \
so do not list places, prices or links yourself. If the message is not about travel, answer \
briefly and remind the user that you specialize in travel planning. Always write full words \
with normal spacing.";

impl Synthesizer {
    /// The opening paragraph and whether the LLM wrote it
    pub(super) async fn intro(
        &self,
        trace: &OrchestrationTrace,
        query: &Query,
        context: &ConversationContext,
        has_info: bool,
        has_offers: bool,
    ) -> (String, bool) {
        match self.llm_intro(trace, query, context).await {
            Some(text) => (text, true),
            None => (template(trace, has_info, has_offers), false),
        }
    }

    async fn llm_intro(
        &self,
        trace: &OrchestrationTrace,
        query: &Query,
        context: &ConversationContext,
    ) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| llm.default_model().to_string());

        let mut system = format!("{}\n\n{}", SYSTEM_PROMPT, findings(trace));
        if !context.is_empty() {
            system.push_str("\n\n");
            system.push_str(&context.instructions());
        }

        let request = CompletionRequest::new(model)
            .with_message(Message::system(system))
            .with_message(Message::user(&query.text))
            .with_max_tokens(300)
            .with_temperature(0.7);

        let response = match llm.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = llm.name(), error = %e, "Intro generation failed");
                return None;
            }
        };

        let text = normalize_whitespace(&response.content);
        if text.is_empty() || looks_fragmented(&text) {
            warn!(provider = llm.name(), "Discarding malformed intro");
            return None;
        }
        Some(text)
    }
}

/// One line per invocation telling the model what the specialists found
fn findings(trace: &OrchestrationTrace) -> String {
    let classification = trace.classification();
    let mut lines = vec![format!("Detected intent: {}", classification.intent)];
    if !classification.destinations.is_empty() {
        lines.push(format!(
            "Destinations: {}",
            classification.destinations.join(", ")
        ));
    }

    for invocation in trace.invocations() {
        let subject = invocation.destination.as_deref().unwrap_or("the request");
        let line = match (invocation.structured(), &invocation.error) {
            (_, Some(_)) => format!("- {}: unavailable for {}", invocation.specialist, subject),
            (Some(SpecialistOutput::DestinationReport(report)), None) => format!(
                "- {}: {} notable places found in {}",
                invocation.specialist,
                report.places.len(),
                report.destination
            ),
            (Some(SpecialistOutput::Suggestions(s)), None) => format!(
                "- {}: suggested {}",
                invocation.specialist,
                s.suggestions
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            (Some(SpecialistOutput::TravelOffer(offer)), None) => format!(
                "- {}: flight, hotel and package offers ready for {}",
                invocation.specialist, offer.destination
            ),
            (None, None) => format!("- {}: answered for {}", invocation.specialist, subject),
        };
        lines.push(line);
    }

    format!("Specialist results:\n{}", lines.join("\n"))
}

// Only promises the sections that are actually rendered below it.
fn template(trace: &OrchestrationTrace, has_info: bool, has_offers: bool) -> String {
    let classification = trace.classification();
    let destinations = join_names(&classification.destinations);
    match (classification.intent, has_info, has_offers) {
        (Intent::Unrelated, _, _) => "Soy un asistente especializado en viajes ✈️, así que no \
                                      puedo ayudarte con eso. Si quieres, puedo recomendarte \
                                      destinos, contarte qué ver en una ciudad o prepararte un \
                                      paquete de viaje."
            .to_string(),
        (Intent::Vague, true, _) => {
            "¡Qué buena idea viajar! ✈️ Aquí tienes algunas ideas para inspirarte.".to_string()
        }
        (Intent::Vague, false, _) => "¡Qué buena idea viajar! ✈️ Cuéntame qué tipo de viaje \
                                      te gustaría (playa, ciudad, aventura o cultura) y te \
                                      ayudo a elegir destino."
            .to_string(),
        (Intent::Purchase, _, true) => format!(
            "¡Aquí tienes unas opciones fantásticas para tu viaje a {}! 🏖️",
            destinations
        ),
        (Intent::Informational, true, _) => format!(
            "¡Excelente elección! Te cuento lo que no te puedes perder en {}. 🌍",
            destinations
        ),
        (Intent::Purchase, true, false) => format!(
            "¡{} es un gran destino! Te cuento lo que no te puedes perder. 🌍",
            destinations
        ),
        (Intent::Informational, false, true) => format!(
            "¡Excelente elección! Estas son las opciones para viajar a {}. ✈️",
            destinations
        ),
        (Intent::Purchase | Intent::Informational, false, false) => format!(
            "Busqué información sobre {}, pero esta vez no encontré resultados. \
             ¿Quieres intentarlo con otro destino?",
            destinations
        ),
    }
}

/// "Roma", "Roma y París", "Roma, París y Londres"
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} y {}", init.join(", "), last),
    }
}

/// Collapse runs of spaces inside lines, trim every line and keep at most
/// one blank line between paragraphs
pub(super) fn normalize_whitespace(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut blank = false;
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank = !out.is_empty();
            continue;
        }
        if blank {
            out.push(String::new());
            blank = false;
        }
        out.push(line);
    }
    out.join("\n")
}

/// Text emitted one character at a time ("H o l a" or one letter per line)
pub(super) fn looks_fragmented(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 8 {
        return false;
    }
    let single = words.iter().filter(|w| w.chars().count() == 1).count();
    single * 10 >= words.len() * 6
}
