//! Destination extraction
//!
//! Destinations are found two ways:
//! - capitalized names after a trigger word ("a", "en", "de", "to",
//!   "about", ...), continued through lists ("Roma, París y Londres");
//! - a gazetteer of well-known destinations, matched case-insensitively
//!   anywhere in the text.
//!
//! Names are compared by [`destination_key`], so "Paris", "paris" and
//! "París" are one destination.

use crate::query::ConversationContext;
use regex::Regex;
use std::sync::LazyLock;

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^>]*>|https?://\S+").expect("MARKUP_RE is a compile-time constant")
});

const TRIGGERS: &[&str] = &[
    "a", "en", "de", "para", "hacia", "sobre", "visitar", "conocer", "recorrer", "to", "in",
    "about", "visit", "visiting", "explore",
];

const ARTICLES: &[&str] = &["el", "la", "los", "las", "the"];

// Lowercase words allowed inside a multi-word name ("Río de Janeiro").
const NAME_CONNECTORS: &[&str] = &["de", "del", "do", "da", "of"];

const LIST_CONNECTORS: &[&str] = &["y", "e", "o", "u", "and", "or"];

const MAX_NAME_WORDS: usize = 4;

const STOPWORDS: &[&str] = &[
    "yo", "tú", "tu", "usted", "ustedes", "ti", "mí", "mi", "me", "te", "nosotros", "i", "you",
    "we", "hola", "gracias", "hello", "hi", "thanks", "please", "por", "favor", "lunes",
    "martes", "miércoles", "jueves", "viernes", "sábado", "domingo", "enero", "febrero",
    "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre", "octubre", "noviembre",
    "diciembre", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "navidad", "christmas", "semana", "santa", "año",
    "nuevo", "google", "maps", "stripe", "vuelo", "hotel", "paquete", "reservar", "internet",
];

// (lowercase match key, display name)
const GAZETTEER: &[(&str, &str)] = &[
    ("roma", "Roma"),
    ("rome", "Rome"),
    ("parís", "París"),
    ("paris", "París"),
    ("londres", "Londres"),
    ("london", "London"),
    ("madrid", "Madrid"),
    ("barcelona", "Barcelona"),
    ("lisboa", "Lisboa"),
    ("lisbon", "Lisbon"),
    ("ámsterdam", "Ámsterdam"),
    ("amsterdam", "Ámsterdam"),
    ("berlín", "Berlín"),
    ("berlin", "Berlín"),
    ("venecia", "Venecia"),
    ("venice", "Venice"),
    ("florencia", "Florencia"),
    ("atenas", "Atenas"),
    ("estambul", "Estambul"),
    ("istanbul", "Istanbul"),
    ("tokio", "Tokio"),
    ("tokyo", "Tokyo"),
    ("kioto", "Kioto"),
    ("kyoto", "Kyoto"),
    ("bali", "Bali"),
    ("bangkok", "Bangkok"),
    ("dubái", "Dubái"),
    ("dubai", "Dubái"),
    ("nueva york", "Nueva York"),
    ("new york", "New York"),
    ("los ángeles", "Los Ángeles"),
    ("los angeles", "Los Ángeles"),
    ("san francisco", "San Francisco"),
    ("miami", "Miami"),
    ("las vegas", "Las Vegas"),
    ("cancún", "Cancún"),
    ("cancun", "Cancún"),
    ("tulum", "Tulum"),
    ("los cabos", "Los Cabos"),
    ("puerto vallarta", "Puerto Vallarta"),
    ("oaxaca", "Oaxaca"),
    ("ciudad de méxico", "Ciudad de México"),
    ("cdmx", "Ciudad de México"),
    ("punta cana", "Punta Cana"),
    ("la habana", "La Habana"),
    ("cartagena", "Cartagena"),
    ("medellín", "Medellín"),
    ("cusco", "Cusco"),
    ("cuzco", "Cusco"),
    ("machu picchu", "Machu Picchu"),
    ("lima", "Lima"),
    ("buenos aires", "Buenos Aires"),
    ("patagonia", "Patagonia"),
    ("santiago", "Santiago"),
    ("río de janeiro", "Río de Janeiro"),
    ("rio de janeiro", "Río de Janeiro"),
    ("costa rica", "Costa Rica"),
    ("islandia", "Islandia"),
    ("iceland", "Iceland"),
    ("queenstown", "Queenstown"),
    ("sídney", "Sídney"),
    ("sydney", "Sydney"),
    ("marrakech", "Marrakech"),
    ("el cairo", "El Cairo"),
    ("cairo", "El Cairo"),
];

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Comparison key for a destination name: lowercase, accents folded,
/// whitespace collapsed
#[must_use]
pub fn destination_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .collect()
}

/// The gazetteer's display name for a known destination, else the name
/// as written
fn canonical_name(name: String) -> String {
    let key = destination_key(&name);
    GAZETTEER
        .iter()
        .find(|(entry, _)| destination_key(entry) == key)
        .map(|(_, display)| (*display).to_string())
        .unwrap_or(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Word,
    Comma,
    Break,
}

#[derive(Debug, Clone)]
struct Token<'a> {
    text: &'a str,
    lower: String,
    kind: Kind,
}

impl Token<'_> {
    fn is_word(&self) -> bool {
        self.kind == Kind::Word
    }

    fn is_capitalized(&self) -> bool {
        self.is_word() && self.text.chars().next().is_some_and(char::is_uppercase)
    }

    fn is(&self, words: &[&str]) -> bool {
        self.is_word() && words.contains(&self.lower.as_str())
    }
}

fn push_word<'a>(tokens: &mut Vec<Token<'a>>, word: &'a str) {
    let word = word.trim_end_matches(['-', '\'']);
    if !word.is_empty() {
        tokens.push(Token {
            text: word,
            lower: word.to_lowercase(),
            kind: Kind::Word,
        });
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (index, ch) in text.char_indices() {
        let continues_word = word_start.is_some() && (ch == '-' || ch == '\'');
        if ch.is_alphanumeric() || continues_word {
            word_start.get_or_insert(index);
            continue;
        }

        if let Some(start) = word_start.take() {
            push_word(&mut tokens, &text[start..index]);
        }
        if ch.is_whitespace() && ch != '\n' {
            continue;
        }
        let kind = if ch == ',' { Kind::Comma } else { Kind::Break };
        tokens.push(Token {
            text: &text[index..index + ch.len_utf8()],
            lower: String::new(),
            kind,
        });
    }
    if let Some(start) = word_start {
        push_word(&mut tokens, &text[start..]);
    }

    tokens
}

/// End (exclusive) of a capitalized name starting at `start`
fn name_end(tokens: &[Token<'_>], start: usize) -> Option<usize> {
    let first = tokens.get(start)?;
    if !first.is_capitalized() || first.is(STOPWORDS) {
        return None;
    }

    let mut end = start + 1;
    while end - start < MAX_NAME_WORDS {
        match (tokens.get(end), tokens.get(end + 1)) {
            (Some(next), _) if next.is_capitalized() && !next.is(STOPWORDS) => end += 1,
            (Some(connector), Some(next))
                if connector.is(NAME_CONNECTORS) && next.is_capitalized() =>
            {
                end += 2
            }
            _ => break,
        }
    }
    Some(end)
}

fn join(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .map(|t| t.text)
        .collect::<Vec<_>>()
        .join(" ")
}

struct Span {
    start: usize,
    end: usize,
    name: String,
}

fn triggered_names(tokens: &[Token<'_>], spans: &mut Vec<Span>) {
    let mut i = 0;
    while i < tokens.len() {
        if !tokens[i].is(TRIGGERS) {
            i += 1;
            continue;
        }

        let mut start = i + 1;
        if tokens.get(start).is_some_and(|t| t.is(ARTICLES)) {
            start += 1;
        }
        let Some(mut end) = name_end(tokens, start) else {
            i += 1;
            continue;
        };
        spans.push(Span {
            start,
            end,
            name: canonical_name(join(&tokens[start..end])),
        });

        // "Roma, París y Londres"
        loop {
            let mut next = end;
            while tokens
                .get(next)
                .is_some_and(|t| t.kind == Kind::Comma || t.is(LIST_CONNECTORS))
            {
                next += 1;
            }
            if next == end {
                break;
            }
            match name_end(tokens, next) {
                Some(list_end) => {
                    spans.push(Span {
                        start: next,
                        end: list_end,
                        name: canonical_name(join(&tokens[next..list_end])),
                    });
                    end = list_end;
                }
                None => break,
            }
        }
        i = end;
    }
}

fn gazetteer_names(tokens: &[Token<'_>], spans: &mut Vec<Span>) {
    for start in 0..tokens.len() {
        if !tokens[start].is_word() {
            continue;
        }
        for (key, display) in GAZETTEER {
            let words: Vec<&str> = key.split(' ').collect();
            let end = start + words.len();
            if end > tokens.len() {
                continue;
            }
            let matches = tokens[start..end]
                .iter()
                .zip(&words)
                .all(|(token, word)| token.is_word() && token.lower == *word);
            let overlaps = spans.iter().any(|s| start < s.end && s.start < end);
            if matches && !overlaps {
                spans.push(Span {
                    start,
                    end,
                    name: (*display).to_string(),
                });
            }
        }
    }
}

/// Destinations named in the text, in order of appearance, deduplicated
/// by [`destination_key`]
#[must_use]
pub fn extract_destinations(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut spans = Vec::new();
    triggered_names(&tokens, &mut spans);
    gazetteer_names(&tokens, &mut spans);
    spans.sort_by_key(|span| span.start);

    let mut seen: Vec<String> = Vec::new();
    let mut names = Vec::new();
    for span in spans {
        let key = destination_key(&span.name);
        if !seen.contains(&key) {
            seen.push(key);
            names.push(span.name);
        }
    }
    names
}

/// The last destination named in the most recent message that names one
#[must_use]
pub fn latest_destination(context: &ConversationContext) -> Option<String> {
    context.entries().iter().rev().find_map(|entry| {
        let plain = MARKUP_RE.replace_all(&entry.content, " ");
        extract_destinations(&plain).pop()
    })
}
