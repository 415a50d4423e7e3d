//! Marker-based scraping of the model's reply.
//!
//! The prompt asks for four labelled sections. Models don't always comply,
//! so every lookup degrades instead of failing: missing markers yield empty
//! sections, a missing `ANSWER:` makes the whole reply the answer, and a
//! missing `CONFIDENCE:` defaults to `Medium`.

use super::result::Confidence;

pub const ANSWER: &str = "ANSWER:";
pub const SNIPPETS: &str = "SNIPPETS:";
pub const SOURCES: &str = "SOURCES:";
pub const CONFIDENCE: &str = "CONFIDENCE:";

const MARKERS: [&str; 4] = [ANSWER, SNIPPETS, SOURCES, CONFIDENCE];

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub answer: String,
    pub snippets: Vec<String>,
    pub sources: Vec<String>,
    pub confidence: Confidence,
}

pub fn parse(raw: &str) -> ParsedResponse {
    let answer = match section(raw, ANSWER) {
        Some(text) => text.trim().to_string(),
        None => raw.trim().to_string(),
    };
    let snippets = section(raw, SNIPPETS).map(lines).unwrap_or_default();
    let sources = section(raw, SOURCES).map(lines).unwrap_or_default();
    let confidence = match section(raw, CONFIDENCE) {
        Some(text) => Confidence::from_label(text.trim().lines().next().unwrap_or("")),
        None => Confidence::Medium,
    };

    ParsedResponse {
        answer,
        snippets,
        sources,
        confidence,
    }
}

/// Text after the first occurrence of `marker`, up to the nearest marker
/// (including a repeat of its own) that follows it.
fn section<'a>(raw: &'a str, marker: &str) -> Option<&'a str> {
    let start = raw.find(marker)? + marker.len();
    let rest = &raw[start..];
    let end = MARKERS
        .iter()
        .filter_map(|m| rest.find(m))
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
