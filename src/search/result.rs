use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence label reported by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
    Unknown,
}

impl Confidence {
    /// Match a free-form label such as `High`, `[medium]` or `**LOW**.`
    pub fn from_label(label: &str) -> Self {
        let cleaned = label
            .trim()
            .trim_matches(|c: char| matches!(c, '[' | ']' | '*' | '.' | '"' | ' '))
            .to_ascii_lowercase();
        let word = cleaned.split_whitespace().next().unwrap_or("");
        match word {
            "low" => Confidence::Low,
            "medium" => Confidence::Medium,
            "high" => Confidence::High,
            _ => Confidence::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
            Confidence::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed search. Created once, never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub answer: String,
    pub snippets: Vec<String>,
    pub sources: Vec<String>,
    pub confidence: Confidence,
    pub timestamp: DateTime<Utc>,
    /// Model output as received; empty when no remote call was made.
    pub raw_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    /// A result carrying a diagnostic instead of an answer.
    pub fn failed(query: &str, answer: String, error: Option<String>) -> Self {
        Self {
            query: query.to_string(),
            answer,
            snippets: Vec::new(),
            sources: Vec::new(),
            confidence: Confidence::Low,
            timestamp: Utc::now(),
            raw_response: String::new(),
            error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
