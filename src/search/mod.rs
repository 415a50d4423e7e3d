//! Search: prompt construction, the generation seam, and structured results.
//!
//! [`QueryEngine::search`] never fails: unresolvable files are skipped and
//! remote errors end up in [`SearchResult::error`].

pub mod parser;
pub mod prompt;
pub mod result;

pub use parser::{parse, ParsedResponse};
pub use result::{Confidence, SearchResult};

use crate::error::Result;
use crate::files::{RemoteFileHandle, RemoteFiles};
use chrono::Utc;

pub const NO_FILES_ANSWER: &str = "No files available for search.";

/// Remote text generation over a prompt plus file references.
pub trait Generate {
    fn generate(&self, prompt: &str, files: &[RemoteFileHandle]) -> Result<String>;
}

pub struct QueryEngine<'a, C: RemoteFiles + Generate + ?Sized> {
    client: &'a C,
}

impl<'a, C: RemoteFiles + Generate + ?Sized> QueryEngine<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Ask `query` against `handles`.
    pub fn search(&self, query: &str, handles: &[RemoteFileHandle]) -> SearchResult {
        let resolved = self.resolve(handles);
        if resolved.is_empty() {
            tracing::info!("no resolvable files for query, skipping remote call");
            return SearchResult::failed(query, NO_FILES_ANSWER.to_string(), None);
        }

        let prompt = prompt::build_search_prompt(query);
        tracing::debug!("searching {} file(s)", resolved.len());

        match self.client.generate(&prompt, &resolved) {
            Ok(raw) => {
                let parsed = parse(&raw);
                SearchResult {
                    query: query.to_string(),
                    answer: parsed.answer,
                    snippets: parsed.snippets,
                    sources: parsed.sources,
                    confidence: parsed.confidence,
                    timestamp: Utc::now(),
                    raw_response: raw,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("search failed: {}", e);
                SearchResult::failed(
                    query,
                    format!("Error during search: {}", e),
                    Some(e.to_string()),
                )
            }
        }
    }

    /// Fresh copies of the handles the service still knows about.
    fn resolve(&self, handles: &[RemoteFileHandle]) -> Vec<RemoteFileHandle> {
        handles
            .iter()
            .filter_map(|h| match self.client.get(&h.id) {
                Ok(fresh) => Some(fresh),
                Err(e) => {
                    tracing::warn!("skipping {} ({}): {}", h.display_name, h.id, e);
                    None
                }
            })
            .collect()
    }
}
