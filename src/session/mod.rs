//! Session: the uploaded-file list and search history for one process.
//!
//! Nothing here is persisted; history can be exported to a JSON file.

use crate::error::Result;
use crate::files::RemoteFileHandle;
use crate::search::SearchResult;
use chrono::Local;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct Session {
    files: Vec<RemoteFileHandle>,
    history: Vec<SearchResult>,
    api_configured: bool,
}

impl Session {
    pub fn new(api_configured: bool) -> Self {
        Self {
            api_configured,
            ..Self::default()
        }
    }

    pub fn api_configured(&self) -> bool {
        self.api_configured
    }

    pub fn set_api_configured(&mut self, configured: bool) {
        self.api_configured = configured;
    }

    pub fn files(&self) -> &[RemoteFileHandle] {
        &self.files
    }

    /// Append a handle, or replace the entry with the same id in place.
    /// Returns `true` when the handle was new.
    pub fn add_file(&mut self, handle: RemoteFileHandle) -> bool {
        match self.files.iter_mut().find(|f| f.id == handle.id) {
            Some(existing) => {
                *existing = handle;
                false
            }
            None => {
                self.files.push(handle);
                true
            }
        }
    }

    pub fn remove_file(&mut self, index: usize) -> Option<RemoteFileHandle> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn remove_file_by_id(&mut self, id: &str) -> Option<RemoteFileHandle> {
        let index = self.files.iter().position(|f| f.id == id)?;
        self.remove_file(index)
    }

    pub fn history(&self) -> &[SearchResult] {
        &self.history
    }

    /// Append a result to history and hand back a reference to it.
    pub fn record(&mut self, result: SearchResult) -> &SearchResult {
        self.history.push(result);
        &self.history[self.history.len() - 1]
    }

    /// Up to `n` most recent results, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &SearchResult> {
        self.history.iter().rev().take(n)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// History as a pretty-printed JSON array.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.history)?)
    }

    /// Write history to `dir/search_history_<YYYYMMDD_HHMMSS>.json`.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(export_file_name());
        std::fs::write(&path, self.export_json()?)?;
        tracing::info!("exported {} search(es) to {}", self.history.len(), path.display());
        Ok(path)
    }
}

pub fn export_file_name() -> String {
    format!("search_history_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Read back an exported history file.
pub fn parse_history(json: &str) -> Result<Vec<SearchResult>> {
    Ok(serde_json::from_str(json)?)
}
