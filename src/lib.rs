//! gfilesearch: upload documents to the Gemini File API and ask
//! natural-language questions about them.
//!
//! The remote service does the storage, retrieval and generation. This
//! crate extracts local previews, moves bytes, scrapes the model's reply
//! into a [`SearchResult`], and keeps per-process session state.

pub mod config;
pub mod error;
pub mod files;
pub mod gemini;
pub mod search;
pub mod session;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use files::{FileState, RemoteFileHandle, RemoteFiles};
pub use gemini::GeminiClient;
pub use search::{Confidence, Generate, QueryEngine, SearchResult};
pub use session::Session;
