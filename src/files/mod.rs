//! Files: remote file handles, the remote file store seam, and local text
//! extraction for previews.

pub mod extract;
pub mod schema;
pub mod store;

pub use schema::{normalize_id, FileState, RemoteFileHandle};
pub use store::RemoteFiles;
