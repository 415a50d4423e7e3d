use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote resource names are `files/<opaque>`.
pub const ID_PREFIX: &str = "files/";

/// Processing state of a remote file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
}

impl FileState {
    /// Map the service's state string. Unknown / unspecified states are
    /// treated as still processing.
    pub fn from_remote(state: &str) -> Self {
        match state {
            "ACTIVE" => FileState::Active,
            "FAILED" => FileState::Failed,
            _ => FileState::Processing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::Processing => "PROCESSING",
            FileState::Active => "ACTIVE",
            FileState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file living on the remote service, as tracked locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFileHandle {
    pub id: String,
    pub display_name: String,
    pub uri: String,
    pub state: FileState,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
    pub mime_type: String,
}

/// Accept both `abc123` and `files/abc123`.
pub fn normalize_id(id: &str) -> String {
    let id = id.trim();
    if id.starts_with(ID_PREFIX) {
        id.to_string()
    } else {
        format!("{}{}", ID_PREFIX, id)
    }
}
