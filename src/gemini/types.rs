//! Wire types for the Gemini File API and `generateContent`.

use crate::files::{FileState, RemoteFileHandle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `File` resource as returned by the service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiFile {
    pub name: String,
    pub display_name: String,
    pub mime_type: String,
    /// int64 fields arrive as JSON strings.
    pub size_bytes: Option<serde_json::Value>,
    pub create_time: Option<String>,
    pub uri: String,
    pub state: String,
}

impl ApiFile {
    /// Convert to a local handle. `fallback_size` is used when the service
    /// omits `sizeBytes`.
    pub fn into_handle(self, fallback_size: u64) -> RemoteFileHandle {
        let size_bytes = match &self.size_bytes {
            Some(serde_json::Value::String(s)) => s.parse().unwrap_or(fallback_size),
            Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(fallback_size),
            _ => fallback_size,
        };
        let uploaded_at = self
            .create_time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        let display_name = if self.display_name.is_empty() {
            self.name.clone()
        } else {
            self.display_name
        };

        RemoteFileHandle {
            id: self.name,
            display_name,
            uri: self.uri,
            state: FileState::from_remote(&self.state),
            size_bytes,
            uploaded_at,
            mime_type: self.mime_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub file: ApiFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListResponse {
    pub files: Vec<ApiFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadStart<'a> {
    pub file: UploadStartFile<'a>,
}

#[derive(Debug, Serialize)]
pub struct UploadStartFile<'a> {
    pub display_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    File { file_data: FileData },
}

#[derive(Debug, Serialize)]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

impl GenerateRequest {
    /// Prompt first, then one `file_data` part per file.
    pub fn new(prompt: &str, files: &[RemoteFileHandle]) -> Self {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        parts.extend(files.iter().map(|f| Part::File {
            file_data: FileData {
                mime_type: f.mime_type.clone(),
                file_uri: f.uri.clone(),
            },
        }));
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponseContent {
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// `{"error": {"message": ...}}`
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_file_converts_string_sizes_and_times() {
        let file: ApiFile = serde_json::from_str(
            r#"{
                "name": "files/abc123",
                "displayName": "notes.txt",
                "mimeType": "text/plain",
                "sizeBytes": "11",
                "createTime": "2024-05-01T10:00:00.123456Z",
                "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc123",
                "state": "ACTIVE"
            }"#,
        )
        .unwrap();

        let handle = file.into_handle(0);
        assert_eq!(handle.id, "files/abc123");
        assert_eq!(handle.display_name, "notes.txt");
        assert_eq!(handle.size_bytes, 11);
        assert_eq!(handle.state, FileState::Active);
        assert_eq!(handle.uploaded_at.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");
    }

    #[test]
    fn sparse_api_file_uses_fallbacks() {
        let file: ApiFile =
            serde_json::from_str(r#"{"name": "files/x", "state": "PROCESSING"}"#).unwrap();
        let handle = file.into_handle(42);
        assert_eq!(handle.display_name, "files/x");
        assert_eq!(handle.size_bytes, 42);
        assert_eq!(handle.state, FileState::Processing);
    }

    #[test]
    fn generate_request_puts_prompt_before_files() {
        let handle = ApiFile {
            name: "files/a".into(),
            mime_type: "application/pdf".into(),
            uri: "https://example.invalid/files/a".into(),
            state: "ACTIVE".into(),
            ..Default::default()
        }
        .into_handle(1);

        let body = serde_json::to_value(GenerateRequest::new("question", &[handle])).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "question");
        assert_eq!(parts[1]["file_data"]["mime_type"], "application/pdf");
        assert_eq!(parts[1]["file_data"]["file_uri"], "https://example.invalid/files/a");
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn response_text_joins_parts() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"ANSWER: "},{"text":"hi"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("ANSWER: hi"));

        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(blocked.text().is_none());
        assert_eq!(
            blocked.prompt_feedback.unwrap().block_reason.as_deref(),
            Some("SAFETY")
        );
    }
}
