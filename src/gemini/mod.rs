//! Gemini client: File API (upload/list/get/delete) and `generateContent`
//! over blocking HTTP.

pub mod types;

use crate::config::{Config, DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::error::{Error, Result};
use crate::files::extract::guess_mime_type;
use crate::files::{normalize_id, RemoteFileHandle, RemoteFiles};
use crate::search::Generate;
use reqwest::blocking::{Client, Response};
use std::path::Path;
use std::time::Duration;
use types::{ApiError, ApiFile, GenerateRequest, GenerateResponse, ListResponse, UploadResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";
const LIST_PAGE_SIZE: u32 = 100;

pub struct GeminiClient {
    http: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client with default endpoint and model. The key is not
    /// validated locally; an empty key is a configuration error.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::build(api_key, DEFAULT_API_BASE, DEFAULT_MODEL, Duration::from_secs(120))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?;
        Self::build(api_key, &config.api_base, &config.model, config.timeout())
    }

    fn build(api_key: &str, api_base: &str, model: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Configuration(
                "Google API key is required. Set GOOGLE_API_KEY or pass an API key.".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.trim().to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn upload_start_url(&self) -> String {
        format!("{}/upload/v1beta/files", self.api_base)
    }

    fn files_url(&self) -> String {
        format!("{}/v1beta/files", self.api_base)
    }

    fn file_url(&self, id: &str) -> String {
        format!("{}/v1beta/{}", self.api_base, normalize_id(id))
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

/// `status: message` from an error response, preferring the API's message.
fn describe_failure(response: Response) -> String {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => format!("{} ({})", api_error.error.message, status),
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => format!("HTTP {}: {}", status, body.trim()),
    }
}

impl RemoteFiles for GeminiClient {
    fn upload(&self, path: &Path, display_name: Option<&str>) -> Result<RemoteFileHandle> {
        let data = std::fs::read(path)
            .map_err(|e| Error::UploadFailed(format!("cannot read {}: {}", path.display(), e)))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = display_name.unwrap_or(&filename);
        let mime_type = guess_mime_type(&filename);

        tracing::debug!("starting upload of {} ({} bytes, {})", name, data.len(), mime_type);

        let start = self
            .http
            .post(self.upload_start_url())
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", data.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", &mime_type)
            .json(&types::UploadStart {
                file: types::UploadStartFile { display_name: name },
            })
            .send()
            .map_err(|e| Error::UploadFailed(format!("upload request failed: {}", e)))?;
        if !start.status().is_success() {
            return Err(Error::UploadFailed(describe_failure(start)));
        }

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::UploadFailed("service returned no upload URL".to_string()))?;

        let size = data.len() as u64;
        let finish = self
            .http
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(data)
            .send()
            .map_err(|e| Error::UploadFailed(format!("upload transfer failed: {}", e)))?;
        if !finish.status().is_success() {
            return Err(Error::UploadFailed(describe_failure(finish)));
        }

        let uploaded: UploadResponse = finish
            .json()
            .map_err(|e| Error::UploadFailed(format!("unexpected upload response: {}", e)))?;
        let handle = uploaded.file.into_handle(size);
        tracing::info!("uploaded {} as {}", handle.display_name, handle.id);
        Ok(handle)
    }

    fn list(&self) -> Result<Vec<RemoteFileHandle>> {
        let mut handles = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.files_url())
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request
                .send()
                .map_err(|e| Error::Request(format!("list files failed: {}", e)))?;
            if !response.status().is_success() {
                return Err(Error::Request(describe_failure(response)));
            }
            let page: ListResponse = response
                .json()
                .map_err(|e| Error::Request(format!("unexpected list response: {}", e)))?;

            handles.extend(page.files.into_iter().map(|f| f.into_handle(0)));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("listed {} remote file(s)", handles.len());
        Ok(handles)
    }

    fn get(&self, id: &str) -> Result<RemoteFileHandle> {
        let response = self
            .http
            .get(self.file_url(id))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .map_err(|e| Error::Request(format!("get {} failed: {}", id, e)))?;

        let status = response.status();
        if status.as_u16() == 404 || status.as_u16() == 403 {
            return Err(Error::NotFound(normalize_id(id)));
        }
        if !status.is_success() {
            return Err(Error::Request(describe_failure(response)));
        }
        let file: ApiFile = response
            .json()
            .map_err(|e| Error::Request(format!("unexpected file response: {}", e)))?;
        Ok(file.into_handle(0))
    }

    fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.file_url(id))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .map_err(|e| Error::DeleteFailed(format!("{}: {}", id, e)))?;
        if !response.status().is_success() {
            return Err(Error::DeleteFailed(format!(
                "{}: {}",
                normalize_id(id),
                describe_failure(response)
            )));
        }
        tracing::info!("deleted {}", normalize_id(id));
        Ok(())
    }
}

impl Generate for GeminiClient {
    fn generate(&self, prompt: &str, files: &[RemoteFileHandle]) -> Result<String> {
        let request = GenerateRequest::new(prompt, files);
        let response = self
            .http
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::GenerationFailed(format!("request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::GenerationFailed(describe_failure(response)));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| Error::GenerationFailed(format!("unexpected response: {}", e)))?;
        if let Some(text) = body.text() {
            tracing::debug!("generation returned {} chars", text.len());
            return Ok(text);
        }
        let reason = body
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {}", r))
            .unwrap_or_else(|| "no text in response".to_string());
        Err(Error::GenerationFailed(reason))
    }
}
