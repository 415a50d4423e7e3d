use std::fmt;

/// Errors raised by the library. The binary wraps these in `anyhow`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or unusable credential / config file.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// A remote file reference could not be resolved.
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("delete failed: {0}")]
    DeleteFailed(String),

    /// The remote inference call failed or returned no text.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// Local text extraction of a malformed file.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Any other remote call (listing, polling).
    #[error("request failed: {0}")]
    Request(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Flat error taxonomy, independent of the payload carried by [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    UploadFailed,
    NotFound,
    DeleteFailed,
    GenerationFailed,
    InvalidFormat,
    Request,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::UploadFailed(_) => ErrorKind::UploadFailed,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::DeleteFailed(_) => ErrorKind::DeleteFailed,
            Error::GenerationFailed(_) => ErrorKind::GenerationFailed,
            Error::InvalidFormat(_) | Error::Json(_) => ErrorKind::InvalidFormat,
            Error::Request(_) => ErrorKind::Request,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::UploadFailed => "UploadFailed",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::DeleteFailed => "DeleteFailed",
            ErrorKind::GenerationFailed => "GenerationFailed",
            ErrorKind::InvalidFormat => "InvalidFormat",
            ErrorKind::Request => "RequestFailed",
            ErrorKind::Io => "IoError",
        };
        f.write_str(name)
    }
}
