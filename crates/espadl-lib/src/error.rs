use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EspaError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{failed} of {total} items or orders failed")]
    IncompleteRun { failed: usize, total: usize },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

/// Failures talking to the order service itself.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Authentication failed for user {username}")]
    Authentication { username: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Order service unavailable at {url}: {reason}")]
    Unavailable { url: String, reason: String },

    #[error("Unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Authentication { .. } => "AuthenticationError",
            ServiceError::NotFound { .. } => "NotFoundError",
            ServiceError::Unavailable { .. } => "ServiceUnavailableError",
            ServiceError::UnexpectedResponse { .. } => "UnexpectedResponseError",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ServiceError::Authentication { .. })
    }
}

/// Failures transferring, storing or verifying a single item.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Failed to transfer {url}: {reason}")]
    Transfer { url: String, reason: String },

    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Unusable checksum file {path}: {reason}")]
    InvalidChecksum { path: PathBuf, reason: String },
}

impl DownloadError {
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadError::Transfer { .. } => "TransferError",
            DownloadError::Filesystem { .. } => "FilesystemError",
            DownloadError::ChecksumMismatch { .. } => "ChecksumMismatchError",
            DownloadError::InvalidChecksum { .. } => "InvalidChecksumError",
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DownloadError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn transfer(url: impl ToString, reason: impl ToString) -> Self {
        DownloadError::Transfer {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
