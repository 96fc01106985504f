//! Error types for path resolution
//!
//! Structured errors using thiserror. Strategy-level failures inside the
//! resolution pipeline are never surfaced through these types; they are
//! logged and the pipeline moves on. What remains here is what a caller
//! can act on.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the remote-fetch gate
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Not able to download file from Url {url}. Http status code: {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("'{url}' is not a valid absolute URL")]
    InvalidUrl { url: String },

    #[error("The input URL does not use a known protocol: {url}")]
    UnsupportedProtocol { url: String },

    #[error("Refusing to download outside the working directory: '{path}'")]
    UnsafeDestination { path: String },

    #[error("Failed to write downloaded file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn status_code(&self) -> String {
        match self {
            Self::HttpStatus { .. } => "FETCH_HTTP_STATUS",
            Self::Transport { .. } => "FETCH_TRANSPORT",
            Self::InvalidUrl { .. } => "FETCH_INVALID_URL",
            Self::UnsupportedProtocol { .. } => "FETCH_UNSUPPORTED_PROTOCOL",
            Self::UnsafeDestination { .. } => "FETCH_UNSAFE_DESTINATION",
            Self::Io { .. } => "FETCH_IO",
        }
        .to_string()
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Main error type for resolution operations
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Run {run_index} is not loaded")]
    UnknownRun { run_index: u32 },

    #[error("Result {result_id} not found in run {run_index}")]
    UnknownResult { result_id: u32, run_index: u32 },

    #[error("'{operation}' must be called from the thread that owns the resolution service")]
    WrongThread { operation: &'static str },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Error reading/writing the per-user preference store
    #[error("preference store io error at '{path}': {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a readable SARIF log: {details}")]
    InvalidLog { path: PathBuf, details: String },

    #[error("invalid preference store: {details}")]
    InvalidStore { details: String },

    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolverError {
    pub fn store_io(path: PathBuf, source: std::io::Error) -> Self {
        Self::StoreIo { path, source }
    }

    pub fn invalid_store(details: impl Into<String>) -> Self {
        Self::InvalidStore {
            details: details.into(),
        }
    }

    /// Stable code for programmatic handling
    pub fn status_code(&self) -> String {
        match self {
            Self::UnknownRun { .. } => "UNKNOWN_RUN".to_string(),
            Self::UnknownResult { .. } => "UNKNOWN_RESULT".to_string(),
            Self::WrongThread { .. } => "WRONG_THREAD".to_string(),
            Self::Fetch(e) => e.status_code(),
            Self::StoreIo { .. } => "STORE_IO".to_string(),
            Self::InvalidLog { .. } => "INVALID_LOG".to_string(),
            Self::InvalidStore { .. } => "INVALID_STORE".to_string(),
            Self::Io { .. } => "IO_ERROR".to_string(),
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::UnknownRun { .. } | Self::UnknownResult { .. } => {
                vec!["Load the log again; run indexes are not stable across sessions"]
            }
            Self::WrongThread { .. } => vec![
                "Dispatch the call to the owning thread",
                "Enable headless mode when driving the service from tests",
            ],
            Self::Fetch(FetchError::HttpStatus { .. }) => vec![
                "Check that the repository is public or that credentials are configured",
                "Verify the revision recorded in the log still exists",
            ],
            Self::Fetch(FetchError::UnsafeDestination { .. }) => {
                vec!["The log names a path with '..' segments; check where it came from"]
            }
            Self::Fetch(_) => vec!["Check network connectivity and proxy settings"],
            Self::StoreIo { .. } => vec![
                "Ensure the store directory exists and is writable",
                "Check disk space and permissions",
            ],
            Self::InvalidLog { .. } => vec!["Check that the file is SARIF 2.1.0 JSON"],
            Self::InvalidStore { .. } => {
                vec!["Delete the preference file; it is recreated on the next consent"]
            }
            Self::Io { .. } => vec!["Check file permissions"],
        }
    }
}

pub type ResolverResult<T> = Result<T, ResolverError>;
