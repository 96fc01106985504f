//! Exit codes for CLI operations following Unix conventions.
//!
//! - `0`: Success
//! - `1`: General error
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::{FetchError, ResolverError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Path or run could not be resolved (code 3)
    NotFound = 3,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// `Success` if a path was resolved, `NotFound` otherwise
    pub fn from_resolution<T>(result: &Option<T>) -> Self {
        match result {
            Some(_) => ExitCode::Success,
            None => ExitCode::NotFound,
        }
    }

    pub fn from_error(error: &ResolverError) -> Self {
        match error {
            ResolverError::UnknownRun { .. } | ResolverError::UnknownResult { .. } => {
                ExitCode::NotFound
            }
            ResolverError::StoreIo { .. }
            | ResolverError::Io { .. }
            | ResolverError::Fetch(FetchError::Io { .. }) => ExitCode::IoError,
            ResolverError::InvalidStore { .. } => ExitCode::ConfigError,
            _ => ExitCode::GeneralError,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::NotFound => "Not found",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
        }
    }
}
