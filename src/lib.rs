//! Rebaselines file paths recorded in SARIF logs onto the local machine

pub mod cache;
pub mod config;
pub mod disambiguate;
pub mod error;
pub mod exit_code;
pub mod fetch;
pub mod fs;
pub mod hash;
pub mod logging;
pub mod materialize;
pub mod paths;
pub mod pipeline;
pub mod prompt;
pub mod remap;
pub mod sarif;
pub mod service;
pub mod vcs;

// Explicit exports for better API clarity
pub use cache::{ArtifactContent, ArtifactTable, PathPrefixRemap, RunEntry, RunPathCache};
pub use config::Settings;
pub use error::{FetchError, FetchResult, ResolverError, ResolverResult};
pub use exit_code::ExitCode;
pub use fs::{FileSystem, InMemoryFileSystem, RealFileSystem};
pub use pipeline::{Learned, Resolved, Strategy};
pub use prompt::{
    DownloadConsent, EmbeddedChoiceAnswer, EmbeddedFileChoice, NonInteractive, TerminalPrompt,
    UserInteractionPort,
};
pub use remap::ResultRecord;
pub use service::PathResolutionService;
