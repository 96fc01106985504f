//! Embedded-vs-local disambiguation
//!
//! When a local file's hash differs from the one recorded in the log, the
//! user picks which copy to open. A remembered answer applies to every
//! mismatch in the same log file for the rest of the session.

use crate::prompt::{EmbeddedFileChoice, UserInteractionPort};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Session-wide memo of remembered answers keyed by log file path
#[derive(Debug, Default)]
pub struct ChoiceMemo {
    inner: DashMap<PathBuf, EmbeddedFileChoice>,
}

impl ChoiceMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, log_file_path: PathBuf, choice: EmbeddedFileChoice) {
        self.inner.insert(log_file_path, choice);
    }

    pub fn get(&self, log_file_path: &Path) -> Option<EmbeddedFileChoice> {
        self.inner.get(log_file_path).map(|entry| *entry)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

/// Decide between the embedded copy and the local file.
///
/// A remembered `UseEmbedded` is ignored when there is nothing embedded.
/// Answers without a log path cannot be remembered.
pub fn choose(
    memo: &ChoiceMemo,
    ui: &dyn UserInteractionPort,
    log_file_path: Option<&Path>,
    has_embedded_content: bool,
) -> EmbeddedFileChoice {
    if let Some(remembered) = log_file_path.and_then(|p| memo.get(p)) {
        if remembered != EmbeddedFileChoice::UseEmbedded || has_embedded_content {
            debug!("Using remembered choice {remembered:?}");
            return remembered;
        }
    }

    let answer = ui.prompt_for_embedded_choice(log_file_path, has_embedded_content);
    if answer.remember && answer.choice != EmbeddedFileChoice::Cancelled {
        if let Some(path) = log_file_path {
            memo.insert(path.to_path_buf(), answer.choice);
        }
    }
    answer.choice
}
