//! Per-run path cache
//!
//! Holds what a run declared about its paths and what resolution has learned
//! since. Learned state only grows for the run's lifetime.

pub mod artifacts;
pub mod registry;

pub use artifacts::{ArtifactContent, ArtifactTable};
pub use registry::{RunEntry, RunRegistry};

use crate::vcs::VersionControlRecord;
use std::collections::HashMap;
use url::Url;

/// A learned rewrite: `original_prefix` in a log path becomes `resolved_prefix`.
///
/// An empty `original_prefix` means the log path had no distinguishing prefix
/// and the rule prepends `resolved_prefix` as a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixRemap {
    pub original_prefix: String,
    pub resolved_prefix: String,
}

impl PathPrefixRemap {
    pub fn new(original_prefix: impl Into<String>, resolved_prefix: impl Into<String>) -> Self {
        Self {
            original_prefix: original_prefix.into(),
            resolved_prefix: resolved_prefix.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunPathCache {
    original_uri_base_paths: HashMap<String, Url>,
    remapped_uri_base_paths: HashMap<String, Url>,
    remapped_path_prefixes: Vec<PathPrefixRemap>,
    source_control_details: Vec<VersionControlRecord>,
    artifacts: ArtifactTable,
}

impl RunPathCache {
    /// Declared state is fixed here; only learned state changes afterwards
    pub fn new(
        original_uri_base_paths: HashMap<String, Url>,
        source_control_details: Vec<VersionControlRecord>,
        artifacts: ArtifactTable,
    ) -> Self {
        Self {
            original_uri_base_paths,
            remapped_uri_base_paths: HashMap::new(),
            remapped_path_prefixes: Vec::new(),
            source_control_details,
            artifacts,
        }
    }

    /// Learned base first, then the declared one
    pub fn base_uri(&self, uri_base_id: &str) -> Option<&Url> {
        self.remapped_uri_base_paths
            .get(uri_base_id)
            .or_else(|| self.original_uri_base_paths.get(uri_base_id))
    }

    pub fn original_base_uri(&self, uri_base_id: &str) -> Option<&Url> {
        self.original_uri_base_paths.get(uri_base_id)
    }

    pub fn remapped_base_uri(&self, uri_base_id: &str) -> Option<&Url> {
        self.remapped_uri_base_paths.get(uri_base_id)
    }

    pub fn original_uri_base_paths(&self) -> &HashMap<String, Url> {
        &self.original_uri_base_paths
    }

    pub fn remapped_uri_base_paths(&self) -> &HashMap<String, Url> {
        &self.remapped_uri_base_paths
    }

    pub fn remapped_path_prefixes(&self) -> &[PathPrefixRemap] {
        &self.remapped_path_prefixes
    }

    pub fn source_control_details(&self) -> &[VersionControlRecord] {
        &self.source_control_details
    }

    pub fn artifacts(&self) -> &ArtifactTable {
        &self.artifacts
    }

    pub fn artifacts_mut(&mut self) -> &mut ArtifactTable {
        &mut self.artifacts
    }

    pub fn remap_uri_base(&mut self, uri_base_id: impl Into<String>, base: Url) {
        self.remapped_uri_base_paths.insert(uri_base_id.into(), base);
    }

    /// Append a rule unless an identical one exists; rules are never removed
    pub fn add_prefix_remap(&mut self, remap: PathPrefixRemap) -> bool {
        if self.remapped_path_prefixes.contains(&remap) {
            return false;
        }
        self.remapped_path_prefixes.push(remap);
        true
    }
}
