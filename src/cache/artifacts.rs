//! Embedded artifact table
//!
//! Artifacts are found by the name the log recorded and, once materialized,
//! by the temp path they were written to. Two indexes over one entry list.

use crate::hash::Sha256Hash;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Embedded file content as declared in a run's artifact table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactContent {
    pub logical_name: String,
    pub text: Option<String>,
    pub sha256: Option<Sha256Hash>,
}

impl ArtifactContent {
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            text: None,
            sha256: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_hash(mut self, hash: Sha256Hash) -> Self {
        self.sha256 = Some(hash);
        self
    }

    pub fn has_content(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct ArtifactTable {
    entries: Vec<ArtifactContent>,
    by_logical_name: HashMap<String, usize>,
    by_resolved_path: HashMap<PathBuf, usize>,
}

impl ArtifactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later declarations of the same name replace earlier ones
    pub fn insert(&mut self, artifact: ArtifactContent) {
        match self.by_logical_name.get(&artifact.logical_name) {
            Some(&index) => self.entries[index] = artifact,
            None => {
                self.by_logical_name
                    .insert(artifact.logical_name.clone(), self.entries.len());
                self.entries.push(artifact);
            }
        }
    }

    /// Look up by logical name first, then by materialized path
    pub fn get(&self, name: &str) -> Option<&ArtifactContent> {
        self.index_of(name).map(|index| &self.entries[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Path this artifact was materialized to, if any
    pub fn materialized_path(&self, name: &str) -> Option<&Path> {
        let index = self.index_of(name)?;
        self.by_resolved_path
            .iter()
            .find(|(_, i)| **i == index)
            .map(|(path, _)| path.as_path())
    }

    /// Make the artifact reachable by its materialized path as well
    pub fn register_resolved_path(&mut self, name: &str, path: PathBuf) -> bool {
        match self.index_of(name) {
            Some(index) => {
                self.by_resolved_path.entry(path).or_insert(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtifactContent> {
        self.entries.iter()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.by_logical_name
            .get(name)
            .or_else(|| self.by_resolved_path.get(Path::new(name)))
            .copied()
    }
}
