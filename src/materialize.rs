//! Embedded artifact materialization
//!
//! Embedded files are written once under `<temp_root>/<sha256>/<name>` and
//! marked read-only. The hash segment keeps artifacts that share a name apart.

use crate::cache::ArtifactTable;
use crate::fs::FileSystem;
use crate::hash::compute_sha256;
use crate::paths;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub struct EmbeddedFileMaterializer {
    fs: Arc<dyn FileSystem>,
    temp_root: PathBuf,
}

impl EmbeddedFileMaterializer {
    pub fn new(fs: Arc<dyn FileSystem>, temp_root: PathBuf) -> Self {
        Self { fs, temp_root }
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Write the artifact recorded as `name` to its temp location.
    ///
    /// `name` may be a logical name from the log or a path this method
    /// returned earlier. Returns `None` when the artifact is unknown or has no
    /// embedded text. Existing files are never rewritten.
    pub fn materialize(
        &self,
        artifacts: &mut ArtifactTable,
        name: &str,
    ) -> io::Result<Option<PathBuf>> {
        let Some(artifact) = artifacts.get(name) else {
            return Ok(None);
        };
        let Some(text) = artifact.text.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let final_path = match artifacts.materialized_path(name) {
            Some(existing) => existing.to_path_buf(),
            None => {
                let hash = artifact
                    .sha256
                    .clone()
                    .filter(|hash| hash.is_well_formed())
                    .unwrap_or_else(|| compute_sha256(text.as_bytes()));
                self.temp_root
                    .join(hash.as_str())
                    .join(temp_file_name(name))
            }
        };

        if let Some(parent) = final_path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        if !self.fs.file_exists(&final_path) {
            self.fs.write(&final_path, text.as_bytes())?;
            self.fs.set_readonly(&final_path, true)?;
            debug!("Materialized {name} to {}", final_path.display());
        }

        artifacts.register_resolved_path(name, final_path.clone());
        Ok(Some(final_path))
    }

    /// Delete everything under the temp root. Failures are logged, not raised.
    pub fn remove_temporary_files(&self) {
        if !self.fs.dir_exists(&self.temp_root) {
            return;
        }
        if let Err(e) = self.fs.remove_dir_all(&self.temp_root) {
            tracing::warn!(
                "Failed to remove temporary files under {}: {e}",
                self.temp_root.display()
            );
        }
    }
}

/// Relative file name for an artifact under its hash directory.
///
/// Names that are URL-shaped or would leave the hash directory get a random
/// file name instead.
fn temp_file_name(name: &str) -> PathBuf {
    let relative = match paths::parse_absolute_url(name) {
        Some(url) if url.scheme() == "file" => {
            paths::contained_relative_path(url.path().trim_start_matches('/'))
        }
        Some(_) => None,
        None => paths::contained_relative_path(name),
    };
    relative.unwrap_or_else(|| {
        debug!("Using a generated file name for {name}");
        PathBuf::from(uuid::Uuid::new_v4().to_string())
    })
}
