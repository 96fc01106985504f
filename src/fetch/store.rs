//! Per-user preference persistence
//!
//! Two JSON arrays in the store directory:
//! - `AllowedDownloadHosts.json`: hosts the user agreed to always download from
//! - `AllowedFileExtensions.json`: extensions the user agreed to open
//!
//! Both are loaded once, only ever grow, and are written back on every addition.

use crate::error::{ResolverError, ResolverResult};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ALLOWED_DOWNLOAD_HOSTS_FILE: &str = "AllowedDownloadHosts.json";
pub const ALLOWED_FILE_EXTENSIONS_FILE: &str = "AllowedFileExtensions.json";

pub struct PreferenceStore {
    dir: PathBuf,
    hosts: RwLock<Vec<String>>,
    extensions: RwLock<Vec<String>>,
}

impl PreferenceStore {
    /// Load both lists from `dir`. Missing or unreadable files start empty.
    pub fn load(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let hosts = load_list(&dir.join(ALLOWED_DOWNLOAD_HOSTS_FILE));
        let extensions = load_list(&dir.join(ALLOWED_FILE_EXTENSIONS_FILE));
        Self {
            dir,
            hosts: RwLock::new(hosts),
            extensions: RwLock::new(extensions),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_host_allowed(&self, host: &str) -> bool {
        self.hosts
            .read()
            .iter()
            .any(|h| h.eq_ignore_ascii_case(host))
    }

    pub fn allowed_download_hosts(&self) -> Vec<String> {
        self.hosts.read().clone()
    }

    /// Returns `false` when the host was already allowed
    pub fn add_allowed_download_host(&self, host: &str) -> ResolverResult<bool> {
        let added = self.add_to(&self.hosts, ALLOWED_DOWNLOAD_HOSTS_FILE, host)?;
        if added {
            info!("Always allowing downloads from {host}");
        }
        Ok(added)
    }

    pub fn allowed_file_extensions(&self) -> Vec<String> {
        self.extensions.read().clone()
    }

    pub fn is_file_extension_allowed(&self, extension: &str) -> bool {
        self.extensions
            .read()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    /// Case-insensitive; returns `false` when already present
    pub fn add_allowed_file_extension(&self, extension: &str) -> ResolverResult<bool> {
        self.add_to(&self.extensions, ALLOWED_FILE_EXTENSIONS_FILE, extension)
    }

    /// The in-memory list only changes once the file on disk does
    fn add_to(
        &self,
        list: &RwLock<Vec<String>>,
        file_name: &str,
        value: &str,
    ) -> ResolverResult<bool> {
        let mut values = list.write();
        if values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            return Ok(false);
        }
        let mut updated = values.clone();
        updated.push(value.to_string());
        self.persist(file_name, &updated)?;
        *values = updated;
        Ok(true)
    }

    fn persist(&self, file_name: &str, values: &[String]) -> ResolverResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ResolverError::store_io(self.dir.clone(), e))?;

        let path = self.dir.join(file_name);
        let content = serde_json::to_string_pretty(values).map_err(|e| {
            ResolverError::invalid_store(format!("Failed to serialize {file_name}: {e}"))
        })?;
        fs::write(&path, content).map_err(|e| ResolverError::store_io(path, e))
    }
}

fn load_list(path: &Path) -> Vec<String> {
    if !path.exists() {
        return Vec::new();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {e}", path.display());
            return Vec::new();
        }
    };
    match serde_json::from_str(&content) {
        Ok(values) => values,
        Err(e) => {
            warn!("Ignoring invalid preference file {}: {e}", path.display());
            Vec::new()
        }
    }
}
