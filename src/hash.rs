//! SHA-256 computation utilities for artifact verification

use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::Path;

/// Hex-encoded SHA-256 digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha256Hash(pub String);

impl Sha256Hash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exactly 64 hex digits, safe to use as a directory name
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 64 && self.0.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Logs record hashes in either case
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute SHA-256 hash of raw bytes
///
/// Returns a lowercase hex-encoded SHA-256 hash (64 characters)
pub fn compute_sha256(content: &[u8]) -> Sha256Hash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    Sha256Hash(format!("{result:x}"))
}

/// Compute SHA-256 hash of a file's contents through the file system seam
pub fn compute_file_sha(fs: &dyn FileSystem, path: &Path) -> io::Result<Sha256Hash> {
    let content = fs.read(path)?;
    Ok(compute_sha256(&content))
}
