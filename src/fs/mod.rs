//! File system seam for the resolver
//!
//! Every strategy in the resolution pipeline touches disk only through
//! [`FileSystem`], so a fake can stand in for headless runs and tests.

pub mod memory;

pub use memory::InMemoryFileSystem;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// File system primitives the resolver depends on
pub trait FileSystem: Send + Sync {
    fn file_exists(&self, path: &Path) -> bool;

    fn dir_exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Stream `reader` into a file at `path`.
    ///
    /// The file only appears once the whole stream was copied; a failed
    /// stream leaves nothing behind.
    fn write_from_reader(&self, path: &Path, reader: &mut dyn Read) -> io::Result<u64>;

    fn set_readonly(&self, path: &Path, readonly: bool) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Files under `root` whose file name equals `file_name` (ASCII case-insensitive)
    fn enumerate_files(
        &self,
        root: &Path,
        file_name: &str,
        recursive: bool,
    ) -> io::Result<Vec<PathBuf>>;

    /// Remove a directory tree, clearing read-only flags first
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by the real disk
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn write_from_reader(&self, path: &Path, reader: &mut dyn Read) -> io::Result<u64> {
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        let bytes = io::copy(reader, &mut staged)?;
        staged.persist(path).map_err(|e| e.error)?;
        Ok(bytes)
    }

    fn set_readonly(&self, path: &Path, readonly: bool) -> io::Result<()> {
        let mut permissions = fs::metadata(path)?.permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(readonly);
        fs::set_permissions(path, permissions)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn enumerate_files(
        &self,
        root: &Path,
        file_name: &str,
        recursive: bool,
    ) -> io::Result<Vec<PathBuf>> {
        let mut walker = WalkDir::new(root).follow_links(false);
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut matches = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(io::Error::other(e)),
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {e}", root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.eq_ignore_ascii_case(file_name))
            {
                matches.push(entry.into_path());
            }
        }

        Ok(matches)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        // Read-only files block deletion on Windows
        for entry in WalkDir::new(path).contents_first(true) {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_file() {
                self.set_readonly(entry.path(), false)?;
            }
        }
        fs::remove_dir_all(path)
    }
}
