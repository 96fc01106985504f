//! In-memory [`FileSystem`] for headless use and tests

use super::FileSystem;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct MemFile {
    data: Vec<u8>,
    readonly: bool,
}

/// Thread-safe in-memory file tree keyed by path.
///
/// Counts writes so callers can assert that an operation skipped disk.
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
    files: RwLock<BTreeMap<PathBuf, MemFile>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
    writes: AtomicUsize,
    enumerations: AtomicUsize,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without counting it as a write
    pub fn with_file(self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Self {
        self.insert(path.as_ref(), contents.as_ref().to_vec());
        self
    }

    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        self.insert(path.as_ref(), contents.as_ref().to_vec());
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of `enumerate_files` calls, i.e. workspace searches
    pub fn enumeration_count(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub fn is_readonly(&self, path: &Path) -> bool {
        self.files
            .read()
            .get(path)
            .is_some_and(|file| file.readonly)
    }

    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    fn insert(&self, path: &Path, data: Vec<u8>) {
        if let Some(parent) = path.parent() {
            self.mark_dirs(parent);
        }
        self.files.write().insert(
            path.to_path_buf(),
            MemFile {
                data,
                readonly: false,
            },
        );
    }

    fn mark_dirs(&self, dir: &Path) {
        let mut dirs = self.dirs.write();
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn write_checked(&self, path: &Path, data: Vec<u8>) -> io::Result<()> {
        if self.files.read().get(path).is_some_and(|f| f.readonly) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(path, data);
        Ok(())
    }
}

impl FileSystem for InMemoryFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    fn dir_exists(&self, path: &Path) -> bool {
        self.dirs.read().contains(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .read()
            .get(path)
            .map(|file| file.data.clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )
            })
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.write_checked(path, contents.to_vec())
    }

    fn write_from_reader(&self, path: &Path, reader: &mut dyn Read) -> io::Result<u64> {
        let mut data = Vec::new();
        let len = reader.read_to_end(&mut data)?;
        self.write_checked(path, data)?;
        Ok(len as u64)
    }

    fn set_readonly(&self, path: &Path, readonly: bool) -> io::Result<()> {
        match self.files.write().get_mut(path) {
            Some(file) => {
                file.readonly = readonly;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.mark_dirs(path);
        Ok(())
    }

    fn enumerate_files(
        &self,
        root: &Path,
        file_name: &str,
        recursive: bool,
    ) -> io::Result<Vec<PathBuf>> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        if !self.dir_exists(root) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", root.display()),
            ));
        }

        let files = self.files.read();
        Ok(files
            .keys()
            .filter(|path| path.starts_with(root))
            .filter(|path| recursive || path.parent() == Some(root))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.eq_ignore_ascii_case(file_name))
            })
            .cloned()
            .collect())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.files.write().retain(|p, _| !p.starts_with(path));
        self.dirs.write().retain(|p| !p.starts_with(path));
        Ok(())
    }
}
