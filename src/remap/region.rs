//! Region re-derivation against current file text
//!
//! After a remap the file on disk may not be the one the log was produced
//! from, so end positions and snippets are recomputed from what is there now.

use crate::fs::FileSystem;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use super::Region;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("Failed to read '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line} is outside '{path}' ({line_count} lines)")]
    OutOfRange {
        path: PathBuf,
        line: usize,
        line_count: usize,
    },
}

/// Recomputes line/column/snippet data for a region in a file
pub trait RegionPopulator: Send + Sync {
    fn populate(
        &self,
        region: &Region,
        file: &Path,
        populate_snippet: bool,
    ) -> Result<Region, RegionError>;

    /// Drop anything remembered about `file`; it may have changed on disk
    fn forget(&self, _file: &Path) {}

    fn clear(&self) {}
}

struct LineIndex {
    text: String,
    /// Byte offset of each line start
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: String) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        // A trailing newline does not open another line
        if starts.len() > 1 && starts.last() == Some(&text.len()) {
            starts.pop();
        }
        Self { text, starts }
    }

    fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Line text without its terminator
    fn line(&self, line: usize) -> &str {
        let start = self.starts[line - 1];
        let end = self
            .starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches(['\n', '\r'])
    }

    fn char_len(&self, line: usize) -> usize {
        self.line(line).chars().count()
    }

    /// Byte offset of a 1-based column, clamped to the line end
    fn offset(&self, line: usize, column: usize) -> usize {
        let text = self.line(line);
        let within = text
            .char_indices()
            .nth(column.saturating_sub(1))
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        self.starts[line - 1] + within
    }
}

/// [`RegionPopulator`] reading through the file system seam.
///
/// Line indexes are cached per file until forgotten.
pub struct TextRegionPopulator {
    fs: Arc<dyn FileSystem>,
    cache: RwLock<HashMap<PathBuf, Arc<LineIndex>>>,
}

impl TextRegionPopulator {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn index_for(&self, file: &Path) -> Result<Arc<LineIndex>, RegionError> {
        if let Some(index) = self.cache.read().get(file) {
            return Ok(Arc::clone(index));
        }

        let text = self
            .fs
            .read_to_string(file)
            .map_err(|source| RegionError::Unreadable {
                path: file.to_path_buf(),
                source,
            })?;
        let index = Arc::new(LineIndex::new(text));
        self.cache
            .write()
            .insert(file.to_path_buf(), Arc::clone(&index));
        Ok(index)
    }
}

impl RegionPopulator for TextRegionPopulator {
    fn populate(
        &self,
        region: &Region,
        file: &Path,
        populate_snippet: bool,
    ) -> Result<Region, RegionError> {
        let index = self.index_for(file)?;
        let line_count = index.line_count();
        let out_of_range = |line| RegionError::OutOfRange {
            path: file.to_path_buf(),
            line,
            line_count,
        };

        if region.start_line == 0 || region.start_line > line_count {
            return Err(out_of_range(region.start_line));
        }
        let end_line = match region.end_line {
            0 => region.start_line,
            line if line > line_count => return Err(out_of_range(line)),
            line => line.max(region.start_line),
        };
        let start_column = region.start_column.max(1);
        let end_column = match region.end_column {
            0 => index.char_len(end_line) + 1,
            column => column,
        };

        let snippet = if populate_snippet {
            let start = index.offset(region.start_line, start_column);
            let end = index.offset(end_line, end_column).max(start);
            Some(index.text[start..end].to_string())
        } else {
            region.snippet.clone()
        };

        Ok(Region {
            start_line: region.start_line,
            start_column,
            end_line,
            end_column,
            snippet,
        })
    }

    fn forget(&self, file: &Path) {
        self.cache.write().remove(file);
    }

    fn clear(&self) {
        self.cache.write().clear();
    }
}
