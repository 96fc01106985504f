//! Loaded runs keyed by run index

use super::RunPathCache;
use crate::error::{ResolverError, ResolverResult};
use crate::remap::ResultRecord;
use std::collections::HashMap;
use std::path::PathBuf;

/// Everything the resolver keeps for one loaded run
#[derive(Debug, Default)]
pub struct RunEntry {
    pub log_file_path: Option<PathBuf>,
    pub paths: RunPathCache,
    pub results: Vec<ResultRecord>,
}

impl RunEntry {
    pub fn new(log_file_path: Option<PathBuf>, paths: RunPathCache) -> Self {
        Self {
            log_file_path,
            paths,
            results: Vec::new(),
        }
    }

    pub fn result(&self, result_id: u32) -> Option<&ResultRecord> {
        self.results.iter().find(|r| r.result_id == result_id)
    }
}

/// Owns every run's cache. Indexes are never reused within a session.
#[derive(Debug, Default)]
pub struct RunRegistry {
    runs: HashMap<u32, RunEntry>,
    next_index: u32,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry` under a fresh run index
    pub fn register(&mut self, entry: RunEntry) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        self.runs.insert(index, entry);
        index
    }

    /// Index the next registered run will get
    pub fn current_index(&self) -> u32 {
        self.next_index
    }

    pub fn get(&self, run_index: u32) -> ResolverResult<&RunEntry> {
        self.runs
            .get(&run_index)
            .ok_or(ResolverError::UnknownRun { run_index })
    }

    pub fn get_mut(&mut self, run_index: u32) -> ResolverResult<&mut RunEntry> {
        self.runs
            .get_mut(&run_index)
            .ok_or(ResolverError::UnknownRun { run_index })
    }

    pub fn remove(&mut self, run_index: u32) -> Option<RunEntry> {
        self.runs.remove(&run_index)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn run_indexes(&self) -> impl Iterator<Item = u32> + '_ {
        self.runs.keys().copied()
    }
}
