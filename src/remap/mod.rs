//! Result records and bulk path remapping
//!
//! A [`ResultRecord`] is the navigable view of one log result: every place
//! it points at a file. Once a path resolves, [`propagate::remap_file_paths`]
//! rewrites every reference to it across the run.

pub mod propagate;
pub mod region;

pub use propagate::{DecorationRefresher, NoopDecorations, remap_file_paths};
pub use region::{RegionError, RegionPopulator, TextRegionPopulator};

use std::path::PathBuf;

/// Text span inside a file; lines and columns are 1-based, 0 means unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub snippet: Option<String>,
}

impl Region {
    pub fn lines(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationRecord {
    pub file_path: String,
    pub region: Option<Region>,
}

impl LocationRecord {
    pub fn new(file_path: impl Into<String>, region: Option<Region>) -> Self {
        Self {
            file_path: file_path.into(),
            region,
        }
    }
}

/// Call-tree node; nodes may carry no location at all
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStepNode {
    pub file_path: Option<String>,
    pub region: Option<Region>,
    pub children: Vec<AnalysisStepNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStep {
    pub top_level_nodes: Vec<AnalysisStepNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    pub message: Option<String>,
    pub frames: Vec<LocationRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactChange {
    pub file_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fix {
    pub description: Option<String>,
    pub artifact_changes: Vec<ArtifactChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRecord {
    pub result_id: u32,
    pub run_index: u32,
    /// Path of the primary location as recorded in the log
    pub file_path: String,
    pub locations: Vec<LocationRecord>,
    pub related_locations: Vec<LocationRecord>,
    pub analysis_steps: Vec<AnalysisStep>,
    pub stacks: Vec<Stack>,
    pub fixes: Vec<Fix>,
    /// Where downloads for this result land; defaults per run when unset
    pub working_directory: Option<PathBuf>,
    pub log_file_path: Option<PathBuf>,
}

impl ResultRecord {
    pub fn new(result_id: u32, run_index: u32, file_path: impl Into<String>) -> Self {
        Self {
            result_id,
            run_index,
            file_path: file_path.into(),
            ..Self::default()
        }
    }
}
