//! The slice of the SARIF object model the resolver consumes
//!
//! Only what path resolution needs is deserialized: base URIs, provenance,
//! embedded artifacts and the locations results point at. Unknown fields are
//! ignored; this is not a validator.

use crate::cache::{ArtifactContent, ArtifactTable, RunPathCache};
use crate::hash::Sha256Hash;
use crate::paths;
use crate::remap::{
    AnalysisStep, AnalysisStepNode, ArtifactChange, Fix, LocationRecord, Region, ResultRecord,
    Stack,
};
use crate::vcs::VersionControlRecord;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SarifLog {
    #[serde(default)]
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    #[serde(default)]
    pub original_uri_base_ids: HashMap<String, ArtifactLocation>,
    #[serde(default)]
    pub version_control_provenance: Vec<VersionControlDetails>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub results: Vec<SarifResult>,
    #[serde(default)]
    pub invocations: Vec<Invocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLocation {
    pub uri: Option<String>,
    pub uri_base_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionControlDetails {
    pub repository_uri: Option<String>,
    pub revision_id: Option<String>,
    pub branch: Option<String>,
    pub mapped_to: Option<ArtifactLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artifact {
    pub location: Option<ArtifactLocation>,
    pub contents: Option<ArtifactContents>,
    #[serde(default)]
    pub hashes: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtifactContents {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    #[serde(default)]
    pub start_line: usize,
    #[serde(default)]
    pub start_column: usize,
    #[serde(default)]
    pub end_line: usize,
    #[serde(default)]
    pub end_column: usize,
    pub snippet: Option<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocation {
    pub artifact_location: Option<ArtifactLocation>,
    pub region: Option<SarifRegion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub physical_location: Option<PhysicalLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadFlowLocation {
    pub location: Option<Location>,
    #[serde(default)]
    pub nesting_level: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadFlow {
    #[serde(default)]
    pub locations: Vec<ThreadFlowLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFlow {
    #[serde(default)]
    pub thread_flows: Vec<ThreadFlow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackFrame {
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SarifStack {
    pub message: Option<Message>,
    #[serde(default)]
    pub frames: Vec<StackFrame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactChange {
    pub artifact_location: Option<ArtifactLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifFix {
    pub description: Option<Message>,
    #[serde(default)]
    pub artifact_changes: Vec<SarifArtifactChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub related_locations: Vec<Location>,
    #[serde(default)]
    pub code_flows: Vec<CodeFlow>,
    #[serde(default)]
    pub stacks: Vec<SarifStack>,
    #[serde(default)]
    pub fixes: Vec<SarifFix>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub working_directory: Option<ArtifactLocation>,
}

pub fn parse_log(json: &str) -> serde_json::Result<SarifLog> {
    serde_json::from_str(json)
}

/// Declared base URIs, each ending with `/`. Entries without a URI are
/// skipped; a base may itself be relative to one declared absolutely.
pub fn uri_base_paths(run: &Run) -> HashMap<String, Url> {
    let mut bases = HashMap::new();

    for (id, location) in &run.original_uri_base_ids {
        let Some(uri) = location.uri.as_deref() else {
            continue;
        };
        if let Some(url) = paths::parse_absolute_url(uri) {
            bases.insert(id.clone(), paths::with_trailing_slash(url));
        }
    }

    for (id, location) in &run.original_uri_base_ids {
        if bases.contains_key(id) {
            continue;
        }
        let (Some(uri), Some(parent)) = (location.uri.as_deref(), location.uri_base_id.as_deref())
        else {
            continue;
        };
        if let Some(url) = bases.get(parent).and_then(|base| paths::join_base(base, uri)) {
            bases.insert(id.clone(), paths::with_trailing_slash(url));
        }
    }

    bases
}

fn resolve_location(location: &ArtifactLocation, bases: &HashMap<String, Url>) -> Option<Url> {
    let uri = location.uri.as_deref()?;
    if let Some(url) = paths::parse_absolute_url(uri) {
        return Some(url);
    }
    let base = bases.get(location.uri_base_id.as_deref()?)?;
    paths::join_base(base, uri)
}

fn version_control_records(run: &Run, bases: &HashMap<String, Url>) -> Vec<VersionControlRecord> {
    run.version_control_provenance
        .iter()
        .map(|details| VersionControlRecord {
            repository_uri: details
                .repository_uri
                .as_deref()
                .and_then(paths::parse_absolute_url),
            revision_id: details.revision_id.clone(),
            branch: details.branch.clone(),
            mapped_to: details
                .mapped_to
                .as_ref()
                .and_then(|location| resolve_location(location, bases))
                .map(paths::with_trailing_slash),
        })
        .collect()
}

fn artifact_table(run: &Run) -> ArtifactTable {
    let mut table = ArtifactTable::new();
    for artifact in &run.artifacts {
        let Some(name) = artifact.location.as_ref().and_then(|l| l.uri.clone()) else {
            continue;
        };
        let text = artifact.contents.as_ref().and_then(|c| c.text.clone());
        let sha256 = artifact.hashes.get("sha-256").cloned().map(Sha256Hash);
        if text.is_none() && sha256.is_none() {
            continue;
        }

        let mut content = ArtifactContent::new(name);
        content.text = text;
        content.sha256 = sha256;
        table.insert(content);
    }
    table
}

fn location_path(location: &Location) -> Option<&str> {
    location
        .physical_location
        .as_ref()?
        .artifact_location
        .as_ref()?
        .uri
        .as_deref()
}

fn location_region(location: &Location) -> Option<Region> {
    let region = location.physical_location.as_ref()?.region.as_ref()?;
    Some(Region {
        start_line: region.start_line,
        start_column: region.start_column,
        end_line: region.end_line,
        end_column: region.end_column,
        snippet: region.snippet.as_ref().and_then(|s| s.text.clone()),
    })
}

fn location_record(location: &Location) -> Option<LocationRecord> {
    Some(LocationRecord::new(
        location_path(location)?,
        location_region(location),
    ))
}

/// Deepest analysis-step nesting kept; deeper steps attach at this level
pub const MAX_NESTING_DEPTH: usize = 256;

/// Nest thread-flow locations by their nesting level
fn analysis_step(flow: &ThreadFlow) -> AnalysisStep {
    fn insert(mut nodes: &mut Vec<AnalysisStepNode>, depth: usize, node: AnalysisStepNode) {
        for _ in 0..depth.min(MAX_NESTING_DEPTH) {
            if nodes.is_empty() {
                break;
            }
            let last = nodes.len() - 1;
            nodes = &mut nodes[last].children;
        }
        nodes.push(node);
    }

    let mut top_level_nodes = Vec::new();
    for step in &flow.locations {
        let node = AnalysisStepNode {
            file_path: step.location.as_ref().and_then(location_path).map(str::to_string),
            region: step.location.as_ref().and_then(location_region),
            children: Vec::new(),
        };
        insert(&mut top_level_nodes, step.nesting_level, node);
    }
    AnalysisStep { top_level_nodes }
}

fn result_record(
    result: &SarifResult,
    result_id: u32,
    run_index: u32,
    working_directory: Option<&Path>,
    log_file_path: Option<&Path>,
) -> ResultRecord {
    let locations: Vec<_> = result.locations.iter().filter_map(location_record).collect();

    ResultRecord {
        result_id,
        run_index,
        file_path: locations
            .first()
            .map(|l| l.file_path.clone())
            .unwrap_or_default(),
        locations,
        related_locations: result
            .related_locations
            .iter()
            .filter_map(location_record)
            .collect(),
        analysis_steps: result
            .code_flows
            .iter()
            .flat_map(|flow| flow.thread_flows.iter())
            .map(analysis_step)
            .collect(),
        stacks: result
            .stacks
            .iter()
            .map(|stack| Stack {
                message: stack.message.as_ref().and_then(|m| m.text.clone()),
                frames: stack
                    .frames
                    .iter()
                    .filter_map(|frame| frame.location.as_ref().and_then(location_record))
                    .collect(),
            })
            .collect(),
        fixes: result
            .fixes
            .iter()
            .map(|fix| Fix {
                description: fix.description.as_ref().and_then(|m| m.text.clone()),
                artifact_changes: fix
                    .artifact_changes
                    .iter()
                    .filter_map(|change| change.artifact_location.as_ref()?.uri.clone())
                    .map(|file_path| ArtifactChange { file_path })
                    .collect(),
            })
            .collect(),
        working_directory: working_directory.map(Path::to_path_buf),
        log_file_path: log_file_path.map(Path::to_path_buf),
    }
}

/// Split a run into its path cache and its navigable result records
pub fn load_run(
    run: &Run,
    run_index: u32,
    log_file_path: Option<&Path>,
) -> (RunPathCache, Vec<ResultRecord>) {
    let bases = uri_base_paths(run);
    let working_directory: Option<PathBuf> = run
        .invocations
        .iter()
        .filter_map(|i| i.working_directory.as_ref())
        .find_map(|location| resolve_location(location, &bases))
        .as_ref()
        .and_then(paths::url_to_local_path);

    let results = run
        .results
        .iter()
        .enumerate()
        .map(|(id, result)| {
            result_record(
                result,
                id as u32,
                run_index,
                working_directory.as_deref(),
                log_file_path,
            )
        })
        .collect();

    let cache = RunPathCache::new(
        bases.clone(),
        version_control_records(run, &bases),
        artifact_table(run),
    );
    debug!(
        "Loaded run {run_index}: {} bases, {} artifacts",
        cache.original_uri_base_paths().len(),
        cache.artifacts().len()
    );
    (cache, results)
}
