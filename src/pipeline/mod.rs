//! Path resolution pipeline
//!
//! Strategies run in a fixed order and the first hit wins:
//!
//! 1. HTTP fast path (the log path is or expands to a web URL)
//! 2. URI base substitution
//! 3. Learned prefix rules
//! 4. Workspace search (unique match only)
//! 5. Source-control provenance
//! 6. Asking the user
//!
//! Candidates from 2-6 are checked against the embedded hash when the log
//! records one. A successful resolution teaches the run's cache so that the
//! next file under the same tree resolves at step 2 or 3.

pub mod rebaseline;
pub mod strategies;

pub use rebaseline::Learned;

use crate::cache::RunPathCache;
use crate::disambiguate::{self, ChoiceMemo};
use crate::error::ResolverResult;
use crate::fetch::RemoteFetchGate;
use crate::fs::FileSystem;
use crate::hash::{Sha256Hash, compute_file_sha};
use crate::materialize::EmbeddedFileMaterializer;
use crate::paths;
use crate::prompt::{EmbeddedFileChoice, UserInteractionPort};
use crate::vcs::VcsParserRegistry;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Which step produced a resolved path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Http,
    UriBase,
    LearnedPrefix,
    Workspace,
    SourceControl,
    Prompt,
    Embedded,
}

/// Borrowed collaborators for one resolution
pub struct Collaborators<'a> {
    pub fs: &'a dyn FileSystem,
    pub gate: &'a RemoteFetchGate,
    pub ui: &'a dyn UserInteractionPort,
    pub vcs: &'a VcsParserRegistry,
    pub materializer: &'a EmbeddedFileMaterializer,
    pub choices: &'a ChoiceMemo,
    pub workspace_root: Option<&'a Path>,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    uri_base_id: Option<&'a str>,
    pub relative_path: &'a str,
    pub working_directory: &'a Path,
    pub log_file_path: Option<&'a Path>,
}

impl<'a> ResolveRequest<'a> {
    pub fn new(
        uri_base_id: Option<&'a str>,
        relative_path: &'a str,
        working_directory: &'a Path,
        log_file_path: Option<&'a Path>,
    ) -> Self {
        Self {
            uri_base_id,
            relative_path,
            working_directory,
            log_file_path,
        }
    }

    /// Empty ids count as absent
    pub fn uri_base_id(&self) -> Option<&'a str> {
        self.uri_base_id.filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: PathBuf,
    pub strategy: Strategy,
    pub learned: Learned,
}

/// Outcome of the hash check on a candidate
enum Verified {
    Accept(PathBuf, Strategy),
    Reject,
}

/// Resolve one log path for a run.
///
/// `Ok(None)` is a total failure: nothing found, the user cancelled, or the
/// result would be the log path itself. Only a failed download on the HTTP
/// fast path is an error.
pub fn resolve(
    ctx: &Collaborators<'_>,
    cache: &mut RunPathCache,
    request: &ResolveRequest<'_>,
) -> ResolverResult<Option<Resolved>> {
    let relative = request.relative_path;
    if relative.is_empty() {
        return Ok(None);
    }

    let declared_hash = cache
        .artifacts()
        .get(relative)
        .and_then(|artifact| artifact.sha256.clone());
    let embedded = match ctx.materializer.materialize(cache.artifacts_mut(), relative) {
        Ok(path) => path,
        Err(e) => {
            warn!("Failed to materialize embedded {relative}: {e}");
            None
        }
    };

    if let Some(source) = strategies::http_source(cache, request) {
        let source = ctx.vcs.convert_to_raw_file_link(&source);
        debug!("Fetching {source} for {relative}");
        let Some(path) = ctx.gate.fetch(&source, request.working_directory, None)? else {
            return Ok(None);
        };
        return Ok(finish(cache, request, path, Strategy::Http));
    }

    let mut candidate = local_candidate(ctx, cache, request);

    if let Some(hash) = &declared_hash {
        candidate = match candidate {
            Some((path, strategy)) => match verify(ctx, request, hash, path, strategy, embedded.as_deref()) {
                Verified::Accept(path, strategy) => Some((path, strategy)),
                Verified::Reject => return Ok(None),
            },
            None => embedded.clone().map(|path| (path, Strategy::Embedded)),
        };
    }

    if candidate.is_none() {
        if let Some(path) = ctx
            .ui
            .prompt_for_resolved_path(request.log_file_path, relative)
        {
            candidate = match &declared_hash {
                Some(hash) => match verify(ctx, request, hash, path, Strategy::Prompt, embedded.as_deref()) {
                    Verified::Accept(path, strategy) => Some((path, strategy)),
                    Verified::Reject => return Ok(None),
                },
                None => Some((path, Strategy::Prompt)),
            };
        }
    }

    let Some((path, strategy)) = candidate else {
        debug!("Could not resolve {relative}");
        return Ok(None);
    };
    Ok(finish(cache, request, path, strategy))
}

/// Strategies 2 to 5
fn local_candidate(
    ctx: &Collaborators<'_>,
    cache: &RunPathCache,
    request: &ResolveRequest<'_>,
) -> Option<(PathBuf, Strategy)> {
    if let Some(path) = strategies::from_uri_base(ctx, cache, request) {
        return Some((path, Strategy::UriBase));
    }
    if let Some(path) = strategies::from_learned_prefixes(ctx, cache, request) {
        return Some((path, Strategy::LearnedPrefix));
    }
    if let Some(path) = strategies::from_workspace(ctx, request) {
        return Some((path, Strategy::Workspace));
    }
    strategies::from_source_control(ctx, cache, request).map(|path| (path, Strategy::SourceControl))
}

/// Keep a candidate whose content matches the recorded hash; otherwise let
/// the user pick between it and the embedded copy
fn verify(
    ctx: &Collaborators<'_>,
    request: &ResolveRequest<'_>,
    hash: &Sha256Hash,
    path: PathBuf,
    strategy: Strategy,
    embedded: Option<&Path>,
) -> Verified {
    match compute_file_sha(ctx.fs, &path) {
        Ok(actual) if hash.matches(actual.as_str()) => return Verified::Accept(path, strategy),
        Ok(_) => debug!("Hash mismatch for {}", path.display()),
        Err(e) => warn!("Failed to hash {}: {e}", path.display()),
    }

    let choice = disambiguate::choose(
        ctx.choices,
        ctx.ui,
        request.log_file_path,
        embedded.is_some(),
    );
    match choice {
        EmbeddedFileChoice::UseLocal => Verified::Accept(path, strategy),
        EmbeddedFileChoice::UseEmbedded => match embedded {
            Some(embedded) => Verified::Accept(embedded.to_path_buf(), Strategy::Embedded),
            None => Verified::Reject,
        },
        EmbeddedFileChoice::BrowseAlternate => match ctx
            .ui
            .prompt_for_resolved_path(request.log_file_path, request.relative_path)
        {
            Some(path) => Verified::Accept(path, Strategy::Prompt),
            None => Verified::Reject,
        },
        EmbeddedFileChoice::Cancelled => Verified::Reject,
    }
}

/// Reject no-op resolutions, then teach the cache
fn finish(
    cache: &mut RunPathCache,
    request: &ResolveRequest<'_>,
    path: PathBuf,
    strategy: Strategy,
) -> Option<Resolved> {
    let relative = request.relative_path;
    if paths::paths_equal_ignore_case(&path.to_string_lossy(), relative) {
        debug!("{relative} resolved to itself");
        return None;
    }

    // Scratch-space copies teach nothing about the local tree
    let learned = match strategy {
        Strategy::Http | Strategy::Embedded => Learned::Nothing,
        _ => rebaseline::learn(cache, request.uri_base_id(), relative, &path)?,
    };

    debug!("Resolved {relative} to {} via {strategy:?}", path.display());
    Some(Resolved {
        path,
        strategy,
        learned,
    })
}
