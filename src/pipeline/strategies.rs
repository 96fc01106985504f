//! Individual resolution strategies
//!
//! Each strategy either produces an existing local file or `None`. Failures
//! inside a strategy are logged and reported as `None` so the pipeline can
//! move on to the next one.

use super::{Collaborators, ResolveRequest};
use crate::cache::RunPathCache;
use crate::paths;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// URL the HTTP fast path should fetch, if the log path is or expands to one
pub fn http_source(cache: &RunPathCache, request: &ResolveRequest<'_>) -> Option<Url> {
    let via_base = request
        .uri_base_id()
        .and_then(|id| cache.original_base_uri(id))
        .filter(|_| paths::is_relative_reference(request.relative_path))
        .and_then(|base| paths::join_base(base, request.relative_path))
        .filter(paths::is_http);

    via_base.or_else(|| paths::parse_absolute_url(request.relative_path).filter(paths::is_http))
}

/// Log path expanded against its declared base, as a local path string
pub fn expanded_original_path(cache: &RunPathCache, request: &ResolveRequest<'_>) -> Option<String> {
    let base = cache.original_base_uri(request.uri_base_id()?)?;
    if !paths::is_relative_reference(request.relative_path) {
        return None;
    }
    let joined = paths::join_base(base, request.relative_path.trim_start_matches('/'))?;
    paths::url_to_local_path(&joined).map(|p| p.to_string_lossy().into_owned())
}

/// Substitute the URI base, learned first, then declared.
///
/// With a base id the log does not declare, the path is checked as written.
pub fn from_uri_base(
    ctx: &Collaborators<'_>,
    cache: &RunPathCache,
    request: &ResolveRequest<'_>,
) -> Option<PathBuf> {
    let relative = request.relative_path;

    if let Some(url) = paths::parse_absolute_url(relative) {
        let local = paths::url_to_local_path(&url)?;
        return ctx.fs.file_exists(&local).then_some(local);
    }

    let uri_base_id = request.uri_base_id()?;
    if !paths::is_relative_reference(relative) {
        return None;
    }

    // Relative to an unknown root; drop the leading slash so it can be rebased
    let trimmed = relative.trim_start_matches('/');
    let candidate = match cache.base_uri(uri_base_id) {
        Some(base) => paths::join_base(base, trimmed)
            .as_ref()
            .and_then(paths::url_to_local_path)?,
        None => PathBuf::from(paths::normalize_separators(trimmed)),
    };

    debug!("URI base candidate {}", candidate.display());
    ctx.fs.file_exists(&candidate).then_some(candidate)
}

/// Apply learned prefix rules in insertion order
pub fn from_learned_prefixes(
    ctx: &Collaborators<'_>,
    cache: &RunPathCache,
    request: &ResolveRequest<'_>,
) -> Option<PathBuf> {
    let normalized = paths::normalize_separators(request.relative_path);
    let expanded = expanded_original_path(cache, request);
    let sources: Vec<&str> = std::iter::once(normalized.as_str())
        .chain(expanded.as_deref())
        .collect();

    for rule in cache.remapped_path_prefixes() {
        for source in &sources {
            let candidate = if rule.original_prefix.is_empty() {
                Path::new(&rule.resolved_prefix).join(source.trim_start_matches(MAIN_SEPARATOR))
            } else if source.contains(&rule.original_prefix) {
                PathBuf::from(source.replacen(&rule.original_prefix, &rule.resolved_prefix, 1))
            } else {
                continue;
            };

            if ctx.fs.file_exists(&candidate) {
                debug!(
                    "Prefix rule '{}' -> '{}' resolved {}",
                    rule.original_prefix,
                    rule.resolved_prefix,
                    candidate.display()
                );
                return Some(candidate);
            }
        }
    }

    None
}

/// Search the workspace for exactly one file whose path ends with the log path
pub fn from_workspace(ctx: &Collaborators<'_>, request: &ResolveRequest<'_>) -> Option<PathBuf> {
    let root = ctx.workspace_root?;
    // A solution file stands for its directory
    let root = if ctx.fs.file_exists(root) {
        root.parent()?
    } else {
        root
    };
    if !ctx.fs.dir_exists(root) {
        return None;
    }

    let normalized = paths::normalize_separators(request.relative_path);
    let relative = normalized.trim_start_matches(MAIN_SEPARATOR).to_lowercase();
    let tail = format!("{MAIN_SEPARATOR}{relative}");
    let file_name = paths::file_name(&normalized);

    let found = match ctx.fs.enumerate_files(root, file_name, true) {
        Ok(found) => found,
        Err(e) => {
            warn!("Workspace search under {} failed: {e}", root.display());
            return None;
        }
    };

    let mut matches = found.into_iter().filter(|path| {
        let path = path.to_string_lossy().to_lowercase();
        path == relative || path.ends_with(&tail)
    });

    let first = matches.next()?;
    if matches.next().is_some() {
        debug!("Ambiguous workspace matches for {}", request.relative_path);
        return None;
    }
    Some(first)
}

/// Mapped-to directories first, then a download through a provider parser
pub fn from_source_control(
    ctx: &Collaborators<'_>,
    cache: &RunPathCache,
    request: &ResolveRequest<'_>,
) -> Option<PathBuf> {
    let relative = request.relative_path;

    for record in cache.source_control_details() {
        if let Some(mapped_to) = &record.mapped_to {
            let local = paths::join_base(&paths::with_trailing_slash(mapped_to.clone()), relative)
                .as_ref()
                .and_then(paths::url_to_local_path);
            if let Some(local) = local.filter(|p| ctx.fs.file_exists(p)) {
                return Some(local);
            }
        }

        let Some(parser) = ctx.vcs.parser_for(record) else {
            continue;
        };
        let Some(source) = parser.source_file_uri(relative) else {
            continue;
        };
        let local_relative = parser.local_relative_path(&source, relative);

        match ctx
            .gate
            .fetch(&source, request.working_directory, local_relative.as_deref())
        {
            Ok(Some(path)) if ctx.fs.file_exists(&path) => return Some(path),
            Ok(_) => {}
            Err(e) => warn!("Download of {source} failed: {e}"),
        }
    }

    None
}
