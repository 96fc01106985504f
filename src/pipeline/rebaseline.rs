//! Learning from a successful resolution
//!
//! The longest common path suffix of the log path and the resolved path
//! splits both into a prefix pair. That pair becomes either a URI base
//! substitution or a generic prefix rule in the run's cache.

use crate::cache::{PathPrefixRemap, RunPathCache};
use crate::paths;
use std::path::{MAIN_SEPARATOR, Path};
use tracing::info;
use url::Url;

/// What a resolution taught the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Learned {
    UriBase { uri_base_id: String, base: Url },
    PrefixRule(PathPrefixRemap),
    /// The same rule was learned before
    AlreadyKnown,
    /// Nothing to learn, e.g. a URL or an unchanged prefix
    Nothing,
}

/// Record what the resolution of `relative_path` to `resolved` implies.
///
/// `None` when the paths share no trailing segments, in which case the
/// resolution is not trusted and nothing is stored.
pub fn learn(
    cache: &mut RunPathCache,
    uri_base_id: Option<&str>,
    relative_path: &str,
    resolved: &Path,
) -> Option<Learned> {
    let resolved = resolved.to_string_lossy();
    let uri_base_id = uri_base_id.filter(|id| !id.is_empty());

    let original = match paths::parse_absolute_url(relative_path) {
        Some(url) => match paths::url_to_local_path(&url) {
            Some(local) => local.to_string_lossy().into_owned(),
            // Web paths have nothing in common with local files
            None => return Some(Learned::Nothing),
        },
        None => original_local_form(cache, uri_base_id, relative_path),
    };

    let suffix = paths::common_suffix(&original, &resolved)?;
    let original_prefix = &original[..original.len() - suffix.len()];
    let resolved_prefix = &resolved[..resolved.len() - suffix.len()];

    if let Some(learned) = undeclared_base(cache, uri_base_id, relative_path, &resolved) {
        return Some(learned);
    }

    if original_prefix == resolved_prefix {
        return Some(Learned::Nothing);
    }

    let rule = PathPrefixRemap::new(original_prefix, resolved_prefix);
    if !cache.add_prefix_remap(rule.clone()) {
        return Some(Learned::AlreadyKnown);
    }
    info!(
        "Learned prefix rule '{}' -> '{}'",
        rule.original_prefix, rule.resolved_prefix
    );
    Some(Learned::PrefixRule(rule))
}

/// The log path as a local path string: expanded against its declared base
/// when there is one, otherwise rooted with a leading separator
fn original_local_form(
    cache: &RunPathCache,
    uri_base_id: Option<&str>,
    relative_path: &str,
) -> String {
    let expanded = uri_base_id
        .and_then(|id| cache.original_base_uri(id))
        .filter(|_| paths::is_relative_reference(relative_path))
        .and_then(|base| paths::join_base(base, relative_path.trim_start_matches('/')))
        .as_ref()
        .and_then(paths::url_to_local_path);
    if let Some(expanded) = expanded {
        return expanded.to_string_lossy().into_owned();
    }

    let normalized = paths::normalize_separators(relative_path);
    if paths::is_relative_reference(relative_path) && !normalized.starts_with(MAIN_SEPARATOR) {
        format!("{MAIN_SEPARATOR}{normalized}")
    } else {
        normalized
    }
}

/// A base id the log never declared is learned as the directory the
/// relative path was found under
fn undeclared_base(
    cache: &mut RunPathCache,
    uri_base_id: Option<&str>,
    relative_path: &str,
    resolved: &str,
) -> Option<Learned> {
    let uri_base_id = uri_base_id?;
    if cache.original_base_uri(uri_base_id).is_some()
        || !paths::is_relative_reference(relative_path)
    {
        return None;
    }

    let normalized = paths::normalize_separators(relative_path.trim_start_matches('/'));
    let index = resolved.rfind(&normalized).filter(|&i| i > 0)?;
    if !resolved[..index].ends_with(MAIN_SEPARATOR) {
        return None;
    }
    let base = Url::from_directory_path(&resolved[..index]).ok()?;
    if cache.remapped_base_uri(uri_base_id) == Some(&base) {
        return Some(Learned::AlreadyKnown);
    }

    info!("Learned base {uri_base_id} = {base}");
    cache.remap_uri_base(uri_base_id, base.clone());
    Some(Learned::UriBase {
        uri_base_id: uri_base_id.to_string(),
        base,
    })
}
