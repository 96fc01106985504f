//! Path and URI helpers shared by the resolution strategies
//!
//! Log paths come from other machines, so they are handled as strings with
//! either separator until they are turned into a local [`PathBuf`].

use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};
use url::Url;

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Rewrite both separator styles to the local one
pub fn normalize_separators(path: &str) -> String {
    path.chars()
        .map(|c| if is_separator(c) { MAIN_SEPARATOR } else { c })
        .collect()
}

/// Case-insensitive path string equality
pub fn paths_equal_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Longest common trailing run of whole path segments, taken from `first`.
///
/// Walks both strings backwards one separator at a time and stops at the
/// first mismatch (ASCII case-insensitive). The suffix always starts with a
/// separator; `None` when not even the file names agree.
pub fn common_suffix(first: &str, second: &str) -> Option<String> {
    let mut common = None;
    let mut first_offset = first.len();
    let mut second_offset = second.len();

    while first_offset > 0 && second_offset > 0 {
        let Some(f) = first[..first_offset].rfind(is_separator) else {
            break;
        };
        let Some(s) = second[..second_offset].rfind(is_separator) else {
            break;
        };
        first_offset = f;
        second_offset = s;

        let first_suffix = &first[first_offset..];
        let second_suffix = &second[second_offset..];
        if !segments_equal(first_suffix, second_suffix) {
            break;
        }
        common = Some(first_suffix.to_string());
    }

    common
}

fn segments_equal(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.chars().zip(b.chars()).all(|(x, y)| {
            (is_separator(x) && is_separator(y)) || x.to_lowercase().eq(y.to_lowercase())
        })
}

/// Parse `s` as an absolute URL, rejecting single-letter schemes so that
/// `C:\src\a.c` stays a path
pub fn parse_absolute_url(s: &str) -> Option<Url> {
    let url = Url::parse(s).ok()?;
    (url.scheme().len() > 1).then_some(url)
}

pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// True when `s` can be resolved against a base URI: not an absolute URL,
/// not drive-rooted and not a UNC share
pub fn is_relative_reference(s: &str) -> bool {
    !s.is_empty()
        && parse_absolute_url(s).is_none()
        && !has_drive_prefix(s)
        && !s.starts_with("\\\\")
}

/// Resolve `relative` against `base`, treating backslashes as separators
pub fn join_base(base: &Url, relative: &str) -> Option<Url> {
    base.join(&relative.replace('\\', "/")).ok()
}

/// Append a trailing `/` so relative joins keep the last segment
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Local path for a `file` URL
pub fn url_to_local_path(url: &Url) -> Option<PathBuf> {
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

/// Strip a drive letter, UNC prefix or leading separators
pub fn strip_root(name: &str) -> &str {
    let name = if has_drive_prefix(name) {
        &name[2..]
    } else {
        name
    };
    name.trim_start_matches(is_separator)
}

/// `name` as a relative path made only of plain segments.
///
/// The root is stripped first. `None` when a segment would climb out of the
/// directory the result is joined onto, or when nothing is left.
pub fn contained_relative_path(name: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in strip_root(name).split(is_separator) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => relative.push(part),
            _ => return None,
        }
    }
    (!relative.as_os_str().is_empty()).then_some(relative)
}

/// Last path segment, accepting either separator
pub fn file_name(path: &str) -> &str {
    path.rsplit(is_separator).next().unwrap_or(path)
}
