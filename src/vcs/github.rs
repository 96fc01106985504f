//! GitHub provenance support
//!
//! Browse links look like `https://github.com/<user>/<repo>/blob/<ref>/<path>`;
//! raw content lives at `https://raw.githubusercontent.com/<user>/<repo>/<ref>/<path>`.

use super::{VcsProvider, VersionControlParser, VersionControlRecord};
use crate::config::VcsConfig;
use crate::paths;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

pub const GITHUB_HOST: &str = "github.com";

static BROWSE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?<protocol>https?://)(?<site>github\.com)/(?<user>.*?)/(?<repo>.*?)(?<folder>/tree/|/blob/)(?<path>.*?)$",
    )
    .expect("github browse link pattern is valid")
});

#[derive(Debug, Default)]
pub struct GithubProvider;

impl VcsProvider for GithubProvider {
    fn id(&self) -> &'static str {
        "github"
    }

    fn is_enabled(&self, config: &VcsConfig) -> bool {
        config.github
    }

    fn supports(&self, record: &VersionControlRecord) -> bool {
        record.repository_host_is(GITHUB_HOST)
    }

    fn parser(&self, record: &VersionControlRecord) -> Box<dyn VersionControlParser> {
        Box::new(GithubParser {
            record: record.clone(),
        })
    }

    fn convert_to_raw_path(&self, url: &str) -> Option<String> {
        convert_to_raw_path(url)
    }
}

/// Rewrite a GitHub blob/tree link to its raw-content form
pub fn convert_to_raw_path(url: &str) -> Option<String> {
    let captures = BROWSE_LINK.captures(url)?;
    Some(format!(
        "{}raw.githubusercontent.com/{}/{}/{}",
        &captures["protocol"], &captures["user"], &captures["repo"], &captures["path"]
    ))
}

pub struct GithubParser {
    record: VersionControlRecord,
}

impl VersionControlParser for GithubParser {
    fn source_file_uri(&self, relative_file_path: &str) -> Option<Url> {
        let base = paths::with_trailing_slash(self.record.repository_uri.clone()?);
        let version = self.record.version()?;
        let relative = relative_file_path.replace('\\', "/");
        let browse = base
            .join(&format!("blob/{version}/{}", relative.trim_start_matches('/')))
            .ok()?;
        if !paths::is_http(&browse) {
            return None;
        }

        match convert_to_raw_path(browse.as_str()) {
            Some(raw) => Url::parse(&raw).ok(),
            None => Some(browse),
        }
    }

    fn local_relative_path(&self, _uri: &Url, _relative_file_path: &str) -> Option<String> {
        // The raw URL already carries the full file path
        None
    }
}
