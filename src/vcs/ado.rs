//! Azure DevOps provenance support
//!
//! Disabled by default: raw item downloads need credentials the fetch gate
//! does not carry.

use super::{VcsProvider, VersionControlParser, VersionControlRecord};
use crate::config::VcsConfig;
use crate::paths;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

pub const ADO_HOST: &str = "dev.azure.com";

static BROWSE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?<protocol>https?://)(?<site>dev\.azure\.com)/(?<org>.*?)/(?<project>.*?)/(?<api>_git)/(?<repo>.*?)\?path=(?<filepath>.*?)(&version=GB(?<version>.*?))?$",
    )
    .expect("azure devops browse link pattern is valid")
});

#[derive(Debug, Default)]
pub struct AdoProvider;

impl VcsProvider for AdoProvider {
    fn id(&self) -> &'static str {
        "azure-devops"
    }

    fn is_enabled(&self, config: &VcsConfig) -> bool {
        config.azure_devops
    }

    fn supports(&self, record: &VersionControlRecord) -> bool {
        record.repository_host_is(ADO_HOST)
    }

    fn parser(&self, record: &VersionControlRecord) -> Box<dyn VersionControlParser> {
        Box::new(AdoParser {
            record: record.clone(),
        })
    }

    fn convert_to_raw_path(&self, url: &str) -> Option<String> {
        convert_to_raw_path(url)
    }
}

/// Rewrite `.../_git/{repo}?path=..&version=GB..` to the items API form
pub fn convert_to_raw_path(url: &str) -> Option<String> {
    let captures = BROWSE_LINK.captures(url)?;
    let mut raw = format!(
        "{}{}/{}/{}/_apis/git/repositories/{}/items?path={}",
        &captures["protocol"],
        &captures["site"],
        &captures["org"],
        &captures["project"],
        &captures["repo"],
        &captures["filepath"],
    );
    if let Some(version) = captures.name("version") {
        raw.push_str("&versionDescriptor[version]=");
        raw.push_str(version.as_str());
    }
    Some(raw)
}

pub struct AdoParser {
    record: VersionControlRecord,
}

impl VersionControlParser for AdoParser {
    fn source_file_uri(&self, relative_file_path: &str) -> Option<Url> {
        let mut browse = self.record.repository_uri.clone()?;
        if !paths::is_http(&browse) {
            return None;
        }
        let trimmed = browse.path().trim_end_matches('/').to_string();
        browse.set_path(&trimmed);

        let relative = relative_file_path.replace('\\', "/");
        let query = match self.record.version() {
            Some(version) => format!("path={relative}&version=GB{version}"),
            None => format!("path={relative}"),
        };
        browse.set_query(Some(&query));

        match convert_to_raw_path(browse.as_str()) {
            Some(raw) => Url::parse(&raw).ok(),
            None => Some(browse),
        }
    }

    fn local_relative_path(&self, _uri: &Url, relative_file_path: &str) -> Option<String> {
        // The file path lives in the query string, not the URL path
        Some(relative_file_path.to_string())
    }
}
