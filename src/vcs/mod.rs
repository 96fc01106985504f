//! Version-control provenance and remote source parsers
//!
//! A provenance record says where a run's sources came from. When a record
//! names a hosting provider we know, a [`VersionControlParser`] turns a log
//! path into a raw-content URL the fetch gate can download.

pub mod ado;
pub mod github;
pub mod registry;

pub use registry::VcsParserRegistry;

use url::Url;

/// One entry of a run's version-control provenance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionControlRecord {
    pub repository_uri: Option<Url>,
    pub revision_id: Option<String>,
    pub branch: Option<String>,
    /// Local directory the repository root was mapped to when the log was produced
    pub mapped_to: Option<Url>,
}

impl VersionControlRecord {
    /// Branch wins over revision, matching how hosting providers address blobs
    pub fn version(&self) -> Option<&str> {
        self.branch
            .as_deref()
            .or(self.revision_id.as_deref())
            .filter(|v| !v.trim().is_empty())
    }

    fn repository_host_is(&self, host: &str) -> bool {
        self.repository_uri.as_ref().is_some_and(|uri| {
            crate::paths::is_http(uri)
                && uri
                    .host_str()
                    .is_some_and(|h| h.eq_ignore_ascii_case(host))
        })
    }
}

/// Turns log paths into remote URLs for one repository
pub trait VersionControlParser: Send + Sync {
    /// Raw-content URL for `relative_file_path`, if one can be built
    fn source_file_uri(&self, relative_file_path: &str) -> Option<Url>;

    /// Path under the working directory to store the download at.
    ///
    /// `None` means "derive it from the URL path".
    fn local_relative_path(&self, uri: &Url, relative_file_path: &str) -> Option<String>;
}

/// Recognizes records for one hosting provider
pub trait VcsProvider: Send + Sync {
    fn id(&self) -> &'static str;

    fn is_enabled(&self, config: &crate::config::VcsConfig) -> bool;

    fn supports(&self, record: &VersionControlRecord) -> bool;

    fn parser(&self, record: &VersionControlRecord) -> Box<dyn VersionControlParser>;

    /// Rewrite a browse link into a raw-content link, `None` if not ours
    fn convert_to_raw_path(&self, url: &str) -> Option<String>;
}
