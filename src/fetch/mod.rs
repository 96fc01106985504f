//! Remote-fetch gate
//!
//! Downloads a file referenced by URL into a working directory, but only from
//! hosts the user allowed. A file already at the destination is reused as-is;
//! there is no freshness check against the remote.

pub mod protocol;
pub mod store;

pub use protocol::{decode_sarif_protocol, parse_download_url};
pub use store::PreferenceStore;

use crate::config::HttpConfig;
use crate::error::{FetchError, FetchResult};
use crate::fs::FileSystem;
use crate::paths;
use crate::prompt::UserInteractionPort;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub struct HttpResponse {
    pub status: u16,
    pub body: Box<dyn Read + Send>,
}

/// A single blocking GET. Implementations are reused across calls.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &Url) -> FetchResult<HttpResponse>;
}

/// [`HttpClient`] over a shared blocking reqwest client
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new(config: &HttpConfig) -> FetchResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &Url) -> FetchResult<HttpResponse> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(HttpResponse {
            status: response.status().as_u16(),
            body: Box::new(response),
        })
    }
}

pub struct RemoteFetchGate {
    fs: Arc<dyn FileSystem>,
    http: Arc<dyn HttpClient>,
    ui: Arc<dyn UserInteractionPort>,
    store: Arc<PreferenceStore>,
}

impl RemoteFetchGate {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        http: Arc<dyn HttpClient>,
        ui: Arc<dyn UserInteractionPort>,
        store: Arc<PreferenceStore>,
    ) -> Self {
        Self {
            fs,
            http,
            ui,
            store,
        }
    }

    /// Fetch `uri` into `working_directory`.
    ///
    /// `Ok(None)` when the user declines the download. Non-200 responses and
    /// transport failures are errors naming the URL.
    pub fn fetch(
        &self,
        uri: &Url,
        working_directory: &Path,
        local_relative_path: Option<&str>,
    ) -> FetchResult<Option<PathBuf>> {
        let decoded;
        let uri = if uri.scheme().eq_ignore_ascii_case("sarif") {
            decoded = parse_download_url(uri.as_str())?;
            &decoded
        } else {
            uri
        };

        match uri.scheme() {
            "file" => self.copy_local(uri, working_directory, local_relative_path),
            "http" | "https" => self.download(uri, working_directory, local_relative_path),
            _ => Err(FetchError::UnsupportedProtocol {
                url: uri.to_string(),
            }),
        }
    }

    fn download(
        &self,
        uri: &Url,
        working_directory: &Path,
        local_relative_path: Option<&str>,
    ) -> FetchResult<Option<PathBuf>> {
        let host = uri.host_str().ok_or_else(|| FetchError::InvalidUrl {
            url: uri.to_string(),
        })?;
        let destination = destination_path(working_directory, uri, local_relative_path)?;

        if !self.store.is_host_allowed(host) {
            let consent = self.ui.confirm_download(host, uri);
            if !consent.allow {
                debug!("Download of {uri} declined");
                return Ok(None);
            }
            if consent.always_allow {
                if let Err(e) = self.store.add_allowed_download_host(host) {
                    warn!("Failed to remember host {host}: {e}");
                }
            }
        }

        self.prepare(&destination)?;
        if self.fs.file_exists(&destination) {
            debug!("Reusing {} for {uri}", destination.display());
            return Ok(Some(destination));
        }

        let mut response = self.http.get(uri)?;
        if response.status != 200 {
            return Err(FetchError::HttpStatus {
                url: uri.to_string(),
                status: response.status,
            });
        }

        let bytes = self
            .fs
            .write_from_reader(&destination, &mut response.body)
            .map_err(|source| FetchError::Io {
                path: destination.clone(),
                source,
            })?;
        info!("Downloaded {uri} ({bytes} bytes) to {}", destination.display());
        Ok(Some(destination))
    }

    fn copy_local(
        &self,
        uri: &Url,
        working_directory: &Path,
        local_relative_path: Option<&str>,
    ) -> FetchResult<Option<PathBuf>> {
        let Some(source) = paths::url_to_local_path(uri) else {
            return Err(FetchError::InvalidUrl {
                url: uri.to_string(),
            });
        };
        if !self.fs.file_exists(&source) {
            return Ok(None);
        }

        let destination = destination_path(working_directory, uri, local_relative_path)?;
        self.prepare(&destination)?;
        if !self.fs.file_exists(&destination) {
            let io_error = |source| FetchError::Io {
                path: destination.clone(),
                source,
            };
            let content = self.fs.read(&source).map_err(io_error)?;
            self.fs.write(&destination, &content).map_err(io_error)?;
        }
        Ok(Some(destination))
    }

    fn prepare(&self, destination: &Path) -> FetchResult<()> {
        match destination.parent() {
            Some(parent) => self
                .fs
                .create_dir_all(parent)
                .map_err(|source| FetchError::Io {
                    path: parent.to_path_buf(),
                    source,
                }),
            None => Ok(()),
        }
    }
}

/// `working_directory / (hint or URL path)`, with the relative part reduced
/// to plain segments.
///
/// Fails when the relative part would climb out of `working_directory`.
pub fn destination_path(
    working_directory: &Path,
    uri: &Url,
    local_relative_path: Option<&str>,
) -> FetchResult<PathBuf> {
    let relative = local_relative_path.unwrap_or(uri.path());
    paths::contained_relative_path(relative)
        .map(|relative| working_directory.join(relative))
        .ok_or_else(|| FetchError::UnsafeDestination {
            path: relative.to_string(),
        })
}
