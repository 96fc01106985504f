//! Configuration module for the path resolver.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `SARIF_REBASELINE_` and use
//! double underscores to separate nested levels:
//! - `SARIF_REBASELINE_HTTP__TIMEOUT_SECS=30` sets `http.timeout_secs`
//! - `SARIF_REBASELINE_VCS__AZURE_DEVOPS=true` sets `vcs.azure_devops`
//! - `SARIF_REBASELINE_LOGGING__LEVEL=debug` sets `logging.level`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ENV_PREFIX: &str = "SARIF_REBASELINE_";
const CONFIG_DIR: &str = ".sarif-rebaseline";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Solution or folder root searched when a log path does not resolve directly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Where embedded artifacts are materialized (defaults to `<temp>/SarifViewer`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_root: Option<PathBuf>,

    /// Directory holding the per-user allow-lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    /// Skip UI-thread affinity checks (tests, batch tools)
    #[serde(default)]
    pub headless: bool,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub vcs: VcsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Request timeout; unset leaves the transport default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct VcsConfig {
    #[serde(default = "default_true")]
    pub github: bool,

    /// Needs credentials for raw downloads, so off by default
    #[serde(default)]
    pub azure_devops: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_user_agent() -> String {
    concat!("sarif-rebaseline/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            temp_root: None,
            store_dir: None,
            headless: false,
            http: HttpConfig::default(),
            vcs: VcsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            github: true,
            azure_devops: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting; single underscores stay in field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Searches from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    pub fn temp_root(&self) -> PathBuf {
        self.temp_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("SarifViewer"))
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("sarif-rebaseline")
        })
    }

    /// Settings for driving the service without a UI thread
    pub fn headless(temp_root: PathBuf, store_dir: PathBuf) -> Self {
        Self {
            temp_root: Some(temp_root),
            store_dir: Some(store_dir),
            headless: true,
            ..Self::default()
        }
    }
}
