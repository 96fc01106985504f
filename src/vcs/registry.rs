//! Provider registry for version-control parsers

use super::ado::AdoProvider;
use super::github::GithubProvider;
use super::{VcsProvider, VersionControlParser, VersionControlRecord};
use crate::config::VcsConfig;
use std::sync::Arc;
use url::Url;

/// Registered providers, filtered by configuration at construction
pub struct VcsParserRegistry {
    providers: Vec<Arc<dyn VcsProvider>>,
}

impl Default for VcsParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl VcsParserRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Built-in providers that `config` enables
    pub fn with_defaults(config: &VcsConfig) -> Self {
        let mut registry = Self::new();
        let builtin: [Arc<dyn VcsProvider>; 2] = [Arc::new(GithubProvider), Arc::new(AdoProvider)];
        for provider in builtin {
            if provider.is_enabled(config) {
                registry.add(provider);
            }
        }
        registry
    }

    pub fn add(&mut self, provider: Arc<dyn VcsProvider>) {
        self.providers.push(provider);
    }

    pub fn providers(&self) -> &[Arc<dyn VcsProvider>] {
        &self.providers
    }

    /// First provider recognizing the record's repository
    pub fn parser_for(&self, record: &VersionControlRecord) -> Option<Box<dyn VersionControlParser>> {
        self.providers
            .iter()
            .find(|provider| provider.supports(record))
            .map(|provider| provider.parser(record))
    }

    /// Browse links become raw-content links; anything else is returned as-is
    pub fn convert_to_raw_file_link(&self, url: &Url) -> Url {
        self.providers
            .iter()
            .find_map(|provider| provider.convert_to_raw_path(url.as_str()))
            .and_then(|raw| Url::parse(&raw).ok())
            .unwrap_or_else(|| url.clone())
    }
}
