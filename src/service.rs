//! Session-wide path resolution service
//!
//! One [`PathResolutionService`] lives for the whole host session. It owns
//! the registry of loaded runs and wires the collaborators each resolution
//! needs. Operations must be called from the thread that built the service
//! unless the settings say the service runs headless.

use crate::cache::{RunEntry, RunRegistry};
use crate::config::Settings;
use crate::disambiguate::ChoiceMemo;
use crate::error::{ResolverError, ResolverResult};
use crate::fetch::{HttpClient, PreferenceStore, RemoteFetchGate, ReqwestClient};
use crate::fs::{FileSystem, RealFileSystem};
use crate::materialize::EmbeddedFileMaterializer;
use crate::pipeline::{self, Collaborators, ResolveRequest, Resolved};
use crate::prompt::UserInteractionPort;
use crate::remap::{
    DecorationRefresher, NoopDecorations, RegionPopulator, TextRegionPopulator, remap_file_paths,
};
use crate::sarif::{self, Run};
use crate::vcs::VcsParserRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tracing::{debug, info};

pub struct PathResolutionService {
    owner: ThreadId,
    settings: Settings,
    runs: RunRegistry,
    fs: Arc<dyn FileSystem>,
    ui: Arc<dyn UserInteractionPort>,
    store: Arc<PreferenceStore>,
    gate: RemoteFetchGate,
    vcs: VcsParserRegistry,
    materializer: EmbeddedFileMaterializer,
    choices: ChoiceMemo,
    regions: Arc<dyn RegionPopulator>,
    decorations: Arc<dyn DecorationRefresher>,
}

impl PathResolutionService {
    /// Service over the real disk and network
    pub fn new(settings: Settings, ui: Arc<dyn UserInteractionPort>) -> ResolverResult<Self> {
        let http = Arc::new(ReqwestClient::new(&settings.http)?);
        Ok(Self::with_collaborators(
            settings,
            Arc::new(RealFileSystem),
            http,
            ui,
        ))
    }

    pub fn with_collaborators(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        http: Arc<dyn HttpClient>,
        ui: Arc<dyn UserInteractionPort>,
    ) -> Self {
        let store = Arc::new(PreferenceStore::load(settings.store_dir()));
        let gate = RemoteFetchGate::new(fs.clone(), http, ui.clone(), store.clone());
        let materializer = EmbeddedFileMaterializer::new(fs.clone(), settings.temp_root());

        Self {
            owner: thread::current().id(),
            vcs: VcsParserRegistry::with_defaults(&settings.vcs),
            regions: Arc::new(TextRegionPopulator::new(fs.clone())),
            decorations: Arc::new(NoopDecorations),
            choices: ChoiceMemo::new(),
            runs: RunRegistry::new(),
            settings,
            fs,
            ui,
            store,
            gate,
            materializer,
        }
    }

    pub fn with_region_populator(mut self, regions: Arc<dyn RegionPopulator>) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_decorations(mut self, decorations: Arc<dyn DecorationRefresher>) -> Self {
        self.decorations = decorations;
        self
    }

    fn check_thread(&self, operation: &'static str) -> ResolverResult<()> {
        if self.settings.headless || thread::current().id() == self.owner {
            Ok(())
        } else {
            Err(ResolverError::WrongThread { operation })
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_workspace_root(&mut self, root: Option<PathBuf>) {
        self.settings.workspace_root = root;
    }

    /// Register one run and return its index
    pub fn load_run(&mut self, log_file_path: Option<&Path>, run: &Run) -> ResolverResult<u32> {
        self.check_thread("load_run")?;

        let run_index = self.runs.current_index();
        let (paths, results) = sarif::load_run(run, run_index, log_file_path);
        let mut entry = RunEntry::new(log_file_path.map(Path::to_path_buf), paths);
        entry.results = results;

        let registered = self.runs.register(entry);
        debug_assert_eq!(registered, run_index);
        Ok(registered)
    }

    /// Read a log from disk and register each of its runs in order
    pub fn load_log(&mut self, log_file_path: &Path) -> ResolverResult<Vec<u32>> {
        self.check_thread("load_log")?;

        let json = self
            .fs
            .read_to_string(log_file_path)
            .map_err(|source| ResolverError::Io {
                path: log_file_path.to_path_buf(),
                source,
            })?;
        let log = sarif::parse_log(&json).map_err(|e| ResolverError::InvalidLog {
            path: log_file_path.to_path_buf(),
            details: e.to_string(),
        })?;

        let indexes = log
            .runs
            .iter()
            .map(|run| self.load_run(Some(log_file_path), run))
            .collect::<ResolverResult<Vec<_>>>()?;
        info!(
            "Loaded {} run(s) from {}",
            indexes.len(),
            log_file_path.display()
        );
        Ok(indexes)
    }

    /// Resolve `relative_path` for a result and rewrite every reference to
    /// it across the run.
    ///
    /// `Ok(None)` when nothing resolved. `Err` for an unknown run or result,
    /// and for a failed download on the HTTP fast path.
    pub fn try_resolve_file_path(
        &mut self,
        result_id: u32,
        run_index: u32,
        uri_base_id: Option<&str>,
        relative_path: &str,
    ) -> ResolverResult<Option<PathBuf>> {
        self.check_thread("try_resolve_file_path")?;
        Ok(self
            .resolve_detailed(result_id, run_index, uri_base_id, relative_path)?
            .map(|resolved| resolved.path))
    }

    /// Like [`try_resolve_file_path`](Self::try_resolve_file_path) but also
    /// reports which strategy succeeded and what the run's cache learned
    pub fn resolve_detailed(
        &mut self,
        result_id: u32,
        run_index: u32,
        uri_base_id: Option<&str>,
        relative_path: &str,
    ) -> ResolverResult<Option<Resolved>> {
        self.check_thread("resolve_detailed")?;

        let ctx = Collaborators {
            fs: self.fs.as_ref(),
            gate: &self.gate,
            ui: self.ui.as_ref(),
            vcs: &self.vcs,
            materializer: &self.materializer,
            choices: &self.choices,
            workspace_root: self.settings.workspace_root.as_deref(),
        };

        let entry = self.runs.get_mut(run_index)?;
        let result = entry
            .result(result_id)
            .ok_or(ResolverError::UnknownResult {
                result_id,
                run_index,
            })?;
        let working_directory = result
            .working_directory
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(run_index.to_string()));
        let log_file_path = result
            .log_file_path
            .clone()
            .or_else(|| entry.log_file_path.clone());

        let request = ResolveRequest::new(
            uri_base_id,
            relative_path,
            &working_directory,
            log_file_path.as_deref(),
        );
        let Some(resolved) = pipeline::resolve(&ctx, &mut entry.paths, &request)? else {
            return Ok(None);
        };

        self.regions.forget(&resolved.path);
        let updated = remap_file_paths(
            &mut entry.results,
            relative_path,
            &resolved.path,
            self.regions.as_ref(),
            self.decorations.as_ref(),
        );
        debug!("Rewrote {updated} reference(s) to {relative_path}");
        Ok(Some(resolved))
    }

    /// Top-level navigation entry point: errors are shown to the user, not returned
    pub fn resolve_for_navigation(
        &mut self,
        result_id: u32,
        run_index: u32,
        uri_base_id: Option<&str>,
        relative_path: &str,
    ) -> Option<PathBuf> {
        match self.try_resolve_file_path(result_id, run_index, uri_base_id, relative_path) {
            Ok(path) => path,
            Err(e) => {
                self.ui.show_error(&e.to_string());
                None
            }
        }
    }

    /// Write a run's embedded copy of `name` to the temp root
    pub fn materialize(&mut self, run_index: u32, name: &str) -> ResolverResult<Option<PathBuf>> {
        self.check_thread("materialize")?;

        let entry = self.runs.get_mut(run_index)?;
        self.materializer
            .materialize(entry.paths.artifacts_mut(), name)
            .map_err(|source| ResolverError::Io {
                path: self.materializer.temp_root().to_path_buf(),
                source,
            })
    }

    /// Drop every materialized file. Run on workspace close.
    pub fn remove_temporary_files(&self) -> ResolverResult<()> {
        self.check_thread("remove_temporary_files")?;
        self.materializer.remove_temporary_files();
        Ok(())
    }

    pub fn allowed_download_hosts(&self) -> Vec<String> {
        self.store.allowed_download_hosts()
    }

    pub fn add_allowed_download_host(&self, host: &str) -> ResolverResult<bool> {
        self.check_thread("add_allowed_download_host")?;
        self.store.add_allowed_download_host(host)
    }

    pub fn allowed_file_extensions(&self) -> Vec<String> {
        self.store.allowed_file_extensions()
    }

    pub fn add_allowed_file_extension(&self, extension: &str) -> ResolverResult<bool> {
        self.check_thread("add_allowed_file_extension")?;
        self.store.add_allowed_file_extension(extension)
    }

    /// Forget remembered embedded-vs-local answers
    pub fn clear_remembered_choices(&self) {
        self.choices.clear();
    }

    pub fn run(&self, run_index: u32) -> ResolverResult<&RunEntry> {
        self.runs.get(run_index)
    }

    pub fn unload_run(&mut self, run_index: u32) -> ResolverResult<()> {
        self.check_thread("unload_run")?;
        self.runs
            .remove(run_index)
            .ok_or(ResolverError::UnknownRun { run_index })?;
        self.regions.clear();
        Ok(())
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}
