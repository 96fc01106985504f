//! CLI entry point for the SARIF path rebaseliner.
//!
//! Loads a log, resolves one recorded path against the local machine with
//! terminal prompts, and manages the per-user download allow-lists.

use anyhow::Context;
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use console::style;
use sarif_rebaseline::{
    ExitCode, PathResolutionService, ResolverError, Settings, TerminalPrompt, logging,
    paths::paths_equal_ignore_case,
};
use std::path::PathBuf;
use std::sync::Arc;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// SARIF path rebaseliner
#[derive(Parser)]
#[command(
    name = "sarif-rebaseline",
    version = env!("CARGO_PKG_VERSION"),
    about = "Map file paths recorded in SARIF logs onto this machine",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a path recorded in a log
    Resolve {
        /// SARIF log file
        log: PathBuf,

        /// Path as recorded in the log
        path: String,

        /// Base id the path is relative to
        #[arg(long)]
        uri_base_id: Option<String>,

        /// Run within the log
        #[arg(long, default_value_t = 0)]
        run: usize,

        /// Result within the run; defaults to the first result referencing the path
        #[arg(long)]
        result: Option<u32>,

        /// Workspace root to search
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },

    /// Hosts downloads are allowed from
    Hosts {
        #[command(subcommand)]
        action: ListAction,
    },

    /// File extensions allowed for download
    Extensions {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Delete materialized embedded files
    Clean,
}

#[derive(Subcommand)]
enum ListAction {
    List,
    Add { value: String },
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("Configuration error loading from {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        }),
    };
    Ok(settings)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = load_settings(&cli)?;
    logging::init(&settings.logging);
    let mut service = PathResolutionService::new(settings, Arc::new(TerminalPrompt))?;

    match cli.command {
        Commands::Resolve {
            log,
            path,
            uri_base_id,
            run,
            result,
            workspace,
        } => {
            if workspace.is_some() {
                service.set_workspace_root(workspace);
            }
            let runs = service.load_log(&log)?;
            let run_index = *runs
                .get(run)
                .with_context(|| format!("{} has {} run(s)", log.display(), runs.len()))?;

            let result_id = match result {
                Some(id) => id,
                None => service
                    .run(run_index)?
                    .results
                    .iter()
                    .find(|r| paths_equal_ignore_case(&r.file_path, &path))
                    .map(|r| r.result_id)
                    .with_context(|| format!("No result references {path}"))?,
            };

            let resolved =
                service.resolve_detailed(result_id, run_index, uri_base_id.as_deref(), &path)?;
            match &resolved {
                Some(resolved) => {
                    println!("{}", resolved.path.display());
                    eprintln!(
                        "{} via {:?}",
                        style("Resolved").green().bold(),
                        resolved.strategy
                    );
                }
                None => eprintln!("{} {path}", style("Could not resolve").yellow().bold()),
            }
            Ok(ExitCode::from_resolution(&resolved))
        }
        Commands::Hosts { action } => {
            match action {
                ListAction::List => service
                    .allowed_download_hosts()
                    .iter()
                    .for_each(|h| println!("{h}")),
                ListAction::Add { value } => {
                    if !service.add_allowed_download_host(&value)? {
                        eprintln!("{value} is already allowed");
                    }
                }
            }
            Ok(ExitCode::Success)
        }
        Commands::Extensions { action } => {
            match action {
                ListAction::List => service
                    .allowed_file_extensions()
                    .iter()
                    .for_each(|e| println!("{e}")),
                ListAction::Add { value } => {
                    if !service.add_allowed_file_extension(&value)? {
                        eprintln!("{value} is already allowed");
                    }
                }
            }
            Ok(ExitCode::Success)
        }
        Commands::Clean => {
            service.remove_temporary_files()?;
            Ok(ExitCode::Success)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", style("Error:").red().bold());
            match e.downcast_ref::<ResolverError>() {
                Some(error) => {
                    for suggestion in error.recovery_suggestions() {
                        eprintln!("  {suggestion}");
                    }
                    ExitCode::from_error(error)
                }
                None => ExitCode::GeneralError,
            }
        }
    };

    std::process::exit(code.into());
}
