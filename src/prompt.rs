//! User interaction port
//!
//! Every modal question the resolver can ask goes through
//! [`UserInteractionPort`]. A cancelled prompt is a normal `None`/decline
//! answer, never an error.

use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::{Path, PathBuf};
use url::Url;

/// How to open a file whose local copy differs from the embedded one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddedFileChoice {
    UseEmbedded,
    UseLocal,
    BrowseAlternate,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedChoiceAnswer {
    pub choice: EmbeddedFileChoice,
    /// Apply this choice to the rest of the log without asking again
    pub remember: bool,
}

impl EmbeddedChoiceAnswer {
    pub fn once(choice: EmbeddedFileChoice) -> Self {
        Self {
            choice,
            remember: false,
        }
    }

    pub fn remembered(choice: EmbeddedFileChoice) -> Self {
        Self {
            choice,
            remember: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadConsent {
    pub allow: bool,
    pub always_allow: bool,
}

pub trait UserInteractionPort: Send + Sync {
    /// Ask the user to locate `original_path`; `None` when cancelled
    fn prompt_for_resolved_path(
        &self,
        log_file_path: Option<&Path>,
        original_path: &str,
    ) -> Option<PathBuf>;

    fn prompt_for_embedded_choice(
        &self,
        log_file_path: Option<&Path>,
        has_embedded_content: bool,
    ) -> EmbeddedChoiceAnswer;

    fn confirm_download(&self, host: &str, uri: &Url) -> DownloadConsent;

    fn show_error(&self, message: &str);
}

/// Declines everything; for batch use where nobody can answer
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl UserInteractionPort for NonInteractive {
    fn prompt_for_resolved_path(&self, _: Option<&Path>, _: &str) -> Option<PathBuf> {
        None
    }

    fn prompt_for_embedded_choice(&self, _: Option<&Path>, _: bool) -> EmbeddedChoiceAnswer {
        EmbeddedChoiceAnswer::once(EmbeddedFileChoice::Cancelled)
    }

    fn confirm_download(&self, _: &str, _: &Url) -> DownloadConsent {
        DownloadConsent::default()
    }

    fn show_error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Terminal prompts for the CLI
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl UserInteractionPort for TerminalPrompt {
    fn prompt_for_resolved_path(
        &self,
        _log_file_path: Option<&Path>,
        original_path: &str,
    ) -> Option<PathBuf> {
        let file_name = crate::paths::file_name(original_path);
        let answer: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Locate {} (empty to skip)",
                style(file_name).cyan()
            ))
            .allow_empty(true)
            .interact_text()
            .ok()?;

        let answer = answer.trim();
        (!answer.is_empty()).then(|| PathBuf::from(answer))
    }

    fn prompt_for_embedded_choice(
        &self,
        log_file_path: Option<&Path>,
        has_embedded_content: bool,
    ) -> EmbeddedChoiceAnswer {
        let log = log_file_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "this log".to_string());
        eprintln!(
            "{} The local file does not match the file recorded in {log}.",
            style("!").yellow().bold()
        );

        let mut choices = vec![
            ("Open the local file", EmbeddedFileChoice::UseLocal),
            ("Browse for another file", EmbeddedFileChoice::BrowseAlternate),
        ];
        if has_embedded_content {
            choices.insert(0, ("Open the embedded copy", EmbeddedFileChoice::UseEmbedded));
        }
        let labels: Vec<_> = choices.iter().map(|(label, _)| *label).collect();

        let theme = ColorfulTheme::default();
        let Ok(Some(index)) = Select::with_theme(&theme)
            .with_prompt("Which file should be opened?")
            .items(&labels)
            .default(0)
            .interact_opt()
        else {
            return EmbeddedChoiceAnswer::once(EmbeddedFileChoice::Cancelled);
        };

        let remember = Confirm::with_theme(&theme)
            .with_prompt("Use this choice for the rest of the log?")
            .default(false)
            .interact()
            .unwrap_or(false);

        EmbeddedChoiceAnswer {
            choice: choices[index].1,
            remember,
        }
    }

    fn confirm_download(&self, host: &str, uri: &Url) -> DownloadConsent {
        let theme = ColorfulTheme::default();
        let allow = Confirm::with_theme(&theme)
            .with_prompt(format!("Download {}?", style(uri).cyan()))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !allow {
            return DownloadConsent::default();
        }

        let always_allow = Confirm::with_theme(&theme)
            .with_prompt(format!("Always allow downloads from {host}?"))
            .default(false)
            .interact()
            .unwrap_or(false);
        DownloadConsent {
            allow,
            always_allow,
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("{} {message}", style("Error:").red().bold());
    }
}
