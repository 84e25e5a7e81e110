//! Line-oriented interactive front end.
//!
//! Parses one command per line and drives the [`Orchestrator`]; rendering is
//! plain text derived from a [`Session`] snapshot.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::documents::{DocumentKind, ParseKindError};
use crate::download::save_document;
use crate::orchestrator::{Orchestrator, RefineOutcome};
use crate::session::{DocumentStatus, Session};

/// Shown by `help`.
pub const HELP: &str = "\
Commands:
  idea <text>               generate all documents for a new idea
  list                      show every document and its status
  show [kind]               print a document (default: the selected one)
  select <kind>             select a document
  refine <kind> <request>   revise a document with AI
  edit <kind> <file>        replace a document with the contents of a file
  download [kind]           save a document (default: the selected one)
  status                    show the idea, banners and loading flags
  help                      show this help
  quit                      leave the shell";

/// Reminder shown once documents have been generated or edited.
pub const CONSISTENCY_REMINDER: &str = "Reminder: significant changes to one document \
(e.g. altering the core idea in the proposal) may require reviewing and refining the related \
documents to keep them consistent.";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Submit a new idea.
    Idea(String),
    /// List documents with their status.
    List,
    /// Print a document.
    Show(Option<DocumentKind>),
    /// Select a document.
    Select(DocumentKind),
    /// Refine a document.
    Refine {
        /// Kind to refine.
        kind: DocumentKind,
        /// Change request.
        request: String,
    },
    /// Replace a document with a file's contents.
    Edit {
        /// Kind to overwrite.
        kind: DocumentKind,
        /// File holding the new content.
        path: PathBuf,
    },
    /// Save a document to the output directory.
    Download(Option<DocumentKind>),
    /// Print session status.
    Status,
    /// Print help.
    Help,
    /// Leave the shell.
    Quit,
}

/// Why a shell line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellParseError {
    /// Blank line.
    #[error("empty command")]
    Empty,
    /// First word is not a command.
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    /// A required argument is absent.
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        /// Command name.
        command: &'static str,
        /// Description of the missing argument.
        argument: &'static str,
    },
    /// The kind argument did not parse.
    #[error(transparent)]
    Kind(#[from] ParseKindError),
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

fn optional_kind(rest: &str) -> Result<Option<DocumentKind>, ShellParseError> {
    if rest.is_empty() {
        Ok(None)
    } else {
        Ok(Some(rest.parse()?))
    }
}

impl FromStr for ShellCommand {
    type Err = ShellParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ShellParseError::Empty);
        }
        let (command, rest) = split_word(line);
        match command.to_ascii_lowercase().as_str() {
            "idea" => {
                if rest.is_empty() {
                    return Err(ShellParseError::MissingArgument {
                        command: "idea",
                        argument: "a description of the idea",
                    });
                }
                Ok(Self::Idea(rest.to_owned()))
            }
            "list" | "ls" => Ok(Self::List),
            "show" => Ok(Self::Show(optional_kind(rest)?)),
            "select" => {
                if rest.is_empty() {
                    return Err(ShellParseError::MissingArgument {
                        command: "select",
                        argument: "a document kind",
                    });
                }
                Ok(Self::Select(rest.parse()?))
            }
            "refine" => {
                let (kind, request) = split_word(rest);
                if kind.is_empty() || request.is_empty() {
                    return Err(ShellParseError::MissingArgument {
                        command: "refine",
                        argument: "a document kind and a change request",
                    });
                }
                Ok(Self::Refine {
                    kind: kind.parse()?,
                    request: request.to_owned(),
                })
            }
            "edit" => {
                let (kind, path) = split_word(rest);
                if kind.is_empty() || path.is_empty() {
                    return Err(ShellParseError::MissingArgument {
                        command: "edit",
                        argument: "a document kind and a file path",
                    });
                }
                Ok(Self::Edit {
                    kind: kind.parse()?,
                    path: PathBuf::from(path),
                })
            }
            "download" | "save" => Ok(Self::Download(optional_kind(rest)?)),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(ShellParseError::Unknown(other.to_owned())),
        }
    }
}

fn status_label(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Unattempted => "not generated",
        DocumentStatus::Generating => "generating...",
        DocumentStatus::Ready => "ready",
        DocumentStatus::Failed => "failed",
        DocumentStatus::Refining => "refining...",
    }
}

/// One line per kind: selection marker, slug, display name, status.
pub fn render_list(session: &Session) -> String {
    let mut out = String::new();
    for kind in DocumentKind::ALL {
        let marker = if session.active() == Some(kind) { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:<22} {:<22} {}",
            kind.slug(),
            kind.display_name(),
            status_label(session.status(kind))
        );
    }
    out
}

/// Idea, banners and the loading flags.
pub fn render_status(session: &Session) -> String {
    let mut out = String::new();
    if let Some(banner) = session.configuration_error() {
        let _ = writeln!(out, "! {banner}");
    }
    match session.idea() {
        Some(idea) => {
            let _ = writeln!(out, "Idea: {idea}");
        }
        None => out.push_str("No idea submitted yet.\n"),
    }
    if session.is_batch_in_flight() {
        out.push_str("Generating documents...\n");
    }
    if let Some(error) = session.error() {
        let _ = writeln!(out, "Error: {error}");
    }
    let loading: Vec<&str> = DocumentKind::ALL
        .into_iter()
        .filter(|kind| session.is_loading(*kind))
        .map(DocumentKind::slug)
        .collect();
    if !loading.is_empty() {
        let _ = writeln!(out, "In flight: {}", loading.join(", "));
    }
    if session.consistency_reminder() {
        let _ = writeln!(out, "{CONSISTENCY_REMINDER}");
    }
    out
}

fn resolve_kind(session: &Session, kind: Option<DocumentKind>) -> anyhow::Result<DocumentKind> {
    kind.or(session.active())
        .context("no document selected; name a kind or use 'select'")
}

/// Run one command. Returns `false` when the shell should exit.
///
/// # Errors
///
/// Returns an error for failed file reads/writes or commands that need a
/// document that does not exist; the shell reports it and keeps going.
pub async fn execute(
    orchestrator: &Orchestrator,
    command: ShellCommand,
    output_dir: &Path,
    out: &mut String,
) -> anyhow::Result<bool> {
    match command {
        ShellCommand::Idea(idea) => {
            out.push_str("Generating documents... This may take a moment.\n");
            if let Some(report) = orchestrator.submit_idea(&idea).await {
                let _ = writeln!(
                    out,
                    "Generated {} of {} documents.",
                    report.succeeded.len(),
                    DocumentKind::ALL.len()
                );
            }
            out.push_str(&render_status(&orchestrator.snapshot()));
        }
        ShellCommand::List => out.push_str(&render_list(&orchestrator.snapshot())),
        ShellCommand::Show(kind) => {
            let session = orchestrator.snapshot();
            let kind = resolve_kind(&session, kind)?;
            match session.document(kind) {
                Some(content) => {
                    let _ = writeln!(out, "== {} ==\n{content}", kind.display_name());
                }
                None => {
                    let _ = writeln!(out, "No content generated for {} yet.", kind.display_name());
                }
            }
        }
        ShellCommand::Select(kind) => {
            orchestrator.select(kind);
            if orchestrator.snapshot().active() == Some(kind) {
                let _ = writeln!(out, "Selected {}.", kind.display_name());
            } else {
                let _ = writeln!(out, "{} has not been generated.", kind.display_name());
            }
        }
        ShellCommand::Refine { kind, request } => {
            orchestrator.open_refine_dialog(kind);
            orchestrator.update_refine_instruction(request.clone());
            let current = orchestrator
                .snapshot()
                .document(kind)
                .map(str::to_owned)
                .with_context(|| format!("{} has no content to refine", kind.display_name()))?;
            let _ = writeln!(out, "Refining {}...", kind.display_name());
            match orchestrator.refine(kind, &current, &request).await {
                RefineOutcome::Refined => {
                    let _ = writeln!(out, "{} updated.", kind.display_name());
                }
                RefineOutcome::Failed(reason) => {
                    let _ = writeln!(out, "Refinement failed: {reason}");
                }
                RefineOutcome::Blocked => {
                    out.push_str(&render_status(&orchestrator.snapshot()));
                }
                RefineOutcome::Skipped => {
                    orchestrator.close_refine_dialog();
                    out.push_str("Refinement skipped.\n");
                }
                RefineOutcome::Superseded => {
                    out.push_str("Refinement discarded: a new idea was submitted.\n");
                }
            }
        }
        ShellCommand::Edit { kind, path } => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            orchestrator.save_direct_edit(kind, content);
            let _ = writeln!(out, "{} replaced from {}.", kind.display_name(), path.display());
        }
        ShellCommand::Download(kind) => {
            let session = orchestrator.snapshot();
            let kind = resolve_kind(&session, kind)?;
            let content = session
                .document(kind)
                .with_context(|| format!("{} has no content to download", kind.display_name()))?;
            let path = save_document(output_dir, kind, session.idea().unwrap_or_default(), content)?;
            let _ = writeln!(out, "Saved {}.", path.display());
        }
        ShellCommand::Status => out.push_str(&render_status(&orchestrator.snapshot())),
        ShellCommand::Help => {
            let _ = writeln!(out, "{HELP}");
        }
        ShellCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Read commands from stdin until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only if stdin/stdout fail.
pub async fn run(orchestrator: &Orchestrator, output_dir: &Path) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut banner = format!("ideaforge ({})\n{HELP}\n", orchestrator.client().model_id());
    banner.push_str(&render_status(&orchestrator.snapshot()));
    stdout.write_all(banner.as_bytes()).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let mut out = String::new();
        let keep_going = match line.parse::<ShellCommand>() {
            Ok(command) => match execute(orchestrator, command, output_dir, &mut out).await {
                Ok(keep_going) => keep_going,
                Err(e) => {
                    let _ = writeln!(out, "error: {e:#}");
                    true
                }
            },
            Err(ShellParseError::Empty) => true,
            Err(e) => {
                let _ = writeln!(out, "error: {e}");
                true
            }
        };
        stdout.write_all(out.as_bytes()).await?;
        if !keep_going {
            break;
        }
    }

    info!("shell closed");
    Ok(())
}
