//! ideaforge CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use ideaforge::client::GenerationClient;
use ideaforge::config::Config;
use ideaforge::credentials::{load_env_file, EnvCredentials};
use ideaforge::documents::DocumentKind;
use ideaforge::download::save_document;
use ideaforge::logging;
use ideaforge::orchestrator::{Orchestrator, RefineOutcome};
use ideaforge::providers::gemini::GeminiProvider;
use ideaforge::shell;

/// Turn a business idea into proposal, plan, research, roadmap, milestones,
/// financials and a technical PRD.
#[derive(Debug, Parser)]
#[command(name = "ideaforge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the document kinds.
    Kinds,
    /// Generate every document for an idea.
    Generate {
        /// The business idea.
        idea: String,
        /// Output directory (defaults to the configured one).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print a summary only; do not write files.
        #[arg(long)]
        no_save: bool,
    },
    /// Refine one document stored in a file.
    Refine {
        /// Document kind, e.g. `market-research`.
        #[arg(long)]
        kind: DocumentKind,
        /// File holding the current content.
        #[arg(long)]
        input: PathBuf,
        /// What to change.
        #[arg(long)]
        request: String,
        /// Idea used to name the saved file.
        #[arg(long)]
        idea: Option<String>,
        /// Save into this directory instead of printing to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Interactive session.
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_loaded = load_env_file(Path::new(".env"))?;
    let config = Config::load().context("failed to load configuration")?;

    let _guard = match cli.command {
        Command::Shell => Some(logging::init_file(&config.output.log_dir, &config.log_level)?),
        _ => {
            logging::init_cli(&config.log_level);
            None
        }
    };
    debug!(env_loaded, ?config, "configuration resolved");

    match cli.command {
        Command::Kinds => {
            for kind in DocumentKind::ALL {
                println!("{:<22} {}", kind.slug(), kind.display_name());
            }
            Ok(())
        }
        Command::Generate { idea, out, no_save } => {
            let orchestrator = build_orchestrator(&config);
            let out = out.unwrap_or_else(|| config.output.dir.clone());
            run_generate(&orchestrator, &idea, (!no_save).then_some(out.as_path())).await
        }
        Command::Refine {
            kind,
            input,
            request,
            idea,
            out,
        } => {
            let orchestrator = build_orchestrator(&config);
            let current = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            run_refine(&orchestrator, kind, &current, &request, idea.as_deref(), out.as_deref())
                .await
        }
        Command::Shell => {
            let orchestrator = build_orchestrator(&config);
            shell::run(&orchestrator, &config.output.dir).await
        }
    }
}

fn build_orchestrator(config: &Config) -> Orchestrator {
    let provider = GeminiProvider::new(config.model.name.clone(), config.model.base_url.clone());
    let credentials = EnvCredentials::new(config.credentials.api_key_env.clone());
    info!(model = %config.model.name, key_vars = ?credentials.vars(), "building generation client");
    let client = GenerationClient::new(Arc::new(provider), Arc::new(credentials));
    Orchestrator::new(client, config.sampling())
}

async fn run_generate(orchestrator: &Orchestrator, idea: &str, out: Option<&Path>) -> Result<()> {
    let Some(report) = orchestrator.submit_idea(idea).await else {
        let session = orchestrator.snapshot();
        bail!(
            "{}",
            session
                .error()
                .unwrap_or("nothing to generate: the idea is empty")
        );
    };

    let session = orchestrator.snapshot();
    let idea = session.idea().unwrap_or_default();
    for kind in &report.succeeded {
        let kind = *kind;
        let Some(content) = session.document(kind) else {
            continue;
        };
        match out {
            Some(dir) => {
                let path = save_document(dir, kind, idea, content)?;
                println!("{:<22} {}", kind.display_name(), path.display());
            }
            None => println!(
                "{:<22} {} chars",
                kind.display_name(),
                content.chars().count()
            ),
        }
    }

    if let Some(error) = session.error() {
        eprintln!("{error}");
    }
    if report.all_failed() {
        bail!("every document failed to generate");
    }
    Ok(())
}

async fn run_refine(
    orchestrator: &Orchestrator,
    kind: DocumentKind,
    current: &str,
    request: &str,
    idea: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    match orchestrator.refine(kind, current, request).await {
        RefineOutcome::Refined => {}
        RefineOutcome::Failed(reason) => bail!("failed to refine {}: {reason}", kind.display_name()),
        RefineOutcome::Blocked => bail!(
            "{}",
            orchestrator
                .snapshot()
                .error()
                .unwrap_or("no API key configured")
        ),
        RefineOutcome::Skipped => bail!("the change request is empty"),
        RefineOutcome::Superseded => bail!("refinement discarded by a newer idea"),
    }

    let session = orchestrator.snapshot();
    let refined = session
        .document(kind)
        .context("refined document missing from session")?;
    match out {
        Some(dir) => {
            let path = save_document(dir, kind, idea.unwrap_or_default().trim(), refined)?;
            println!("{}", path.display());
        }
        None => println!("{refined}"),
    }
    Ok(())
}
