//! Generation pass orchestration and the refine / direct-edit flows.
//!
//! The [`Orchestrator`] owns the live [`Session`] inside a `watch` channel.
//! Every mutation is a [`SessionEvent`] applied through `send_modify`, which
//! serializes writes and lets any number of observers follow along.

use std::collections::BTreeSet;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::client::{GenerationClient, GenerationError};
use crate::documents::DocumentKind;
use crate::prompts::{build_generation_prompt, build_refinement_prompt};
use crate::providers::SamplingConfig;
use crate::session::{DocumentFailure, PassId, Session, SessionEvent};

/// Shown when a generation pass is refused for lack of a credential.
pub const GENERATE_BLOCKED_MESSAGE: &str =
    "Cannot generate documents: API key is missing or empty. Set the API_KEY environment variable.";

/// Shown when a refinement is refused for lack of a credential.
pub const REFINE_BLOCKED_MESSAGE: &str = "Cannot refine document: API key is missing or empty.";

/// Sampling used for each kind of request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPlan {
    /// Initial generation.
    pub generation: SamplingConfig,
    /// Refinement.
    pub refinement: SamplingConfig,
}

impl Default for SamplingPlan {
    fn default() -> Self {
        Self {
            generation: SamplingConfig::GENERATION,
            refinement: SamplingConfig::REFINEMENT,
        }
    }
}

/// Summary of a finished generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Pass identifier.
    pub pass: PassId,
    /// Kinds that produced content, in display order.
    pub succeeded: Vec<DocumentKind>,
    /// Kinds that failed, in display order.
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    /// Whether every kind failed.
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty()
    }
}

/// Result of a [`Orchestrator::refine`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineOutcome {
    /// The stored content was replaced.
    Refined,
    /// The request failed; the stored content is unchanged.
    Failed(String),
    /// No credential; no request was issued.
    Blocked,
    /// Blank instruction or a request for this kind already in flight.
    Skipped,
    /// A new idea was submitted while the request was in flight; the result
    /// was discarded.
    Superseded,
}

/// Drives generation, refinement and direct edits against one session.
#[derive(Debug)]
pub struct Orchestrator {
    client: GenerationClient,
    sampling: SamplingPlan,
    state: watch::Sender<Session>,
}

impl Orchestrator {
    /// Create an orchestrator and record whether a credential is available.
    pub fn new(client: GenerationClient, sampling: SamplingPlan) -> Self {
        let (state, _) = watch::channel(Session::new());
        let available = client.has_credential();
        if !available {
            warn!("no API key configured; generation and refinement are disabled");
        }
        let orchestrator = Self {
            client,
            sampling,
            state,
        };
        orchestrator.dispatch(SessionEvent::CredentialChecked { available });
        orchestrator
    }

    /// The underlying generation client.
    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Follow session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn dispatch(&self, event: SessionEvent) {
        self.state.send_modify(|session| session.apply(event));
    }

    /// Generate every document for `idea` concurrently.
    ///
    /// Returns `None` when the idea is blank or no credential is configured
    /// (the latter sets the error banner). Otherwise waits for all requests
    /// to settle, commits the results and returns a summary.
    pub async fn submit_idea(&self, idea: &str) -> Option<BatchReport> {
        let idea = idea.trim();
        if idea.is_empty() {
            debug!("ignoring blank idea");
            return None;
        }
        if !self.client.has_credential() {
            warn!("generation pass refused: missing API key");
            self.dispatch(SessionEvent::ConfigurationMissing {
                message: GENERATE_BLOCKED_MESSAGE.to_owned(),
            });
            return None;
        }

        self.dispatch(SessionEvent::IdeaSubmitted {
            idea: idea.to_owned(),
        });
        let pass = self.state.borrow().pass();
        info!(
            pass,
            model = self.client.model_id(),
            idea_chars = idea.chars().count(),
            "starting generation pass"
        );

        let mut tasks = JoinSet::new();
        for kind in DocumentKind::ALL {
            let client = self.client.clone();
            let prompt = build_generation_prompt(idea, kind);
            let sampling = self.sampling.generation;
            self.dispatch(SessionEvent::GenerationDispatched { pass, kind });
            tasks.spawn(async move { (kind, client.generate(prompt, sampling).await) });
        }

        let mut unsettled: BTreeSet<DocumentKind> = DocumentKind::ALL.into_iter().collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((kind, result)) => {
                    unsettled.remove(&kind);
                    self.settle_generation(pass, kind, result);
                }
                Err(e) => warn!(pass, error = %e, "generation task did not complete"),
            }
        }
        for kind in unsettled {
            self.settle_generation(
                pass,
                kind,
                Err(GenerationError::Upstream(
                    "generation task ended unexpectedly".to_owned(),
                )),
            );
        }

        self.dispatch(SessionEvent::BatchCompleted { pass });
        let report = self.report(pass);
        info!(
            pass,
            succeeded = report.succeeded.len(),
            failed = report.failures.len(),
            "generation pass complete"
        );
        Some(report)
    }

    fn settle_generation(
        &self,
        pass: PassId,
        kind: DocumentKind,
        result: Result<String, GenerationError>,
    ) {
        let outcome = match result {
            Ok(content) => {
                debug!(pass, kind = %kind, chars = content.chars().count(), "document generated");
                Ok(content)
            }
            Err(e) => {
                warn!(pass, kind = %kind, error = %e, "document generation failed");
                Err(e.to_string())
            }
        };
        self.dispatch(SessionEvent::GenerationSettled {
            pass,
            kind,
            outcome,
        });
    }

    fn report(&self, pass: PassId) -> BatchReport {
        let session = self.state.borrow();
        let mut failures = session.failures().to_vec();
        failures.sort_by_key(|f| f.kind);
        let succeeded = DocumentKind::ALL
            .into_iter()
            .filter(|kind| !failures.iter().any(|f| f.kind == *kind))
            .collect();
        BatchReport {
            pass,
            succeeded,
            failures,
        }
    }

    /// Revise one document according to `edit_request`.
    ///
    /// The stored content is used as the base (including a settled result of
    /// a pass that is still running); `current_content` is the fallback when
    /// nothing, or only empty text, is stored for `kind`.
    pub async fn refine(
        &self,
        kind: DocumentKind,
        current_content: &str,
        edit_request: &str,
    ) -> RefineOutcome {
        let edit_request = edit_request.trim();
        if edit_request.is_empty() {
            debug!(kind = %kind, "ignoring blank refine request");
            return RefineOutcome::Skipped;
        }
        if !self.client.has_credential() {
            warn!(kind = %kind, "refinement refused: missing API key");
            self.dispatch(SessionEvent::ConfigurationMissing {
                message: REFINE_BLOCKED_MESSAGE.to_owned(),
            });
            return RefineOutcome::Blocked;
        }

        // Claim the kind's slot and read the base content under one write.
        let mut started = None;
        self.state.send_modify(|session| {
            if session.is_loading(kind) {
                return;
            }
            let base = session
                .current_content(kind)
                .filter(|stored| !stored.is_empty())
                .unwrap_or(current_content)
                .to_owned();
            let pass = session.pass();
            started = Some((pass, base));
            session.apply(SessionEvent::RefineStarted { pass, kind });
        });
        let Some((pass, base)) = started else {
            warn!(kind = %kind, "refinement already in flight");
            return RefineOutcome::Skipped;
        };

        info!(pass, kind = %kind, "refining document");
        let prompt = build_refinement_prompt(kind, &base, edit_request);
        let result = self.client.generate(prompt, self.sampling.refinement).await;
        if let Err(e) = &result {
            warn!(pass, kind = %kind, error = %e, "refinement failed");
        }
        let outcome = result.map_err(|e| e.to_string());

        let mut current = true;
        self.state.send_modify(|session| {
            current = session.pass() == pass;
            session.apply(SessionEvent::RefineSettled {
                pass,
                kind,
                outcome: outcome.clone(),
            });
        });
        if !current {
            warn!(pass, kind = %kind, "discarding refinement from a previous idea");
            return RefineOutcome::Superseded;
        }
        match outcome {
            Ok(_) => RefineOutcome::Refined,
            Err(reason) => RefineOutcome::Failed(reason),
        }
    }

    /// Overwrite a document locally. Never touches the network.
    pub fn save_direct_edit(&self, kind: DocumentKind, new_content: impl Into<String>) {
        debug!(kind = %kind, "saving direct edit");
        self.dispatch(SessionEvent::DirectEditSaved {
            kind,
            content: new_content.into(),
        });
    }

    /// Select the document to view.
    pub fn select(&self, kind: DocumentKind) {
        self.dispatch(SessionEvent::DocumentSelected { kind });
    }

    /// Open the refine dialog for `kind` (only if it has content).
    pub fn open_refine_dialog(&self, kind: DocumentKind) {
        self.dispatch(SessionEvent::RefineDialogOpened { kind });
    }

    /// Replace the refine dialog's instruction text.
    pub fn update_refine_instruction(&self, instruction: impl Into<String>) {
        self.dispatch(SessionEvent::RefineInstructionEdited {
            instruction: instruction.into(),
        });
    }

    /// Dismiss the refine dialog without submitting.
    pub fn close_refine_dialog(&self) {
        self.dispatch(SessionEvent::RefineDialogClosed);
    }
}
