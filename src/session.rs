//! Session state and its transitions.
//!
//! A [`Session`] holds everything the presentation layer renders: the idea,
//! the stored documents, per-kind loading flags, the active selection and
//! the error banner. It only changes through [`Session::apply`], which maps
//! the current state and one [`SessionEvent`] to the next state without any
//! I/O.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::documents::DocumentKind;

/// Identifies one generation pass. Settlements from an older pass are
/// ignored once a new idea has been submitted.
pub type PassId = u64;

/// Derived per-document lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Never requested in the current session.
    Unattempted,
    /// Initial generation in flight.
    Generating,
    /// Content available.
    Ready,
    /// Last generation or refinement failed.
    Failed,
    /// Refinement in flight.
    Refining,
}

/// A failed generation, kept structured and rendered into the error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// The document that failed.
    pub kind: DocumentKind,
    /// Upstream or configuration reason.
    pub reason: String,
}

/// An open refine dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    /// Document being refined.
    pub kind: DocumentKind,
    /// Instruction typed so far.
    pub instruction: String,
}

/// Every state change a session can undergo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Startup credential probe finished.
    CredentialChecked {
        /// Whether a usable key was found.
        available: bool,
    },
    /// A remote action was refused because no credential is configured.
    ConfigurationMissing {
        /// User-facing explanation.
        message: String,
    },
    /// A new idea replaces the current session contents.
    IdeaSubmitted {
        /// The (trimmed) idea text.
        idea: String,
    },
    /// One kind's generation request was dispatched.
    GenerationDispatched {
        /// Pass the request belongs to.
        pass: PassId,
        /// Kind being generated.
        kind: DocumentKind,
    },
    /// One kind's generation request settled.
    GenerationSettled {
        /// Pass the request belongs to.
        pass: PassId,
        /// Kind that settled.
        kind: DocumentKind,
        /// Generated text or failure reason.
        outcome: Result<String, String>,
    },
    /// Every request of the pass has settled.
    BatchCompleted {
        /// Pass that completed.
        pass: PassId,
    },
    /// The user opened the refine dialog for a kind.
    RefineDialogOpened {
        /// Kind to refine.
        kind: DocumentKind,
    },
    /// The refine dialog text changed.
    RefineInstructionEdited {
        /// Full instruction text.
        instruction: String,
    },
    /// The refine dialog was dismissed.
    RefineDialogClosed,
    /// A refinement request was dispatched.
    RefineStarted {
        /// Pass the refinement belongs to.
        pass: PassId,
        /// Kind being refined.
        kind: DocumentKind,
    },
    /// A refinement request settled.
    RefineSettled {
        /// Pass the refinement was started under.
        pass: PassId,
        /// Kind that settled.
        kind: DocumentKind,
        /// Revised text or failure reason.
        outcome: Result<String, String>,
    },
    /// The user overwrote a document by hand.
    DirectEditSaved {
        /// Kind edited.
        kind: DocumentKind,
        /// New content.
        content: String,
    },
    /// The user selected a document to view.
    DocumentSelected {
        /// Kind selected.
        kind: DocumentKind,
    },
}

/// The single live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    idea: Option<String>,
    pass: PassId,
    documents: BTreeMap<DocumentKind, String>,
    pending: BTreeMap<DocumentKind, String>,
    edited_in_batch: BTreeSet<DocumentKind>,
    loading: BTreeMap<DocumentKind, bool>,
    failed: BTreeSet<DocumentKind>,
    failures: Vec<DocumentFailure>,
    active: Option<DocumentKind>,
    error: Option<String>,
    configuration_error: Option<String>,
    batch_in_flight: bool,
    consistency_reminder: bool,
    editing: Option<EditRequest>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An empty session with every loading flag present and false.
    pub fn new() -> Self {
        Self {
            idea: None,
            pass: 0,
            documents: BTreeMap::new(),
            pending: BTreeMap::new(),
            edited_in_batch: BTreeSet::new(),
            loading: idle_flags(),
            failed: BTreeSet::new(),
            failures: Vec::new(),
            active: None,
            error: None,
            configuration_error: None,
            batch_in_flight: false,
            consistency_reminder: false,
            editing: None,
        }
    }

    /// Apply one event.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::CredentialChecked { available } => {
                self.configuration_error =
                    (!available).then(|| crate::client::MISSING_CREDENTIAL_MESSAGE.to_owned());
            }
            SessionEvent::ConfigurationMissing { message } => {
                self.error = Some(message);
            }
            SessionEvent::IdeaSubmitted { idea } => {
                self.idea = Some(idea);
                self.pass = self.pass.wrapping_add(1);
                self.documents.clear();
                self.pending.clear();
                self.edited_in_batch.clear();
                self.loading = idle_flags();
                self.failed.clear();
                self.failures.clear();
                self.active = None;
                self.error = None;
                self.batch_in_flight = true;
                self.consistency_reminder = false;
                self.editing = None;
            }
            SessionEvent::GenerationDispatched { pass, kind } => {
                if pass == self.pass && self.batch_in_flight {
                    self.loading.insert(kind, true);
                }
            }
            SessionEvent::GenerationSettled {
                pass,
                kind,
                outcome,
            } => {
                if pass != self.pass || !self.batch_in_flight {
                    return;
                }
                self.loading.insert(kind, false);
                // A user edit made while this request was outstanding wins.
                if self.edited_in_batch.contains(&kind) {
                    return;
                }
                match outcome {
                    Ok(content) => {
                        self.pending.insert(kind, content);
                    }
                    Err(reason) => {
                        self.pending.insert(kind, generation_placeholder(kind, &reason));
                        self.failed.insert(kind);
                        self.failures.push(DocumentFailure { kind, reason });
                        self.error = Some(render_failures(&self.failures));
                    }
                }
            }
            SessionEvent::BatchCompleted { pass } => {
                if pass != self.pass || !self.batch_in_flight {
                    return;
                }
                self.documents = std::mem::take(&mut self.pending);
                self.edited_in_batch.clear();
                self.active = Some(DocumentKind::first());
                self.batch_in_flight = false;
                self.consistency_reminder = true;
            }
            SessionEvent::RefineDialogOpened { kind } => {
                if self.current_content(kind).is_some() {
                    self.editing = Some(EditRequest {
                        kind,
                        instruction: String::new(),
                    });
                }
            }
            SessionEvent::RefineInstructionEdited { instruction } => {
                if let Some(editing) = self.editing.as_mut() {
                    editing.instruction = instruction;
                }
            }
            SessionEvent::RefineDialogClosed => {
                self.editing = None;
            }
            SessionEvent::RefineStarted { pass, kind } => {
                if pass != self.pass {
                    return;
                }
                self.error = None;
                self.editing = None;
                self.loading.insert(kind, true);
            }
            SessionEvent::RefineSettled {
                pass,
                kind,
                outcome,
            } => {
                if pass != self.pass {
                    return;
                }
                match outcome {
                    Ok(content) => {
                        self.store_user_write(kind, content);
                        self.failed.remove(&kind);
                        self.consistency_reminder = true;
                    }
                    Err(reason) => {
                        self.failed.insert(kind);
                        self.error = Some(format!(
                            "Failed to refine {}. {reason}",
                            kind.display_name()
                        ));
                    }
                }
                self.loading.insert(kind, false);
            }
            SessionEvent::DirectEditSaved { kind, content } => {
                self.store_user_write(kind, content);
                self.failed.remove(&kind);
                self.consistency_reminder = true;
            }
            SessionEvent::DocumentSelected { kind } => {
                if self.status(kind) != DocumentStatus::Unattempted {
                    self.active = Some(kind);
                }
            }
        }
    }

    /// Route a refinement or direct edit to the committed documents, or to
    /// the pending batch results while a pass is still running so the batch
    /// commit keeps it.
    fn store_user_write(&mut self, kind: DocumentKind, content: String) {
        self.failures.retain(|failure| failure.kind != kind);
        if self.batch_in_flight {
            self.edited_in_batch.insert(kind);
            self.pending.insert(kind, content);
        } else {
            self.documents.insert(kind, content);
        }
    }

    /// Latest text for `kind`: committed content, or a result of the
    /// running pass that has settled but is not committed yet.
    pub fn current_content(&self, kind: DocumentKind) -> Option<&str> {
        self.documents
            .get(&kind)
            .or_else(|| self.pending.get(&kind))
            .map(String::as_str)
    }

    /// The submitted idea, if any.
    pub fn idea(&self) -> Option<&str> {
        self.idea.as_deref()
    }

    /// Current generation pass. Zero before the first submission.
    pub fn pass(&self) -> PassId {
        self.pass
    }

    /// Stored content for `kind`.
    pub fn document(&self, kind: DocumentKind) -> Option<&str> {
        self.documents.get(&kind).map(String::as_str)
    }

    /// All stored documents.
    pub fn documents(&self) -> &BTreeMap<DocumentKind, String> {
        &self.documents
    }

    /// Whether a request for `kind` is outstanding.
    pub fn is_loading(&self, kind: DocumentKind) -> bool {
        self.loading.get(&kind).copied().unwrap_or(false)
    }

    /// Per-kind loading flags; always holds all seven kinds.
    pub fn loading_flags(&self) -> &BTreeMap<DocumentKind, bool> {
        &self.loading
    }

    /// Whether any request is outstanding.
    pub fn any_loading(&self) -> bool {
        self.loading.values().any(|flag| *flag)
    }

    /// Whether the initial generation pass is still running.
    pub fn is_batch_in_flight(&self) -> bool {
        self.batch_in_flight
    }

    /// The selected kind.
    pub fn active(&self) -> Option<DocumentKind> {
        self.active
    }

    /// Content of the selected kind.
    pub fn active_document(&self) -> Option<&str> {
        self.active.and_then(|kind| self.document(kind))
    }

    /// The error banner.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Failures of the most recent generation pass whose placeholder has not
    /// been replaced since.
    pub fn failures(&self) -> &[DocumentFailure] {
        &self.failures
    }

    /// Standing banner shown while no credential is configured.
    pub fn configuration_error(&self) -> Option<&str> {
        self.configuration_error.as_deref()
    }

    /// Whether to remind the user to keep documents consistent.
    pub fn consistency_reminder(&self) -> bool {
        self.consistency_reminder
    }

    /// The open refine dialog.
    pub fn editing(&self) -> Option<&EditRequest> {
        self.editing.as_ref()
    }

    /// Lifecycle state of `kind`.
    pub fn status(&self, kind: DocumentKind) -> DocumentStatus {
        let stored = self.documents.contains_key(&kind) || self.pending.contains_key(&kind);
        if self.is_loading(kind) {
            return if stored {
                DocumentStatus::Refining
            } else {
                DocumentStatus::Generating
            };
        }
        if self.failed.contains(&kind) {
            DocumentStatus::Failed
        } else if stored {
            DocumentStatus::Ready
        } else {
            DocumentStatus::Unattempted
        }
    }
}

/// Placeholder stored in a kind's slot when its generation fails.
pub fn generation_placeholder(kind: DocumentKind, reason: &str) -> String {
    format!("Error generating {}. {reason}", kind.display_name())
}

/// Render failures as the `; `-joined banner text.
pub fn render_failures(failures: &[DocumentFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("Failed to generate {}", f.kind.display_name()))
        .collect::<Vec<_>>()
        .join("; ")
}

fn idle_flags() -> BTreeMap<DocumentKind, bool> {
    DocumentKind::ALL.into_iter().map(|kind| (kind, false)).collect()
}
