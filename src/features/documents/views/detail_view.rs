use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};

use crate::core::error::Result;
use crate::features::documents::clients::DocumentsApi;
use crate::features::documents::dtos::{Decision, Document, ReviewInput, WorkflowStatus};
use crate::features::documents::views::{Notifier, StatusPoller};
use crate::shared::templates::render_template;

const REVIEWED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local state of the document detail screen
#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub document: Option<Document>,
    /// Last workflow status received; kept when a later fetch fails
    pub status: Option<WorkflowStatus>,
    /// Why the most recent status fetch failed, cleared by the next success
    pub status_error: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub reviewer: String,
    pub notes: String,
    pub submitting: bool,
    pub mounted: bool,
}

impl DetailState {
    /// Approve/Reject are disabled while a decision is outstanding
    pub fn actions_enabled(&self) -> bool {
        !self.submitting
    }

    pub fn workflow_line(&self) -> String {
        workflow_line(self.status.as_ref())
    }
}

/// Human-readable workflow state; `Unknown` before any status arrived
pub fn workflow_line(status: Option<&WorkflowStatus>) -> String {
    match status {
        None => "Unknown".to_string(),
        Some(status) if status.has_decision => match status.decision {
            Some(decision) => format!("Decision made: {}", decision),
            None => "Decision made: unknown".to_string(),
        },
        Some(_) => "Waiting for decision...".to_string(),
    }
}

#[derive(Serialize)]
struct DetailScreen<'a> {
    loading: bool,
    error: Option<&'a str>,
    document: Option<DocumentCard<'a>>,
    workflow: String,
    status_notice: Option<&'a str>,
    reviewer: &'a str,
    notes: &'a str,
    actions_enabled: bool,
}

#[derive(Serialize)]
struct DocumentCard<'a> {
    filename: &'a str,
    content_type: &'a str,
    file_size: u64,
    status: String,
    ai: Option<String>,
    ai_reasoning: Option<&'a str>,
    reviewed: Option<String>,
}

impl<'a> DocumentCard<'a> {
    fn from_document(doc: &'a Document) -> Self {
        let reviewed = doc.reviewed_by.as_ref().map(|by| match doc.reviewed_at {
            Some(at) => format!("Reviewed by {} at {}", by, at.format(REVIEWED_AT_FORMAT)),
            None => format!("Reviewed by {}", by),
        });

        Self {
            filename: &doc.filename,
            content_type: &doc.content_type,
            file_size: doc.file_size,
            status: doc.status.to_string(),
            ai: doc
                .ai_suggestion
                .zip(doc.ai_confidence_percent())
                .map(|(suggestion, pct)| format!("{} ({}%)", suggestion, pct)),
            ai_reasoning: doc.ai_reasoning.as_deref(),
            reviewed,
        }
    }
}

/// State shared with the poller task
struct DetailShared {
    id: String,
    api: Arc<dyn DocumentsApi>,
    state: RwLock<DetailState>,
    revision: watch::Sender<u64>,
}

impl DetailShared {
    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Apply a state change; discarded once the screen is unmounted
    async fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut DetailState) + Send,
    {
        {
            let mut state = self.state.write().await;
            if !state.mounted {
                return false;
            }
            f(&mut state);
        }
        self.bump();
        true
    }

    async fn refresh_status(&self) {
        match self.api.get_workflow_status(&self.id).await {
            Ok(status) => {
                self.update(move |s| {
                    s.status = Some(status);
                    s.status_error = None;
                })
                .await;
            }
            Err(e) => {
                warn!(document_id = %self.id, "Workflow status refresh failed: {}", e);
                self.update(move |s| s.status_error = Some(e.to_string()))
                    .await;
            }
        }
    }
}

/// Document detail screen with the decision form and workflow status poller
#[derive(Clone)]
pub struct DocumentDetailView {
    shared: Arc<DetailShared>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    poller: Arc<Mutex<Option<StatusPoller>>>,
}

impl DocumentDetailView {
    pub fn new(
        id: impl Into<String>,
        api: Arc<dyn DocumentsApi>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            shared: Arc::new(DetailShared {
                id: id.into(),
                api,
                state: RwLock::new(DetailState::default()),
                revision,
            }),
            notifier,
            poll_interval,
            poller: Arc::new(Mutex::new(None)),
        }
    }

    pub fn id(&self) -> &str {
        &self.shared.id
    }

    /// Changes whenever the screen state changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub async fn snapshot(&self) -> DetailState {
        self.shared.state.read().await.clone()
    }

    #[cfg(test)]
    pub async fn actions_enabled(&self) -> bool {
        self.shared.state.read().await.actions_enabled()
    }

    /// Load the document and status, then poll the status until unmounted
    pub async fn mount(&self) {
        {
            let mut state = self.shared.state.write().await;
            if state.mounted {
                return;
            }
            // Writes from calls that settled while unmounted were dropped
            state.mounted = true;
            state.loading = false;
            state.submitting = false;
        }
        self.shared.bump();
        debug!(document_id = %self.id(), "Mounting document detail");

        self.start_polling();
        self.load().await;
    }

    /// Stop polling; later results are dropped instead of written
    pub async fn unmount(&self) {
        self.shared.state.write().await.mounted = false;

        let poller = self
            .poller
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(poller) = poller {
            poller.stop();
        }

        debug!(document_id = %self.id(), "Unmounted document detail");
    }

    fn start_polling(&self) {
        let shared = Arc::clone(&self.shared);
        let poller = StatusPoller::spawn(self.poll_interval, move || {
            let shared = Arc::clone(&shared);
            async move { shared.refresh_status().await }
        });

        let previous = self
            .poller
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(poller);
        if let Some(previous) = previous {
            previous.stop();
        }
    }

    /// Fetch the document and its workflow status concurrently.
    ///
    /// A document failure renders inline. A status failure keeps the last
    /// known status and shows a notice instead.
    pub async fn load(&self) {
        let started = self
            .shared
            .update(|s| {
                s.loading = true;
                s.error = None;
            })
            .await;
        if !started {
            return;
        }

        let id = self.id();
        let (document, status) = tokio::join!(
            self.shared.api.get_document(id),
            self.shared.api.get_workflow_status(id)
        );

        if let Err(e) = &document {
            warn!(document_id = %id, "Failed to load document: {}", e);
        }
        if let Err(e) = &status {
            warn!(document_id = %id, "Workflow status refresh failed: {}", e);
        }

        self.shared
            .update(move |s| {
                match document {
                    Ok(doc) => s.document = Some(doc),
                    Err(e) => s.error = Some(e.to_string()),
                }
                match status {
                    Ok(status) => {
                        s.status = Some(status);
                        s.status_error = None;
                    }
                    Err(e) => s.status_error = Some(e.to_string()),
                }
                s.loading = false;
            })
            .await;
    }

    pub async fn set_reviewer(&self, reviewer: impl Into<String>) {
        let reviewer = reviewer.into();
        self.shared.update(move |s| s.reviewer = reviewer).await;
    }

    pub async fn set_notes(&self, notes: impl Into<String>) {
        let notes = notes.into();
        self.shared.update(move |s| s.notes = notes).await;
    }

    pub async fn approve(&self) -> bool {
        self.decide(Decision::Approved).await
    }

    pub async fn reject(&self) -> bool {
        self.decide(Decision::Rejected).await
    }

    /// Send a decision with the current form values.
    ///
    /// Returns `true` when the backend accepted it. Whatever the document's
    /// status, the request is sent; the backend owns the transition rules.
    /// A call while a decision is outstanding does nothing.
    pub async fn decide(&self, decision: Decision) -> bool {
        let review = {
            let mut state = self.shared.state.write().await;
            if !state.mounted || state.submitting {
                return false;
            }
            state.submitting = true;
            ReviewInput::from_form(&state.notes, &state.reviewer)
        };
        self.shared.bump();

        let id = self.id();
        info!(document_id = %id, %decision, "Submitting decision");

        let result = match decision {
            Decision::Approved => self.shared.api.approve_document(id, review).await,
            Decision::Rejected => self.shared.api.reject_document(id, review).await,
        };

        let accepted = match result {
            Ok(updated) => {
                self.shared.update(move |s| s.document = Some(updated)).await;
                self.load().await;
                true
            }
            Err(e) => {
                error!(document_id = %id, %decision, "Decision failed: {}", e);
                self.notifier.alert(&e.to_string());
                false
            }
        };

        self.shared.update(|s| s.submitting = false).await;
        accepted
    }

    pub async fn render(&self) -> Result<String> {
        let state = self.shared.state.read().await;
        let screen = DetailScreen {
            loading: state.loading,
            error: state.error.as_deref(),
            document: state.document.as_ref().map(DocumentCard::from_document),
            workflow: state.workflow_line(),
            status_notice: state.status_error.as_deref(),
            reviewer: &state.reviewer,
            notes: &state.notes,
            actions_enabled: state.actions_enabled(),
        };

        Ok(render_template("document_detail.jinja", &screen)?)
    }
}
