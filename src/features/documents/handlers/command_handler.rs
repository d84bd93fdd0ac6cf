use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::core::error::Result;
use crate::features::documents::clients::DocumentsApi;
use crate::features::documents::dtos::{Decision, DocumentStatus};
use crate::features::documents::views::{
    workflow_line, DocumentDetailView, DocumentListView, Notifier,
};
use crate::modules::files::UploadFile;

/// Rendered screen plus whether the command achieved what it was asked to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub screen: String,
    pub success: bool,
}

impl CommandOutput {
    fn new(screen: String, success: bool) -> Self {
        Self { screen, success }
    }
}

/// Drives the document screens for one-shot terminal commands
pub struct DocumentCommands {
    api: Arc<dyn DocumentsApi>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
}

impl DocumentCommands {
    pub fn new(
        api: Arc<dyn DocumentsApi>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            api,
            notifier,
            poll_interval,
        }
    }

    fn list_view(&self) -> DocumentListView {
        DocumentListView::new(Arc::clone(&self.api), Arc::clone(&self.notifier))
    }

    fn detail_view(&self, id: &str) -> DocumentDetailView {
        DocumentDetailView::new(
            id,
            Arc::clone(&self.api),
            Arc::clone(&self.notifier),
            self.poll_interval,
        )
    }

    pub async fn list(&self, status: Option<DocumentStatus>) -> Result<CommandOutput> {
        let view = self.list_view();
        view.set_status_filter(status).await;
        view.mount().await;

        let success = view.snapshot().await.error.is_none();
        Ok(CommandOutput::new(view.render().await?, success))
    }

    /// Upload a local file and show the refreshed list
    pub async fn upload(&self, path: &Path) -> Result<CommandOutput> {
        let file = UploadFile::from_path(path).await?;
        file.ensure_accepted()?;

        let view = self.list_view();
        view.mount().await;
        view.select_file(Some(file)).await;
        let uploaded = view.upload().await;

        Ok(CommandOutput::new(view.render().await?, uploaded))
    }

    pub async fn show(&self, id: &str) -> Result<CommandOutput> {
        let view = self.detail_view(id);
        view.mount().await;

        let success = view.snapshot().await.error.is_none();
        let screen = view.render().await;
        view.unmount().await;

        Ok(CommandOutput::new(screen?, success))
    }

    /// Fill the decision form and submit it.
    ///
    /// Nothing is submitted when the document itself failed to load.
    pub async fn decide(
        &self,
        id: &str,
        decision: Decision,
        reviewer: &str,
        notes: &str,
    ) -> Result<CommandOutput> {
        let view = self.detail_view(id);
        view.mount().await;

        let accepted = if view.snapshot().await.error.is_some() {
            false
        } else {
            view.set_reviewer(reviewer).await;
            view.set_notes(notes).await;
            match decision {
                Decision::Approved => view.approve().await,
                Decision::Rejected => view.reject().await,
            }
        };

        let screen = view.render().await;
        view.unmount().await;

        Ok(CommandOutput::new(screen?, accepted))
    }

    /// One-off workflow status fetch
    pub async fn status(&self, id: &str) -> Result<CommandOutput> {
        let status = self.api.get_workflow_status(id).await?;
        Ok(CommandOutput::new(workflow_line(Some(&status)), true))
    }

    /// Keep the detail screen mounted and emit it every time it changes.
    ///
    /// Returns when `shutdown` resolves, or once the workflow has a decision
    /// if `until_decided` is set. A document that fails to load ends the
    /// watch right after the first frame.
    pub async fn watch<S, E>(
        &self,
        id: &str,
        until_decided: bool,
        shutdown: S,
        mut emit: E,
    ) -> Result<CommandOutput>
    where
        S: Future<Output = ()>,
        E: FnMut(&str),
    {
        let view = self.detail_view(id);
        let mut changes = view.subscribe();
        view.mount().await;
        info!(document_id = %id, "Watching document");

        let result = Self::follow(&view, until_decided, shutdown, &mut changes, &mut emit).await;

        view.unmount().await;
        result
    }

    async fn follow<S, E>(
        view: &DocumentDetailView,
        until_decided: bool,
        shutdown: S,
        changes: &mut watch::Receiver<u64>,
        emit: &mut E,
    ) -> Result<CommandOutput>
    where
        S: Future<Output = ()>,
        E: FnMut(&str),
    {
        let mut last = view.render().await?;
        emit(&last);

        if view.snapshot().await.error.is_some() {
            return Ok(CommandOutput::new(last, false));
        }

        tokio::pin!(shutdown);
        loop {
            let status = view.snapshot().await.status;
            if until_decided && status.is_some_and(|s| s.has_decision) {
                debug!(document_id = %view.id(), "Workflow decided; leaving watch");
                break;
            }

            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = &mut shutdown => break,
            }

            let screen = view.render().await?;
            if screen != last {
                emit(&screen);
                last = screen;
            }
        }

        Ok(CommandOutput::new(last, true))
    }

    pub async fn health(&self) -> Result<CommandOutput> {
        let health = self.api.health().await?;
        let up = health.status.eq_ignore_ascii_case("UP");
        Ok(CommandOutput::new(
            format!("{}: {}", health.service, health.status),
            up,
        ))
    }
}
