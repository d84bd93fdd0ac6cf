use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::core::error::Result;
use crate::features::documents::clients::DocumentsApi;
use crate::features::documents::dtos::{Document, DocumentStatus};
use crate::features::documents::views::Notifier;
use crate::modules::files::UploadFile;
use crate::shared::templates::render_template;

/// Local state of the document list screen
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub documents: Vec<Document>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_file: Option<UploadFile>,
    pub uploading: bool,
    pub status_filter: Option<DocumentStatus>,
}

impl ListState {
    /// The upload control is live only with a file picked and no upload running
    pub fn can_upload(&self) -> bool {
        self.selected_file.is_some() && !self.uploading
    }
}

#[derive(Serialize)]
struct ListScreen<'a> {
    loading: bool,
    error: Option<&'a str>,
    uploading: bool,
    selected_file: Option<&'a str>,
    can_upload: bool,
    status_filter: Option<String>,
    documents: Vec<ListRow<'a>>,
}

#[derive(Serialize)]
struct ListRow<'a> {
    id: &'a str,
    filename: &'a str,
    status: String,
    ai: Option<String>,
}

impl<'a> ListScreen<'a> {
    fn from_state(state: &'a ListState) -> Self {
        Self {
            loading: state.loading,
            error: state.error.as_deref(),
            uploading: state.uploading,
            selected_file: state.selected_file.as_ref().map(|f| f.filename.as_str()),
            can_upload: state.can_upload(),
            status_filter: state.status_filter.map(|s| s.to_string()),
            documents: state
                .documents
                .iter()
                .map(|doc| ListRow {
                    id: &doc.id,
                    filename: &doc.filename,
                    status: doc.status.to_string(),
                    ai: doc
                        .ai_suggestion
                        .zip(doc.ai_confidence_percent())
                        .map(|(suggestion, pct)| format!("{} ({}%)", suggestion, pct)),
                })
                .collect(),
        }
    }
}

/// Document list screen with its upload form
#[derive(Clone)]
pub struct DocumentListView {
    api: Arc<dyn DocumentsApi>,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<ListState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl DocumentListView {
    pub fn new(api: Arc<dyn DocumentsApi>, notifier: Arc<dyn Notifier>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            api,
            notifier,
            state: Arc::new(RwLock::new(ListState::default())),
            revision: Arc::new(revision),
        }
    }

    /// Changes whenever the screen state changes
    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub async fn snapshot(&self) -> ListState {
        self.state.read().await.clone()
    }

    async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ListState) + Send,
    {
        {
            let mut state = self.state.write().await;
            f(&mut state);
        }
        self.revision.send_modify(|rev| *rev += 1);
    }

    pub async fn mount(&self) {
        debug!("Mounting document list");
        self.refresh().await;
    }

    /// Restrict the list to one status; takes effect on the next refresh
    pub async fn set_status_filter(&self, filter: Option<DocumentStatus>) {
        self.update(|s| s.status_filter = filter).await;
    }

    /// Re-fetch the list; failures render inline
    pub async fn refresh(&self) {
        let filter = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
            state.status_filter
        };
        self.revision.send_modify(|rev| *rev += 1);

        let result = match filter {
            Some(status) => self.api.list_documents_by_status(status).await,
            None => self.api.list_documents().await,
        };

        if let Err(e) = &result {
            warn!("Failed to load documents: {}", e);
        }

        self.update(move |s| {
            match result {
                Ok(documents) => s.documents = documents,
                Err(e) => s.error = Some(e.to_string()),
            }
            s.loading = false;
        })
        .await;
    }

    pub async fn select_file(&self, file: Option<UploadFile>) {
        self.update(|s| s.selected_file = file).await;
    }

    /// Upload the selected file.
    ///
    /// Returns `true` when the backend accepted it; the selection is then
    /// cleared and the list re-fetched. Failures raise an alert. A call while
    /// the control is disabled does nothing.
    pub async fn upload(&self) -> bool {
        let file = {
            let mut state = self.state.write().await;
            if state.uploading {
                return false;
            }
            let Some(file) = state.selected_file.clone() else {
                return false;
            };
            state.uploading = true;
            file
        };
        self.revision.send_modify(|rev| *rev += 1);

        let filename = file.filename.clone();
        let uploaded = match self.api.upload_document(file).await {
            Ok(document) => {
                info!("Uploaded {} as document {}", filename, document.id);
                self.update(|s| s.selected_file = None).await;
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", filename, e);
                self.notifier.alert(&e.to_string());
                false
            }
        };

        self.update(|s| s.uploading = false).await;
        uploaded
    }

    pub async fn render(&self) -> Result<String> {
        let state = self.state.read().await;
        Ok(render_template(
            "document_list.jinja",
            &ListScreen::from_state(&state),
        )?)
    }
}
