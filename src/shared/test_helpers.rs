#[cfg(test)]
pub use fakes::*;

#[cfg(test)]
mod fakes {
    use async_trait::async_trait;
    use axum::{
        extract::{Multipart, Path, Request, State},
        http::StatusCode,
        middleware::Next,
        response::Response,
        routing::{get, post},
        Json, Router,
    };
    use chrono::{NaiveDate, NaiveDateTime, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    use crate::core::error::{AppError, Result};
    use crate::features::documents::clients::DocumentsApi;
    use crate::features::documents::dtos::{
        AiSuggestion, Decision, Document, DocumentStatus, HealthStatus, ReviewInput,
        WorkflowStatus,
    };
    use crate::features::documents::views::Notifier;
    use crate::modules::files::UploadFile;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    /// A pending document with no review data
    pub fn sample_document(id: &str, filename: &str) -> Document {
        Document {
            id: id.to_string(),
            filename: filename.to_string(),
            content_type: mime_type_of(filename),
            file_size: 1024,
            status: DocumentStatus::Pending,
            ai_suggestion: None,
            ai_confidence: None,
            ai_reasoning: None,
            reviewer_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            workflow_id: Some(format!("document-approval-{}", id)),
            created_at: fixed_time(),
            updated_at: fixed_time(),
        }
    }

    fn mime_type_of(filename: &str) -> String {
        UploadFile::new(filename, Vec::new()).content_type
    }

    fn apply_decision(doc: &mut Document, decision: Decision, review: &ReviewInput) {
        doc.status = match decision {
            Decision::Approved => DocumentStatus::Approved,
            Decision::Rejected => DocumentStatus::Rejected,
        };
        doc.reviewer_notes = review.reviewer_notes.clone();
        doc.reviewed_by = review.reviewed_by.clone();
        doc.reviewed_at = Some(Utc::now().naive_utc());
        doc.updated_at = Utc::now().naive_utc();
    }

    fn status_of(doc: &Document) -> WorkflowStatus {
        match doc.status {
            DocumentStatus::Pending => WorkflowStatus::waiting(),
            DocumentStatus::Approved => WorkflowStatus::decided(Decision::Approved),
            DocumentStatus::Rejected => WorkflowStatus::decided(Decision::Rejected),
        }
    }

    fn server_error(status: u16) -> AppError {
        AppError::Request {
            status,
            body: "boom".to_string(),
        }
    }

    fn not_found(id: &str) -> AppError {
        AppError::Request {
            status: 404,
            body: format!("Document not found: {}", id),
        }
    }

    // =========================================================================
    // IN-MEMORY API
    // =========================================================================

    /// In-memory `DocumentsApi` with call counters and injectable failures
    #[derive(Default)]
    pub struct FakeDocumentsApi {
        documents: Mutex<Vec<Document>>,
        status_override: Mutex<Option<WorkflowStatus>>,
        decisions: Mutex<Vec<(Decision, ReviewInput)>>,
        decision_gate: Mutex<Option<Arc<Notify>>>,
        next_id: AtomicUsize,

        pub list_calls: AtomicUsize,
        pub filtered_list_calls: AtomicUsize,
        pub get_calls: AtomicUsize,
        pub upload_calls: AtomicUsize,
        pub decision_calls: AtomicUsize,
        pub status_calls: AtomicUsize,

        pub fail_list: AtomicBool,
        pub fail_upload: AtomicBool,
        pub fail_decision: AtomicBool,
        /// Status fetches fail with 503
        pub fail_status: AtomicBool,
    }

    impl FakeDocumentsApi {
        pub fn with_documents(documents: Vec<Document>) -> Self {
            let api = Self::default();
            *api.documents.lock().unwrap() = documents;
            api
        }

        /// Serve this status instead of deriving one from the document
        pub fn set_workflow_status(&self, status: Option<WorkflowStatus>) {
            *self.status_override.lock().unwrap() = status;
        }

        /// Hold every decision call until the returned gate is notified
        pub fn gate_decisions(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.decision_gate.lock().unwrap() = Some(Arc::clone(&gate));
            gate
        }

        pub fn decisions(&self) -> Vec<(Decision, ReviewInput)> {
            self.decisions.lock().unwrap().clone()
        }

        async fn decide(&self, id: &str, decision: Decision, review: ReviewInput) -> Result<Document> {
            self.decision_calls.fetch_add(1, Ordering::SeqCst);
            self.decisions
                .lock()
                .unwrap()
                .push((decision, review.clone()));

            let gate = self.decision_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            if self.fail_decision.load(Ordering::SeqCst) {
                return Err(server_error(500));
            }

            let mut documents = self.documents.lock().unwrap();
            let doc = documents
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| server_error(500))?;
            apply_decision(doc, decision, &review);
            Ok(doc.clone())
        }
    }

    #[async_trait]
    impl DocumentsApi for FakeDocumentsApi {
        async fn upload_document(&self, file: UploadFile) -> Result<Document> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_upload.load(Ordering::SeqCst) {
                return Err(server_error(500));
            }

            let id = format!("up-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            let mut doc = sample_document(&id, &file.filename);
            doc.content_type = file.content_type;
            doc.file_size = file.bytes.len() as u64;
            self.documents.lock().unwrap().push(doc.clone());
            Ok(doc)
        }

        async fn list_documents(&self) -> Result<Vec<Document>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(server_error(500));
            }
            Ok(self.documents.lock().unwrap().clone())
        }

        async fn list_documents_by_status(&self, status: DocumentStatus) -> Result<Vec<Document>> {
            self.filtered_list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(server_error(500));
            }
            Ok(self
                .documents
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.status == status)
                .cloned()
                .collect())
        }

        async fn get_document(&self, id: &str) -> Result<Document> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            self.documents
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == id)
                .cloned()
                .ok_or_else(|| not_found(id))
        }

        async fn approve_document(&self, id: &str, review: ReviewInput) -> Result<Document> {
            self.decide(id, Decision::Approved, review).await
        }

        async fn reject_document(&self, id: &str, review: ReviewInput) -> Result<Document> {
            self.decide(id, Decision::Rejected, review).await
        }

        async fn get_workflow_status(&self, id: &str) -> Result<WorkflowStatus> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_status.load(Ordering::SeqCst) {
                return Err(server_error(503));
            }
            if let Some(status) = *self.status_override.lock().unwrap() {
                return Ok(status);
            }
            self.documents
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == id)
                .map(status_of)
                .ok_or_else(|| not_found(id))
        }

        async fn health(&self) -> Result<HealthStatus> {
            Ok(HealthStatus {
                status: "UP".to_string(),
                service: "DocFlow API".to_string(),
            })
        }
    }

    /// Notifier that keeps every alert for inspection
    #[derive(Default)]
    pub struct RecordingNotifier {
        alerts: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub fn alerts(&self) -> Vec<String> {
            self.alerts.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn alert(&self, message: &str) {
            self.alerts.lock().unwrap().push(message.to_string());
        }
    }

    // =========================================================================
    // FAKE BACKEND OVER HTTP
    // =========================================================================

    #[derive(Default)]
    struct BackendState {
        documents: Vec<Document>,
        decisions: HashMap<String, Decision>,
        last_decision_body: Option<serde_json::Value>,
        request_ids: Vec<String>,
    }

    type SharedBackend = Arc<Mutex<BackendState>>;
    type HandlerError = (StatusCode, String);

    /// Document API served on an ephemeral local port
    pub struct FakeBackend {
        pub base_url: String,
        state: SharedBackend,
    }

    impl FakeBackend {
        /// Insert a pending document directly, bypassing upload
        pub async fn seed(&self, filename: &str) -> Document {
            let doc = sample_document(&uuid::Uuid::new_v4().to_string(), filename);
            self.state.lock().unwrap().documents.push(doc.clone());
            doc
        }

        pub async fn last_decision_body(&self) -> Option<serde_json::Value> {
            self.state.lock().unwrap().last_decision_body.clone()
        }

        pub async fn request_ids(&self) -> Vec<String> {
            self.state.lock().unwrap().request_ids.clone()
        }
    }

    pub async fn spawn_fake_backend() -> FakeBackend {
        let state: SharedBackend = Arc::new(Mutex::new(BackendState::default()));

        let app = Router::new()
            .route("/api/documents", get(list_documents))
            .route("/api/documents/upload", post(upload_document))
            .route("/api/documents/health", get(health))
            .route("/api/documents/status/{status}", get(list_by_status))
            .route("/api/documents/{id}", get(get_document))
            .route("/api/documents/{id}/approve", post(approve_document))
            .route("/api/documents/{id}/reject", post(reject_document))
            .route("/api/documents/{id}/workflow-status", get(workflow_status))
            .layer(axum::middleware::from_fn_with_state(
                Arc::clone(&state),
                record_request_id,
            ))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeBackend {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    async fn record_request_id(
        State(state): State<SharedBackend>,
        request: Request,
        next: Next,
    ) -> Response {
        if let Some(id) = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
        {
            state.lock().unwrap().request_ids.push(id.to_string());
        }
        next.run(request).await
    }

    async fn list_documents(State(state): State<SharedBackend>) -> Json<Vec<Document>> {
        Json(state.lock().unwrap().documents.clone())
    }

    async fn list_by_status(
        State(state): State<SharedBackend>,
        Path(status): Path<String>,
    ) -> std::result::Result<Json<Vec<Document>>, HandlerError> {
        let status = status
            .parse::<DocumentStatus>()
            .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
        let documents = state
            .lock()
            .unwrap()
            .documents
            .iter()
            .filter(|d| d.status == status)
            .cloned()
            .collect();
        Ok(Json(documents))
    }

    async fn get_document(
        State(state): State<SharedBackend>,
        Path(id): Path<String>,
    ) -> std::result::Result<Json<Document>, HandlerError> {
        state
            .lock()
            .unwrap()
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .map(Json)
            .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Document not found: {}", id)))
    }

    async fn upload_document(
        State(state): State<SharedBackend>,
        mut multipart: Multipart,
    ) -> std::result::Result<Json<Document>, HandlerError> {
        let mut upload: Option<(String, String, usize)> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
        {
            if field.name() != Some("file") {
                continue;
            }
            let filename = field.file_name().unwrap_or("unnamed").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            upload = Some((filename, content_type, bytes.len()));
        }

        let (filename, content_type, size) =
            upload.ok_or_else(|| (StatusCode::BAD_REQUEST, "File is required".to_string()))?;
        if size == 0 {
            return Err((StatusCode::BAD_REQUEST, "File is empty".to_string()));
        }

        let mut doc = sample_document(&uuid::Uuid::new_v4().to_string(), &filename);
        doc.content_type = content_type;
        doc.file_size = size as u64;
        doc.ai_suggestion = Some(AiSuggestion::Approve);
        doc.ai_confidence = Some(0.85);
        doc.ai_reasoning = Some("Document appears complete".to_string());

        state.lock().unwrap().documents.push(doc.clone());
        Ok(Json(doc))
    }

    async fn approve_document(
        state: State<SharedBackend>,
        id: Path<String>,
        body: Json<serde_json::Value>,
    ) -> std::result::Result<Json<Document>, HandlerError> {
        record_decision(state, id, body, Decision::Approved)
    }

    async fn reject_document(
        state: State<SharedBackend>,
        id: Path<String>,
        body: Json<serde_json::Value>,
    ) -> std::result::Result<Json<Document>, HandlerError> {
        record_decision(state, id, body, Decision::Rejected)
    }

    fn record_decision(
        State(state): State<SharedBackend>,
        Path(id): Path<String>,
        Json(body): Json<serde_json::Value>,
        decision: Decision,
    ) -> std::result::Result<Json<Document>, HandlerError> {
        let review: ReviewInput = serde_json::from_value(body.clone())
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

        let mut state = state.lock().unwrap();
        state.last_decision_body = Some(body);

        let doc = state
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Document not found: {}", id),
                )
            })?;
        apply_decision(doc, decision, &review);
        let doc = doc.clone();

        state.decisions.insert(id, decision);
        Ok(Json(doc))
    }

    async fn workflow_status(
        State(state): State<SharedBackend>,
        Path(id): Path<String>,
    ) -> std::result::Result<Json<WorkflowStatus>, HandlerError> {
        let state = state.lock().unwrap();
        if !state.documents.iter().any(|d| d.id == id) {
            return Err((StatusCode::NOT_FOUND, format!("Document not found: {}", id)));
        }
        let status = match state.decisions.get(&id) {
            Some(decision) => WorkflowStatus::decided(*decision),
            None => WorkflowStatus::waiting(),
        };
        Ok(Json(status))
    }

    async fn health() -> Json<HealthStatus> {
        Json(HealthStatus {
            status: "UP".to_string(),
            service: "DocFlow API".to_string(),
        })
    }
}
