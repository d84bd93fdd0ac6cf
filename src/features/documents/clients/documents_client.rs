use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::core::config::ApiConfig;
use crate::core::error::{AppError, Result};
use crate::features::documents::dtos::{
    Decision, DecisionRequest, Document, DocumentStatus, HealthStatus, ReviewInput,
    WorkflowStatus,
};
use crate::modules::files::UploadFile;

/// Operations the screens need from the document workflow backend
#[async_trait]
pub trait DocumentsApi: Send + Sync {
    async fn upload_document(&self, file: UploadFile) -> Result<Document>;

    async fn list_documents(&self) -> Result<Vec<Document>>;

    async fn list_documents_by_status(&self, status: DocumentStatus) -> Result<Vec<Document>>;

    async fn get_document(&self, id: &str) -> Result<Document>;

    async fn approve_document(&self, id: &str, review: ReviewInput) -> Result<Document>;

    async fn reject_document(&self, id: &str, review: ReviewInput) -> Result<Document>;

    async fn get_workflow_status(&self, id: &str) -> Result<WorkflowStatus>;

    async fn health(&self) -> Result<HealthStatus>;
}

/// `DocumentsApi` over HTTP
pub struct HttpDocumentsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpDocumentsClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    fn documents_url(&self) -> String {
        format!("{}/api/documents", self.base_url)
    }

    fn document_url(&self, id: &str, suffix: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.documents_url(), urlencoding::encode(id));
        if let Some(suffix) = suffix {
            url.push('/');
            url.push_str(suffix);
        }
        url
    }

    /// Send a request tagged with a fresh request id and decode the JSON reply
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let request_id = Uuid::now_v7().to_string();
        tracing::debug!(request_id = %request_id, "{}", what);

        let response = request
            .header("x-request-id", &request_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(request_id = %request_id, "{} failed: {}", what, e);
                AppError::Transport(format!("{} failed: {}", what, e))
            })?;

        handle(response, what).await
    }

    async fn decide(&self, id: &str, decision: Decision, review: ReviewInput) -> Result<Document> {
        let body = DecisionRequest::new(decision, review);
        let request = self
            .http_client
            .post(self.document_url(id, Some(decision.action())))
            .json(&body);

        self.execute(request, &format!("{} document {}", decision.action(), id))
            .await
    }
}

/// Non-2xx replies become `AppError::Request` carrying the status and raw body
async fn handle<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("{} answered HTTP {} - {}", what, status, body);
        return Err(AppError::Request {
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().await.map_err(|e| {
        tracing::error!("Failed to parse response of {}: {}", what, e);
        AppError::Decode(format!("{}: {}", what, e))
    })
}

#[async_trait]
impl DocumentsApi for HttpDocumentsClient {
    async fn upload_document(&self, file: UploadFile) -> Result<Document> {
        let what = format!("upload {}", file.filename);
        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|e| AppError::Validation(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part("file", part);

        let request = self
            .http_client
            .post(format!("{}/upload", self.documents_url()))
            .multipart(form);

        self.execute(request, &what).await
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let request = self.http_client.get(self.documents_url());
        self.execute(request, "list documents").await
    }

    async fn list_documents_by_status(&self, status: DocumentStatus) -> Result<Vec<Document>> {
        let request = self
            .http_client
            .get(format!("{}/status/{}", self.documents_url(), status));
        self.execute(request, &format!("list {} documents", status))
            .await
    }

    async fn get_document(&self, id: &str) -> Result<Document> {
        let request = self.http_client.get(self.document_url(id, None));
        self.execute(request, &format!("get document {}", id)).await
    }

    async fn approve_document(&self, id: &str, review: ReviewInput) -> Result<Document> {
        self.decide(id, Decision::Approved, review).await
    }

    async fn reject_document(&self, id: &str, review: ReviewInput) -> Result<Document> {
        self.decide(id, Decision::Rejected, review).await
    }

    async fn get_workflow_status(&self, id: &str) -> Result<WorkflowStatus> {
        let request = self
            .http_client
            .get(self.document_url(id, Some("workflow-status")));
        self.execute(request, &format!("get workflow status {}", id))
            .await
    }

    async fn health(&self) -> Result<HealthStatus> {
        let request = self.http_client.get(format!("{}/health", self.documents_url()));
        self.execute(request, "health check").await
    }
}
