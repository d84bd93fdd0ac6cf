use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::shared::types::local_datetime;

/// Review state of a document as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Pending => write!(f, "pending"),
            DocumentStatus::Approved => write!(f, "approved"),
            DocumentStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(DocumentStatus::Pending),
            "approved" => Ok(DocumentStatus::Approved),
            "rejected" => Ok(DocumentStatus::Rejected),
            other => Err(format!(
                "invalid status '{}' (expected pending, approved or rejected)",
                other
            )),
        }
    }
}

/// Disposition proposed by the AI analysis step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiSuggestion {
    #[serde(alias = "approved")]
    Approve,
    #[serde(alias = "rejected")]
    Reject,
}

impl std::fmt::Display for AiSuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiSuggestion::Approve => write!(f, "approve"),
            AiSuggestion::Reject => write!(f, "reject"),
        }
    }
}

/// A reviewer's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Path segment of the decision endpoint (`/api/documents/{id}/<segment>`)
    pub fn action(&self) -> &'static str {
        match self {
            Decision::Approved => "approve",
            Decision::Rejected => "reject",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Approved => write!(f, "approved"),
            Decision::Rejected => write!(f, "rejected"),
        }
    }
}

/// Document as returned by every document endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    /// Size of the uploaded file in bytes
    pub file_size: u64,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_suggestion: Option<AiSuggestion>,
    /// Confidence of the AI suggestion, 0 to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(
        default,
        with = "local_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub reviewed_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(with = "local_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(with = "local_datetime")]
    pub updated_at: NaiveDateTime,
}

impl Document {
    /// AI confidence as a whole percentage, only when a suggestion exists.
    /// A suggestion without a confidence counts as 0%.
    pub fn ai_confidence_percent(&self) -> Option<i64> {
        self.ai_suggestion
            .map(|_| (self.ai_confidence.unwrap_or(0.0) * 100.0).round() as i64)
    }
}

/// Reviewer input attached to a decision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

impl ReviewInput {
    /// Build from raw form fields; an empty field means "not provided"
    pub fn from_form(notes: &str, reviewer: &str) -> Self {
        Self {
            reviewer_notes: non_empty(notes),
            reviewed_by: non_empty(reviewer),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Body of the approve/reject endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub decision: Decision,
    #[serde(flatten)]
    pub review: ReviewInput,
}

impl DecisionRequest {
    pub fn new(decision: Decision, review: ReviewInput) -> Self {
        Self { decision, review }
    }
}

/// Read-only projection of the backend workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    pub has_decision: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
}

#[cfg(test)]
impl WorkflowStatus {
    pub fn waiting() -> Self {
        Self {
            has_decision: false,
            decision: None,
        }
    }

    pub fn decided(decision: Decision) -> Self {
        Self {
            has_decision: true,
            decision: Some(decision),
        }
    }
}

/// Backend liveness probe response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}
