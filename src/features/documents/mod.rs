//! Document review feature.
//!
//! Typed client for the document workflow backend plus the two screens that
//! drive it.
//!
//! ## Backend endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/documents/upload` | Upload a file (multipart, field `file`) |
//! | GET | `/api/documents` | List documents |
//! | GET | `/api/documents/status/{status}` | List documents with one status |
//! | GET | `/api/documents/{id}` | Get a document |
//! | POST | `/api/documents/{id}/approve` | Approve a document |
//! | POST | `/api/documents/{id}/reject` | Reject a document |
//! | GET | `/api/documents/{id}/workflow-status` | Workflow decision status |
//! | GET | `/api/documents/health` | Backend liveness |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod views;

pub use clients::HttpDocumentsClient;
pub use handlers::{CommandOutput, DocumentCommands};
pub use views::StderrNotifier;
