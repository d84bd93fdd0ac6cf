mod documents_client;

pub use documents_client::{DocumentsApi, HttpDocumentsClient};
