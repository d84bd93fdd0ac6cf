use std::path::Path;
use tracing::debug;

use crate::core::error::{AppError, Result};

/// Extensions offered by the upload picker besides PDFs and images
pub const ACCEPTED_EXTENSIONS: &[&str] = &["doc", "docx", "txt"];

/// A file selected for upload, held in memory
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    /// Build from raw parts; the MIME type is guessed from the filename
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Self {
            filename,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk
    pub async fn from_path(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                AppError::Validation(format!("'{}' does not name a file", path.display()))
            })?;

        let bytes = tokio::fs::read(path).await?;
        let file = Self::new(filename, bytes);

        debug!(
            "Loaded {} ({}, {} bytes)",
            file.filename,
            file.content_type,
            file.size()
        );

        Ok(file)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Fail unless the file is a type the upload form offers
    pub fn ensure_accepted(&self) -> Result<()> {
        if is_accepted(&self.content_type, &self.filename) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "'{}' ({}) is not an accepted document type; use a PDF, an image, or a .doc/.docx/.txt file",
                self.filename, self.content_type
            )))
        }
    }
}

/// Mirrors the upload picker: PDFs, any image, and a few office/text extensions
pub fn is_accepted(content_type: &str, filename: &str) -> bool {
    if content_type == "application/pdf" || content_type.starts_with("image/") {
        return true;
    }

    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}
