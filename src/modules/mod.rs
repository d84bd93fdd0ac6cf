//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for local resources the screens consume, such as files picked for upload.

pub mod files;
