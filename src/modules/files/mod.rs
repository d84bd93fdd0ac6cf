//! Local file access for uploads
//!
//! Reads a file picked by the user into memory and derives the metadata the
//! multipart upload needs (filename and MIME type).

mod local_file;

pub use local_file::UploadFile;
