//! Screen template module.
//!
//! Screens render to plain text through Jinja2 templates kept in
//! `templates/screens/` and embedded into the binary at compile time.
//!
//! # Usage
//!
//! ```ignore
//! use crate::shared::templates::render_template;
//!
//! let screen = render_template("document_list.jinja", &context)?;
//! ```

pub mod engine;

pub use engine::{render_template, TemplateError};
