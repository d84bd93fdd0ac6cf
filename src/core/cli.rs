use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::features::documents::dtos::DocumentStatus;

#[derive(Debug, Parser)]
#[command(
    name = "docflow",
    version,
    about = "Review documents in the DocFlow approval workflow"
)]
pub struct Cli {
    /// Backend base URL (overrides DOCFLOW_API_BASE).
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the document list.
    List(ListArgs),
    /// Upload a file and show the refreshed list.
    Upload(UploadArgs),
    /// Show a single document and its workflow status.
    Show(DocumentArgs),
    /// Approve a document.
    Approve(DecisionArgs),
    /// Reject a document.
    Reject(DecisionArgs),
    /// Print the workflow status of a document.
    Status(DocumentArgs),
    /// Keep the document screen open and redraw it as the workflow progresses.
    Watch(WatchArgs),
    /// Check that the backend is reachable.
    Health,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show documents with this status.
    #[arg(long, value_parser = parse_status)]
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct DocumentArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct DecisionArgs {
    pub id: String,

    /// Reviewer name recorded with the decision.
    #[arg(long, default_value = "")]
    pub reviewer: String,

    /// Free-text notes recorded with the decision.
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    pub id: String,

    /// Exit once the workflow reports a decision.
    #[arg(long)]
    pub until_decided: bool,
}

fn parse_status(raw: &str) -> Result<DocumentStatus, String> {
    raw.parse::<DocumentStatus>()
}
