mod core;
mod features;
mod modules;
mod shared;

use crate::core::cli::{Cli, Command};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::features::documents::dtos::Decision;
use crate::features::documents::{
    CommandOutput, DocumentCommands, HttpDocumentsClient, StderrNotifier,
};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(2);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    // Screens go to stdout, so logs stay on stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    if let Some(api_base) = cli.api_base.as_deref() {
        config = config
            .with_api_base(api_base)
            .map_err(|e| anyhow::anyhow!(e))?;
    }

    tracing::debug!(
        "Configuration loaded: api_base={}, poll_interval={}ms",
        config.api.base_url,
        config.view.poll_interval_ms
    );

    let client = Arc::new(HttpDocumentsClient::new(&config.api)?);
    let commands = DocumentCommands::new(
        client,
        Arc::new(StderrNotifier),
        config.view.poll_interval(),
    );

    let output = match dispatch(&commands, cli.command).await {
        Ok(output) => output,
        Err(e) => {
            if let Some(status) = e.status() {
                tracing::debug!(status, "Backend answered with an error status");
            }
            if e.is_not_found() {
                eprintln!("! No such document on {}: {}", config.api.base_url, e);
            } else {
                eprintln!("! {}", e);
            }
            std::process::exit(1);
        }
    };

    if !output.screen.is_empty() {
        println!("{}", output.screen);
    }

    if !output.success {
        std::process::exit(1);
    }

    Ok(())
}

async fn dispatch(commands: &DocumentCommands, command: Command) -> Result<CommandOutput> {
    match command {
        Command::List(args) => commands.list(args.status).await,
        Command::Upload(args) => commands.upload(&args.path).await,
        Command::Show(args) => commands.show(&args.id).await,
        Command::Approve(args) => {
            commands
                .decide(&args.id, Decision::Approved, &args.reviewer, &args.notes)
                .await
        }
        Command::Reject(args) => {
            commands
                .decide(&args.id, Decision::Rejected, &args.reviewer, &args.notes)
                .await
        }
        Command::Status(args) => commands.status(&args.id).await,
        Command::Watch(args) => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            };

            let output = commands
                .watch(&args.id, args.until_decided, shutdown, |screen| {
                    println!("{}\n", screen);
                })
                .await?;

            // Every frame is already on stdout
            Ok(CommandOutput {
                screen: String::new(),
                ..output
            })
        }
        Command::Health => commands.health().await,
    }
}
