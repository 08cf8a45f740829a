mod commands;
mod config;
mod input;
mod surface;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{AutoConfirm, ConfirmPrompt, HttpPostsResource, PostsController};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    commands::{Session, HELP},
    config::{load_settings, DEFAULT_SETTINGS_FILE},
    input::{LineConfirm, LineInput},
    surface::TerminalSurface,
};

#[derive(Parser, Debug)]
#[command(about = "Browse, create and delete posts from the terminal")]
struct Args {
    /// Posts collection URL; overrides the settings file and environment.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    /// Delete without asking for confirmation.
    #[arg(long)]
    yes: bool,
    #[arg(long)]
    request_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(timeout) = args.request_timeout_ms {
        settings.request_timeout_ms = timeout;
    }
    if args.yes {
        settings.auto_confirm = true;
    }
    let resource = HttpPostsResource::new(&settings.api_url, settings.request_timeout())
        .with_context(|| format!("invalid posts URL '{}'", settings.api_url))?;
    info!(api_url = %resource.base_url(), "starting post board");
    let surface = Arc::new(TerminalSurface::new(std::io::stdout()));
    let input = LineInput::stdin();
    let confirm: Arc<dyn ConfirmPrompt> = if settings.auto_confirm {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(LineConfirm::new(input.clone(), surface.clone()))
    };

    let controller = Arc::new(PostsController::new(
        Arc::new(resource),
        surface.clone(),
        confirm,
        settings.controller_options(),
    ));

    surface.print(HELP);
    controller.start().await;
    Session::new(controller, surface, input).run().await?;
    Ok(())
}
