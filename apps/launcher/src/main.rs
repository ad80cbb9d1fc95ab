use std::{io::Write as _, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{HttpBotLaunchTransport, LaunchController, LaunchEvent, LaunchPhase};
use shared::domain::SessionDraft;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod view;

use cli::{build_draft, share_link, Cli, Command};
use config::load_settings;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(backend_url) = cli.backend_url {
        settings.backend_url = backend_url;
    }

    match cli.command {
        Command::Launch {
            draft,
            timeout_secs,
            interactive,
        } => {
            let timeout = timeout_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| settings.launch_timeout());
            let draft = build_draft(&draft, &settings);
            let transport = HttpBotLaunchTransport::new(&settings.backend_url)?;
            info!(
                endpoint = %transport.endpoint(),
                timeout_secs = timeout.as_secs(),
                "bot launch service"
            );

            let controller =
                LaunchController::new_with_options(Arc::new(transport), draft.clone(), timeout);
            run_launch(controller, draft, interactive).await
        }
        Command::ShareLink { draft, base } => {
            let draft = build_draft(&draft, &settings);
            println!("{}", share_link(&base, &draft)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_launch(
    controller: Arc<LaunchController>,
    draft: SessionDraft,
    interactive: bool,
) -> Result<ExitCode> {
    let mut events = controller.subscribe();
    let mut stdin = BufReader::new(tokio::io::stdin());

    loop {
        let launch = tokio::spawn({
            let controller = controller.clone();
            let draft = draft.clone();
            async move { controller.launch(draft).await }
        });

        let settled = loop {
            match events.recv().await {
                Ok(LaunchEvent::StateChanged(state)) => {
                    println!("{}", view::render(&state));
                    if matches!(state.phase(), LaunchPhase::RoomCreated | LaunchPhase::Error) {
                        break state.phase();
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "launch events lagged");
                }
                Err(RecvError::Closed) => bail!("launch controller stopped emitting events"),
            }
        };
        launch.await?;

        if settled == LaunchPhase::RoomCreated {
            return Ok(ExitCode::SUCCESS);
        }
        if !interactive || !confirm_retry(&mut stdin).await? {
            return Ok(ExitCode::FAILURE);
        }
        controller.reset().await;
    }
}

async fn confirm_retry<R>(input: &mut BufReader<R>) -> Result<bool>
where
    R: tokio::io::AsyncRead + Unpin,
{
    print!("Retry? [y/N] ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(false);
    }
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
