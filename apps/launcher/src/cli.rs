use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{draft_from_query, draft_to_query};
use shared::domain::SessionDraft;
use url::Url;

use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "launcher", about = "Configure a bot session and launch it into a room")]
pub struct Cli {
    /// Base URL of the bot launch service (the one serving /start_bot)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch a bot and print the room link
    Launch {
        #[command(flatten)]
        draft: DraftArgs,
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Offer a manual retry after a failed launch
        #[arg(long)]
        interactive: bool,
    },
    /// Print a link that pre-fills the draft
    ShareLink {
        #[command(flatten)]
        draft: DraftArgs,
        #[arg(long, default_value = "http://localhost:3000/")]
        base: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct DraftArgs {
    /// Query string to seed the draft from, e.g. "prompt=Hi&sprite=parkingmeter&name=Ada"
    #[arg(long)]
    pub query: Option<String>,
    #[arg(long)]
    pub prompt: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub sprite: Option<String>,
}

/// Deployment defaults, then `--query`, then the explicit flags.
pub fn build_draft(args: &DraftArgs, settings: &Settings) -> SessionDraft {
    let catalog = settings.catalog();
    let mut draft = draft_from_query(
        args.query.as_deref().unwrap_or_default(),
        &settings.default_draft(),
        &catalog,
    );

    if let Some(prompt) = &args.prompt {
        draft.system_prompt = prompt.clone();
    }
    if let Some(name) = &args.name {
        draft.name = name.clone();
    }
    if let Some(sprite) = &args.sprite {
        match catalog.recognize(sprite) {
            Some(sprite) => draft.sprite_folder = sprite.to_string(),
            None => tracing::warn!(
                sprite = %sprite,
                known = ?catalog.sprites(),
                "unknown sprite; keeping {}",
                draft.sprite_folder
            ),
        }
    }

    draft
}

pub fn share_link(base: &str, draft: &SessionDraft) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("invalid share link base '{base}'"))?;
    let query = draft_to_query(draft);
    url.set_query((!query.is_empty()).then_some(query.as_str()));
    Ok(url)
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
