use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::{SessionDraft, SpriteCatalog, DEFAULT_SPRITE_FOLDER};

pub const SETTINGS_FILE: &str = "launcher.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub system_prompt: String,
    pub bot_name: String,
    pub default_sprite: String,
    pub sprites: Vec<String>,
    pub launch_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:7860".into(),
            system_prompt: String::new(),
            bot_name: "Chatbot".into(),
            default_sprite: DEFAULT_SPRITE_FOLDER.into(),
            sprites: Vec::new(),
            launch_timeout_secs: 120,
        }
    }
}

impl Settings {
    pub fn catalog(&self) -> SpriteCatalog {
        SpriteCatalog::new(self.default_sprite.clone(), self.sprites.clone())
    }

    pub fn default_draft(&self) -> SessionDraft {
        SessionDraft::new(
            self.system_prompt.clone(),
            self.bot_name.clone(),
            self.default_sprite.clone(),
        )
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    system_prompt: Option<String>,
    bot_name: Option<String>,
    default_sprite: Option<String>,
    sprites: Option<Vec<String>>,
    launch_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(Path::new(SETTINGS_FILE)) {
        match apply_file(&mut settings, &raw) {
            Ok(()) => tracing::debug!(file = SETTINGS_FILE, "loaded launcher settings file"),
            Err(err) => {
                tracing::warn!(file = SETTINGS_FILE, %err, "ignoring unreadable settings file")
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<(), toml::de::Error> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.backend_url {
        settings.backend_url = v;
    }
    if let Some(v) = file_cfg.system_prompt {
        settings.system_prompt = v;
    }
    if let Some(v) = file_cfg.bot_name {
        settings.bot_name = v;
    }
    if let Some(v) = file_cfg.default_sprite {
        settings.default_sprite = v;
    }
    if let Some(v) = file_cfg.sprites {
        settings.sprites = v;
    }
    if let Some(v) = file_cfg.launch_timeout_secs {
        settings.launch_timeout_secs = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BOT_LAUNCH_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = lookup("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = lookup("SYSTEM_PROMPT") {
        settings.system_prompt = v;
    }
    if let Some(v) = lookup("APP__SYSTEM_PROMPT") {
        settings.system_prompt = v;
    }

    if let Some(v) = lookup("BOT_NAME") {
        settings.bot_name = v;
    }
    if let Some(v) = lookup("APP__BOT_NAME") {
        settings.bot_name = v;
    }

    if let Some(v) = lookup("APP__DEFAULT_SPRITE") {
        settings.default_sprite = v;
    }
    if let Some(v) = lookup("APP__SPRITES") {
        settings.sprites = v
            .split(',')
            .map(str::trim)
            .filter(|sprite| !sprite.is_empty())
            .map(str::to_string)
            .collect();
    }

    if let Some(v) = lookup("APP__LAUNCH_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.launch_timeout_secs = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
