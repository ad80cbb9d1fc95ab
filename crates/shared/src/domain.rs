use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LaunchErrorKind;

/// Sprite folder the bot worker animates when nothing else is chosen.
pub const DEFAULT_SPRITE_FOLDER: &str = "parkingmeter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchAttemptId(pub Uuid);

impl LaunchAttemptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LaunchAttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LaunchAttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// User-editable configuration for a single bot launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub system_prompt: String,
    pub name: String,
    pub sprite_folder: String,
}

impl SessionDraft {
    pub fn new(
        system_prompt: impl Into<String>,
        name: impl Into<String>,
        sprite_folder: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            name: name.into(),
            sprite_folder: sprite_folder.into(),
        }
    }
}

/// The sprite folders a launch may pick from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteCatalog {
    default: String,
    known: Vec<String>,
}

impl SpriteCatalog {
    /// Builds a catalog; the default is always part of the recognized set.
    pub fn new(default: impl Into<String>, known: impl IntoIterator<Item = String>) -> Self {
        let default = default.into();
        let mut sprites = vec![default.clone()];
        for sprite in known {
            let sprite = sprite.trim();
            if !sprite.is_empty() && !sprites.iter().any(|known| known == sprite) {
                sprites.push(sprite.to_string());
            }
        }
        Self {
            default,
            known: sprites,
        }
    }

    pub fn default_sprite(&self) -> &str {
        &self.default
    }

    pub fn sprites(&self) -> &[String] {
        &self.known
    }

    pub fn contains(&self, sprite: &str) -> bool {
        self.known.iter().any(|known| known == sprite)
    }

    /// Returns `sprite` when recognized, otherwise `None`.
    pub fn recognize(&self, sprite: &str) -> Option<&str> {
        self.known
            .iter()
            .find(|known| known.as_str() == sprite)
            .map(String::as_str)
    }
}

impl Default for SpriteCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_SPRITE_FOLDER, Vec::new())
    }
}

/// Outcome of one launch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LaunchResult {
    Room {
        room_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    Failure {
        kind: LaunchErrorKind,
        message: String,
    },
}

impl LaunchResult {
    pub fn room_url(&self) -> Option<&str> {
        match self {
            Self::Room { room_url, .. } => Some(room_url),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Room { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}
