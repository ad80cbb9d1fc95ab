use serde::{Deserialize, Serialize};

use crate::domain::SessionDraft;

pub const START_BOT_PATH: &str = "/start_bot";

/// Body of `POST /start_bot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartBotRequest {
    pub system_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&SessionDraft> for StartBotRequest {
    fn from(draft: &SessionDraft) -> Self {
        Self {
            system_prompt: draft.system_prompt.clone(),
            sprite_folder: non_empty(&draft.sprite_folder),
            name: non_empty(&draft.name),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartBotResponse {
    pub room_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
