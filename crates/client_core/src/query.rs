//! Seeding a session draft from `?prompt=&sprite=&name=` and building the
//! matching share link.

use shared::domain::{SessionDraft, SpriteCatalog};
use tracing::debug;
use url::form_urlencoded;

pub const PROMPT_PARAM: &str = "prompt";
pub const SPRITE_PARAM: &str = "sprite";
pub const NAME_PARAM: &str = "name";

/// Applies recognized query parameters on top of `defaults`.
///
/// A `sprite` outside the catalog is ignored and the default sprite kept.
pub fn draft_from_query(
    query: &str,
    defaults: &SessionDraft,
    catalog: &SpriteCatalog,
) -> SessionDraft {
    let mut draft = defaults.clone();
    if draft.sprite_folder.is_empty() || !catalog.contains(&draft.sprite_folder) {
        draft.sprite_folder = catalog.default_sprite().to_string();
    }

    let query = query.trim().trim_start_matches('?');
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            PROMPT_PARAM => draft.system_prompt = value.into_owned(),
            NAME_PARAM => draft.name = value.into_owned(),
            SPRITE_PARAM => match catalog.recognize(&value) {
                Some(sprite) => draft.sprite_folder = sprite.to_string(),
                None => debug!(sprite = %value, "ignoring unrecognized sprite"),
            },
            _ => {}
        }
    }

    draft
}

/// Encodes the draft as a query string (no leading `?`).
///
/// `prompt` and `name` are written even when empty so that decoding over
/// deployment defaults gives back the same draft; an empty sprite is left
/// out since only catalog sprites survive decoding.
pub fn draft_to_query(draft: &SessionDraft) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair(PROMPT_PARAM, &draft.system_prompt);
    if !draft.sprite_folder.is_empty() {
        serializer.append_pair(SPRITE_PARAM, &draft.sprite_folder);
    }
    serializer.append_pair(NAME_PARAM, &draft.name);
    serializer.finish()
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
