use crate::engine::{parse_speed, Voice};
use crate::error::Result;
use crate::persistence;
use crate::state::AppState;

pub fn set_voice(state: &mut AppState, name: &str) -> Result<Voice> {
    let voice: Voice = name.parse()?;
    state.settings.tts.voice = voice;
    state.persisted.tts.voice = voice;
    persist(state);
    Ok(voice)
}

pub fn set_speed(state: &mut AppState, value: &str) -> Result<f32> {
    let speed = parse_speed(value)?;
    state.settings.tts.speed = speed;
    state.persisted.tts.speed = speed;
    persist(state);
    Ok(speed)
}

/// Blank input leaves the model unchanged
pub fn set_model(state: &mut AppState, model: &str) -> String {
    let model = model.trim();
    if !model.is_empty() {
        state.settings.tts.model = model.to_string();
        state.persisted.tts.model = model.to_string();
        persist(state);
    }
    state.settings.tts.model.clone()
}

/// Session-only; the key is never persisted
pub fn set_credential(state: &mut AppState, key: &str) {
    state.credential = key.trim().to_string();
}

/// Writes the stored settings only, so session overrides never reach disk
fn persist(state: &AppState) {
    if let Some(path) = &state.settings_path {
        persistence::save_settings(path, &state.persisted);
    }
}
