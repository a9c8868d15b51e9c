use std::path::PathBuf;

use serde::{Serialize, Deserialize};

use crate::audio::PlaybackController;
use crate::engine::openai_tts::OPENAI_SPEECH_ENDPOINT;
use crate::engine::{SynthesisClient, Voice, DEFAULT_MODEL};

pub const DEFAULT_FILE_NAME: &str = "tts_audio.mp3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Idle,
    Synthesizing,
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Everything the console works on. Owned by the console loop and passed
/// by `&mut` into the command functions.
pub struct AppState {
    pub status: AppStatus,
    /// Effective settings for this session, including command-line overrides
    pub settings: Settings,
    /// Settings as stored on disk; the only copy that is ever written back
    pub persisted: Settings,
    /// API key for this session only; never written to the settings file
    pub credential: String,
    pub text: String,
    pub playback: PlaybackController,
    pub synthesis: SynthesisClient,
    /// Where settings changes are persisted; `None` keeps them in memory
    pub settings_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(settings: Settings, playback: PlaybackController, synthesis: SynthesisClient) -> Self {
        Self {
            status: AppStatus::default(),
            persisted: settings.clone(),
            settings,
            credential: String::new(),
            text: String::new(),
            playback,
            synthesis,
            settings_path: None,
        }
    }

    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub tts: TtsSettings,
    #[serde(default)]
    pub download: DownloadSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsSettings {
    pub model: String,
    pub voice: Voice,
    pub speed: f32,
    pub endpoint: String,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            voice: Voice::default(),
            speed: 1.0,
            endpoint: OPENAI_SPEECH_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSettings {
    pub file_name: String,
    /// Where `save` writes when no path is given; current directory if unset
    pub directory: Option<PathBuf>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"tts":{"model":"tts-1-hd","voice":"onyx","speed":1.0,"endpoint":"http://localhost"}}"#).unwrap();

        assert_eq!(settings.tts.voice, Voice::Onyx);
        assert_eq!(settings.download.file_name, DEFAULT_FILE_NAME);
    }
}
