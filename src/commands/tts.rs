use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::audio::{AudioArtifact, PlaybackState};
use crate::engine::{AudioBytes, SynthesisRequest, Voice};
use crate::error::{Error, Result};
use crate::state::{AppState, AppStatus, DownloadSettings};

/// What the play control should do right now
#[derive(Debug)]
pub enum SpeakAction {
    /// A paused clip was resumed in place
    Resumed,
    /// Audio is already playing; nothing to do
    AlreadyPlaying,
    /// Run this request, then hand the result to [`finish_speak`]
    Synthesize(SynthesisRequest),
}

/// First half of the play control. Resolves the cheap cases immediately and
/// otherwise marks the app as synthesizing and returns the request to run.
pub fn begin_speak(state: &mut AppState) -> Result<SpeakAction> {
    if state.status == AppStatus::Synthesizing {
        return Err(Error::Busy);
    }

    match state.playback.state() {
        PlaybackState::Paused => {
            state.playback.resume();
            return Ok(SpeakAction::Resumed);
        }
        PlaybackState::Playing => return Ok(SpeakAction::AlreadyPlaying),
        PlaybackState::Stopped => {}
    }

    let tts = &state.settings.tts;
    let request = SynthesisRequest::new(state.text.clone(), tts.voice, state.credential.clone())
        .with_model(tts.model.clone())
        .with_speed(tts.speed);

    state.status = AppStatus::Synthesizing;
    Ok(SpeakAction::Synthesize(request))
}

/// Second half of the play control: store the audio and start it
pub fn finish_speak(state: &mut AppState, result: Result<AudioBytes>) -> Result<PlaybackState> {
    state.status = AppStatus::Idle;

    let audio = result?;
    let artifact = AudioArtifact::write(&audio)?;
    state.playback.play(artifact)
}

/// Play control run inline (synthesis awaited on the caller's task)
pub async fn speak_text(state: &mut AppState) -> Result<PlaybackState> {
    match begin_speak(state)? {
        SpeakAction::Resumed | SpeakAction::AlreadyPlaying => Ok(state.playback.state()),
        SpeakAction::Synthesize(request) => {
            let result = state.synthesis.synthesize(&request).await;
            finish_speak(state, result)
        }
    }
}

pub fn pause_speaking(state: &mut AppState) -> PlaybackState {
    state.playback.pause()
}

pub fn resume_speaking(state: &mut AppState) -> PlaybackState {
    state.playback.resume()
}

pub fn stop_speaking(state: &mut AppState) -> PlaybackState {
    state.playback.stop()
}

/// Save the current clip, returning where it was written
pub fn save_audio(state: &AppState, dest: Option<&Path>) -> Result<PathBuf> {
    if !state.playback.has_artifact() {
        return Err(Error::NoArtifact);
    }
    let path = resolve_save_path(&state.settings.download, dest);
    state.playback.download(&path)?;
    Ok(path)
}

/// Directories get the default file name appended; bare names get `.mp3`
pub fn resolve_save_path(settings: &DownloadSettings, dest: Option<&Path>) -> PathBuf {
    let path = match dest {
        Some(p) if p.is_dir() => p.join(&settings.file_name),
        Some(p) => p.to_path_buf(),
        None => settings
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&settings.file_name),
    };

    if path.extension().is_none() {
        path.with_extension("mp3")
    } else {
        path
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: AppStatus,
    pub playback: PlaybackState,
    pub voice: Voice,
    pub model: String,
    pub speed: f32,
    pub has_credential: bool,
    pub text_chars: usize,
    pub clip_bytes: Option<u64>,
}

pub fn get_status(state: &AppState) -> StatusReport {
    StatusReport {
        status: state.status,
        playback: state.playback.state(),
        voice: state.settings.tts.voice,
        model: state.settings.tts.model.clone(),
        speed: state.settings.tts.speed,
        has_credential: !state.credential.trim().is_empty(),
        text_chars: state.text.chars().count(),
        clip_bytes: state.playback.current_artifact().map(|a| a.size_bytes()),
    }
}
