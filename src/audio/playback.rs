use std::path::Path;

use serde::{Serialize, Deserialize};

use super::{AudioArtifact, AudioOutput};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

/// Owns the current clip and the play/pause/stop state on top of one output.
///
/// The internal state is authoritative for explicit pause and stop. The
/// output's busy flag is only consulted while `Playing`, to notice a clip
/// that ran to its end.
pub struct PlaybackController {
    output: Box<dyn AudioOutput>,
    current: Option<AudioArtifact>,
    state: PlaybackState,
}

impl PlaybackController {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output,
            current: None,
            state: PlaybackState::Stopped,
        }
    }

    pub fn state(&self) -> PlaybackState {
        if self.state == PlaybackState::Playing && !self.output.is_busy() {
            PlaybackState::Stopped
        } else {
            self.state
        }
    }

    pub fn current_artifact(&self) -> Option<&AudioArtifact> {
        self.current.as_ref()
    }

    pub fn has_artifact(&self) -> bool {
        self.current.is_some()
    }

    fn reconcile(&mut self) {
        if self.state == PlaybackState::Playing && !self.output.is_busy() {
            tracing::info!("Playback reached the end of the clip");
            self.state = PlaybackState::Stopped;
        }
    }

    /// Start a newly synthesized clip.
    ///
    /// While something is already playing this is a no-op and `artifact` is
    /// discarded. From `Paused` or `Stopped` the new clip replaces the current
    /// one and starts from the beginning.
    pub fn play(&mut self, artifact: AudioArtifact) -> Result<PlaybackState> {
        self.reconcile();
        if self.state == PlaybackState::Playing {
            tracing::warn!("Already playing; ignoring clip #{}", artifact.id());
            return Ok(self.state);
        }
        self.start(artifact)
    }

    /// Play the current clip again: resumes in place when paused, does nothing
    /// while playing, reloads from the start when stopped.
    pub fn replay(&mut self) -> Result<PlaybackState> {
        self.reconcile();
        match self.state {
            PlaybackState::Playing => Ok(self.state),
            PlaybackState::Paused => Ok(self.resume()),
            PlaybackState::Stopped => match self.current.take() {
                Some(artifact) => self.start(artifact),
                None => Ok(self.state),
            },
        }
    }

    fn start(&mut self, artifact: AudioArtifact) -> Result<PlaybackState> {
        let loaded = self.output.load(artifact.path());

        // A clip that failed to load is still the latest one; it stays
        // available for saving.
        self.current = Some(artifact);

        if let Err(e) = loaded {
            tracing::error!("Failed to load clip: {}", e);
            self.state = PlaybackState::Stopped;
            return Err(e);
        }

        self.output.play();
        self.state = PlaybackState::Playing;
        if let Some(current) = &self.current {
            tracing::info!("Playing clip #{} ({} bytes)", current.id(), current.size_bytes());
        }
        Ok(self.state)
    }

    /// Toggle: pauses while playing, resumes while paused.
    pub fn pause(&mut self) -> PlaybackState {
        self.reconcile();
        if self.current.is_none() {
            return self.state;
        }
        match self.state {
            PlaybackState::Playing => {
                self.output.pause();
                self.state = PlaybackState::Paused;
                tracing::info!("Playback paused");
            }
            PlaybackState::Paused => {
                self.output.unpause();
                self.state = PlaybackState::Playing;
                tracing::info!("Playback resumed");
            }
            PlaybackState::Stopped => {
                tracing::debug!("Pause ignored: nothing is playing");
            }
        }
        self.state
    }

    pub fn resume(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Paused && self.current.is_some() {
            self.output.unpause();
            self.state = PlaybackState::Playing;
            tracing::info!("Playback resumed");
        }
        self.state
    }

    pub fn stop(&mut self) -> PlaybackState {
        self.output.stop();
        if self.state != PlaybackState::Stopped {
            tracing::info!("Playback stopped");
        }
        self.state = PlaybackState::Stopped;
        self.state
    }

    /// Copy the current clip to `dest`
    pub fn download(&self, dest: &Path) -> Result<u64> {
        let artifact = self.current.as_ref().ok_or(Error::NoArtifact)?;
        let bytes = artifact.copy_to(dest)?;
        tracing::info!("Saved clip #{} to {} ({} bytes)", artifact.id(), dest.display(), bytes);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::testing::{Call, FakeOutput};

    fn controller() -> (PlaybackController, FakeOutput) {
        let output = FakeOutput::default();
        (PlaybackController::new(Box::new(output.clone())), output)
    }

    fn clip(bytes: &[u8]) -> AudioArtifact {
        AudioArtifact::write(bytes).unwrap()
    }

    #[test]
    fn starts_stopped_without_artifact() {
        let (ctl, _) = controller();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(!ctl.has_artifact());
    }

    #[test]
    fn play_loads_and_starts() {
        let (mut ctl, out) = controller();
        let artifact = clip(b"a");
        let path = artifact.path().to_path_buf();

        assert_eq!(ctl.play(artifact).unwrap(), PlaybackState::Playing);
        assert_eq!(out.log.borrow().calls, vec![Call::Load(path), Call::Play]);
    }

    #[test]
    fn pause_then_toggle_resumes_without_reload() {
        let (mut ctl, out) = controller();
        ctl.play(clip(b"a")).unwrap();
        let id = ctl.current_artifact().unwrap().id();

        assert_eq!(ctl.pause(), PlaybackState::Paused);
        assert_eq!(out.last_call(), Some(Call::Pause));

        assert_eq!(ctl.pause(), PlaybackState::Playing);
        assert_eq!(out.last_call(), Some(Call::Unpause));
        assert_eq!(out.loads(), 1);
        assert_eq!(ctl.current_artifact().unwrap().id(), id);
    }

    #[test]
    fn pause_then_resume_returns_to_playing() {
        let (mut ctl, out) = controller();
        ctl.play(clip(b"a")).unwrap();

        ctl.pause();
        assert_eq!(ctl.resume(), PlaybackState::Playing);
        assert_eq!(out.loads(), 1);
    }

    #[test]
    fn resume_is_a_no_op_unless_paused() {
        let (mut ctl, out) = controller();
        ctl.play(clip(b"a")).unwrap();

        assert_eq!(ctl.resume(), PlaybackState::Playing);
        assert_eq!(out.last_call(), Some(Call::Play));
    }

    #[test]
    fn stop_from_any_state_clears_pause() {
        for pause_first in [false, true] {
            let (mut ctl, out) = controller();
            ctl.play(clip(b"a")).unwrap();
            if pause_first {
                ctl.pause();
            }

            assert_eq!(ctl.stop(), PlaybackState::Stopped);
            assert_eq!(out.last_call(), Some(Call::Stop));

            // Paused flag is gone: pause no longer resumes anything
            assert_eq!(ctl.pause(), PlaybackState::Stopped);
        }
    }

    #[test]
    fn stop_when_idle_still_reaches_output() {
        let (mut ctl, out) = controller();
        assert_eq!(ctl.stop(), PlaybackState::Stopped);
        assert_eq!(out.last_call(), Some(Call::Stop));
    }

    #[test]
    fn replay_while_playing_does_not_reload() {
        let (mut ctl, out) = controller();
        ctl.play(clip(b"a")).unwrap();

        assert_eq!(ctl.replay().unwrap(), PlaybackState::Playing);
        assert_eq!(out.loads(), 1);
    }

    #[test]
    fn play_while_playing_keeps_current_clip() {
        let (mut ctl, out) = controller();
        ctl.play(clip(b"a")).unwrap();
        let id = ctl.current_artifact().unwrap().id();

        ctl.play(clip(b"b")).unwrap();

        assert_eq!(out.loads(), 1);
        assert_eq!(ctl.current_artifact().unwrap().id(), id);
    }

    #[test]
    fn replay_while_paused_resumes_in_place() {
        let (mut ctl, out) = controller();
        ctl.play(clip(b"a")).unwrap();
        ctl.pause();

        assert_eq!(ctl.replay().unwrap(), PlaybackState::Playing);
        assert_eq!(out.last_call(), Some(Call::Unpause));
        assert_eq!(out.loads(), 1);
    }

    #[test]
    fn new_clip_while_paused_replaces_old_one() {
        let (mut ctl, out) = controller();
        ctl.play(clip(b"a")).unwrap();
        let old_path = ctl.current_artifact().unwrap().path().to_path_buf();
        ctl.pause();

        ctl.play(clip(b"b")).unwrap();

        assert_eq!(ctl.state(), PlaybackState::Playing);
        assert_eq!(out.loads(), 2);
        assert!(!old_path.exists(), "retired clip should be cleaned up");
    }

    #[test]
    fn finished_track_reads_as_stopped_and_reloads_on_replay() {
        let (mut ctl, out) = controller();
        ctl.play(clip(b"a")).unwrap();

        out.finish_track();
        assert_eq!(ctl.state(), PlaybackState::Stopped);

        assert_eq!(ctl.replay().unwrap(), PlaybackState::Playing);
        assert_eq!(out.loads(), 2);
    }

    #[test]
    fn paused_state_ignores_busy_flag() {
        let (mut ctl, out) = controller();
        ctl.play(clip(b"a")).unwrap();
        ctl.pause();
        out.finish_track();

        assert_eq!(ctl.state(), PlaybackState::Paused);
    }

    #[test]
    fn controls_without_artifact_are_no_ops() {
        let (mut ctl, out) = controller();

        assert_eq!(ctl.pause(), PlaybackState::Stopped);
        assert_eq!(ctl.resume(), PlaybackState::Stopped);
        assert_eq!(ctl.replay().unwrap(), PlaybackState::Stopped);
        assert!(out.log.borrow().calls.is_empty());
    }

    #[test]
    fn load_failure_leaves_controller_stopped() {
        let (mut ctl, out) = controller();
        out.log.borrow_mut().fail_load = true;

        let err = ctl.play(clip(b"not audio")).unwrap_err();

        assert!(matches!(err, Error::AudioOutput(_)));
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(ctl.has_artifact());
    }

    #[test]
    fn download_without_artifact_writes_nothing() {
        let (ctl, _) = controller();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tts_audio.mp3");

        assert!(matches!(ctl.download(&dest), Err(Error::NoArtifact)));
        assert!(!dest.exists());
    }

    #[test]
    fn download_copies_current_clip() {
        let (mut ctl, _) = controller();
        ctl.play(clip(b"mp3 bytes")).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tts_audio.mp3");

        assert_eq!(ctl.download(&dest).unwrap(), 9);
        assert_eq!(std::fs::read(&dest).unwrap(), b"mp3 bytes");
    }
}
