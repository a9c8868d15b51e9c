use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::error::{Error, Result};

/// Local decode/output device. Holds at most one loaded clip.
pub trait AudioOutput {
    /// Replace whatever is loaded with the clip at `path`, ready but not playing
    fn load(&mut self, path: &Path) -> Result<()>;
    fn play(&mut self);
    fn pause(&mut self);
    fn unpause(&mut self);
    fn stop(&mut self);
    /// True while a loaded clip still has audio left (paused counts as busy)
    fn is_busy(&self) -> bool;
}

/// Default output device through rodio.
///
/// Not `Send`: the output stream must stay on the thread that opened it.
pub struct RodioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl RodioOutput {
    pub fn new() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| Error::AudioOutput(format!("no output device available: {}", e)))?;
        tracing::info!("Audio output opened on default device");
        Ok(Self { _stream: stream, handle, sink: None })
    }
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, path: &Path) -> Result<()> {
        // Drop the previous sink first so its file handle is released
        self.sink = None;

        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| Error::AudioOutput(format!("cannot decode {}: {}", path.display(), e)))?;

        let sink = Sink::try_new(&self.handle)
            .map_err(|e| Error::AudioOutput(e.to_string()))?;
        sink.pause();
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn unpause(&mut self) {
        self.play();
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_busy(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}
