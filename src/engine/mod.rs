pub mod openai_tts;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

pub const DEFAULT_MODEL: &str = "tts-1";
pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 4.0;

/// Complete synthesized audio (MP3 container)
pub type AudioBytes = Vec<u8>;

/// Voices accepted by the speech service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    /// Name used on the wire and in the console
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::Alloy
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| Error::InvalidVoice(s.trim().to_string()))
    }
}

/// Parse a playback speed, rejecting values the service would refuse
pub fn parse_speed(s: &str) -> Result<f32> {
    let speed: f32 = s.trim().parse().map_err(|_| Error::InvalidSpeed(s.trim().to_string()))?;
    if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
        return Err(Error::InvalidSpeed(s.trim().to_string()));
    }
    Ok(speed)
}

/// One text-to-speech call. Built per request and never mutated afterwards.
#[derive(Clone)]
pub struct SynthesisRequest {
    text: String,
    voice: Voice,
    credential: String,
    model: String,
    speed: f32,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice: Voice, credential: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice,
            credential: credential.into(),
            model: DEFAULT_MODEL.to_string(),
            speed: 1.0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Out-of-range speeds are clamped into what the service accepts
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}

// Keep the API key out of logs.
impl fmt::Debug for SynthesisRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisRequest")
            .field("text_len", &self.text.len())
            .field("voice", &self.voice)
            .field("credential", &"<redacted>")
            .field("model", &self.model)
            .field("speed", &self.speed)
            .finish()
    }
}

/// Remote text -> audio service
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn create_speech(&self, request: &SynthesisRequest) -> Result<AudioBytes>;
}

/// Validates requests and performs exactly one backend round trip per call.
/// No retries: any failure is returned to the caller unchanged.
#[derive(Clone)]
pub struct SynthesisClient {
    backend: Arc<dyn SpeechBackend>,
}

impl SynthesisClient {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self { backend }
    }

    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioBytes> {
        if request.credential().trim().is_empty() {
            return Err(Error::MissingCredential);
        }
        if request.text().trim().is_empty() {
            return Err(Error::EmptyText);
        }

        tracing::info!(
            "Synthesizing {} chars with voice '{}' (model {})",
            request.text().chars().count(),
            request.voice(),
            request.model()
        );

        let audio = match self.backend.create_speech(request).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::error!("Synthesis failed: {}", e);
                return Err(e);
            }
        };

        if audio.is_empty() {
            tracing::error!("Synthesis returned an empty body");
            return Err(Error::synthesis("the service returned no audio"));
        }

        tracing::info!("Synthesis complete: {} bytes", audio.len());
        Ok(audio)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Backend double that records every call and replays a canned reply
    pub struct FakeBackend {
        reply: std::result::Result<AudioBytes, String>,
        pub calls: Mutex<Vec<(String, Voice)>>,
    }

    impl FakeBackend {
        pub fn returning(bytes: &[u8]) -> Arc<Self> {
            Arc::new(Self { reply: Ok(bytes.to_vec()), calls: Mutex::new(Vec::new()) })
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self { reply: Err(message.to_string()), calls: Mutex::new(Vec::new()) })
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SpeechBackend for FakeBackend {
        async fn create_speech(&self, request: &SynthesisRequest) -> Result<AudioBytes> {
            self.calls.lock().unwrap().push((request.text().to_string(), request.voice()));
            self.reply.clone().map_err(Error::synthesis)
        }
    }
}
