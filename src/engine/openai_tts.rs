use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AudioBytes, SpeechBackend, SynthesisRequest};
use crate::error::{Error, Result};

pub const OPENAI_SPEECH_ENDPOINT: &str = "https://api.openai.com/v1/audio/speech";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("ReadAloud/", env!("CARGO_PKG_VERSION"));

/// JSON body of `POST /v1/audio/speech`
#[derive(Debug, Serialize)]
struct SpeechPayload<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
    speed: f32,
}

impl<'a> SpeechPayload<'a> {
    fn from_request(request: &'a SynthesisRequest) -> Self {
        Self {
            model: request.model(),
            input: request.text(),
            voice: request.voice().as_str(),
            response_format: "mp3",
            speed: request.speed(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI speech endpoint over HTTPS
pub struct OpenAiSpeech {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiSpeech {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::synthesis(e.to_string()))?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechBackend for OpenAiSpeech {
    async fn create_speech(&self, request: &SynthesisRequest) -> Result<AudioBytes> {
        let payload = SpeechPayload::from_request(request);

        let resp = self.client.post(&self.endpoint)
            .bearer_auth(request.credential())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::synthesis(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!("Speech API returned {}", status);
            return Err(Error::synthesis(api_error_message(status.as_u16(), &body)));
        }

        let bytes = resp.bytes()
            .await
            .map_err(|e| Error::synthesis(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Pull the service's own message out of an error body, falling back to the raw text
fn api_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => format!("HTTP {}: {}", status, body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Voice;

    #[test]
    fn payload_matches_speech_api_shape() {
        let req = SynthesisRequest::new("Test.", Voice::Echo, "sk-test").with_speed(1.25);
        let value = serde_json::to_value(SpeechPayload::from_request(&req)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "model": "tts-1",
                "input": "Test.",
                "voice": "echo",
                "response_format": "mp3",
                "speed": 1.25,
            })
        );
    }

    #[test]
    fn error_message_is_extracted_from_json_body() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota"}}"#;
        assert_eq!(api_error_message(429, body), "You exceeded your current quota");
    }

    #[test]
    fn error_message_falls_back_to_status_and_body() {
        assert_eq!(api_error_message(502, "Bad Gateway\n"), "HTTP 502: Bad Gateway");
        assert_eq!(api_error_message(500, ""), "HTTP 500");
    }
}
