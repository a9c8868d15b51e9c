//! Error types surfaced to the console.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a speak/transport/save command can report.
///
/// None of these are fatal: the surface prints them and keeps running.
#[derive(Error, Debug)]
pub enum Error {
    /// No API key was entered.
    #[error("please enter an OpenAI API key")]
    MissingCredential,

    /// The text buffer is empty.
    #[error("nothing to read: the text is empty")]
    EmptyText,

    /// The remote speech service failed. The message is passed through as-is.
    #[error("error reading the text: {message}")]
    Synthesis { message: String },

    /// Save requested before any audio was synthesized.
    #[error("nothing to save: no audio has been generated yet")]
    NoArtifact,

    /// A synthesis request is already outstanding.
    #[error("a synthesis request is already in progress")]
    Busy,

    /// Output device or decoder failure.
    #[error("audio output error: {0}")]
    AudioOutput(String),

    #[error("unknown voice '{0}' (expected one of: alloy, echo, fable, onyx, nova, shimmer)")]
    InvalidVoice(String),

    #[error("invalid speed '{0}' (expected a number between 0.25 and 4.0)")]
    InvalidSpeed(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis { message: message.into() }
    }
}
