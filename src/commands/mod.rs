pub mod settings;
pub mod tts;
