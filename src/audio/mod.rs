pub mod artifact;
pub mod output;
pub mod playback;

pub use artifact::AudioArtifact;
pub use output::{AudioOutput, RodioOutput};
pub use playback::{PlaybackController, PlaybackState};
