use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use tempfile::NamedTempFile;

use crate::error::Result;

static NEXT_ARTIFACT_ID: AtomicU64 = AtomicU64::new(1);

/// One synthesized clip, fully written to a temporary `.mp3` file.
///
/// The file lives exactly as long as the artifact: dropping it (for instance
/// when a newer clip replaces it) removes the file from disk.
#[derive(Debug)]
pub struct AudioArtifact {
    id: u64,
    file: NamedTempFile,
    len: u64,
}

impl AudioArtifact {
    /// Write `bytes` to a fresh temp file. Returns only after the data is
    /// flushed, so the path is safe to hand to a decoder.
    pub fn write(bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("read-aloud-")
            .suffix(".mp3")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        file.as_file().sync_all()?;

        let id = NEXT_ARTIFACT_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Artifact #{} written to {} ({} bytes)", id, file.path().display(), bytes.len());

        Ok(Self { id, file, len: bytes.len() as u64 })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size_bytes(&self) -> u64 {
        self.len
    }

    /// Byte-for-byte copy to `dest`, returning the number of bytes copied
    pub fn copy_to(&self, dest: &Path) -> Result<u64> {
        Ok(std::fs::copy(self.path(), dest)?)
    }
}
