/*!
 * Transcription service clients.
 *
 * - Mistral: hosted Voxtral speech-to-text API
 * - Mock: scripted transcriber for tests
 * - Upload: per-segment upload progress reporting
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::TranscriptionError;
use crate::subtitle::TranscriptCue;

pub use upload::{UploadProgress, UploadTracker};

/// Common trait for speech-to-text services
///
/// Implementations receive one audio chunk at a time and return cues whose
/// times are relative to the start of that chunk.
#[async_trait]
pub trait Transcriber: Send + Sync + Debug {
    /// Transcribe one chunk file
    ///
    /// # Arguments
    /// * `chunk_path` - WAV file to transcribe
    /// * `language` - Optional ISO 639-1 hint; services may ignore it
    async fn transcribe(
        &self,
        chunk_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<TranscriptCue>, TranscriptionError>;

    /// Transcribe one chunk file, reporting upload progress when `upload` is set.
    ///
    /// Services that do not stream their uploads ignore the progress target.
    async fn transcribe_with_progress(
        &self,
        chunk_path: &Path,
        language: Option<&str>,
        upload: Option<UploadProgress>,
    ) -> Result<Vec<TranscriptCue>, TranscriptionError> {
        let _ = upload;
        self.transcribe(chunk_path, language).await
    }

    /// Short name for log output
    fn name(&self) -> &str;
}

pub mod mistral;
pub mod mock;
pub mod upload;
