/*!
 * Subtitle file generation.
 *
 * The whole document is validated before anything is wrapped or rendered,
 * and the rendered text is persisted in one atomic step, so a bad cue
 * anywhere in the input leaves no file behind.
 */

use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::FormatError;
use crate::file_utils::FileManager;
use crate::subtitle::formats::SubtitleFormat;
use crate::subtitle::model::{validate_cues, SubtitleDocument, TranscriptCue};
use crate::subtitle::wrapping::DEFAULT_MAX_CHARS;

/// Generates subtitle files from absolute-time cues
#[derive(Debug, Clone)]
pub struct SubtitleGenerator {
    max_chars: usize,
}

impl Default for SubtitleGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl SubtitleGenerator {
    /// Create a generator wrapping lines at `max_chars` characters
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Generate a subtitle file from a format name (`srt`, `vtt`, `webvtt`, `sbv`).
    ///
    /// The name is checked before any cue is looked at.
    pub fn generate<P: AsRef<Path>>(
        &self,
        cues: &[TranscriptCue],
        output_path: P,
        format: &str,
    ) -> Result<PathBuf, FormatError> {
        let format: SubtitleFormat = format.parse()?;
        self.generate_as(cues, output_path, format)
    }

    /// Generate a subtitle file in an already parsed format
    pub fn generate_as<P: AsRef<Path>>(
        &self,
        cues: &[TranscriptCue],
        output_path: P,
        format: SubtitleFormat,
    ) -> Result<PathBuf, FormatError> {
        let output_path = output_path.as_ref();

        let content = self.render(cues, format)?;

        FileManager::write_atomic(output_path, &content).map_err(|e| FormatError::Write {
            path: output_path.to_path_buf(),
            message: format!("{:#}", e),
        })?;

        debug!("Wrote {} bytes of {} to {:?}", content.len(), format, output_path);

        Ok(output_path.to_path_buf())
    }

    /// Validate, wrap, paginate and serialize without touching the filesystem
    pub fn render(&self, cues: &[TranscriptCue], format: SubtitleFormat) -> Result<String, FormatError> {
        validate_cues(cues)?;

        let document = SubtitleDocument::from_cues(cues, self.max_chars);
        debug!("Rendering {} cues as {} pages of {}", cues.len(), document.len(), format);

        Ok(format.render(&document))
    }
}

/// Generate with the default line width
pub fn generate<P: AsRef<Path>>(cues: &[TranscriptCue], output_path: P, format: &str) -> Result<PathBuf, FormatError> {
    SubtitleGenerator::default().generate(cues, output_path, format)
}
