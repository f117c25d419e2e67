/*!
 * Core data types for transcribed cues and rendered subtitle pages.
 */

use serde::{Deserialize, Serialize};

use crate::errors::FormatError;
use crate::subtitle::pagination::paginate;
use crate::subtitle::wrapping::wrap_text;

/// One transcribed utterance.
///
/// Times are chunk-local when produced by a transcriber and absolute once
/// the stitcher has shifted them onto the source timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptCue {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Spoken text, may contain explicit line breaks
    pub text: String,
}

impl TranscriptCue {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Copy of this cue moved `offset` seconds later
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            text: self.text.clone(),
        }
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Check the time fields of the cue at position `index` in a document
    pub fn validate(&self, index: usize) -> Result<(), FormatError> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(FormatError::InvalidTime { index, field: "start", value: self.start });
        }
        if !self.end.is_finite() || self.end < 0.0 {
            return Err(FormatError::InvalidTime { index, field: "end", value: self.end });
        }
        if self.end < self.start {
            return Err(FormatError::InvertedRange { index, start: self.start, end: self.end });
        }
        Ok(())
    }
}

/// Cue shape as received from loosely typed sources (JSON responses, fixtures).
///
/// Every field is optional so a missing one can be reported by name instead
/// of surfacing as an opaque deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CueRecord {
    #[serde(default)]
    pub start: Option<f64>,

    #[serde(default)]
    pub end: Option<f64>,

    #[serde(default)]
    pub text: Option<String>,
}

impl CueRecord {
    /// Convert into a validated cue, reporting the first missing or invalid field
    pub fn into_cue(self, index: usize) -> Result<TranscriptCue, FormatError> {
        let start = self.start.ok_or(FormatError::MissingField { index, field: "start" })?;
        let end = self.end.ok_or(FormatError::MissingField { index, field: "end" })?;
        let text = self.text.ok_or(FormatError::MissingField { index, field: "text" })?;

        let cue = TranscriptCue { start, end, text };
        cue.validate(index)?;
        Ok(cue)
    }
}

/// Convert a whole list of records, failing on the first bad one
pub fn cues_from_records(records: Vec<CueRecord>) -> Result<Vec<TranscriptCue>, FormatError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_cue(index))
        .collect()
}

/// Validate every cue of a document before anything is rendered
pub fn validate_cues(cues: &[TranscriptCue]) -> Result<(), FormatError> {
    cues.iter()
        .enumerate()
        .try_for_each(|(index, cue)| cue.validate(index))
}

// @struct: Timed block of one or two wrapped lines
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    // @field: 1-2 wrapped lines
    pub lines: Vec<String>,

    // @field: Start in seconds
    pub start: f64,

    // @field: End in seconds
    pub end: f64,
}

impl Page {
    pub fn new(lines: Vec<String>, start: f64, end: f64) -> Self {
        Self { lines, start, end }
    }
}

/// Ordered pages of every cue, the unit that format emitters serialize
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitleDocument {
    pub pages: Vec<Page>,
}

impl SubtitleDocument {
    /// Wrap and paginate each cue in order.
    ///
    /// Cues are expected to have passed [`validate_cues`].
    pub fn from_cues(cues: &[TranscriptCue], max_chars: usize) -> Self {
        let pages = cues
            .iter()
            .flat_map(|cue| paginate(&wrap_text(&cue.text, max_chars), cue.start, cue.end))
            .collect();

        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
