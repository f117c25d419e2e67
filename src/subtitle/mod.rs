/*!
 * Subtitle rendering: cue model, wrapping, pagination and output formats.
 *
 * Data flow for one document:
 * `TranscriptCue` → `wrap_text` → `paginate` → `SubtitleDocument` → `SubtitleFormat::render`
 */

pub mod formats;
pub mod generator;
pub mod model;
pub mod pagination;
pub mod wrapping;

// Re-export types used by other modules
pub use formats::{format_timestamp_sbv, format_timestamp_srt, format_timestamp_vtt, SubtitleFormat};
pub use generator::{generate, SubtitleGenerator};
pub use model::{cues_from_records, validate_cues, CueRecord, Page, SubtitleDocument, TranscriptCue};
pub use pagination::{paginate, MAX_LINES_PER_PAGE};
pub use wrapping::{wrap_text, DEFAULT_MAX_CHARS};
