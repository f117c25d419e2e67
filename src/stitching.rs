/*!
 * Timestamp stitching across transcription chunks.
 *
 * Each chunk's transcription starts its own clock at zero. Stitching walks
 * the chunks in window order and shifts every cue by a running offset,
 * which advances to the end of the last cue emitted for a chunk.
 *
 * The offset follows the last cue's end, not the window's nominal length,
 * which assumes every chunk's cues reach close to the chunk's true end.
 * A chunk with no cues leaves the offset untouched, so silence or trailing
 * gaps make later timestamps drift early.
 */

use log::{debug, warn};

use crate::errors::StitchingError;
use crate::subtitle::TranscriptCue;

/// Merge chunk-local cue lists into one absolute, time-ordered list.
///
/// Cues keep their input order; nothing is reordered or deduplicated.
pub fn stitch(chunks: &[Vec<TranscriptCue>]) -> Result<Vec<TranscriptCue>, StitchingError> {
    let total: usize = chunks.iter().map(Vec::len).sum();
    let mut stitched = Vec::with_capacity(total);
    let mut offset = 0.0_f64;

    for (chunk_index, chunk) in chunks.iter().enumerate() {
        for (cue_index, cue) in chunk.iter().enumerate() {
            validate_chunk_cue(chunk_index, cue_index, cue)?;
            stitched.push(cue.shifted(offset));
        }

        match stitched.last() {
            Some(last) if !chunk.is_empty() => {
                offset = last.end;
                debug!("Chunk {}: {} cues, offset now {:.3}s", chunk_index + 1, chunk.len(), offset);
            }
            _ => warn!(
                "Chunk {} produced no cues; keeping offset at {:.3}s",
                chunk_index + 1,
                offset
            ),
        }
    }

    Ok(stitched)
}

fn validate_chunk_cue(chunk: usize, cue: usize, value: &TranscriptCue) -> Result<(), StitchingError> {
    if !value.start.is_finite() || value.start < 0.0 {
        return Err(StitchingError::InvalidTime { chunk, cue, field: "start", value: value.start });
    }
    if !value.end.is_finite() || value.end < 0.0 {
        return Err(StitchingError::InvalidTime { chunk, cue, field: "end", value: value.end });
    }
    if value.end < value.start {
        return Err(StitchingError::InvertedRange { chunk, cue, start: value.start, end: value.end });
    }
    Ok(())
}
