/*!
 * Segment planning for long audio.
 *
 * The transcription service only accepts a bounded amount of audio per
 * request, so longer recordings are cut into overlapping windows. The
 * overlap gives the transcriber shared context across each cut.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::PlanningError;

/// Longest window sent to the transcription service (15 minutes)
pub const MAX_SEGMENT_SECS: f64 = 900.0;

/// Shared audio between consecutive windows
pub const SEGMENT_OVERLAP_SECS: f64 = 2.0;

/// Upper bound on windows in one plan; about 26 years of audio at the defaults
pub const MAX_WINDOWS: usize = 1_000_000;

// @struct: Slice of the source audio's absolute timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    // @field: Start in seconds
    pub start: f64,

    // @field: End in seconds
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the window in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Plan the transcription windows for audio of `duration` seconds.
///
/// Audio no longer than `max_length` yields the single window `[0, duration]`,
/// which callers treat as "no split needed". Longer audio is walked forward
/// in steps of `max_length - overlap`; each window starts `overlap` seconds
/// before the previous one ended and the final window ends exactly at
/// `duration`.
pub fn plan_segments(duration: f64, max_length: f64, overlap: f64) -> Result<Vec<TimeWindow>, PlanningError> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(PlanningError::InvalidDuration { value: duration });
    }
    if !max_length.is_finite() || max_length <= 0.0 {
        return Err(PlanningError::InvalidMaxLength { value: max_length });
    }
    if !overlap.is_finite() || overlap <= 0.0 || overlap >= max_length {
        return Err(PlanningError::InvalidOverlap { overlap, max_length });
    }

    if duration <= max_length {
        return Ok(vec![TimeWindow::new(0.0, duration)]);
    }

    let count = expected_window_count(duration, max_length, overlap);
    if count > MAX_WINDOWS as f64 {
        return Err(PlanningError::TooManyWindows { count, limit: MAX_WINDOWS });
    }

    let mut windows = Vec::with_capacity(count as usize);
    let mut start = 0.0_f64;
    loop {
        // min() hands back `duration` itself on the last step, so no drift reaches the final end
        let end = (start + max_length).min(duration);
        windows.push(TimeWindow::new(start, end));
        if end >= duration {
            break;
        }
        start = end - overlap;
    }

    debug!(
        "Planned {} windows for {:.3}s of audio (max {:.1}s, overlap {:.1}s)",
        windows.len(), duration, max_length, overlap
    );

    Ok(windows)
}

/// Plan with the default 900 s windows and 2 s overlap
pub fn plan_default(duration: f64) -> Result<Vec<TimeWindow>, PlanningError> {
    plan_segments(duration, MAX_SEGMENT_SECS, SEGMENT_OVERLAP_SECS)
}

/// Whether audio of `duration` seconds must be cut before transcription
pub fn needs_splitting(duration: f64, max_length: f64) -> bool {
    duration > max_length
}

// Float on purpose: huge durations must be compared before any cast
fn expected_window_count(duration: f64, max_length: f64, overlap: f64) -> f64 {
    ((duration - overlap) / (max_length - overlap)).ceil().max(1.0)
}
