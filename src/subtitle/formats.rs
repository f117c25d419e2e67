/*!
 * Subtitle output formats and their text serialization.
 *
 * - SRT: 1-based index, `HH:MM:SS,mmm --> HH:MM:SS,mmm`, text lines
 * - WebVTT: `WEBVTT` header, `HH:MM:SS.mmm --> HH:MM:SS.mmm`, text lines
 * - SBV: start and end on separate lines as `H:MM:SS,mmm`, text lines
 *
 * Blocks are separated by a blank line.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FormatError;
use crate::subtitle::model::{Page, SubtitleDocument};

/// Closed set of output formats accepted by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
    WebVtt,
    Sbv,
}

impl SubtitleFormat {
    /// Every accepted format name
    pub const NAMES: [&'static str; 4] = ["srt", "vtt", "webvtt", "sbv"];

    // @returns: Lowercase format identifier
    pub fn name(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::WebVtt => "webvtt",
            Self::Sbv => "sbv",
        }
    }

    // @returns: File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt | Self::WebVtt => "vtt",
            Self::Sbv => "sbv",
        }
    }

    /// Format a time in seconds the way this format writes it
    pub fn format_timestamp(&self, seconds: f64) -> String {
        match self {
            Self::Srt => format_timestamp_srt(seconds),
            Self::Vtt | Self::WebVtt => format_timestamp_vtt(seconds),
            Self::Sbv => format_timestamp_sbv(seconds),
        }
    }

    /// Serialize a whole document
    pub fn render(&self, document: &SubtitleDocument) -> String {
        let body = document
            .pages
            .iter()
            .enumerate()
            .map(|(i, page)| self.render_block(i + 1, page))
            .collect::<Vec<_>>()
            .join("\n");

        match self {
            Self::Vtt | Self::WebVtt => format!("WEBVTT\n\n{}", body),
            Self::Srt | Self::Sbv => body,
        }
    }

    // @renders: One page as a block ending in a newline; `index` is 1-based and document-wide
    fn render_block(&self, index: usize, page: &Page) -> String {
        let start = self.format_timestamp(page.start);
        let end = self.format_timestamp(page.end);
        let text = page.lines.join("\n");

        match self {
            Self::Srt => format!("{}\n{} --> {}\n{}\n", index, start, end, text),
            Self::Vtt | Self::WebVtt => format!("{} --> {}\n{}\n", start, end, text),
            Self::Sbv => format!("{}\n{}\n{}\n", start, end, text),
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SubtitleFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            "webvtt" => Ok(Self::WebVtt),
            "sbv" => Ok(Self::Sbv),
            _ => Err(FormatError::UnsupportedFormat { name: s.to_string() }),
        }
    }
}

/// Split seconds into (hours, minutes, seconds, milliseconds).
///
/// Milliseconds are rounded from the fractional part, exact halves away
/// from zero (`0.0625` gives 63 ms); a fraction that rounds to 1000
/// carries into the seconds.
fn split_timestamp(seconds: f64) -> (u64, u64, u64, u64) {
    let seconds = seconds.max(0.0);
    let whole = seconds.floor();
    let mut total_seconds = whole as u64;
    let mut millis = ((seconds - whole) * 1000.0).round() as u64;
    if millis >= 1000 {
        total_seconds += 1;
        millis -= 1000;
    }

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    (hours, minutes, secs, millis)
}

/// Format seconds as `HH:MM:SS,mmm`
pub fn format_timestamp_srt(seconds: f64) -> String {
    let (h, m, s, ms) = split_timestamp(seconds);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Format seconds as `HH:MM:SS.mmm`
pub fn format_timestamp_vtt(seconds: f64) -> String {
    let (h, m, s, ms) = split_timestamp(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}

/// Format seconds as `H:MM:SS,mmm` (hour not zero-padded)
pub fn format_timestamp_sbv(seconds: f64) -> String {
    let (h, m, s, ms) = split_timestamp(seconds);
    format!("{}:{:02}:{:02},{:03}", h, m, s, ms)
}
