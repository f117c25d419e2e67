use std::path::{Path, PathBuf};

use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::audio::{run_ffmpeg, splitter, FfmpegOutcome};
use crate::errors::AudioError;
use crate::pipeline::ProgressCallback;

// @module: Audio track extraction with ffmpeg

static OUT_TIME_US_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^out_time_(?:us|ms)=(\d+)$").unwrap()
});

static OUT_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^out_time=(\d+):(\d{2}):(\d{2}(?:\.\d+)?)$").unwrap()
});

/// Parse a `-progress` line into elapsed output seconds.
///
/// ffmpeg reports `out_time_us` and `out_time_ms` in microseconds (the latter
/// despite its name) and `out_time` as `HH:MM:SS.micro`.
pub fn parse_progress_line(line: &str) -> Option<f64> {
    let line = line.trim();

    if let Some(caps) = OUT_TIME_US_REGEX.captures(line) {
        let micros: u64 = caps.get(1)?.as_str().parse().ok()?;
        return Some(micros as f64 / 1_000_000.0);
    }

    if let Some(caps) = OUT_TIME_REGEX.captures(line) {
        let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
        let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
        let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
        return Some(hours * 3600.0 + minutes * 60.0 + seconds);
    }

    None
}

// @struct: Turns ffmpeg progress lines into human readable messages
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    operation: String,
    total_secs: Option<f64>,
    last_percent: Option<u32>,
    finished: bool,
}

impl ProgressTracker {
    // @param total_secs: Expected output duration, when known
    pub fn new(operation: impl Into<String>, total_secs: Option<f64>) -> Self {
        Self {
            operation: operation.into(),
            total_secs: total_secs.filter(|t| t.is_finite() && *t > 0.0),
            last_percent: None,
            finished: false,
        }
    }

    /// Feed one line; returns a message only when the whole percentage changed
    pub fn update(&mut self, line: &str) -> Option<String> {
        let line = line.trim();

        if line == "progress=end" {
            if self.finished {
                return None;
            }
            self.finished = true;
            return Some(format!("{}: 100%", self.operation));
        }

        let elapsed = parse_progress_line(line)?;

        match self.total_secs {
            Some(total) => {
                let percent = ((elapsed / total) * 100.0).clamp(0.0, 100.0);
                let whole = percent as u32;
                if self.last_percent == Some(whole) {
                    return None;
                }
                self.last_percent = Some(whole);
                Some(format!("{}: {:.1}s / {:.1}s ({}%)", self.operation, elapsed, total, whole))
            }
            None => Some(format!("{}: {:.1}s", self.operation, elapsed)),
        }
    }
}

/// Check that the `ffmpeg` binary can be executed
pub async fn check_ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Extract the audio track of `video` as 16 kHz mono PCM WAV into `output`
pub async fn extract_audio(
    video: &Path,
    output: &Path,
    timeout_secs: u64,
    progress: Option<ProgressCallback>,
) -> Result<PathBuf, AudioError> {
    if !check_ffmpeg_available().await {
        return Err(AudioError::FfmpegNotFound);
    }

    if !video.is_file() {
        return Err(AudioError::VideoNotFound(video.to_path_buf()));
    }

    let mut args: Vec<String> = vec![
        "-y".into(),
        "-v".into(),
        "error".into(),
        "-i".into(),
        video.to_string_lossy().into_owned(),
        "-vn".into(),
        "-acodec".into(),
        "pcm_s16le".into(),
        "-ar".into(),
        "16000".into(),
        "-ac".into(),
        "1".into(),
    ];

    let tracking = match progress {
        Some(callback) => {
            // Percentages need the source duration; without it only elapsed time is shown
            let total = match splitter::probe_duration(video, timeout_secs).await {
                Ok(total) => Some(total),
                Err(e) => {
                    debug!("No duration for progress reporting: {}", e);
                    None
                }
            };
            args.extend(["-progress", "pipe:1", "-nostats"].map(String::from));
            Some((ProgressTracker::new("Extracting audio", total), callback))
        }
        None => None,
    };

    args.push(output.to_string_lossy().into_owned());

    info!("Extracting audio from {:?}", video);

    match run_ffmpeg(&args, timeout_secs, tracking).await? {
        FfmpegOutcome::Success => {
            debug!("Audio written to {:?}", output);
            Ok(output.to_path_buf())
        }
        FfmpegOutcome::Failed(message) => {
            error!("Audio extraction failed: {}", message);
            Err(AudioError::ExtractionFailed(message))
        }
    }
}
