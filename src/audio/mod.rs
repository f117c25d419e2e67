/*!
 * Audio collaborators: extraction from video, duration probing and window cutting.
 *
 * The pipeline talks to these through the `AudioBackend` trait so tests can
 * substitute a backend that never spawns ffmpeg.
 */

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::errors::AudioError;
use crate::pipeline::ProgressCallback;
use crate::segmentation::TimeWindow;

pub mod extractor;
pub mod splitter;

pub use extractor::{check_ffmpeg_available, extract_audio, parse_progress_line, ProgressTracker};
pub use splitter::{cut_window, parse_duration_output, probe_duration, segment_file_name};

/// Default timeout for a single ffmpeg or ffprobe invocation
pub const DEFAULT_FFMPEG_TIMEOUT_SECS: u64 = 600;

/// Operations the pipeline needs from the audio tooling
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Extract a mono 16 kHz PCM WAV track from `video` into `output`
    async fn extract_audio(
        &self,
        video: &Path,
        output: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, AudioError>;

    /// Duration of an audio file in seconds
    async fn probe_duration(&self, audio: &Path) -> Result<f64, AudioError>;

    /// Copy the `window` of `audio` into `output`
    async fn cut_window(
        &self,
        audio: &Path,
        window: &TimeWindow,
        output: &Path,
        label: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, AudioError>;
}

/// Backend spawning the system `ffmpeg` and `ffprobe` binaries
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    timeout_secs: u64,
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG_TIMEOUT_SECS)
    }
}

impl FfmpegBackend {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

#[async_trait]
impl AudioBackend for FfmpegBackend {
    async fn extract_audio(
        &self,
        video: &Path,
        output: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, AudioError> {
        extractor::extract_audio(video, output, self.timeout_secs, progress).await
    }

    async fn probe_duration(&self, audio: &Path) -> Result<f64, AudioError> {
        splitter::probe_duration(audio, self.timeout_secs).await
    }

    async fn cut_window(
        &self,
        audio: &Path,
        window: &TimeWindow,
        output: &Path,
        label: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, AudioError> {
        splitter::cut_window(audio, window, output, label, self.timeout_secs, progress).await
    }
}

/// Result of an ffmpeg run that managed to start
pub(crate) enum FfmpegOutcome {
    Success,
    Failed(String),
}

/// Run ffmpeg with `args`, streaming `-progress pipe:1` output into the tracker.
///
/// The child is killed if the timeout elapses.
pub(crate) async fn run_ffmpeg(
    args: &[String],
    timeout_secs: u64,
    progress: Option<(ProgressTracker, ProgressCallback)>,
) -> Result<FfmpegOutcome, AudioError> {
    debug!("Running ffmpeg {}", args.join(" "));

    let mut child = match Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(AudioError::FfmpegNotFound),
        Err(e) => return Ok(FfmpegOutcome::Failed(format!("Failed to execute ffmpeg: {}", e))),
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Drained on its own task so a chatty stderr cannot block the child
    let stderr_task = tokio::spawn(async move {
        let mut buffer = String::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_string(&mut buffer).await;
        }
        buffer
    });

    let mut progress = progress;
    let run = async {
        if let Some(stdout) = stdout {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some((tracker, callback)) = progress.as_mut() {
                    if let Some(message) = tracker.update(&line) {
                        (**callback)(&message);
                    }
                }
            }
        }
        child.wait().await
    };

    let status = tokio::select! {
        status = run => status,
        _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
            return Err(AudioError::Timeout { command: "ffmpeg", secs: timeout_secs });
        }
    };

    let stderr = stderr_task.await.unwrap_or_default();

    match status {
        Ok(status) if status.success() => Ok(FfmpegOutcome::Success),
        Ok(status) => {
            debug!("ffmpeg exited with {}", status);
            Ok(FfmpegOutcome::Failed(filter_ffmpeg_stderr(&stderr)))
        }
        Err(e) => Ok(FfmpegOutcome::Failed(format!("Failed to wait for ffmpeg: {}", e))),
    }
}

/// Keep only the meaningful lines of ffmpeg stderr, dropping the banner and stream dumps
pub(crate) fn filter_ffmpeg_stderr(stderr: &str) -> String {
    const NOISE_PREFIXES: [&str; 14] = [
        "ffmpeg version",
        "ffprobe version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "encoder",
        "handler_name",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !NOISE_PREFIXES.iter().any(|prefix| line.starts_with(prefix)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
