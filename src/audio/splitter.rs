/*!
 * Duration probing and window cutting.
 *
 * Windows are cut with stream copy (`-c copy`) placed after the input so the
 * seek is sample accurate on PCM WAV.
 */

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error};
use tokio::process::Command;

use crate::audio::extractor::ProgressTracker;
use crate::audio::{filter_ffmpeg_stderr, run_ffmpeg, FfmpegOutcome};
use crate::errors::AudioError;
use crate::pipeline::ProgressCallback;
use crate::segmentation::TimeWindow;

/// File name of the `index`-th (1-based) window file
pub fn segment_file_name(index: usize) -> String {
    format!("segment_{:03}.wav", index)
}

/// Parse the bare number printed by `ffprobe -of default=noprint_wrappers=1:nokey=1`
pub fn parse_duration_output(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Ask ffprobe for the container duration of `path` in seconds
pub async fn probe_duration(path: &Path, timeout_secs: u64) -> Result<f64, AudioError> {
    let probe_error = |message: String| AudioError::DurationProbe {
        path: path.to_path_buf(),
        message,
    };

    let ffprobe_future = Command::new("ffprobe")
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(path)
        .kill_on_drop(true)
        .output();

    let output = tokio::select! {
        result = ffprobe_future => match result {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(AudioError::FfmpegNotFound),
            Err(e) => return Err(probe_error(format!("Failed to execute ffprobe: {}", e))),
        },
        _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
            return Err(AudioError::Timeout { command: "ffprobe", secs: timeout_secs });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(probe_error(filter_ffmpeg_stderr(&stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration = parse_duration_output(&stdout)
        .ok_or_else(|| probe_error(format!("unexpected ffprobe output: {:?}", stdout.trim())))?;

    debug!("Duration of {:?}: {:.3}s", path, duration);
    Ok(duration)
}

/// Cut one window of `audio` into `output` without re-encoding
pub async fn cut_window(
    audio: &Path,
    window: &TimeWindow,
    output: &Path,
    label: &str,
    timeout_secs: u64,
    progress: Option<ProgressCallback>,
) -> Result<PathBuf, AudioError> {
    let mut args: Vec<String> = vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-i".to_string(),
        audio.to_string_lossy().into_owned(),
        "-ss".to_string(),
        format!("{:.3}", window.start),
        "-to".to_string(),
        format!("{:.3}", window.end),
        "-c".to_string(),
        "copy".to_string(),
    ];

    let tracking = progress.map(|callback| {
        args.extend(["-progress", "pipe:1", "-nostats"].map(String::from));
        (ProgressTracker::new(label, Some(window.duration())), callback)
    });

    args.push(output.to_string_lossy().into_owned());

    match run_ffmpeg(&args, timeout_secs, tracking).await? {
        FfmpegOutcome::Success => Ok(output.to_path_buf()),
        FfmpegOutcome::Failed(message) => {
            error!("{} failed: {}", label, message);
            Err(AudioError::SplitFailed {
                index: segment_index(output),
                start: window.start,
                end: window.end,
                message,
            })
        }
    }
}

// Recover the window number from a `segment_NNN.wav` name, 0 when absent
fn segment_index(output: &Path) -> usize {
    output
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.strip_prefix("segment_"))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}
