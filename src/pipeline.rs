/*!
 * End-to-end orchestration: video → audio → windows → transcription → stitched subtitles.
 *
 * Runs are strictly sequential. Chunk i+1 is not cut until chunk i has been
 * transcribed, and the stitcher sees chunk results in window order.
 * Intermediate WAV files live in a private work directory that is removed
 * when the run ends, successfully or not.
 */

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::app_config::{BatchJob, Config};
use crate::audio::{segment_file_name, AudioBackend};
use crate::errors::{AppError, AudioError};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::{Transcriber, UploadProgress};
use crate::segmentation::{plan_segments, TimeWindow, MAX_SEGMENT_SECS, SEGMENT_OVERLAP_SECS};
use crate::stitching::stitch;
use crate::subtitle::{SubtitleFormat, SubtitleGenerator, TranscriptCue, DEFAULT_MAX_CHARS};

/// Receives human readable status lines
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Tunables for one pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_segment_secs: f64,
    pub overlap_secs: f64,
    pub max_chars: usize,
    /// Language hint, normalized to ISO 639-1 before it reaches the transcriber
    pub language: Option<String>,
    /// Parent of the per-run work directory
    pub temp_dir: PathBuf,
    /// Forward ffmpeg progress lines to the callback
    pub verbose_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_segment_secs: MAX_SEGMENT_SECS,
            overlap_secs: SEGMENT_OVERLAP_SECS,
            max_chars: DEFAULT_MAX_CHARS,
            language: None,
            temp_dir: std::env::temp_dir(),
            verbose_progress: false,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_segment_secs: config.segmentation.max_segment_secs,
            overlap_secs: config.segmentation.overlap_secs,
            max_chars: config.subtitle.max_chars_per_line,
            language: config.transcription.language.clone(),
            temp_dir: config.audio.resolved_temp_dir(),
            verbose_progress: config.verbose_progress,
        }
    }
}

/// Sequential video-to-subtitles pipeline
pub struct Pipeline {
    backend: Arc<dyn AudioBackend>,
    transcriber: Arc<dyn Transcriber>,
    options: PipelineOptions,
    generator: SubtitleGenerator,
    progress: Option<ProgressCallback>,
    cancel: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(backend: Arc<dyn AudioBackend>, transcriber: Arc<dyn Transcriber>, options: PipelineOptions) -> Self {
        let generator = SubtitleGenerator::new(options.max_chars);
        Self {
            backend,
            transcriber,
            options,
            generator,
            progress: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Report status lines to `callback`
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Share an externally owned cancellation flag (e.g. set from a Ctrl-C handler)
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag checked between chunks; setting it stops the run at the next boundary
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    fn report(&self, message: &str) {
        debug!("{}", message);
        if let Some(callback) = &self.progress {
            callback(message);
        }
    }

    fn ffmpeg_progress(&self) -> Option<ProgressCallback> {
        if self.options.verbose_progress {
            self.progress.clone()
        } else {
            None
        }
    }

    fn upload_progress(&self, segment: usize, total: usize) -> Option<UploadProgress> {
        match (&self.progress, self.options.verbose_progress) {
            (Some(callback), true) => Some(UploadProgress::new(segment, total, Arc::clone(callback))),
            _ => None,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Turn one video into one subtitle file.
    ///
    /// `format` is checked before any external tool runs.
    pub async fn process_video(&self, video: &Path, output: &Path, format: &str) -> Result<PathBuf, AppError> {
        let format: SubtitleFormat = format.parse()?;
        self.process_video_as(video, output, format).await
    }

    /// Same as [`Pipeline::process_video`] with an already parsed format
    pub async fn process_video_as(
        &self,
        video: &Path,
        output: &Path,
        format: SubtitleFormat,
    ) -> Result<PathBuf, AppError> {
        if !video.is_file() {
            return Err(AudioError::VideoNotFound(video.to_path_buf()).into());
        }

        let language = match &self.options.language {
            Some(hint) => Some(language_utils::normalize_language_hint(hint)?),
            None => None,
        };

        FileManager::ensure_dir(&self.options.temp_dir)?;
        let work_dir = tempfile::Builder::new()
            .prefix("audio-to-subs-")
            .tempdir_in(&self.options.temp_dir)?;
        debug!("Work directory: {:?}", work_dir.path());

        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        let audio_path = work_dir.path().join(format!("audio_{}.wav", stem));

        self.report("Extracting audio from video...");
        self.backend
            .extract_audio(video, &audio_path, self.ffmpeg_progress())
            .await?;

        let duration = self.backend.probe_duration(&audio_path).await?;
        let windows = plan_segments(duration, self.options.max_segment_secs, self.options.overlap_secs)?;
        info!(
            "Audio duration {:.1}s, {} window(s) of at most {:.0}s",
            duration,
            windows.len(),
            self.options.max_segment_secs
        );

        if windows.len() > 1 {
            self.report(&format!(
                "Audio exceeds {:.0} minutes, splitting into {} segments...",
                self.options.max_segment_secs / 60.0,
                windows.len()
            ));
        }

        let chunks = self
            .transcribe_windows(&audio_path, work_dir.path(), &windows, language.as_deref())
            .await?;

        let cues = stitch(&chunks)?;
        info!("Stitched {} cues from {} chunk(s)", cues.len(), chunks.len());

        self.report(&format!("Generating {} subtitles...", format.name().to_uppercase()));
        let written = self.generator.generate_as(&cues, output, format)?;

        FileManager::remove_quietly(&audio_path);
        if let Err(e) = work_dir.close() {
            warn!("Could not remove work directory: {}", e);
        }

        self.report(&format!("Complete! Subtitles saved to {}", written.display()));
        Ok(written)
    }

    // One chunk at a time: cut, transcribe, delete
    async fn transcribe_windows(
        &self,
        audio_path: &Path,
        work_dir: &Path,
        windows: &[TimeWindow],
        language: Option<&str>,
    ) -> Result<Vec<Vec<TranscriptCue>>, AppError> {
        let total = windows.len();
        let mut chunks = Vec::with_capacity(total);

        for (index, window) in windows.iter().enumerate() {
            if self.is_cancelled() {
                warn!("Cancelled after {} of {} chunks", index, total);
                return Err(AppError::Cancelled { completed: index, total });
            }

            // A single window covers the whole file, no cut needed
            let chunk_path = if total == 1 {
                audio_path.to_path_buf()
            } else {
                let label = format!("Splitting segment {}/{}", index + 1, total);
                let path = work_dir.join(segment_file_name(index + 1));
                self.backend
                    .cut_window(audio_path, window, &path, &label, self.ffmpeg_progress())
                    .await?
            };

            self.report(&format!("Transcribing segment {}/{}...", index + 1, total));
            let upload = self.upload_progress(index + 1, total);
            let result = self
                .transcriber
                .transcribe_with_progress(&chunk_path, language, upload)
                .await;

            // Stitching only reads the returned cues, never the chunk file
            if total > 1 {
                FileManager::remove_quietly(&chunk_path);
            }

            let cues = result.map_err(|e| {
                error!("Chunk {}/{} [{:.1}s, {:.1}s] failed: {}", index + 1, total, window.start, window.end, e);
                e
            })?;

            debug!("Chunk {}/{}: {} cues", index + 1, total, cues.len());
            chunks.push(cues);
        }

        Ok(chunks)
    }

    /// Run jobs in order, stopping at the first failure.
    ///
    /// Returns `(input, output)` pairs for the completed jobs.
    pub async fn process_batch(&self, jobs: &[BatchJob]) -> Result<Vec<(PathBuf, PathBuf)>, AppError> {
        let total = jobs.len();
        let mut completed = Vec::with_capacity(total);

        for (index, job) in jobs.iter().enumerate() {
            self.report(&format!("[{}/{}] Processing: {}", index + 1, total, job.input.display()));

            match self.process_video_as(&job.input, &job.output, job.format).await {
                Ok(output) => completed.push((job.input.clone(), output)),
                Err(e) => {
                    self.report(&format!("Failed: {} - {}", job.input.display(), e));
                    return Err(e);
                }
            }
        }

        Ok(completed)
    }
}
