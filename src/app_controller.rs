use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{BatchConfig, Config};
use crate::audio::{AudioBackend, FfmpegBackend};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::pipeline::{Pipeline, PipelineOptions, ProgressCallback};
use crate::providers::mistral::Mistral;
use crate::providers::Transcriber;
use crate::subtitle::SubtitleFormat;

// @module: Application controller wiring config, collaborators and progress display

/// Outcome counts of a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: ffmpeg collaborator
    backend: Arc<dyn AudioBackend>,
    // @field: Speech-to-text collaborator
    transcriber: Arc<dyn Transcriber>,
    // @field: Set by the Ctrl-C handler
    cancel: Arc<AtomicBool>,
    // @field: Draw spinners on the terminal
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller talking to ffmpeg and the Mistral API
    pub fn with_config(config: Config) -> Result<Self> {
        let backend = Arc::new(FfmpegBackend::new(config.audio.ffmpeg_timeout_secs));
        let transcription = &config.transcription;
        let transcriber = Arc::new(Mistral::new_with_config(
            transcription.api_key.clone(),
            transcription.endpoint.clone(),
            transcription.model.clone(),
            transcription.timeout_secs,
            transcription.retry_count,
            transcription.retry_backoff_ms,
        ));

        Ok(Self::with_components(config, backend, transcriber))
    }

    /// Create a controller with explicit collaborators
    pub fn with_components(config: Config, backend: Arc<dyn AudioBackend>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            config,
            backend,
            transcriber,
            cancel: Arc::new(AtomicBool::new(false)),
            show_progress: true,
        }
    }

    /// Disable terminal spinners
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Flag that stops the current run at the next chunk boundary
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn new_spinner(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    fn build_pipeline(&self, spinner: &ProgressBar) -> Pipeline {
        let pb = spinner.clone();
        let progress: ProgressCallback = Arc::new(move |message: &str| {
            pb.set_message(message.to_string());
        });

        Pipeline::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.transcriber),
            PipelineOptions::from_config(&self.config),
        )
        .with_progress(progress)
        .with_cancel_flag(Arc::clone(&self.cancel))
    }

    /// Where the subtitle for `input_file` goes.
    ///
    /// An explicit output naming an existing directory gets `<stem>.<ext>` inside it;
    /// no output means `<stem>.<ext>` next to the input.
    pub fn resolve_output_path(input_file: &Path, output: Option<&Path>, format: SubtitleFormat) -> PathBuf {
        match output {
            Some(output) if output.is_dir() => FileManager::generate_output_path(input_file, output, format),
            Some(output) => output.to_path_buf(),
            None => {
                let dir = input_file.parent().unwrap_or(Path::new(""));
                FileManager::generate_output_path(input_file, dir, format)
            }
        }
    }

    /// Transcribe one video.
    ///
    /// Returns `None` when the output exists and `force_overwrite` is off.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output: Option<PathBuf>,
        format: SubtitleFormat,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        let start_time = Instant::now();

        if !input_file.is_file() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = Self::resolve_output_path(&input_file, output.as_deref(), format);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, output already exists (use --force to overwrite)", output_path);
            return Ok(None);
        }

        let spinner = self.new_spinner();
        let pipeline = self.build_pipeline(&spinner);

        let result = pipeline.process_video_as(&input_file, &output_path, format).await;
        spinner.finish_and_clear();

        let written = result?;
        info!("Success: {:?} ({})", written, Self::format_duration(start_time.elapsed()));
        Ok(Some(written))
    }

    /// Transcribe every video below `input_dir`, writing next to each video.
    ///
    /// A failing file is logged and counted; a cancellation stops the folder run.
    pub async fn run_folder(&self, input_dir: PathBuf, format: SubtitleFormat, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let video_files = FileManager::find_videos(&input_dir)?;
        if video_files.is_empty() {
            return Err(anyhow!("No video files found in directory: {:?}", input_dir));
        }

        info!("Found {} video file(s) in {:?}", video_files.len(), input_dir);

        let mut summary = FolderSummary::default();

        for video_file in &video_files {
            match self.run(video_file.clone(), None, format, force_overwrite).await {
                Ok(Some(_)) => summary.processed += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    if let Some(AppError::Cancelled { .. }) = e.downcast_ref::<AppError>() {
                        return Err(e);
                    }
                    error!("Error processing file {:?}: {}", video_file, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors ({})",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    /// Run a YAML batch file, stopping at the first failing job
    pub async fn run_batch(&self, batch: &BatchConfig, force_overwrite: bool) -> Result<Vec<(PathBuf, PathBuf)>> {
        let start_time = Instant::now();

        let jobs: Vec<_> = batch
            .jobs()?
            .into_iter()
            .filter(|job| {
                let keep = force_overwrite || !job.output.exists();
                if !keep {
                    warn!("Skipping {:?}, output already exists (use --force to overwrite)", job.output);
                }
                keep
            })
            .collect();

        info!("Processing {} batch job(s)", jobs.len());

        let spinner = self.new_spinner();
        let pipeline = self.build_pipeline(&spinner);
        let result = pipeline.process_batch(&jobs).await;
        spinner.finish_and_clear();

        let completed = result?;
        for (input, output) in &completed {
            info!("{:?} -> {:?}", input, output);
        }
        info!("Batch complete in {}", Self::format_duration(start_time.elapsed()));

        Ok(completed)
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
