// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use audio_to_subs::app_config::{self, BatchConfig, Config};
use audio_to_subs::app_controller::Controller;
use audio_to_subs::errors::AppError;
use audio_to_subs::subtitle::SubtitleFormat;

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSubtitleFormat {
    Srt,
    Vtt,
    Webvtt,
    Sbv,
}

impl From<CliSubtitleFormat> for SubtitleFormat {
    fn from(cli_format: CliSubtitleFormat) -> Self {
        match cli_format {
            CliSubtitleFormat::Srt => SubtitleFormat::Srt,
            CliSubtitleFormat::Vtt => SubtitleFormat::Vtt,
            CliSubtitleFormat::Webvtt => SubtitleFormat::WebVtt,
            CliSubtitleFormat::Sbv => SubtitleFormat::Sbv,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate subtitles from a video (default command)
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Generate shell completions for audio-to-subs
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct GenerateArgs {
    /// Input video file or directory of videos
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output subtitle file (defaults to the input name with the format's extension)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Subtitle format
    #[arg(short, long, value_enum)]
    format: Option<CliSubtitleFormat>,

    /// YAML batch file describing several jobs
    #[arg(short, long, value_name = "YAML", conflicts_with_all = ["input", "output"])]
    batch: Option<PathBuf>,

    /// Mistral API key
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Language hint (e.g., 'en', 'fr', 'deu')
    #[arg(short, long)]
    language: Option<String>,

    /// Transcription model
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Shortcut for --log-level debug
    #[arg(short, long)]
    verbose: bool,

    /// Show ffmpeg progress for every extraction and split
    #[arg(long)]
    verbose_progress: bool,

    /// Force overwrite of existing output files
    #[arg(long)]
    force: bool,
}

/// audio-to-subs - Subtitles from video audio
///
/// Extracts the audio track of a video, transcribes it with Mistral's
/// speech-to-text API and writes timestamped subtitles.
#[derive(Parser, Debug)]
#[command(name = "audio-to-subs")]
#[command(version)]
#[command(about = "Generate subtitles from the audio track of a video")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "audio-to-subs extracts audio from video files and transcribes it into subtitles.

EXAMPLES:
    audio-to-subs -i talk.mp4                      # Write talk.srt next to the video
    audio-to-subs -i talk.mp4 -o talk.vtt -f vtt   # WebVTT to an explicit path
    audio-to-subs -i /videos/ -f sbv               # Every video in a directory
    audio-to-subs --batch jobs.yaml                # Jobs from a YAML file
    audio-to-subs completions bash > audio-to-subs.bash

CONFIGURATION:
    Settings are stored in conf.json by default. If the file doesn't exist,
    a default one is created. The API key can come from MISTRAL_API_KEY.

SUPPORTED FORMATS:
    srt, vtt, webvtt, sbv")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config if needed
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "audio-to-subs", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Generate(args)) => run_generate(args).await,
        None => run_generate(cli.generate).await,
    }
}

async fn run_generate(options: GenerateArgs) -> Result<()> {
    let cli_log_level: Option<app_config::LogLevel> = match (options.log_level, options.verbose) {
        (Some(level), _) => Some(level.into()),
        (None, true) => Some(app_config::LogLevel::Debug),
        (None, false) => None,
    };

    // If log level is set via command line, apply it immediately
    if let Some(level) = cli_log_level {
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(api_key) = &options.api_key {
        config.transcription.api_key = api_key.clone();
    }
    if let Some(model) = &options.model {
        config.transcription.model = model.clone();
    }
    if let Some(language) = &options.language {
        config.transcription.language = Some(language.clone());
    }
    if let Some(format) = options.format {
        config.subtitle.format = format.into();
    }
    if options.verbose_progress {
        config.verbose_progress = true;
    }
    if let Some(level) = cli_log_level {
        config.log_level = level;
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    if cli_log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    if let Some(language) = &config.transcription.language {
        if let Ok(name) = audio_to_subs::language_utils::get_language_name(language) {
            info!("Language hint: {}", name);
        }
    }

    let format = config.subtitle.format;
    let controller = Controller::with_config(config)?;

    let cancel = controller.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current chunk");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let result = if let Some(batch_path) = &options.batch {
        let batch = BatchConfig::load(batch_path)?;
        controller.run_batch(&batch, options.force).await.map(|completed| {
            info!("Batch complete: {} file(s) written", completed.len());
        })
    } else {
        let input = options
            .input
            .clone()
            .ok_or_else(|| anyhow!("--input is required unless --batch is given"))?;

        if input.is_file() {
            controller.run(input, options.output.clone(), format, options.force).await.map(|_| ())
        } else if input.is_dir() {
            if options.output.is_some() {
                warn!("--output is ignored for directory input");
            }
            controller.run_folder(input, format, options.force).await.map(|_| ())
        } else {
            Err(anyhow!("Input path does not exist: {:?}", input))
        }
    };

    if let Err(e) = &result {
        if let Some(AppError::Cancelled { completed, total }) = e.downcast_ref::<AppError>() {
            error!("Cancelled after {} of {} chunks, no subtitle written", completed, total);
        }
    }

    result
}
