/*!
 * Error types for the audio-to-subs application.
 *
 * This module contains custom error types for the different stages of the
 * video-to-subtitles pipeline, using the thiserror crate for ergonomic
 * error definitions. Every message names the offending field and value.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while planning transcription windows
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// Duration is negative or not a finite number
    #[error("Invalid duration: {value} (must be a finite, non-negative number of seconds)")]
    InvalidDuration {
        /// Offending duration in seconds
        value: f64,
    },

    /// Maximum window length is not a positive finite number
    #[error("Invalid max_length: {value} (must be a finite, positive number of seconds)")]
    InvalidMaxLength {
        /// Offending maximum length in seconds
        value: f64,
    },

    /// Overlap is outside the open interval (0, max_length)
    #[error("Invalid overlap: {overlap} (must satisfy 0 < overlap < max_length = {max_length})")]
    InvalidOverlap {
        /// Offending overlap in seconds
        overlap: f64,
        /// Window length the overlap was checked against
        max_length: f64,
    },

    /// The plan would need more windows than one run can hold
    #[error("Too many windows: duration needs {count} windows (limit {limit})")]
    TooManyWindows {
        /// Windows the plan would produce
        count: f64,
        /// Largest accepted plan
        limit: usize,
    },
}

/// Errors raised while merging chunk-local cues onto one timeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StitchingError {
    /// A cue time is negative or not a finite number
    #[error("Chunk {chunk}, cue {cue}: invalid '{field}' value {value} (must be a finite, non-negative number)")]
    InvalidTime {
        chunk: usize,
        cue: usize,
        field: &'static str,
        value: f64,
    },

    /// A cue ends before it starts
    #[error("Chunk {chunk}, cue {cue}: invalid range, 'end' ({end}) is before 'start' ({start})")]
    InvertedRange {
        chunk: usize,
        cue: usize,
        start: f64,
        end: f64,
    },
}

/// Errors raised while validating or writing a subtitle document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Format name is not in the allow-list
    #[error("Unsupported subtitle format '{name}' (must be one of: srt, vtt, webvtt, sbv)")]
    UnsupportedFormat {
        /// The rejected format name
        name: String,
    },

    /// A cue is missing one of `start`, `end` or `text`
    #[error("Cue {index}: missing required field '{field}'")]
    MissingField {
        index: usize,
        field: &'static str,
    },

    /// A cue time is negative or not a finite number
    #[error("Cue {index}: invalid timecode '{field}': {value} (must be a non-negative number)")]
    InvalidTime {
        index: usize,
        field: &'static str,
        value: f64,
    },

    /// A cue ends before it starts
    #[error("Cue {index}: invalid timecode range, 'end' ({end}) is before 'start' ({start})")]
    InvertedRange {
        index: usize,
        start: f64,
        end: f64,
    },

    /// The rendered document could not be persisted
    #[error("Failed to write subtitle file {}: {message}", path.display())]
    Write {
        path: PathBuf,
        message: String,
    },
}

/// Errors that can occur when talking to the transcription service
#[derive(Error, Debug)]
pub enum TranscriptionError {
    /// The chunk audio file does not exist
    #[error("Audio file not found: {}", .0.display())]
    AudioFileNotFound(PathBuf),

    /// No API key was configured
    #[error("API key is required for the transcription service")]
    MissingApiKey,

    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised by the ffmpeg / ffprobe collaborators
#[derive(Error, Debug)]
pub enum AudioError {
    /// ffmpeg is not installed or not on PATH
    #[error("FFmpeg is not available on this system")]
    FfmpegNotFound,

    /// Input video does not exist
    #[error("Video file not found: {}", .0.display())]
    VideoNotFound(PathBuf),

    /// ffmpeg failed while extracting audio
    #[error("FFmpeg extraction failed: {0}")]
    ExtractionFailed(String),

    /// ffprobe could not report a duration
    #[error("Failed to get audio duration for {}: {message}", path.display())]
    DurationProbe {
        path: PathBuf,
        message: String,
    },

    /// ffmpeg failed while cutting a window
    #[error("FFmpeg error during splitting of window {index} [{start}, {end}]: {message}")]
    SplitFailed {
        index: usize,
        start: f64,
        end: f64,
        message: String,
    },

    /// An external command did not finish in time
    #[error("{command} timed out after {secs} seconds")]
    Timeout {
        command: &'static str,
        secs: u64,
    },
}

/// Errors in the JSON settings file or the YAML batch file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Batch file does not exist
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Batch file is not valid YAML
    #[error("Invalid YAML in {}: {message}", path.display())]
    InvalidYaml {
        path: PathBuf,
        message: String,
    },

    /// Batch file defines no jobs
    #[error("No jobs defined in configuration")]
    NoJobs,

    /// A job entry is not a mapping
    #[error("Job {index} is not a dictionary")]
    JobNotMapping {
        index: usize,
    },

    /// A job entry lacks `input` or `output`
    #[error("Job {index} missing required field: {field}")]
    MissingJobField {
        index: usize,
        field: &'static str,
    },

    /// A job requests a format outside the allow-list
    #[error("Job {index}: unsupported format '{format}'. Must be one of: srt, vtt, webvtt, sbv")]
    UnsupportedFormat {
        index: usize,
        format: String,
    },

    /// Any other invalid setting
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from segment planning
    #[error("Planning error: {0}")]
    Planning(#[from] PlanningError),

    /// Error from timestamp stitching
    #[error("Stitching error: {0}")]
    Stitching(#[from] StitchingError),

    /// Error from subtitle generation
    #[error("Subtitle generation failed: {0}")]
    Format(#[from] FormatError),

    /// Error from the transcription service
    #[error("Transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Error from audio extraction or splitting
    #[error("Audio processing failed: {0}")]
    Audio(#[from] AudioError),

    /// Error from configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The run was cancelled between chunks
    #[error("Cancelled after {completed} of {total} chunks")]
    Cancelled {
        completed: usize,
        total: usize,
    },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
