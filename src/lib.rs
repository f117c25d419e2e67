/*!
 * # audio-to-subs
 *
 * Generate timestamped subtitle files from the audio track of a video.
 *
 * ## Features
 *
 * - Extract a 16 kHz mono audio track with ffmpeg
 * - Split long audio into overlapping windows for the transcription API
 * - Transcribe with Mistral's Voxtral models
 * - Stitch chunk-local timestamps back onto the source timeline
 * - Wrap, paginate and emit SRT, WebVTT or SBV
 * - Batch processing from a YAML job file
 *
 * ## Architecture
 *
 * - `segmentation`: Window planning over the audio duration
 * - `stitching`: Chunk-local to absolute timestamps
 * - `subtitle`: Cue model, wrapping, pagination and format emitters
 * - `audio`: ffmpeg / ffprobe collaborators
 * - `providers`: Transcription service clients
 * - `pipeline`: End-to-end orchestration
 * - `app_config`: JSON settings and YAML batch files
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod segmentation;
pub mod stitching;
pub mod subtitle;

// Re-export main types for easier usage
pub use app_config::{BatchConfig, BatchJob, Config};
pub use errors::{AppError, AudioError, ConfigError, FormatError, PlanningError, StitchingError, TranscriptionError};
pub use pipeline::{Pipeline, PipelineOptions, ProgressCallback};
pub use segmentation::{plan_segments, TimeWindow};
pub use stitching::stitch;
pub use subtitle::{generate, SubtitleFormat, SubtitleGenerator, TranscriptCue};
