use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::providers::mistral::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::segmentation::{MAX_SEGMENT_SECS, SEGMENT_OVERLAP_SECS};
use crate::subtitle::{SubtitleFormat, DEFAULT_MAX_CHARS};

/// Application configuration module
/// Settings live in a JSON file (`conf.json` by default) that is created with
/// defaults on first run. Batch jobs are described separately in YAML.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Transcription service settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Window planning settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Output rendering settings
    #[serde(default)]
    pub subtitle: SubtitleConfig,

    /// ffmpeg settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Print every ffmpeg progress update instead of the step summary
    #[serde(default)]
    pub verbose_progress: bool,
}

/// Transcription service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: API key, may be supplied through MISTRAL_API_KEY instead
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Optional language hint (ISO 639 code)
    #[serde(default)]
    pub language: Option<String>,

    // @field: Timeout seconds per request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            language: None,
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Window planning configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SegmentationConfig {
    /// Longest audio window sent in one request, in seconds
    #[serde(default = "default_max_segment_secs")]
    pub max_segment_secs: f64,

    /// Overlap between consecutive windows, in seconds
    #[serde(default = "default_overlap_secs")]
    pub overlap_secs: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_segment_secs: default_max_segment_secs(),
            overlap_secs: default_overlap_secs(),
        }
    }
}

/// Configuration for subtitle output
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Default output format
    #[serde(default)]
    pub format: SubtitleFormat,

    /// Wrap width in characters
    #[serde(default = "default_max_chars_per_line")]
    pub max_chars_per_line: usize,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            format: SubtitleFormat::default(),
            max_chars_per_line: default_max_chars_per_line(),
        }
    }
}

/// Configuration for the ffmpeg collaborators
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AudioConfig {
    /// Timeout for one ffmpeg or ffprobe run
    #[serde(default = "default_ffmpeg_timeout_secs")]
    pub ffmpeg_timeout_secs: u64,

    /// Where intermediate WAV files go; the system temp dir when unset
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ffmpeg_timeout_secs: default_ffmpeg_timeout_secs(),
            temp_dir: None,
        }
    }
}

impl AudioConfig {
    pub fn resolved_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_max_segment_secs() -> f64 {
    MAX_SEGMENT_SECS
}

fn default_overlap_secs() -> f64 {
    SEGMENT_OVERLAP_SECS
}

fn default_max_chars_per_line() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_ffmpeg_timeout_secs() -> u64 {
    600
}

impl Config {
    /// Load the JSON settings file, writing a default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transcription.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Mistral API key is required. Set MISTRAL_API_KEY or pass --api-key".to_string(),
            ));
        }

        let segmentation = &self.segmentation;
        if !segmentation.max_segment_secs.is_finite() || segmentation.max_segment_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "segmentation.max_segment_secs must be positive, got {}",
                segmentation.max_segment_secs
            )));
        }
        if !segmentation.overlap_secs.is_finite()
            || segmentation.overlap_secs <= 0.0
            || segmentation.overlap_secs >= segmentation.max_segment_secs
        {
            return Err(ConfigError::Invalid(format!(
                "segmentation.overlap_secs must be in (0, {}), got {}",
                segmentation.max_segment_secs, segmentation.overlap_secs
            )));
        }

        if self.subtitle.max_chars_per_line == 0 {
            return Err(ConfigError::Invalid(
                "subtitle.max_chars_per_line must be at least 1".to_string(),
            ));
        }

        if let Some(language) = &self.transcription.language {
            crate::language_utils::normalize_language_hint(language)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        Ok(())
    }
}

/// One resolved batch job
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: SubtitleFormat,
}

/// `defaults` section of a batch file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchDefaults {
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBatchFile {
    #[serde(default)]
    defaults: Option<BatchDefaults>,
    #[serde(default)]
    jobs: Option<Vec<serde_yaml::Value>>,
}

/// Batch job file:
///
/// ```yaml
/// defaults:
///   format: srt
/// jobs:
///   - input: a.mp4
///     output: a.srt
///   - input: b.mkv
///     output: b.vtt
///     format: vtt
/// ```
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub defaults: BatchDefaults,
    jobs: Vec<serde_yaml::Value>,
}

impl BatchConfig {
    /// Read and parse a YAML batch file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidYaml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_yaml_str(&content, path)
    }

    /// Parse YAML text; `path` is only used in error messages
    pub fn from_yaml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawBatchFile = if content.trim().is_empty() {
            RawBatchFile::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        Ok(Self {
            defaults: raw.defaults.unwrap_or_default(),
            jobs: raw.jobs.unwrap_or_default(),
        })
    }

    /// Number of raw job entries
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Resolve every job, failing on the first malformed one
    pub fn jobs(&self) -> Result<Vec<BatchJob>, ConfigError> {
        if self.jobs.is_empty() {
            return Err(ConfigError::NoJobs);
        }

        let default_format = self.defaults.format.as_deref().unwrap_or("srt");

        self.jobs
            .iter()
            .enumerate()
            .map(|(index, value)| Self::resolve_job(index, value, default_format))
            .collect()
    }

    /// Check the whole file without keeping the jobs
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jobs().map(|_| ())
    }

    fn resolve_job(index: usize, value: &serde_yaml::Value, default_format: &str) -> Result<BatchJob, ConfigError> {
        let mapping = value.as_mapping().ok_or(ConfigError::JobNotMapping { index })?;

        let field = |name: &'static str| -> Result<String, ConfigError> {
            mapping
                .get(name)
                .and_then(scalar_to_string)
                .filter(|s| !s.trim().is_empty())
                .ok_or(ConfigError::MissingJobField { index, field: name })
        };

        let input = field("input")?;
        let output = field("output")?;

        let format_name = mapping
            .get("format")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| default_format.to_string());
        let format = format_name
            .parse::<SubtitleFormat>()
            .map_err(|_| ConfigError::UnsupportedFormat { index, format: format_name.clone() })?;

        Ok(BatchJob {
            input: PathBuf::from(input),
            output: PathBuf::from(output),
            format,
        })
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
