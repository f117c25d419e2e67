/*!
 * Tests for application configuration and batch files
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use audio_to_subs::app_config::{BatchConfig, Config, LogLevel};
use audio_to_subs::errors::ConfigError;
use audio_to_subs::subtitle::SubtitleFormat;
use crate::common;

/// A missing settings file is created with defaults
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.log_level, LogLevel::Info);
    let reloaded: Config = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(reloaded.transcription.endpoint, "https://api.mistral.ai");
    Ok(())
}

/// Existing settings are read back
#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"transcription":{"api_key":"k","language":"fr"},"subtitle":{"format":"sbv","max_chars_per_line":32},"log_level":"debug"}"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.transcription.api_key, "k");
    assert_eq!(config.transcription.language.as_deref(), Some("fr"));
    assert_eq!(config.subtitle.format, SubtitleFormat::Sbv);
    assert_eq!(config.subtitle.max_chars_per_line, 32);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

/// Broken JSON is an error, not a silent default
#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

/// Unknown language hints fail validation
#[test]
fn test_validate_withUnknownLanguage_shouldFail() {
    let mut config = Config::default();
    config.transcription.api_key = "k".to_string();
    config.transcription.language = Some("zz".to_string());

    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

/// Zero-width lines are rejected
#[test]
fn test_validate_withZeroLineWidth_shouldFail() {
    let mut config = Config::default();
    config.transcription.api_key = "k".to_string();
    config.subtitle.max_chars_per_line = 0;

    assert!(config.validate().is_err());
}

fn batch(yaml: &str) -> Result<BatchConfig, ConfigError> {
    BatchConfig::from_yaml_str(yaml, Path::new("jobs.yaml"))
}

/// Jobs inherit the default format unless they set their own
#[test]
fn test_batchConfig_withJobs_shouldResolveFormats() {
    let config = batch(
        "jobs:\n  - input: a.mp4\n    output: out/a.srt\n  - input: b.mkv\n    output: out/b.vtt\n    format: WebVTT\n",
    )
    .unwrap();

    let jobs = config.jobs().unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].input, PathBuf::from("a.mp4"));
    assert_eq!(jobs[0].output, PathBuf::from("out/a.srt"));
    assert_eq!(jobs[0].format, SubtitleFormat::Srt);
    assert_eq!(jobs[1].format, SubtitleFormat::WebVtt);
}

/// Empty files and empty job lists are reported
#[test]
fn test_batchConfig_withNoJobs_shouldFail() {
    assert_eq!(batch("").unwrap().jobs(), Err(ConfigError::NoJobs));
    assert_eq!(batch("jobs: []\n").unwrap().jobs(), Err(ConfigError::NoJobs));
    assert_eq!(batch("defaults:\n  format: vtt\n").unwrap().validate(), Err(ConfigError::NoJobs));
}

/// Missing required fields name the job and the field
#[test]
fn test_batchConfig_withMissingOutput_shouldNameField() {
    let config = batch("jobs:\n  - input: a.mp4\n").unwrap();

    let err = config.jobs().unwrap_err();

    assert_eq!(err, ConfigError::MissingJobField { index: 0, field: "output" });
    assert_eq!(err.to_string(), "Job 0 missing required field: output");
}

/// Unknown formats are rejected per job
#[test]
fn test_batchConfig_withUnsupportedFormat_shouldFail() {
    let config = batch("jobs:\n  - input: a.mp4\n    output: a.ass\n    format: ass\n").unwrap();

    assert_eq!(
        config.jobs(),
        Err(ConfigError::UnsupportedFormat { index: 0, format: "ass".to_string() })
    );
}

/// Malformed YAML and missing files are distinct errors
#[test]
fn test_batchConfig_load_withBadInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let missing = BatchConfig::load(temp_dir.path().join("none.yaml")).unwrap_err();
    assert!(matches!(missing, ConfigError::NotFound(_)));

    let path = common::create_test_file(temp_dir.path(), "bad.yaml", "jobs: [unclosed\n")?;
    let invalid = BatchConfig::load(&path).unwrap_err();
    assert!(matches!(invalid, ConfigError::InvalidYaml { .. }));
    Ok(())
}
