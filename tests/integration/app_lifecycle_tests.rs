/*!
 * Controller lifecycle tests: output resolution, overwrite rules, folders and batches
 */

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use audio_to_subs::app_config::{BatchConfig, Config};
use audio_to_subs::app_controller::{Controller, FolderSummary};
use audio_to_subs::errors::AppError;
use audio_to_subs::providers::mock::MockTranscriber;
use audio_to_subs::subtitle::SubtitleFormat;
use crate::common::{self, FakeAudioBackend};

fn test_config(work_dir: &Path) -> Config {
    let mut config = Config::default();
    config.transcription.api_key = "test-key".to_string();
    config.audio.temp_dir = Some(work_dir.to_path_buf());
    config
}

fn controller(work_dir: &Path, transcriber: Arc<MockTranscriber>) -> Controller {
    Controller::with_components(test_config(work_dir), Arc::new(FakeAudioBackend::new(12.0)), transcriber)
        .without_progress()
}

/// Without an explicit output the subtitle lands next to the video
#[tokio::test]
async fn test_run_withoutOutput_shouldWriteNextToInput() -> Result<()> {
    let videos = common::create_temp_dir()?;
    let work = common::create_temp_dir()?;
    let video = common::create_test_video(videos.path(), "holiday.mp4")?;

    let controller = controller(work.path(), Arc::new(MockTranscriber::echo()));
    let written = controller.run(video, None, SubtitleFormat::Vtt, false).await?;

    let expected = videos.path().join("holiday.vtt");
    assert_eq!(written.as_deref(), Some(expected.as_path()));
    assert!(fs::read_to_string(&expected)?.starts_with("WEBVTT\n\n"));
    Ok(())
}

/// An output naming a directory gets the derived file name inside it
#[tokio::test]
async fn test_run_withOutputDirectory_shouldDeriveFileName() -> Result<()> {
    let videos = common::create_temp_dir()?;
    let work = common::create_temp_dir()?;
    let out_dir = common::create_temp_dir()?;
    let video = common::create_test_video(videos.path(), "holiday.mkv")?;

    let controller = controller(work.path(), Arc::new(MockTranscriber::echo()));
    let written = controller
        .run(video, Some(out_dir.path().to_path_buf()), SubtitleFormat::Sbv, false)
        .await?;

    assert_eq!(written, Some(out_dir.path().join("holiday.sbv")));
    Ok(())
}

/// Existing outputs are kept unless overwriting is forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldRespectForceFlag() -> Result<()> {
    let videos = common::create_temp_dir()?;
    let work = common::create_temp_dir()?;
    let video = common::create_test_video(videos.path(), "holiday.mp4")?;
    let existing = common::create_test_file(videos.path(), "holiday.srt", "old subtitles")?;

    let transcriber = Arc::new(MockTranscriber::echo());
    let controller = controller(work.path(), transcriber.clone());

    let skipped = controller.run(video.clone(), None, SubtitleFormat::Srt, false).await?;
    assert!(skipped.is_none());
    assert_eq!(transcriber.call_count(), 0);
    assert_eq!(fs::read_to_string(&existing)?, "old subtitles");

    let forced = controller.run(video, None, SubtitleFormat::Srt, true).await?;
    assert_eq!(forced, Some(existing.clone()));
    assert_eq!(transcriber.call_count(), 1);
    assert!(fs::read_to_string(&existing)?.starts_with("1\n00:00:00,000 --> 00:00:01,000\n"));
    Ok(())
}

/// A missing input is reported before anything runs
#[test]
fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let videos = common::create_temp_dir()?;
    let work = common::create_temp_dir()?;
    let transcriber = Arc::new(MockTranscriber::echo());

    let controller = controller(work.path(), transcriber.clone());
    let result = tokio_test::block_on(async {
        controller
            .run(videos.path().join("ghost.mp4"), None, SubtitleFormat::Srt, false)
            .await
    });

    assert!(result.is_err());
    assert_eq!(transcriber.call_count(), 0);
    Ok(())
}

/// Folder runs count processed, skipped and failed files separately
#[tokio::test]
async fn test_runFolder_withMixedOutcomes_shouldSummarize() -> Result<()> {
    let videos = common::create_temp_dir()?;
    let work = common::create_temp_dir()?;
    common::create_test_video(videos.path(), "a.mp4")?;
    common::create_test_video(videos.path(), "b.mp4")?;
    common::create_test_video(videos.path(), "c.mp4")?;
    common::create_test_file(videos.path(), "a.srt", "done already")?;

    // a is skipped, b is the first call and succeeds, c is the second call and fails
    let controller = controller(work.path(), Arc::new(MockTranscriber::failing_at(1)));
    let summary = controller
        .run_folder(videos.path().to_path_buf(), SubtitleFormat::Srt, false)
        .await?;

    assert_eq!(summary, FolderSummary { processed: 1, skipped: 1, failed: 1 });
    assert!(videos.path().join("b.srt").exists());
    assert!(!videos.path().join("c.srt").exists());
    Ok(())
}

/// A folder without videos is an error
#[tokio::test]
async fn test_runFolder_withoutVideos_shouldFail() -> Result<()> {
    let videos = common::create_temp_dir()?;
    let work = common::create_temp_dir()?;
    common::create_test_file(videos.path(), "readme.txt", "nothing here")?;

    let controller = controller(work.path(), Arc::new(MockTranscriber::echo()));
    let result = controller
        .run_folder(videos.path().to_path_buf(), SubtitleFormat::Srt, false)
        .await;

    assert!(result.is_err());
    Ok(())
}

/// A cancelled folder run stops instead of counting a failure
#[tokio::test]
async fn test_runFolder_whenCancelled_shouldPropagate() -> Result<()> {
    let videos = common::create_temp_dir()?;
    let work = common::create_temp_dir()?;
    common::create_test_video(videos.path(), "a.mp4")?;
    common::create_test_video(videos.path(), "b.mp4")?;

    let transcriber = Arc::new(MockTranscriber::echo());
    let controller = controller(work.path(), transcriber.clone());
    controller.cancel_flag().store(true, std::sync::atomic::Ordering::SeqCst);

    let err = controller
        .run_folder(videos.path().to_path_buf(), SubtitleFormat::Srt, false)
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Cancelled { .. })));
    assert_eq!(transcriber.call_count(), 0);
    Ok(())
}

/// Batch files from YAML run every job with its own format
#[tokio::test]
async fn test_runBatch_withYamlJobs_shouldWriteEveryOutput() -> Result<()> {
    let videos = common::create_temp_dir()?;
    let work = common::create_temp_dir()?;
    let first = common::create_test_video(videos.path(), "one.mp4")?;
    let second = common::create_test_video(videos.path(), "two.mp4")?;
    let out_one = videos.path().join("one.srt");
    let out_two = videos.path().join("two.sbv");

    let yaml = format!(
        "defaults:\n  format: srt\njobs:\n  - input: \"{}\"\n    output: \"{}\"\n  - input: \"{}\"\n    output: \"{}\"\n    format: sbv\n",
        first.display(),
        out_one.display(),
        second.display(),
        out_two.display()
    );
    let batch_path = common::create_test_file(videos.path(), "jobs.yaml", &yaml)?;
    let batch = BatchConfig::load(&batch_path)?;

    let controller = controller(work.path(), Arc::new(MockTranscriber::echo()));
    let completed = controller.run_batch(&batch, false).await?;

    assert_eq!(completed, vec![(first, out_one.clone()), (second, out_two.clone())]);
    assert!(fs::read_to_string(&out_one)?.starts_with("1\n"));
    assert!(fs::read_to_string(&out_two)?.starts_with("0:00:00,000\n0:00:01,000\n"));
    Ok(())
}

/// Batch jobs with existing outputs are skipped unless forced
#[tokio::test]
async fn test_runBatch_withExistingOutput_shouldSkipJob() -> Result<()> {
    let videos = common::create_temp_dir()?;
    let work = common::create_temp_dir()?;
    let first = common::create_test_video(videos.path(), "one.mp4")?;
    let out_one = common::create_test_file(videos.path(), "one.srt", "keep me")?;

    let yaml = format!("jobs:\n  - input: \"{}\"\n    output: \"{}\"\n", first.display(), out_one.display());
    let batch = BatchConfig::from_yaml_str(&yaml, Path::new("jobs.yaml"))?;

    let transcriber = Arc::new(MockTranscriber::echo());
    let controller = controller(work.path(), transcriber.clone());

    let completed = controller.run_batch(&batch, false).await?;
    assert!(completed.is_empty());
    assert_eq!(fs::read_to_string(&out_one)?, "keep me");

    let completed = controller.run_batch(&batch, true).await?;
    assert_eq!(completed.len(), 1);
    assert_eq!(transcriber.call_count(), 1);
    Ok(())
}

/// The production wiring builds without touching the network
#[test]
fn test_withConfig_shouldBuildController() -> Result<()> {
    let work = common::create_temp_dir()?;
    let controller = Controller::with_config(test_config(work.path()))?;

    assert_eq!(controller.config().transcription.api_key, "test-key");
    assert_eq!(controller.config().subtitle.max_chars_per_line, 42);
    Ok(())
}
