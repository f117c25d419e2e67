/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;

use anyhow::Result;
use audio_to_subs::file_utils::FileManager;
use audio_to_subs::subtitle::SubtitleFormat;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_fileExists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

/// Test that generate_output_path swaps the extension for the format's
#[test]
fn test_generateOutputPath_shouldUseFormatExtension() {
    let input_file = Path::new("/tmp/input/video.mkv");
    let output_dir = Path::new("/tmp/output");

    assert_eq!(
        FileManager::generate_output_path(input_file, output_dir, SubtitleFormat::Srt),
        Path::new("/tmp/output/video.srt")
    );
    assert_eq!(
        FileManager::generate_output_path(input_file, output_dir, SubtitleFormat::WebVtt),
        Path::new("/tmp/output/video.vtt")
    );
    assert_eq!(
        FileManager::generate_output_path(input_file, output_dir, SubtitleFormat::Sbv),
        Path::new("/tmp/output/video.sbv")
    );
}

/// Test that ensure_dir creates nested directories
#[test]
fn test_ensureDir_withNestedPath_shouldCreateAll() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested)?;

    assert!(FileManager::dir_exists(&nested));
    Ok(())
}

/// Test that atomic writes replace content entirely
#[test]
fn test_writeAtomic_withLongerOldContent_shouldReplaceIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "out.srt", "a much longer previous content")?;

    FileManager::write_atomic(&path, "short")?;

    assert_eq!(fs::read_to_string(&path)?, "short");
    Ok(())
}

/// Test that video discovery walks subdirectories and ignores other files
#[test]
fn test_findVideos_shouldReturnOnlyVideosSorted() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let sub = temp_dir.path().join("season1");
    fs::create_dir_all(&sub)?;
    common::create_test_video(temp_dir.path(), "b.mp4")?;
    common::create_test_video(temp_dir.path(), "a.MKV")?;
    common::create_test_video(&sub, "e01.webm")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "x")?;
    common::create_test_file(temp_dir.path(), "b.srt", "x")?;

    let videos = FileManager::find_videos(temp_dir.path())?;

    let names: Vec<String> = videos
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.MKV", "b.mp4", "e01.webm"]);
    Ok(())
}

/// Test that removing a missing file is silent
#[test]
fn test_removeQuietly_withMissingFile_shouldNotFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "segment_001.wav", "x")?;

    FileManager::remove_quietly(&path);
    FileManager::remove_quietly(&path);

    assert!(!path.exists());
    Ok(())
}
