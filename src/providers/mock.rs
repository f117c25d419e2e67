/*!
 * Mock transcriber for testing.
 *
 * - `MockTranscriber::scripted(chunks)` - Returns the given cue lists, one per call
 * - `MockTranscriber::echo()` - One cue per call naming the chunk file
 * - `MockTranscriber::failing()` - Always fails with an API error
 * - `MockTranscriber::failing_at(n)` - Fails on the n-th call (0-based) only
 * - `MockTranscriber::empty()` - Always returns no cues
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::TranscriptionError;
use crate::providers::{Transcriber, UploadProgress};
use crate::subtitle::TranscriptCue;

/// Behavior mode for the mock transcriber
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Pops the next scripted cue list, empty once the script runs out
    Scripted,
    /// Returns a single cue `[0, 1]` with the chunk file name as text
    Echo,
    /// Always fails
    Failing,
    /// Fails on the given call only
    FailingAt { call: usize },
    /// Always returns no cues
    Empty,
    /// Sleeps before echoing (for cancellation tests)
    Slow { delay_ms: u64 },
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub chunk_path: PathBuf,
    pub language: Option<String>,
    /// Whether the chunk file existed when the call was made
    pub file_existed: bool,
    /// `(segment, total_segments)` when upload progress was requested
    pub upload: Option<(usize, usize)>,
}

/// Mock transcriber for pipeline tests
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    behavior: MockBehavior,
    script: Arc<Mutex<VecDeque<Vec<TranscriptCue>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn scripted(chunks: Vec<Vec<TranscriptCue>>) -> Self {
        let mock = Self::new(MockBehavior::Scripted);
        if let Ok(mut script) = mock.script.lock() {
            script.extend(chunks);
        }
        mock
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn failing_at(call: usize) -> Self {
        Self::new(MockBehavior::FailingAt { call })
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of `transcribe` calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the recorded calls
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn echo_cues(chunk_path: &Path) -> Vec<TranscriptCue> {
        let name = chunk_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        vec![TranscriptCue::new(0.0, 1.0, name)]
    }

    fn failure(call: usize) -> TranscriptionError {
        TranscriptionError::ApiError {
            status_code: 500,
            message: format!("Mock transcriber failure on call {}", call),
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        chunk_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<TranscriptCue>, TranscriptionError> {
        self.transcribe_with_progress(chunk_path, language, None).await
    }

    async fn transcribe_with_progress(
        &self,
        chunk_path: &Path,
        language: Option<&str>,
        upload: Option<UploadProgress>,
    ) -> Result<Vec<TranscriptCue>, TranscriptionError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                chunk_path: chunk_path.to_path_buf(),
                language: language.map(str::to_string),
                file_existed: chunk_path.exists(),
                upload: upload.as_ref().map(|u| (u.segment, u.total_segments)),
            });
        }

        // Pretend the whole file went out in one piece
        if let Some(upload) = &upload {
            let size = std::fs::metadata(chunk_path).map(|m| m.len()).unwrap_or(0);
            let mut tracker = upload.tracker(size);
            tracker.start();
            tracker.advance(size as usize);
            tracker.finish();
        }

        match self.behavior {
            MockBehavior::Scripted => Ok(self
                .script
                .lock()
                .ok()
                .and_then(|mut script| script.pop_front())
                .unwrap_or_default()),
            MockBehavior::Echo => Ok(Self::echo_cues(chunk_path)),
            MockBehavior::Failing => Err(Self::failure(call)),
            MockBehavior::FailingAt { call: failing } if failing == call => Err(Self::failure(call)),
            MockBehavior::FailingAt { .. } => Ok(Self::echo_cues(chunk_path)),
            MockBehavior::Empty => Ok(Vec::new()),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(Self::echo_cues(chunk_path))
            }
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
