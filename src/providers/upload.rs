/*!
 * Upload progress for chunk files sent to a transcription service.
 *
 * Messages look like `Uploading segment 2/5: 1.0/2.5 MB (40%)`. Every upload
 * reports 0% before the first byte and 100% exactly once at the end.
 */

use std::fmt;

use futures::stream::{self, Stream, StreamExt};

use crate::pipeline::ProgressCallback;

/// Bytes handed to the HTTP body per stream item
pub const UPLOAD_CHUNK_BYTES: usize = 1024 * 1024;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Which segment is being uploaded and where its progress goes
#[derive(Clone)]
pub struct UploadProgress {
    pub segment: usize,
    pub total_segments: usize,
    callback: ProgressCallback,
}

impl fmt::Debug for UploadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadProgress")
            .field("segment", &self.segment)
            .field("total_segments", &self.total_segments)
            .finish_non_exhaustive()
    }
}

impl UploadProgress {
    pub fn new(segment: usize, total_segments: usize, callback: ProgressCallback) -> Self {
        Self { segment, total_segments, callback }
    }

    /// Fresh tracker for one upload attempt of `total_bytes`
    pub fn tracker(&self, total_bytes: u64) -> UploadTracker {
        UploadTracker {
            progress: self.clone(),
            total_bytes,
            sent_bytes: 0,
            finished: false,
        }
    }

    fn emit(&self, detail: String) {
        let message = format!("Uploading segment {}/{}: {}", self.segment, self.total_segments, detail);
        (*self.callback)(&message);
    }
}

// @struct: Byte counter for a single upload attempt
#[derive(Debug)]
pub struct UploadTracker {
    progress: UploadProgress,
    total_bytes: u64,
    sent_bytes: u64,
    finished: bool,
}

impl UploadTracker {
    /// Report 0%; an empty upload is complete immediately
    pub fn start(&mut self) {
        self.progress
            .emit(format!("0 / {:.1} MB (0%)", self.total_bytes as f64 / BYTES_PER_MB));
        if self.total_bytes == 0 {
            self.finish();
        }
    }

    /// Count `bytes` more as handed to the connection
    pub fn advance(&mut self, bytes: usize) {
        if self.finished {
            return;
        }

        self.sent_bytes = (self.sent_bytes + bytes as u64).min(self.total_bytes);
        if self.sent_bytes >= self.total_bytes {
            self.finish();
            return;
        }

        let percent = self.sent_bytes * 100 / self.total_bytes;
        self.progress.emit(format!(
            "{:.1}/{:.1} MB ({}%)",
            self.sent_bytes as f64 / BYTES_PER_MB,
            self.total_bytes as f64 / BYTES_PER_MB,
            percent
        ));
    }

    /// Report 100% if it has not been reported yet
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let total_mb = self.total_bytes as f64 / BYTES_PER_MB;
        self.progress.emit(format!("{:.1} / {:.1} MB (100%)", total_mb, total_mb));
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Split a file's bytes into upload-sized pieces
pub fn upload_chunks(data: &[u8]) -> Vec<Vec<u8>> {
    data.chunks(UPLOAD_CHUNK_BYTES).map(<[u8]>::to_vec).collect()
}

/// Stream `chunks` while counting each one against `tracker`.
///
/// The tracker reports as the HTTP client pulls items, so the percentages
/// follow what has actually been handed to the connection.
pub fn counting_stream(
    chunks: Vec<Vec<u8>>,
    mut tracker: UploadTracker,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
    stream::iter(chunks).map(move |chunk| {
        tracker.advance(chunk.len());
        Ok::<_, std::io::Error>(chunk)
    })
}
