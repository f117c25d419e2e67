use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use serde::Deserialize;

use crate::errors::TranscriptionError;
use crate::providers::upload::{counting_stream, upload_chunks};
use crate::providers::{Transcriber, UploadProgress};
use crate::subtitle::{cues_from_records, CueRecord, TranscriptCue};

/// Default public endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai";

/// Default speech-to-text model
pub const DEFAULT_MODEL: &str = "voxtral-mini-latest";

/// Mistral client for the audio transcription endpoint
pub struct Mistral {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Model name sent with every request
    model: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl std::fmt::Debug for Mistral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mistral")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Transcription response body
#[derive(Debug, Deserialize)]
pub struct TranscriptionResponse {
    /// Full transcript text
    #[serde(default)]
    pub text: String,

    /// Timestamped segments, present when segment granularity was requested
    #[serde(default)]
    pub segments: Option<Vec<CueRecord>>,

    /// Detected language, if reported
    #[serde(default)]
    pub language: Option<String>,
}

impl Mistral {
    /// Create a new Mistral client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, model, 300, 3, 1000)
    }

    /// Create a client with explicit timeout and retry settings
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        let endpoint = endpoint.into();
        let model = model.into();

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: if endpoint.is_empty() { DEFAULT_ENDPOINT.to_string() } else { endpoint },
            model: if model.is_empty() { DEFAULT_MODEL.to_string() } else { model },
            max_retries,
            backoff_base_ms,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/v1/audio/transcriptions", self.endpoint.trim_end_matches('/'))
    }

    /// Multipart body for one attempt; with `upload` set the file is streamed and counted
    fn build_form(
        &self,
        file_name: &str,
        audio: &[u8],
        upload: Option<&UploadProgress>,
    ) -> Result<Form, TranscriptionError> {
        let file_part = match upload {
            Some(upload) => {
                let length = audio.len() as u64;
                let mut tracker = upload.tracker(length);
                tracker.start();
                Part::stream_with_length(Body::wrap_stream(counting_stream(upload_chunks(audio), tracker)), length)
            }
            None => Part::bytes(audio.to_vec()),
        };

        let file_part = file_part
            .file_name(file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::RequestFailed(format!("Invalid file part: {}", e)))?;

        Ok(Form::new()
            .text("model", self.model.clone())
            .text("timestamp_granularities", "segment")
            .part("file", file_part))
    }
}

/// Parse a transcription response body into chunk-local cues
pub fn parse_response(body: &str) -> Result<Vec<TranscriptCue>, TranscriptionError> {
    let response: TranscriptionResponse = serde_json::from_str(body)
        .map_err(|e| TranscriptionError::ParseError(format!("Invalid JSON: {}", e)))?;

    let Some(segments) = response.segments else {
        warn!("Transcription response has no segments; text length {}", response.text.len());
        return Ok(Vec::new());
    };

    let mut cues = cues_from_records(segments)
        .map_err(|e| TranscriptionError::ParseError(e.to_string()))?;

    for cue in &mut cues {
        cue.text = cue.text.trim().to_string();
    }

    if let Some(language) = response.language {
        debug!("Detected language: {}", language);
    }

    Ok(cues)
}

/// Map a non-success status to an error
pub fn classify_status(status: StatusCode, body: String) -> TranscriptionError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TranscriptionError::AuthenticationError(body),
        StatusCode::TOO_MANY_REQUESTS => TranscriptionError::RateLimitExceeded(body),
        _ => TranscriptionError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

// Rate limits, server errors and network failures are worth another attempt
fn is_retryable(err: &TranscriptionError) -> bool {
    match err {
        TranscriptionError::RequestFailed(_) | TranscriptionError::RateLimitExceeded(_) => true,
        TranscriptionError::ApiError { status_code, .. } => *status_code >= 500,
        _ => false,
    }
}

#[async_trait]
impl Transcriber for Mistral {
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
        if self.api_key.is_empty() {
            return Err(TranscriptionError::MissingApiKey);
        }
        if !chunk_path.is_file() {
            return Err(TranscriptionError::AudioFileNotFound(chunk_path.to_path_buf()));
        }
        if let Some(language) = language {
            // The endpoint rejects a language together with timestamp granularities
            debug!("Language hint '{}' not sent: incompatible with segment timestamps", language);
        }

        let audio = tokio::fs::read(chunk_path)
            .await
            .map_err(|e| TranscriptionError::RequestFailed(format!("Failed to read {:?}: {}", chunk_path, e)))?;
        let file_name = chunk_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();

        let url = self.transcriptions_url();
        let mut attempt = 0;

        loop {
            let form = self.build_form(&file_name, &audio, upload.as_ref())?;

            let result = match self
                .client
                .post(&url)
                .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
                .multipart(form)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to get response text".to_string());
                    if status.is_success() {
                        parse_response(&body)
                    } else {
                        Err(classify_status(status, body))
                    }
                }
                Err(e) => Err(TranscriptionError::RequestFailed(format!(
                    "Failed to send request to Mistral API: {}",
                    e
                ))),
            };

            match result {
                Ok(cues) => {
                    debug!("{:?}: {} segments", file_name, cues.len());
                    return Ok(cues);
                }
                Err(e) if is_retryable(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                    warn!(
                        "Mistral API error: {} - attempt {}/{}, retrying in {}ms",
                        e,
                        attempt,
                        self.max_retries + 1,
                        backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => {
                    error!("Mistral API error: {}", e);
                    return Err(e);
                }
            }
        }
    }

    fn name(&self) -> &str {
        "Mistral"
    }
}
