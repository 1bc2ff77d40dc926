use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use validator::Validate;

use chunkscribe_domain::{
    join_transcripts, AudioAsset, Chunk, ChunkFetcher, ChunkSplitter, DomainError, FetchedChunk,
    ProgressEvent, ProgressSink, TranscriptResult, TranscriptionOptions, TranscriptionPort,
};

use crate::{ApplicationError, TranscribeRequest, TranscribeResponse};

#[async_trait]
pub trait TranscribeUseCase: Send + Sync {
    /// Runs one transcription: split, sequentially transcribe each chunk,
    /// reassemble. Per-chunk failures degrade the result instead of
    /// failing it; only chunk acquisition errors propagate. Progress is
    /// published synchronously on this task and cancellation is honored
    /// at chunk boundaries.
    async fn transcribe(
        &self,
        request: TranscribeRequest,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<TranscribeResponse, ApplicationError>;
}

pub struct TranscribeUseCaseImpl {
    splitter: Arc<dyn ChunkSplitter>,
    fetcher: Arc<dyn ChunkFetcher>,
    transcriber: Arc<dyn TranscriptionPort>,
    default_model: String,
    default_language: Option<String>,
    max_attempts: u32,
}

impl TranscribeUseCaseImpl {
    pub fn new(
        splitter: Arc<dyn ChunkSplitter>,
        fetcher: Arc<dyn ChunkFetcher>,
        transcriber: Arc<dyn TranscriptionPort>,
        default_model: impl Into<String>,
        default_language: Option<String>,
        max_attempts: u32,
    ) -> Self {
        Self {
            splitter,
            fetcher,
            transcriber,
            default_model: default_model.into(),
            default_language,
            max_attempts: max_attempts.max(1),
        }
    }

    /// One attempt covers resolving the chunk to submittable bytes plus
    /// the API call, so a remote fetch failure is retried together with
    /// the submission.
    async fn resolve_and_transcribe(
        &self,
        chunk: &Chunk,
        options: &TranscriptionOptions,
    ) -> Result<String, DomainError> {
        let fetched = match chunk {
            Chunk::Inline {
                name,
                mime_type,
                bytes,
            } => FetchedChunk {
                name: name.clone(),
                mime_type: mime_type.clone(),
                bytes: bytes.clone(),
            },
            Chunk::Remote { url } => self.fetcher.fetch(url).await?,
        };
        self.transcriber.transcribe_chunk(&fetched, options).await
    }

    async fn transcribe_with_attempts(
        &self,
        chunk: &Chunk,
        options: &TranscriptionOptions,
    ) -> Result<String, DomainError> {
        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match self.resolve_and_transcribe(chunk, options).await {
                Ok(text) => return Ok(text),
                Err(error) => {
                    tracing::warn!(attempt, max_attempts = self.max_attempts, %error, "chunk attempt failed");
                    last_error = Some(error);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| DomainError::TranscriptionApi("no attempts executed".to_string())))
    }
}

#[async_trait]
impl TranscribeUseCase for TranscribeUseCaseImpl {
    async fn transcribe(
        &self,
        request: TranscribeRequest,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<TranscribeResponse, ApplicationError> {
        request
            .validate()
            .map_err(|e| ApplicationError::Validation(e.to_string()))?;

        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let asset = AudioAsset::new(request.file_name, request.mime_type, request.bytes);
        let file_size_bytes = asset.size_bytes();
        let options = TranscriptionOptions {
            model: request
                .model
                .unwrap_or_else(|| self.default_model.clone()),
            language: request.language.or_else(|| self.default_language.clone()),
            prompt: request.prompt,
        };

        tracing::debug!(
            %run_id,
            file_bytes = file_size_bytes,
            model = %options.model,
            language = options.language.as_deref().unwrap_or("none"),
            "starting transcription run"
        );

        progress.publish(ProgressEvent {
            current_chunk: 0,
            total_chunks: 0,
            chunk_transcript: String::new(),
            message: "uploading audio".to_string(),
        });

        // Chunk acquisition is the only fatal phase of a run.
        let chunks = self.splitter.split(&asset).await?;
        let total_chunks = chunks.len();

        progress.publish(ProgressEvent {
            current_chunk: 0,
            total_chunks,
            chunk_transcript: String::new(),
            message: "starting transcription".to_string(),
        });

        let mut transcripts: Vec<String> = Vec::with_capacity(total_chunks);
        let mut failed_chunks = 0;
        let mut cancelled = false;

        for (i, chunk) in chunks.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            progress.publish(ProgressEvent {
                current_chunk: i + 1,
                total_chunks,
                chunk_transcript: transcripts.last().cloned().unwrap_or_default(),
                message: "transcribing chunk".to_string(),
            });

            match self.transcribe_with_attempts(chunk, &options).await {
                Ok(text) => {
                    progress.publish(ProgressEvent {
                        current_chunk: i + 1,
                        total_chunks,
                        chunk_transcript: text.clone(),
                        message: "transcribing chunk".to_string(),
                    });
                    transcripts.push(text);
                }
                Err(error) => {
                    tracing::warn!(%run_id, chunk = i + 1, %error, "chunk transcription failed");
                    failed_chunks += 1;
                    transcripts.push(String::new());
                    progress.publish(ProgressEvent {
                        current_chunk: i + 1,
                        total_chunks,
                        chunk_transcript: String::new(),
                        message: format!("chunk {} failed: {error}", i + 1),
                    });
                }
            }
        }

        if cancelled {
            // Keep the segment-count invariant: unattempted chunks still
            // contribute empty segments to the final text.
            let completed = transcripts.len();
            transcripts.resize(total_chunks, String::new());
            progress.publish(ProgressEvent {
                current_chunk: completed,
                total_chunks,
                chunk_transcript: String::new(),
                message: "transcription cancelled".to_string(),
            });
        }

        let result = TranscriptResult {
            text: join_transcripts(&transcripts),
            elapsed_ms: started.elapsed().as_millis() as u64,
            file_size_bytes,
        };

        tracing::debug!(
            %run_id,
            total_chunks,
            failed_chunks,
            cancelled,
            elapsed_ms = result.elapsed_ms,
            "transcription run completed"
        );

        Ok(TranscribeResponse {
            result,
            total_chunks,
            failed_chunks,
        })
    }
}
