use async_trait::async_trait;

use crate::{AudioAsset, Chunk, DomainError, FetchedChunk, ProgressEvent, TranscriptionOptions};

/// Splits one asset into an ordered chunk sequence. Implementations choose
/// the partitioning strategy (sample-accurate, byte-range, remote service)
/// but must preserve ascending temporal order.
#[async_trait]
pub trait ChunkSplitter: Send + Sync {
    async fn split(&self, asset: &AudioAsset) -> Result<Vec<Chunk>, DomainError>;
}

/// Resolves a remote chunk URL to submittable bytes.
#[async_trait]
pub trait ChunkFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedChunk, DomainError>;
}

/// Submits one chunk to the speech-to-text API and returns its transcript.
#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    async fn transcribe_chunk(
        &self,
        chunk: &FetchedChunk,
        options: &TranscriptionOptions,
    ) -> Result<String, DomainError>;
}

/// Consumes progress events. Invoked synchronously on the caller's task,
/// never concurrently; implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}
