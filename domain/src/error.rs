use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Audio could not be decoded. Fatal: aborts the run.
    #[error("audio decode failed: {0}")]
    Decode(String),

    /// Remote split service unreachable or non-2xx. Fatal.
    #[error("split service failed: {0}")]
    SplitService(String),

    /// A remote chunk URL could not be fetched. Recovered per chunk as an
    /// empty transcript placeholder.
    #[error("chunk fetch failed: {0}")]
    ChunkFetch(String),

    /// Transcription API call failed: transport error, non-2xx (the message
    /// carries the status code and response body text), or a malformed
    /// body. Recovered per chunk.
    #[error("transcription api error: {0}")]
    TranscriptionApi(String),

    /// Caller input rejected before any work started. Fatal.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    /// Errors that abort the whole run rather than degrading one chunk.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::Decode(_) | DomainError::SplitService(_) | DomainError::InvalidInput(_)
        )
    }
}
