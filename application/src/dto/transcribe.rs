use serde::Serialize;
use validator::Validate;

use chunkscribe_domain::TranscriptResult;

#[derive(Debug, Clone, Validate)]
pub struct TranscribeRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1, max = 127))]
    pub mime_type: String,
    #[validate(length(min = 1))]
    pub bytes: Vec<u8>,
    #[validate(length(min = 1, max = 64))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub language: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscribeResponse {
    pub result: TranscriptResult,
    pub total_chunks: usize,
    pub failed_chunks: usize,
}
