use serde::{Deserialize, Serialize};

/// Original upload: an immutable byte blob plus its declared MIME type.
/// Owned by the orchestrator for the duration of one transcription run.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AudioAsset {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// File extension after the last dot, if any.
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.name)
    }
}

/// Planar per-channel samples decoded from an [`AudioAsset`]. Transient:
/// owned by the local splitter for the duration of one split.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub sample_rate_hz: u32,
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel. Channels are equal length by construction.
    pub fn frame_count(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate_hz as f64
    }
}

/// One sub-unit of an audio file, submitted independently for transcription.
/// A chunk sequence is ordered by original temporal position; the final
/// transcript depends on that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Self-contained encoded audio produced by a local splitter.
    Inline {
        name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
    /// Downloadable chunk produced by the remote split service.
    Remote { url: String },
}

impl Chunk {
    pub fn inline(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Chunk::Inline {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Chunk::Remote { url: url.into() }
    }
}

/// A chunk resolved to submittable bytes: identity for inline chunks,
/// download plus MIME inference for remote ones.
#[derive(Debug, Clone)]
pub struct FetchedChunk {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Immutable per-run transcription options, passed unchanged to every
/// chunk's API call.
#[derive(Debug, Clone)]
pub struct TranscriptionOptions {
    pub model: String,
    pub language: Option<String>,
    pub prompt: Option<String>,
}

/// Point-in-time status report for UI consumption. `chunk_transcript`
/// carries the most recently completed chunk's text, empty if none yet
/// or on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub current_chunk: usize,
    pub total_chunks: usize,
    pub chunk_transcript: String,
    pub message: String,
}

/// Final outcome of one transcription run. `text` joins all per-chunk
/// transcripts with a single space; failed chunks contribute an empty
/// segment, so the separator count is always `total_chunks - 1`.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptResult {
    pub text: String,
    pub elapsed_ms: u64,
    pub file_size_bytes: u64,
}
