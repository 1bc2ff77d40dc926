use async_trait::async_trait;

use chunkscribe_domain::{AudioAsset, Chunk, ChunkSplitter, DomainError};

use crate::decode::decode_audio;
use crate::wav::encode_wav_pcm16;

/// Even chunk duration for a file that must be cut into
/// `ceil(file_size / max_chunk_size)` pieces.
pub fn calc_unit_duration(
    file_size_bytes: u64,
    total_duration_secs: f64,
    max_chunk_size_bytes: u64,
) -> f64 {
    let required_chunks = file_size_bytes.div_ceil(max_chunk_size_bytes).max(1);
    total_duration_secs / required_chunks as f64
}

/// Splits by decoded frame boundaries: decodes once, slices time-aligned
/// sample ranges per channel, and re-encodes each slice as an
/// independently decodable PCM WAV chunk.
pub struct SampleAccurateSplitter {
    max_chunk_size_bytes: u64,
    max_chunk_duration_secs: f64,
}

impl SampleAccurateSplitter {
    pub fn new(max_chunk_size_bytes: u64, max_chunk_duration_secs: f64) -> Self {
        Self {
            max_chunk_size_bytes,
            max_chunk_duration_secs,
        }
    }
}

#[async_trait]
impl ChunkSplitter for SampleAccurateSplitter {
    async fn split(&self, asset: &AudioAsset) -> Result<Vec<Chunk>, DomainError> {
        if asset.bytes.is_empty() {
            return Err(DomainError::InvalidInput("audio asset is empty".to_string()));
        }
        if self.max_chunk_size_bytes == 0 || self.max_chunk_duration_secs <= 0.0 {
            return Err(DomainError::InvalidInput(
                "chunk size and duration limits must be positive".to_string(),
            ));
        }

        let decoded = decode_audio(&asset.bytes)?;
        let total_duration = decoded.duration_secs();
        let sample_rate = decoded.sample_rate_hz;
        let frames = decoded.frame_count();

        // The computed duration is never trusted unbounded; long low-bitrate
        // files would otherwise produce chunks the upstream API rejects.
        let chunk_duration = calc_unit_duration(
            asset.size_bytes(),
            total_duration,
            self.max_chunk_size_bytes,
        )
        .min(self.max_chunk_duration_secs);

        let num_chunks = ((total_duration / chunk_duration).ceil() as usize).max(1);
        let mut chunks = Vec::with_capacity(num_chunks);

        for i in 0..num_chunks {
            let start_time = i as f64 * chunk_duration;
            let end_time = ((i + 1) as f64 * chunk_duration).min(total_duration);

            let start_frame = ((start_time * sample_rate as f64).floor() as usize).min(frames);
            // Floor truncation may drop or duplicate at most one sample per
            // boundary; the last chunk always reaches the final frame so the
            // chunk sequence covers the whole duration.
            let end_frame = if i == num_chunks - 1 {
                frames
            } else {
                ((end_time * sample_rate as f64).floor() as usize).min(frames)
            };

            let slice: Vec<Vec<f32>> = decoded
                .channels
                .iter()
                .map(|channel| channel[start_frame..end_frame].to_vec())
                .collect();

            let bytes = encode_wav_pcm16(&slice, sample_rate)?;
            tracing::debug!(
                chunk = i + 1,
                total = num_chunks,
                start_secs = start_time,
                end_secs = end_time,
                frames = end_frame - start_frame,
                bytes = bytes.len(),
                "encoded audio chunk"
            );
            chunks.push(Chunk::inline(format!("chunk_{i}.wav"), "audio/wav", bytes));
        }

        tracing::debug!(
            file_bytes = asset.size_bytes(),
            duration_secs = total_duration,
            chunk_duration_secs = chunk_duration,
            chunk_count = chunks.len(),
            "sample-accurate split completed"
        );

        Ok(chunks)
    }
}

/// Splits raw bytes into contiguous ranges of at most `max_chunk_size_bytes`.
/// Boundaries are not aligned to decodable audio frames; callers that need
/// independently decodable chunks must use [`SampleAccurateSplitter`].
pub struct ByteRangeSplitter {
    max_chunk_size_bytes: u64,
}

impl ByteRangeSplitter {
    pub fn new(max_chunk_size_bytes: u64) -> Self {
        Self {
            max_chunk_size_bytes,
        }
    }
}

#[async_trait]
impl ChunkSplitter for ByteRangeSplitter {
    async fn split(&self, asset: &AudioAsset) -> Result<Vec<Chunk>, DomainError> {
        if asset.bytes.is_empty() {
            return Err(DomainError::InvalidInput("audio asset is empty".to_string()));
        }
        if self.max_chunk_size_bytes == 0 {
            return Err(DomainError::InvalidInput(
                "chunk size limit must be positive".to_string(),
            ));
        }

        // Already within the upload limit: the whole file is one chunk.
        if asset.size_bytes() <= self.max_chunk_size_bytes {
            return Ok(vec![Chunk::inline(
                asset.name.clone(),
                asset.mime_type.clone(),
                asset.bytes.clone(),
            )]);
        }

        let max = self.max_chunk_size_bytes as usize;
        let stem = asset.stem();
        let extension = asset.extension().unwrap_or("bin");
        let chunks = asset
            .bytes
            .chunks(max)
            .enumerate()
            .map(|(i, range)| {
                Chunk::inline(
                    format!("{stem}_part{i}.{extension}"),
                    asset.mime_type.clone(),
                    range.to_vec(),
                )
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            file_bytes = asset.size_bytes(),
            chunk_count = chunks.len(),
            "byte-range split completed"
        );

        Ok(chunks)
    }
}
