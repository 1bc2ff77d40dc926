use std::io::Cursor;

use chunkscribe_domain::DomainError;

/// Scales a float sample into the 16-bit PCM range. Negative values use
/// the full -32768 extent, non-negative values top out at 32767; the
/// result is truncated toward zero after clamping to [-1, 1].
pub fn scale_sample(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    let scaled = if clamped < 0.0 {
        clamped * 32_768.0
    } else {
        clamped * 32_767.0
    };
    scaled as i16
}

/// Encodes planar float samples as a canonical 44-byte-header PCM WAV:
/// format 1, 16 bits per sample, interleaved little-endian frames.
pub fn encode_wav_pcm16(channels: &[Vec<f32>], sample_rate_hz: u32) -> Result<Vec<u8>, DomainError> {
    if channels.is_empty() || sample_rate_hz == 0 {
        return Err(DomainError::InvalidInput(
            "wav encoding requires at least one channel and a non-zero sample rate".to_string(),
        ));
    }

    let frames = channels[0].len();
    if channels.iter().any(|c| c.len() != frames) {
        return Err(DomainError::InvalidInput(
            "wav encoding requires equal-length channels".to_string(),
        ));
    }

    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate: sample_rate_hz,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| DomainError::Decode(format!("wav encode: {e}")))?;
        for frame in 0..frames {
            for channel in channels {
                writer
                    .write_sample(scale_sample(channel[frame]))
                    .map_err(|e| DomainError::Decode(format!("wav encode: {e}")))?;
            }
        }
        writer
            .finalize()
            .map_err(|e| DomainError::Decode(format!("wav encode: {e}")))?;
    }

    Ok(cursor.into_inner())
}
