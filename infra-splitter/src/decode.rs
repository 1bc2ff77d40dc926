use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use chunkscribe_domain::{DecodedAudio, DomainError};

/// Decodes an encoded audio blob into planar per-channel samples at the
/// source sample rate. Channels and rate are preserved so that re-encoded
/// chunks keep the original format. The probe and decoder are scoped to
/// this call and dropped on every return path.
pub fn decode_audio(data: &[u8]) -> Result<DecodedAudio, DomainError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let hint = Hint::new();
    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();
    let decoder_opts = DecoderOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| DomainError::Decode(format!("probe: {e}")))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| DomainError::Decode("no audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate_hz = codec_params
        .sample_rate
        .ok_or_else(|| DomainError::Decode("unknown sample rate".to_string()))?;
    let channel_count = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &decoder_opts)
        .map_err(|e| DomainError::Decode(format!("codec: {e}")))?;

    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); channel_count];

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(DomainError::Decode(format!("packet: {e}")));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                tracing::warn!(error = %e, "skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(DomainError::Decode(format!("decode: {e}")));
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        for frame in sample_buf.samples().chunks_exact(channel_count) {
            for (channel, sample) in frame.iter().enumerate() {
                channels[channel].push(*sample);
            }
        }
    }

    if channels.iter().all(|c| c.is_empty()) {
        return Err(DomainError::Decode("no audio samples decoded".to_string()));
    }

    let decoded = DecodedAudio {
        sample_rate_hz,
        channels,
    };

    tracing::debug!(
        sample_rate_hz = decoded.sample_rate_hz,
        channel_count = decoded.channel_count(),
        frames = decoded.frame_count(),
        duration_secs = decoded.duration_secs(),
        "audio decoded"
    );

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::decode_audio;
    use crate::wav::encode_wav_pcm16;
    use chunkscribe_domain::DomainError;

    #[test]
    fn round_trips_stereo_wav() {
        let left: Vec<f32> = (0..1600).map(|i| (i as f32 / 1600.0) - 0.5).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        let bytes = encode_wav_pcm16(&[left.clone(), right], 16_000).expect("encode");

        let decoded = decode_audio(&bytes).expect("decode");
        assert_eq!(decoded.sample_rate_hz, 16_000);
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.frame_count(), 1600);
        // i16 quantization keeps samples within one step of the source
        for (a, b) in left.iter().zip(&decoded.channels[0]) {
            assert!((a - b).abs() < 1.0 / 32_000.0);
        }
    }

    #[test]
    fn rejects_garbage_bytes() {
        let error = decode_audio(&[0u8; 64]).expect_err("garbage should not decode");
        assert!(matches!(error, DomainError::Decode(_)));
    }
}
