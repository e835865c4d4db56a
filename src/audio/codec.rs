// ABOUTME: WAV container codec
// ABOUTME: Decodes WAV bytes into an AudioBuffer and re-encodes with the same format

use crate::audio::AudioBuffer;
use crate::error::Error;
use std::io::Cursor;

/// Codec for uncompressed PCM in a WAV container.
///
/// Integer PCM only (8/16/24/32-bit). Float WAV is rejected with a decode
/// error; anything beyond plain PCM framing is out of scope.
pub struct WavCodec;

impl WavCodec {
    /// Parse a WAV byte stream into samples plus format metadata
    pub fn decode(bytes: &[u8]) -> crate::Result<AudioBuffer> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| Error::Decode(e.to_string()))?;
        let spec = reader.spec();

        if spec.sample_format == hound::SampleFormat::Float {
            return Err(Error::Decode(
                "float WAV is unsupported, expected integer PCM".to_string(),
            ));
        }

        let samples = reader
            .samples::<i32>()
            .collect::<Result<Vec<i32>, _>>()
            .map_err(|e| Error::Decode(e.to_string()))?;

        Ok(AudioBuffer {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            samples,
        })
    }

    /// Serialize a buffer back into a WAV byte stream, preserving
    /// sample rate, channel count and bit depth
    pub fn encode(buffer: &AudioBuffer) -> crate::Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: buffer.channels,
            sample_rate: buffer.sample_rate,
            bits_per_sample: buffer.bits_per_sample,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| Error::Decode(e.to_string()))?;
            for &sample in &buffer.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| Error::Decode(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| Error::Decode(e.to_string()))?;
        }

        Ok(cursor.into_inner())
    }
}
