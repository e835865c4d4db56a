// ABOUTME: Audio module for the voice-masking pipeline
// ABOUTME: Provides the decoded buffer type, WAV codec and modulator

mod codec;
mod modulator;

pub use codec::WavCodec;
pub use modulator::Modulator;

/// Decoded PCM audio: interleaved samples plus format metadata.
///
/// Transient by design; a buffer exists only for the duration of one
/// modulation call. Samples are integer PCM held as `i32` regardless of the
/// container bit depth, so a decode/encode round trip is exact.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
    /// Bit depth of the source container (8, 16, 24 or 32)
    pub bits_per_sample: u16,
    /// Interleaved PCM samples
    pub samples: Vec<i32>,
}

impl AudioBuffer {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Playback duration in seconds at the declared sample rate
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / self.sample_rate as f64
        }
    }

    /// Whether the buffer contains no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
