// ABOUTME: Voice-masking modulation
// ABOUTME: Pitch-lowering reinterpretation plus a delayed, attenuated robotic overlay

use crate::audio::AudioBuffer;
use crate::error::Error;

/// Frame-rate scale for the pitch-down step
const PITCH_SCALE: f64 = 0.75;
/// Delay of the overlaid copy in milliseconds
const OVERLAY_DELAY_MS: u64 = 50;
/// Attenuation of the overlaid copy in decibels
const OVERLAY_GAIN_DB: f64 = -10.0;

/// Deterministic voice-masking transform.
///
/// The pitch step reinterprets the stream at 0.75x the declared frame rate and
/// then converts back to the declared rate, so both pitch and tempo shift
/// (duration grows by 4/3). This matches the behavior of the service this
/// relay fronts; it is not a pitch-preserving time-stretch. The robotic
/// doubling comes from summing a 50ms-delayed copy attenuated by 10dB.
pub struct Modulator;

impl Modulator {
    /// Apply the pitch-down and robotic overlay to a decoded buffer.
    ///
    /// Pure and stateless: identical input buffers yield byte-identical
    /// output. Channel count, bit depth and the frame rate label are
    /// preserved; only the frame count changes.
    pub fn apply(input: &AudioBuffer) -> crate::Result<AudioBuffer> {
        if input.channels == 0 {
            return Err(Error::Modulation("zero channels".to_string()));
        }
        if input.sample_rate == 0 {
            return Err(Error::Modulation("zero frame rate".to_string()));
        }
        if input.samples.is_empty() {
            return Err(Error::Modulation("empty buffer".to_string()));
        }

        let channels = input.channels as usize;
        let in_frames = input.samples.len() / channels;
        if in_frames == 0 {
            return Err(Error::Modulation("empty buffer".to_string()));
        }

        // Pitch down: relabel at 0.75x the declared rate, then resample back
        // to the declared rate. The data stretches to ~4/3 the frame count and
        // the output keeps the original rate label.
        let lowered_rate = (input.sample_rate as f64 * PITCH_SCALE) as u32;
        if lowered_rate == 0 {
            return Err(Error::Modulation("zero frame rate".to_string()));
        }

        let ratio = input.sample_rate as f64 / lowered_rate as f64;
        let out_frames = (in_frames as f64 * ratio).round() as usize;
        let step = lowered_rate as f64 / input.sample_rate as f64;

        let mut pitched = vec![0.0f64; out_frames * channels];
        for frame in 0..out_frames {
            let pos = frame as f64 * step;
            let base = (pos.floor() as usize).min(in_frames - 1);
            let next = (base + 1).min(in_frames - 1);
            let frac = pos - pos.floor();
            for ch in 0..channels {
                let a = input.samples[base * channels + ch] as f64;
                let b = input.samples[next * channels + ch] as f64;
                pitched[frame * channels + ch] = a + (b - a) * frac;
            }
        }

        // Robotic doubling: sum a delayed, attenuated copy onto the signal.
        // The output is padded by the delay so the copy is never truncated.
        let delay_frames =
            (input.sample_rate as u64 * OVERLAY_DELAY_MS / 1000) as usize;
        let gain = 10.0f64.powf(OVERLAY_GAIN_DB / 20.0);

        let total_frames = out_frames + delay_frames;
        let mut mixed = vec![0.0f64; total_frames * channels];
        mixed[..out_frames * channels].copy_from_slice(&pitched);
        for frame in 0..out_frames {
            for ch in 0..channels {
                mixed[(frame + delay_frames) * channels + ch] +=
                    pitched[frame * channels + ch] * gain;
            }
        }

        // Clamp sums to the container's sample range
        let bits = input.bits_per_sample.clamp(1, 32) as i64;
        let max = ((1i64 << (bits - 1)) - 1) as f64;
        let min = -(1i64 << (bits - 1)) as f64;
        let samples = mixed
            .iter()
            .map(|&v| v.round().clamp(min, max) as i32)
            .collect();

        Ok(AudioBuffer {
            sample_rate: input.sample_rate,
            channels: input.channels,
            bits_per_sample: input.bits_per_sample,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(sample_rate: u32, channels: u16, frames: usize) -> AudioBuffer {
        let mut samples = Vec::with_capacity(frames * channels as usize);
        for frame in 0..frames {
            let t = frame as f64 / sample_rate as f64;
            let v = (8000.0 * (2.0 * std::f64::consts::PI * 220.0 * t).sin()) as i32;
            for _ in 0..channels {
                samples.push(v);
            }
        }
        AudioBuffer {
            sample_rate,
            channels,
            bits_per_sample: 16,
            samples,
        }
    }

    #[test]
    fn test_deterministic() {
        let input = tone(44100, 1, 4410);
        let first = Modulator::apply(&input).unwrap();
        let second = Modulator::apply(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shape_preserved() {
        let input = tone(44100, 2, 4410);
        let output = Modulator::apply(&input).unwrap();

        assert_eq!(output.channels, 2);
        assert_eq!(output.bits_per_sample, 16);
        // Rate label is the original rate, not the intermediate 0.75x one
        assert_eq!(output.sample_rate, 44100);
    }

    #[test]
    fn test_duration_stretched() {
        let input = tone(44100, 1, 44100); // 1 second
        let output = Modulator::apply(&input).unwrap();

        // 4/3 stretch plus the 50ms overlay pad
        let expected = 1.0 / PITCH_SCALE + OVERLAY_DELAY_MS as f64 / 1000.0;
        assert!((output.duration_secs() - expected).abs() < 0.01);
    }

    #[test]
    fn test_samples_clamped_to_range() {
        let input = AudioBuffer {
            sample_rate: 8000,
            channels: 1,
            bits_per_sample: 16,
            samples: vec![i16::MAX as i32; 1600],
        };
        let output = Modulator::apply(&input).unwrap();
        assert!(output
            .samples
            .iter()
            .all(|&s| s >= i16::MIN as i32 && s <= i16::MAX as i32));
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let input = AudioBuffer {
            sample_rate: 44100,
            channels: 1,
            bits_per_sample: 16,
            samples: vec![],
        };
        assert!(matches!(
            Modulator::apply(&input).unwrap_err(),
            Error::Modulation(_)
        ));
    }

    #[test]
    fn test_zero_rate_rejected() {
        let input = AudioBuffer {
            sample_rate: 0,
            channels: 1,
            bits_per_sample: 16,
            samples: vec![1, 2, 3],
        };
        assert!(matches!(
            Modulator::apply(&input).unwrap_err(),
            Error::Modulation(_)
        ));
    }

    #[test]
    fn test_zero_channels_rejected() {
        let input = AudioBuffer {
            sample_rate: 44100,
            channels: 0,
            bits_per_sample: 16,
            samples: vec![1, 2, 3],
        };
        assert!(matches!(
            Modulator::apply(&input).unwrap_err(),
            Error::Modulation(_)
        ));
    }
}
