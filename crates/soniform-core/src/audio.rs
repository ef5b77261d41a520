//! Audio collaborator interface.
//!
//! Signal acquisition (microphone, tab capture, file decode) lives outside
//! the core; the engine only consumes frequency- and time-domain byte
//! buffers through [`AudioSource`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Selectable FFT resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FftSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FftSize {
    /// FFT window length in samples.
    pub fn size(self) -> usize {
        match self {
            FftSize::Small => 512,
            FftSize::Medium => 2048,
            FftSize::Large => 8192,
        }
    }

    /// Number of frequency bins produced by analysis.
    pub fn bins(self) -> usize {
        self.size() / 2
    }
}

/// Errors surfaced by audio collaborators.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Capture was declined by the user. Existing editor state is untouched.
    #[error("audio capture permission denied")]
    PermissionDenied,
    #[error("audio device unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of a live audio analysis.
///
/// Implementations wrap whatever produces the signal; the animation engine
/// and the spectrum display consume this interface and nothing else.
pub trait AudioSource {
    /// Sample rate of the analyzed signal in Hz.
    fn sample_rate(&self) -> u32;

    /// The active FFT resolution.
    fn fft_size(&self) -> FftSize;

    /// Current frequency-domain magnitudes, one byte (0-255) per bin.
    fn frequency_data(&self) -> Vec<u8>;

    /// Current time-domain samples, bytes centred on 128.
    fn waveform(&self) -> Vec<u8>;
}

/// Mean magnitude of the bins covered by `range`, normalized to `[0,1]`.
///
/// `range` is a fraction interval of the full spectrum; the scaled index
/// range is always widened to span at least one bin.
pub fn band_level(spectrum: &[u8], range: [f64; 2]) -> f64 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let bins = spectrum.len() as f64;
    let lo = range[0].clamp(0.0, 1.0).min(range[1].clamp(0.0, 1.0));
    let hi = range[0].clamp(0.0, 1.0).max(range[1].clamp(0.0, 1.0));

    let start = ((lo * bins).floor() as usize).min(spectrum.len() - 1);
    let mut end = ((hi * bins).ceil() as usize).min(spectrum.len());
    if end <= start {
        end = start + 1;
    }

    let sum: u32 = spectrum[start..end].iter().map(|&b| b as u32).sum();
    let mean = sum as f64 / (end - start) as f64;
    mean / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test double returning a fixed spectrum.
    pub struct FixedSpectrum {
        pub bins: Vec<u8>,
    }

    impl AudioSource for FixedSpectrum {
        fn sample_rate(&self) -> u32 {
            48_000
        }

        fn fft_size(&self) -> FftSize {
            FftSize::Small
        }

        fn frequency_data(&self) -> Vec<u8> {
            self.bins.clone()
        }

        fn waveform(&self) -> Vec<u8> {
            vec![128; self.bins.len()]
        }
    }

    #[test]
    fn test_fft_sizes() {
        assert_eq!(FftSize::Small.size(), 512);
        assert_eq!(FftSize::Medium.size(), 2048);
        assert_eq!(FftSize::Large.size(), 8192);
        assert_eq!(FftSize::Large.bins(), 4096);
    }

    #[test]
    fn test_band_level_full_range() {
        let spectrum = vec![0u8, 255, 0, 255];
        assert!((band_level(&spectrum, [0.0, 1.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_band_level_sub_range() {
        let spectrum = vec![255u8, 255, 0, 0];
        assert!((band_level(&spectrum, [0.0, 0.5]) - 1.0).abs() < 1e-12);
        assert!((band_level(&spectrum, [0.5, 1.0]) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_band_level_spans_at_least_one_bin() {
        let spectrum = vec![0u8, 0, 255, 0];
        // A degenerate interval still reads one bin.
        let level = band_level(&spectrum, [0.6, 0.6]);
        assert!((level - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_band_level_reversed_range() {
        let spectrum = vec![255u8, 255, 0, 0];
        assert!((band_level(&spectrum, [0.5, 0.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_band_level_empty_spectrum() {
        assert_eq!(band_level(&[], [0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_fixed_spectrum_source() {
        let source = FixedSpectrum {
            bins: vec![10, 20, 30, 40],
        };
        assert_eq!(source.frequency_data().len(), 4);
        assert_eq!(source.waveform()[0], 128);
    }
}
