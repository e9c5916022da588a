use crate::constants::{SUBCARRIER_HZ, VOR_TONE_HZ};

/// Decoded mono recording
///
/// Samples are normalized to `[-1, 1]`. The buffer is never mutated once
/// built; every stage derives new signals from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recording length in seconds
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

/// Frequency band a [`FilteredSignal`] isolates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalBand {
    /// 30 Hz AM reference tone
    Reference,
    /// 9960 Hz FM subcarrier
    Subcarrier,
    /// 30 Hz tone recovered from the subcarrier, in Hz of deviation
    VariableTone,
}

impl SignalBand {
    pub fn center_hz(&self) -> f32 {
        match self {
            SignalBand::Reference | SignalBand::VariableTone => VOR_TONE_HZ,
            SignalBand::Subcarrier => SUBCARRIER_HZ,
        }
    }
}

/// Filtered derivative of a [`SampleBuffer`]
///
/// Time-aligned with its source: sample `n` here corresponds to sample `n`
/// of the input, with the same length and rate.
#[derive(Debug, Clone)]
pub struct FilteredSignal {
    samples: Vec<f32>,
    sample_rate: u32,
    band: SignalBand,
}

impl FilteredSignal {
    pub fn new(samples: Vec<f32>, sample_rate: u32, band: SignalBand) -> Self {
        Self {
            samples,
            sample_rate,
            band,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn band(&self) -> SignalBand {
        self.band
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }
}

/// Root-mean-square level, accumulated in f64
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let buffer = SampleBuffer::new(vec![0.0; 22050], 44100);
        assert!((buffer.duration_secs() - 0.5).abs() < 1e-6);
        assert_eq!(buffer.len(), 22050);
    }

    #[test]
    fn test_rms_of_sine() {
        let samples: Vec<f32> = (0..48000)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin())
            .collect();
        let level = rms(&samples);
        assert!((level - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn test_rms_empty() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(SampleBuffer::new(Vec::new(), 44100).rms(), 0.0);
    }

    #[test]
    fn test_band_centers() {
        assert_eq!(SignalBand::Reference.center_hz(), 30.0);
        assert_eq!(SignalBand::Subcarrier.center_hz(), 9960.0);
    }
}
