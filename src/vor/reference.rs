use crate::audio::{FilteredSignal, SampleBuffer, SignalBand};
use crate::config::VorConfig;
use crate::error::{Result, VorError};
use crate::signal_processing::ZeroPhaseButterworth;

use super::{PhaseEstimate, PhaseEstimator, check_sample_rate};

/// Extracts the phase of the 30 Hz AM reference tone
///
/// The composite is band-passed around 30 Hz with a forward-backward
/// Butterworth filter, which leaves the tone's phase untouched, and the
/// filtered tone is handed to the shared [`PhaseEstimator`].
#[derive(Debug, Clone)]
pub struct ReferencePhaseExtractor {
    bandpass: ZeroPhaseButterworth,
    estimator: PhaseEstimator,
    sample_rate: u32,
    min_tone_amplitude: f32,
    min_tone_ratio: f32,
}

impl ReferencePhaseExtractor {
    /// # Errors
    /// Returns `VorError::Config` or `VorError::FilterDesign` if the
    /// reference settings cannot be realised at `sample_rate`. The subcarrier
    /// settings are not checked, so low-rate recordings still work here.
    pub fn new(config: &VorConfig, sample_rate: u32) -> Result<Self> {
        config.validate_reference(sample_rate)?;
        let r = &config.reference;
        let bandpass = ZeroPhaseButterworth::bandpass(
            r.bandpass_low,
            r.bandpass_high,
            sample_rate as f32,
            r.filter_order,
        )?;

        Ok(Self {
            bandpass,
            estimator: PhaseEstimator::new(&config.estimator, sample_rate),
            sample_rate,
            min_tone_amplitude: config.estimator.min_tone_amplitude,
            min_tone_ratio: config.estimator.min_tone_ratio,
        })
    }

    /// Band-pass the reference tone out of the composite
    pub fn filter(&self, buffer: &SampleBuffer) -> Result<FilteredSignal> {
        let samples = self.bandpass.filter_zero_phase(buffer.samples())?;
        Ok(FilteredSignal::new(samples, self.sample_rate, SignalBand::Reference))
    }

    /// Estimate the reference phase relative to the first sample
    ///
    /// # Errors
    /// * `VorError::InsufficientSignal` if the buffer holds too few periods
    /// * `VorError::DegenerateSignal` if no reference tone is present
    pub fn extract(&self, buffer: &SampleBuffer) -> Result<PhaseEstimate> {
        self.extract_with_signal(buffer).map(|(estimate, _)| estimate)
    }

    /// Like [`Self::extract`], also returning the filtered tone
    pub fn extract_with_signal(
        &self,
        buffer: &SampleBuffer,
    ) -> Result<(PhaseEstimate, FilteredSignal)> {
        check_sample_rate(buffer, self.sample_rate)?;
        self.estimator.check_length(buffer.len())?;

        let filtered = self.filter(buffer)?;
        let estimate = self.estimator.estimate(filtered.samples())?;

        let total_rms = buffer.rms();
        if estimate.amplitude < self.min_tone_amplitude
            || estimate.amplitude < self.min_tone_ratio * total_rms
        {
            return Err(VorError::DegenerateSignal(format!(
                "30 Hz reference amplitude {:.3e} (recording RMS {:.3e})",
                estimate.amplitude, total_rms
            )));
        }

        log::debug!(
            "Reference phase {:.2}° (amplitude {:.4}, coherence {:.3})",
            estimate.degrees,
            estimate.amplitude,
            estimate.coherence
        );

        Ok((estimate, filtered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::vor::angle_error;
    use std::f64::consts::PI;

    const RATE: u32 = 44100;

    fn extractor() -> ReferencePhaseExtractor {
        ReferencePhaseExtractor::new(&VorConfig::default(), RATE).unwrap()
    }

    fn composite(reference_deg: f64, secs: f64) -> SampleBuffer {
        let len = (secs * RATE as f64) as usize;
        let samples = (0..len)
            .map(|n| {
                let t = n as f64 / RATE as f64;
                let reference = 0.3 * (2.0 * PI * 30.0 * t + reference_deg.to_radians()).cos();
                let subcarrier = 0.3 * (2.0 * PI * 9960.0 * t).cos();
                let ident = 0.1 * (2.0 * PI * 1020.0 * t).cos();
                (reference + subcarrier + ident) as f32
            })
            .collect();
        SampleBuffer::new(samples, RATE)
    }

    #[test]
    fn test_extracts_reference_phase_from_composite() {
        for phase in [0.0, 77.0, 180.0, 333.0] {
            let estimate = extractor().extract(&composite(phase, 0.5)).unwrap();
            let mut error = (estimate.degrees as f64 - phase).abs();
            if error > 180.0 {
                error = 360.0 - error;
            }
            assert!(error < 0.5, "expected {}, got {}", phase, estimate.degrees);
            assert!((estimate.amplitude - 0.3).abs() < 0.01);
        }
    }

    #[test]
    fn test_filtered_signal_shape() {
        let buffer = composite(10.0, 0.5);
        let (_, filtered) = extractor().extract_with_signal(&buffer).unwrap();
        assert_eq!(filtered.len(), buffer.len());
        assert_eq!(filtered.band(), SignalBand::Reference);
        assert_eq!(filtered.sample_rate(), RATE);
    }

    #[test]
    fn test_silence_is_degenerate() {
        let buffer = SampleBuffer::new(vec![0.0; 22050], RATE);
        let err = extractor().extract(&buffer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateSignal);
    }

    #[test]
    fn test_shorter_than_one_cycle() {
        let buffer = composite(0.0, 0.02);
        let err = extractor().extract(&buffer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientSignal);
    }

    #[test]
    fn test_works_below_subcarrier_rate() {
        let rate = 8000;
        let samples: Vec<f32> = (0..rate)
            .map(|n| {
                let t = n as f64 / rate as f64;
                (0.3 * (2.0 * PI * 30.0 * t + 70f64.to_radians()).cos()) as f32
            })
            .collect();
        let extractor = ReferencePhaseExtractor::new(&VorConfig::default(), rate).unwrap();
        let estimate = extractor
            .extract(&SampleBuffer::new(samples, rate))
            .unwrap();
        assert!(angle_error(estimate.degrees, 70.0) < 1.0, "got {}", estimate.degrees);
    }

    #[test]
    fn test_sample_rate_mismatch() {
        let buffer = SampleBuffer::new(vec![0.0; 24000], 48000);
        let err = extractor().extract(&buffer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
