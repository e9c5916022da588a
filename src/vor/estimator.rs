use std::f64::consts::{FRAC_PI_2, SQRT_2, TAU};
use std::ops::Range;

use crate::config::{EstimatorConfig, PhaseMethod};
use crate::constants::{MIN_POWER_THRESHOLD, MIN_RMS_THRESHOLD};
use crate::error::{Result, VorError};
use crate::signal_processing::{
    ZeroCrossingDetector, circular_mean_radians, oscillator_phase, wrap_radians,
};

/// Phase of a 30 Hz tone at the first sample of its buffer
///
/// Cosine convention: a tone `A cos(2π·f·t + φ)` is reported as `φ` in
/// degrees, `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseEstimate {
    /// Phase in degrees, [0, 360)
    pub degrees: f32,
    /// Recovered tone amplitude, in the units of the measured signal
    pub amplitude: f32,
    /// Share of the measured window explained by the tone (0-1)
    pub coherence: f32,
}

/// Tone phase estimator shared by the reference and variable paths
///
/// Both paths run through the same estimator so their phases have the same
/// time origin (sample 0) and sign convention. Filter start-up transients are
/// trimmed from both ends and the measurement window is cut to a whole number
/// of tone periods, centred in what remains.
#[derive(Debug, Clone)]
pub struct PhaseEstimator {
    method: PhaseMethod,
    tone_hz: f64,
    sample_rate: f64,
    min_cycles: f64,
    settle_samples: usize,
    zero_cross_hysteresis: f32,
}

impl PhaseEstimator {
    pub fn new(config: &EstimatorConfig, sample_rate: u32) -> Self {
        let sample_rate = sample_rate as f64;
        Self {
            method: config.method,
            tone_hz: config.tone_hz as f64,
            sample_rate,
            min_cycles: config.min_cycles as f64,
            settle_samples: (config.settle_secs as f64 * sample_rate).round() as usize,
            zero_cross_hysteresis: config.zero_cross_hysteresis,
        }
    }

    fn period_samples(&self) -> f64 {
        self.sample_rate / self.tone_hz
    }

    /// Whole tone periods the measurement window must hold
    fn required_cycles(&self) -> f64 {
        self.min_cycles.ceil().max(1.0)
    }

    /// Shortest buffer that can be measured: the settling time at both ends
    /// plus [`EstimatorConfig::min_cycles`] whole periods
    pub fn min_samples(&self) -> usize {
        2 * self.settle_samples + (self.required_cycles() * self.period_samples()).ceil() as usize
    }

    /// # Errors
    /// Returns `VorError::InsufficientSignal` below [`Self::min_samples`]
    pub fn check_length(&self, available: usize) -> Result<()> {
        let needed = self.min_samples();
        if available < needed {
            return Err(VorError::InsufficientSignal { needed, available });
        }
        Ok(())
    }

    /// Sample range used for the measurement of a buffer of length `len`
    ///
    /// The settling time is always trimmed in full from both ends.
    pub fn window(&self, len: usize) -> Result<Range<usize>> {
        self.check_length(len)?;

        let available = len - 2 * self.settle_samples;
        let period = self.period_samples();
        let cycles = (available as f64 / period).floor();
        if cycles < self.required_cycles() {
            return Err(VorError::InsufficientSignal {
                needed: self.min_samples(),
                available: len,
            });
        }

        let window_len = ((cycles * period).round() as usize).min(available);
        let start = self.settle_samples + (available - window_len) / 2;
        Ok(start..start + window_len)
    }

    /// Estimate the tone phase of a filtered signal
    ///
    /// # Errors
    /// * `VorError::InsufficientSignal` if the signal is too short
    /// * `VorError::DegenerateSignal` if zero-crossing estimation finds no
    ///   usable crossings
    pub fn estimate(&self, signal: &[f32]) -> Result<PhaseEstimate> {
        let window = self.window(signal.len())?;
        let estimate = match self.method {
            PhaseMethod::Correlation => self.estimate_correlation(signal, window),
            PhaseMethod::ZeroCrossing => self.estimate_zero_crossing(signal, window)?,
        };
        log::trace!(
            "{:?} estimate: {:.2}° amplitude {:.4} coherence {:.3}",
            self.method,
            estimate.degrees,
            estimate.amplitude,
            estimate.coherence
        );
        Ok(estimate)
    }

    /// I/Q correlation against cos/sin at the tone frequency
    ///
    /// For `x[n] = A cos(ωn + φ)` over whole periods,
    /// `I = Σ x cos(ωn) = (N·A/2) cos φ` and `Q = Σ x sin(ωn) = -(N·A/2) sin φ`,
    /// so `φ = atan2(-Q, I)`.
    fn estimate_correlation(&self, signal: &[f32], window: Range<usize>) -> PhaseEstimate {
        let len = window.len() as f64;
        let mut i_sum = 0.0f64;
        let mut q_sum = 0.0f64;
        let mut power_sum = 0.0f64;

        for n in window {
            let x = signal[n] as f64;
            let phase = oscillator_phase(self.tone_hz, self.sample_rate, n);
            i_sum += x * phase.cos();
            q_sum += x * phase.sin();
            power_sum += x * x;
        }

        let amplitude = 2.0 * i_sum.hypot(q_sum) / len;
        let phase = wrap_radians((-q_sum).atan2(i_sum));

        let signal_power = power_sum / len;
        let coherence = if signal_power > MIN_POWER_THRESHOLD {
            (amplitude / (SQRT_2 * signal_power.sqrt())).min(1.0)
        } else {
            0.0
        };

        PhaseEstimate {
            degrees: phase_degrees(phase),
            amplitude: amplitude as f32,
            coherence: coherence as f32,
        }
    }

    /// Circular mean of the phases implied by each rising zero crossing
    ///
    /// A rising crossing of `cos(ωt + φ)` happens where `ωt + φ = -π/2`.
    fn estimate_zero_crossing(&self, signal: &[f32], window: Range<usize>) -> Result<PhaseEstimate> {
        let start = window.start;
        let slice = &signal[window];

        let power = slice.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>() / slice.len() as f64;
        let amplitude = SQRT_2 * power.sqrt();
        if amplitude < MIN_RMS_THRESHOLD as f64 {
            return Err(VorError::DegenerateSignal(format!(
                "tone amplitude {:.3e} too small for zero-crossing detection",
                amplitude
            )));
        }

        let detector =
            ZeroCrossingDetector::for_amplitude(amplitude as f32, self.zero_cross_hysteresis);
        let phases: Vec<f64> = detector
            .find_all_crossings(slice)
            .into_iter()
            .map(|c| {
                let position = start as f64 + c as f64;
                let cycles = (self.tone_hz * position / self.sample_rate).fract();
                wrap_radians(-FRAC_PI_2 - TAU * cycles)
            })
            .collect();

        let mean = circular_mean_radians(&phases).ok_or_else(|| {
            VorError::DegenerateSignal(format!(
                "{} zero crossings gave no consistent phase",
                phases.len()
            ))
        })?;

        let (sin_sum, cos_sum) = phases
            .iter()
            .fold((0.0f64, 0.0f64), |(s, c), p| (s + p.sin(), c + p.cos()));
        let coherence = sin_sum.hypot(cos_sum) / phases.len() as f64;

        Ok(PhaseEstimate {
            degrees: phase_degrees(mean),
            amplitude: amplitude as f32,
            coherence: coherence as f32,
        })
    }
}

fn phase_degrees(radians: f64) -> f32 {
    let degrees = radians.to_degrees() as f32;
    if degrees >= 360.0 { 0.0 } else { degrees }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const RATE: u32 = 44100;

    fn estimator(method: PhaseMethod) -> PhaseEstimator {
        let config = EstimatorConfig {
            method,
            ..EstimatorConfig::default()
        };
        PhaseEstimator::new(&config, RATE)
    }

    fn tone(amplitude: f64, phase_deg: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| {
                let t = n as f64 / RATE as f64;
                (amplitude * (2.0 * PI * 30.0 * t + phase_deg.to_radians()).cos()) as f32
            })
            .collect()
    }

    fn angle_error(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_min_samples() {
        // 2205 settling samples per side plus three periods of 1470
        assert_eq!(estimator(PhaseMethod::Correlation).min_samples(), 8820);
    }

    #[test]
    fn test_window_is_whole_periods() {
        let window = estimator(PhaseMethod::Correlation).window(22050).unwrap();
        assert_eq!(window.len() % 1470, 0);
        assert!(window.start >= 2205);
        assert!(window.end <= 22050 - 2205);
    }

    #[test]
    fn test_shortest_window_keeps_full_settling_trim() {
        let window = estimator(PhaseMethod::Correlation).window(8820).unwrap();
        assert_eq!(window, 2205..6615);

        let err = estimator(PhaseMethod::Correlation).window(8819).unwrap_err();
        assert!(matches!(
            err,
            VorError::InsufficientSignal {
                needed: 8820,
                available: 8819
            }
        ));
    }

    #[test]
    fn test_fractional_cycles_round_up() {
        let config = EstimatorConfig {
            min_cycles: 2.5,
            ..EstimatorConfig::default()
        };
        let est = PhaseEstimator::new(&config, RATE);
        assert_eq!(est.min_samples(), 2 * 2205 + 3 * 1470);
        assert!(est.window(est.min_samples()).is_ok());
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = estimator(PhaseMethod::Correlation)
            .estimate(&tone(1.0, 0.0, 1000))
            .unwrap_err();
        assert!(matches!(
            err,
            VorError::InsufficientSignal {
                needed: 8820,
                available: 1000
            }
        ));
    }

    #[test]
    fn test_correlation_recovers_phase() {
        let est = estimator(PhaseMethod::Correlation);
        for phase in [0.0, 45.0, 123.0, 200.0, 359.0] {
            let estimate = est.estimate(&tone(0.3, phase, 22050)).unwrap();
            assert!(
                angle_error(estimate.degrees, phase as f32) < 0.1,
                "expected {}, got {}",
                phase,
                estimate.degrees
            );
            assert!((estimate.amplitude - 0.3).abs() < 1e-3);
            assert!(estimate.coherence > 0.99);
        }
    }

    #[test]
    fn test_zero_crossing_recovers_phase() {
        let est = estimator(PhaseMethod::ZeroCrossing);
        for phase in [0.0, 90.0, 181.0, 300.0] {
            let estimate = est.estimate(&tone(1.0, phase, 22050)).unwrap();
            assert!(
                angle_error(estimate.degrees, phase as f32) < 0.1,
                "expected {}, got {}",
                phase,
                estimate.degrees
            );
            assert!(estimate.coherence > 0.99);
        }
    }

    #[test]
    fn test_zero_crossing_silence_is_degenerate() {
        let err = estimator(PhaseMethod::ZeroCrossing)
            .estimate(&vec![0.0; 22050])
            .unwrap_err();
        assert!(matches!(err, VorError::DegenerateSignal(_)));
    }

    #[test]
    fn test_correlation_silence_has_zero_amplitude() {
        let estimate = estimator(PhaseMethod::Correlation)
            .estimate(&vec![0.0; 22050])
            .unwrap();
        assert_eq!(estimate.amplitude, 0.0);
        assert_eq!(estimate.coherence, 0.0);
    }
}
