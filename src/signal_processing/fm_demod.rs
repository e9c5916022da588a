use num_complex::Complex;

use super::FirLowpass;
use super::math::oscillator_phase;
use crate::error::Result;

/// Quadrature FM discriminator for a real-valued subcarrier
///
/// The input is mixed down by `center_hz` to complex baseband, channel
/// filtered with a linear-phase low-pass (delay removed), and the frequency
/// is read from the phase advance across each sample. The centred difference
/// `arg(z[n+1] * conj(z[n-1])) / 2` measures the frequency at sample `n`
/// itself, so the output carries no half-sample lag.
#[derive(Debug, Clone)]
pub struct FmDemodulator {
    center_hz: f32,
    sample_rate: f32,
    baseband: FirLowpass,
}

impl FmDemodulator {
    /// Create a demodulator
    ///
    /// # Arguments
    /// * `center_hz` - Nominal subcarrier frequency
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `cutoff_hz` - Baseband channel filter passband edge
    /// * `num_taps` - Baseband filter length
    /// * `transition_hz` - Baseband filter transition width
    ///
    /// # Errors
    /// Returns `VorError::FilterDesign` if the channel filter cannot be designed
    pub fn new(
        center_hz: f32,
        sample_rate: f32,
        cutoff_hz: f32,
        num_taps: usize,
        transition_hz: f32,
    ) -> Result<Self> {
        Ok(Self {
            center_hz,
            sample_rate,
            baseband: FirLowpass::new(cutoff_hz, sample_rate, num_taps, transition_hz)?,
        })
    }

    /// Mix a real signal down to filtered complex baseband
    pub fn to_baseband(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut i_branch = Vec::with_capacity(input.len());
        let mut q_branch = Vec::with_capacity(input.len());

        for (n, &x) in input.iter().enumerate() {
            let phase = oscillator_phase(self.center_hz as f64, self.sample_rate as f64, n);
            let mixed = Complex::from_polar(x as f64, -phase);
            i_branch.push(mixed.re as f32);
            q_branch.push(mixed.im as f32);
        }

        let i_branch = self.baseband.filter_aligned(&i_branch);
        let q_branch = self.baseband.filter_aligned(&q_branch);

        i_branch
            .into_iter()
            .zip(q_branch)
            .map(|(re, im)| Complex::new(re, im))
            .collect()
    }

    /// Demodulate to instantaneous frequency offset from `center_hz`, in Hz
    pub fn demodulate(&self, input: &[f32]) -> Vec<f32> {
        let baseband = self.to_baseband(input);
        discriminate(&baseband, self.sample_rate)
    }
}

/// Instantaneous frequency of a complex baseband signal, in Hz
///
/// Interior samples use the centred difference; the two end samples fall
/// back to one-sided differences. Output has the input's length.
pub fn discriminate(baseband: &[Complex<f32>], sample_rate: f32) -> Vec<f32> {
    let n = baseband.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let to_hz = sample_rate / (2.0 * std::f32::consts::PI);
    let step = |later: Complex<f32>, earlier: Complex<f32>| (later * earlier.conj()).arg();

    let mut output = Vec::with_capacity(n);
    output.push(step(baseband[1], baseband[0]) * to_hz);
    for w in baseband.windows(3) {
        output.push(step(w[2], w[0]) * 0.5 * to_hz);
    }
    output.push(step(baseband[n - 1], baseband[n - 2]) * to_hz);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const RATE: f32 = 44100.0;

    fn demodulator() -> FmDemodulator {
        FmDemodulator::new(9960.0, RATE, 700.0, 255, 500.0).unwrap()
    }

    #[test]
    fn test_discriminate_constant_offset() {
        let offset_hz = 250.0f64;
        let baseband: Vec<Complex<f32>> = (0..1000)
            .map(|n| {
                let phase = 2.0 * PI * offset_hz * n as f64 / RATE as f64;
                Complex::from_polar(1.0, phase as f32)
            })
            .collect();
        let freq = discriminate(&baseband, RATE);
        assert_eq!(freq.len(), baseband.len());
        for f in freq {
            assert!((f - offset_hz as f32).abs() < 0.5, "{}", f);
        }
    }

    #[test]
    fn test_discriminate_short_inputs() {
        assert!(discriminate(&[], RATE).is_empty());
        assert_eq!(discriminate(&[Complex::new(1.0, 0.0)], RATE), vec![0.0]);
    }

    #[test]
    fn test_unmodulated_carrier_offset() {
        let carrier_hz = 10060.0f64;
        let input: Vec<f32> = (0..8820)
            .map(|n| (2.0 * PI * carrier_hz * n as f64 / RATE as f64).cos() as f32)
            .collect();
        let freq = demodulator().demodulate(&input);

        let settled = &freq[1000..7800];
        let mean = settled.iter().sum::<f32>() / settled.len() as f32;
        assert!((mean - 100.0).abs() < 1.0, "mean offset {}", mean);
    }

    #[test]
    fn test_recovers_30hz_deviation() {
        let beta = 480.0 / 30.0;
        let input: Vec<f32> = (0..22050)
            .map(|n| {
                let t = n as f64 / RATE as f64;
                (2.0 * PI * 9960.0 * t + beta * (2.0 * PI * 30.0 * t).sin()).cos() as f32
            })
            .collect();
        let freq = demodulator().demodulate(&input);

        // Instantaneous frequency is 9960 + 480 cos(2π·30·t)
        for n in (2000..20000).step_by(331) {
            let t = n as f64 / RATE as f64;
            let expected = 480.0 * (2.0 * PI * 30.0 * t).cos();
            assert!(
                (freq[n] as f64 - expected).abs() < 10.0,
                "sample {}: {} vs {}",
                n,
                freq[n],
                expected
            );
        }
    }
}
