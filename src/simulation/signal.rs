use std::f64::consts::TAU;

use crate::audio::SampleBuffer;
use crate::constants::{IDENT_TONE_HZ, SUBCARRIER_DEVIATION_HZ, SUBCARRIER_HZ, VOR_TONE_HZ};

/// Parameters of a synthetic VOR composite
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct VorSignalParams {
    pub duration_secs: f32,
    pub sample_rate: u32,
    /// Bearing encoded as `variable - reference` phase
    pub bearing_degrees: f32,
    /// Phase of the reference tone at the first sample
    pub reference_phase_degrees: f32,
    pub reference_amplitude: f32,
    pub subcarrier_amplitude: f32,
    pub deviation_hz: f32,
    /// Subcarrier mistuning, added to the nominal 9960 Hz
    pub subcarrier_offset_hz: f32,
    /// Continuous 1020 Hz ident tone; zero disables it
    pub ident_amplitude: f32,
}

impl Default for VorSignalParams {
    fn default() -> Self {
        Self {
            duration_secs: 1.0,
            sample_rate: 44100,
            bearing_degrees: 0.0,
            reference_phase_degrees: 0.0,
            reference_amplitude: 0.3,
            subcarrier_amplitude: 0.3,
            deviation_hz: SUBCARRIER_DEVIATION_HZ,
            subcarrier_offset_hz: 0.0,
            ident_amplitude: 0.1,
        }
    }
}

impl VorSignalParams {
    pub fn with_bearing(bearing_degrees: f32) -> Self {
        Self {
            bearing_degrees,
            ..Self::default()
        }
    }
}

/// Synthesise the composite audio a VOR receiver would output
///
/// ```text
/// x(t) = Ar cos(ωt + R)
///      + As cos(2π(fs + δ)t + (Δf/30) sin(ωt + R + B))
///      + Ai cos(2π·1020·t)
/// ```
///
/// with `ω = 2π·30`, reference phase `R` and bearing `B`.
pub fn generate_vor_signal(params: &VorSignalParams) -> SampleBuffer {
    let rate = params.sample_rate as f64;
    let num_samples = (params.duration_secs as f64 * rate) as usize;

    let tone_hz = VOR_TONE_HZ as f64;
    let reference_phase = (params.reference_phase_degrees as f64).to_radians();
    let variable_phase = reference_phase + (params.bearing_degrees as f64).to_radians();
    let carrier_hz = (SUBCARRIER_HZ + params.subcarrier_offset_hz) as f64;
    let modulation_index = params.deviation_hz as f64 / tone_hz;

    let samples = (0..num_samples)
        .map(|n| {
            let t = n as f64 / rate;
            let tone = TAU * tone_hz * t;

            let reference = params.reference_amplitude as f64 * (tone + reference_phase).cos();
            let subcarrier = params.subcarrier_amplitude as f64
                * (TAU * carrier_hz * t + modulation_index * (tone + variable_phase).sin()).cos();
            let ident =
                params.ident_amplitude as f64 * (TAU * IDENT_TONE_HZ as f64 * t).cos();

            (reference + subcarrier + ident) as f32
        })
        .collect();

    SampleBuffer::new(samples, params.sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_signal_length() {
        let params = VorSignalParams {
            duration_secs: 0.5,
            ..VorSignalParams::default()
        };
        let buffer = generate_vor_signal(&params);
        assert_eq!(buffer.len(), 22050);
        assert_eq!(buffer.sample_rate(), 44100);
    }

    #[test]
    fn test_signal_stays_in_range() {
        let buffer = generate_vor_signal(&VorSignalParams::with_bearing(123.0));
        let peak = buffer.samples().iter().fold(0.0f32, |a, &b| a.max(b.abs()));
        assert!(peak <= 0.7 + 1e-6, "peak {}", peak);
        assert!(buffer.rms() > 0.1);
    }

    #[test]
    fn test_reference_only() {
        let params = VorSignalParams {
            subcarrier_amplitude: 0.0,
            ident_amplitude: 0.0,
            reference_phase_degrees: 90.0,
            ..VorSignalParams::default()
        };
        let buffer = generate_vor_signal(&params);
        // cos(π/2) at the first sample
        assert!(buffer.samples()[0].abs() < 1e-6);
        assert!((buffer.rms() - 0.3 / 2.0f32.sqrt()).abs() < 1e-3);
    }
}
