//! Configuration for the VOR bearing decoder.
//!
//! Every section has a `Default` matching the standard VOR audio format, and
//! the whole tree deserializes from TOML with missing keys falling back to
//! those defaults:
//!
//! ```
//! use vorbearing::config::{PhaseMethod, VorConfig};
//!
//! let config = VorConfig::from_toml_str(
//!     r#"
//!     [estimator]
//!     method = "zero-crossing"
//!
//!     [bearing]
//!     offset_degrees = 223.0
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.estimator.method, PhaseMethod::ZeroCrossing);
//! assert_eq!(config.bearing.offset_degrees, 223.0);
//! assert_eq!(config.reference.filter_order, 2);
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::VOR_TONE_HZ;
use crate::error::{Result, VorError};

/// How multi-channel recordings are reduced to the mono buffer the decoder
/// works on. The choice matters when channels carry different delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMix {
    /// Mean of all channels
    #[default]
    Average,
    /// A single channel by zero-based index
    Channel(u16),
}

/// Phase estimation method shared by both extractors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseMethod {
    /// I/Q correlation against a 30 Hz reference over whole cycles
    #[default]
    Correlation,
    /// Circular mean of interpolated rising zero crossings
    ZeroCrossing,
}

/// System-wide decoder configuration
///
/// Use `VorConfig::default()` for the standard VOR format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VorConfig {
    /// Audio input configuration
    pub audio: AudioConfig,
    /// 30 Hz reference tone extraction
    pub reference: ReferenceConfig,
    /// 9960 Hz subcarrier demodulation
    pub variable: VariableConfig,
    /// Phase estimation shared by both paths
    pub estimator: EstimatorConfig,
    /// Calibration and validation
    pub bearing: BearingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Multi-channel reduction policy
    pub channel_mix: ChannelMix,
}

/// Reference tone band-pass configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Band-pass lower cutoff in Hz
    pub bandpass_low: f32,
    /// Band-pass upper cutoff in Hz
    pub bandpass_high: f32,
    /// Butterworth order (applied twice, forward and backward)
    pub filter_order: usize,
}

/// Subcarrier isolation and FM demodulation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VariableConfig {
    /// Subcarrier band-pass lower edge in Hz
    pub subcarrier_low: f32,
    /// Subcarrier band-pass upper edge in Hz
    pub subcarrier_high: f32,
    /// Subcarrier FIR length (rounded up to odd)
    pub subcarrier_taps: usize,
    /// Subcarrier FIR transition width in Hz
    pub subcarrier_transition_hz: f32,
    /// Complex baseband low-pass cutoff in Hz
    pub baseband_cutoff_hz: f32,
    /// Baseband FIR length (rounded up to odd)
    pub baseband_taps: usize,
    /// Baseband FIR transition width in Hz
    pub baseband_transition_hz: f32,
    /// Low-pass cutoff applied to the discriminator output in Hz
    pub demod_lowpass_hz: f32,
    /// Butterworth order of the discriminator low-pass
    pub demod_lowpass_order: usize,
    /// Minimum ratio of subcarrier-band RMS to total RMS
    pub min_subcarrier_ratio: f32,
    /// Minimum recovered 30 Hz deviation in Hz
    pub min_deviation_hz: f32,
}

/// Phase estimator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Estimation method
    pub method: PhaseMethod,
    /// Frequency of the tone being measured in Hz
    pub tone_hz: f32,
    /// Whole tone periods the measurement window must hold (rounded up)
    pub min_cycles: f32,
    /// Filter settling time trimmed from each end of the buffer, in seconds.
    /// Buffers too short to keep `min_cycles` after trimming are rejected.
    pub settle_secs: f32,
    /// Minimum recovered reference amplitude (normalized sample units)
    pub min_tone_amplitude: f32,
    /// Minimum recovered reference amplitude relative to buffer RMS
    pub min_tone_ratio: f32,
    /// Zero-crossing hysteresis as a fraction of the tone amplitude
    pub zero_cross_hysteresis: f32,
}

/// Bearing output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BearingConfig {
    /// Calibration offset in degrees added to every bearing
    pub offset_degrees: f32,
    /// Accepted error when checking against an expected bearing
    pub tolerance_degrees: f32,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            bandpass_low: 22.0,
            bandpass_high: 38.0,
            filter_order: 2,
        }
    }
}

impl Default for VariableConfig {
    fn default() -> Self {
        Self {
            subcarrier_low: 9360.0,
            subcarrier_high: 10560.0,
            subcarrier_taps: 255,
            subcarrier_transition_hz: 400.0,
            baseband_cutoff_hz: 700.0,
            baseband_taps: 255,
            baseband_transition_hz: 500.0,
            demod_lowpass_hz: 45.0,
            demod_lowpass_order: 4,
            min_subcarrier_ratio: 0.05,
            min_deviation_hz: 20.0,
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            method: PhaseMethod::Correlation,
            tone_hz: VOR_TONE_HZ,
            min_cycles: 3.0,
            settle_secs: 0.05,
            min_tone_amplitude: 1e-4,
            min_tone_ratio: 1e-3,
            zero_cross_hysteresis: 0.1,
        }
    }
}

impl Default for BearingConfig {
    fn default() -> Self {
        Self {
            offset_degrees: 0.0,
            tolerance_degrees: 2.0,
        }
    }
}

impl VorConfig {
    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| VorError::Config(e.to_string()))
    }

    /// Load a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| VorError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Check the settings the reference path uses: the reference band-pass,
    /// the estimator and the calibration offset
    ///
    /// # Errors
    /// Returns `VorError::Config` describing the first inconsistency found
    pub fn validate_reference(&self, sample_rate: u32) -> Result<()> {
        if sample_rate == 0 {
            return Err(VorError::Config("sample rate must be positive".into()));
        }
        let nyquist = sample_rate as f32 / 2.0;

        let r = &self.reference;
        if !(r.bandpass_low > 0.0 && r.bandpass_low < r.bandpass_high) {
            return Err(VorError::Config(format!(
                "reference band-pass {}-{} Hz is not a valid band",
                r.bandpass_low, r.bandpass_high
            )));
        }
        if r.filter_order == 0 {
            return Err(VorError::Config("reference filter order must be >= 1".into()));
        }

        let e = &self.estimator;
        if e.tone_hz <= 0.0 || e.tone_hz >= nyquist {
            return Err(VorError::Config(format!("invalid tone frequency {}", e.tone_hz)));
        }
        if e.min_cycles < 1.0 {
            return Err(VorError::Config("min_cycles must be at least one period".into()));
        }
        if e.settle_secs < 0.0 {
            return Err(VorError::Config("settle_secs must not be negative".into()));
        }

        if !self.bearing.offset_degrees.is_finite() {
            return Err(VorError::Config("offset must be finite".into()));
        }

        Ok(())
    }

    /// Check that the whole configuration is usable at the given sample rate
    ///
    /// # Errors
    /// * `VorError::Config` describing the first inconsistent setting
    /// * `VorError::SubcarrierAboveNyquist` if the sample rate is too low to
    ///   carry the subcarrier band
    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        self.validate_reference(sample_rate)?;

        let v = &self.variable;
        if !(v.subcarrier_low > 0.0 && v.subcarrier_low < v.subcarrier_high) {
            return Err(VorError::Config(format!(
                "subcarrier band {}-{} Hz is not a valid band",
                v.subcarrier_low, v.subcarrier_high
            )));
        }
        if v.baseband_cutoff_hz <= 0.0 || v.demod_lowpass_hz <= 0.0 {
            return Err(VorError::Config("demodulator cutoffs must be positive".into()));
        }
        if v.demod_lowpass_hz <= self.estimator.tone_hz {
            return Err(VorError::Config(format!(
                "demodulator low-pass {} Hz would reject the {} Hz tone",
                v.demod_lowpass_hz, self.estimator.tone_hz
            )));
        }
        if v.demod_lowpass_order == 0 {
            return Err(VorError::Config("demodulator filter order must be >= 1".into()));
        }

        let band_edge_hz = v.subcarrier_high + v.subcarrier_transition_hz;
        if band_edge_hz >= sample_rate as f32 / 2.0 {
            return Err(VorError::SubcarrierAboveNyquist {
                sample_rate,
                band_edge_hz,
            });
        }

        Ok(())
    }
}
