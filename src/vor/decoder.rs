use std::path::Path;

use crate::audio::{FilteredSignal, SampleBuffer, SampleSource, WavFileSource};
use crate::config::VorConfig;
use crate::error::Result;

use super::{
    BearingMeasurement, PhaseEstimate, PhaseEstimator, ReferencePhaseExtractor,
    VariablePhaseExtractor, compute_bearing,
};

/// Both recovered 30 Hz tones with their phases
#[derive(Debug, Clone)]
pub struct DemodulatedSignals {
    pub reference: FilteredSignal,
    pub variable: FilteredSignal,
    pub reference_phase: PhaseEstimate,
    pub variable_phase: PhaseEstimate,
}

/// Complete bearing pipeline for recordings at one sample rate
///
/// Filter designs are built once in [`VorDecoder::new`] and only read
/// afterwards, so one decoder can serve any number of recordings, from any
/// number of threads.
#[derive(Debug, Clone)]
pub struct VorDecoder {
    reference: ReferencePhaseExtractor,
    variable: VariablePhaseExtractor,
    sample_rate: u32,
}

impl VorDecoder {
    /// # Errors
    /// * `VorError::SubcarrierAboveNyquist` if `sample_rate` is too low for
    ///   the subcarrier band
    /// * `VorError::Config` or `VorError::FilterDesign` if the configuration
    ///   cannot be realised at `sample_rate`
    pub fn new(config: &VorConfig, sample_rate: u32) -> Result<Self> {
        Ok(Self {
            reference: ReferencePhaseExtractor::new(config, sample_rate)?,
            variable: VariablePhaseExtractor::new(config, sample_rate)?,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Recover both tones and their phases, reference first
    pub fn demodulate(&self, buffer: &SampleBuffer) -> Result<DemodulatedSignals> {
        let (reference_phase, reference) = self.reference.extract_with_signal(buffer)?;
        let (variable_phase, variable) = self.variable.extract_with_signal(buffer)?;

        let confidence = reference_phase.coherence.min(variable_phase.coherence);
        if confidence < 0.5 {
            log::warn!(
                "Low phase coherence {:.2}; bearing may be unreliable",
                confidence
            );
        }

        Ok(DemodulatedSignals {
            reference,
            variable,
            reference_phase,
            variable_phase,
        })
    }

    /// Full measurement with intermediate phases
    pub fn measure(&self, buffer: &SampleBuffer, offset_degrees: f32) -> Result<BearingMeasurement> {
        self.measure_with_signals(buffer, offset_degrees)
            .map(|(measurement, _)| measurement)
    }

    /// Like [`Self::measure`], also returning the recovered tones
    pub fn measure_with_signals(
        &self,
        buffer: &SampleBuffer,
        offset_degrees: f32,
    ) -> Result<(BearingMeasurement, DemodulatedSignals)> {
        let signals = self.demodulate(buffer)?;
        let measurement = BearingMeasurement::new(
            &signals.reference_phase,
            &signals.variable_phase,
            offset_degrees,
            buffer.duration_secs(),
        );
        log::info!(
            "Bearing {:.1}° (raw {:.1}°, offset {:.1}°, confidence {:.2})",
            measurement.bearing_degrees,
            measurement.raw_bearing,
            offset_degrees,
            measurement.confidence
        );
        Ok((measurement, signals))
    }

    /// Bearing in degrees, `[0, 360)`
    pub fn bearing(&self, buffer: &SampleBuffer, offset_degrees: f32) -> Result<f32> {
        let reference = self.reference.extract(buffer)?;
        let variable = self.variable.extract(buffer)?;
        Ok(compute_bearing(reference.degrees, variable.degrees, offset_degrees))
    }
}

/// Reject a buffer too short to measure before any filter is designed, so
/// a short recording reports `InsufficientSignal` at any sample rate
pub fn check_length(config: &VorConfig, buffer: &SampleBuffer) -> Result<()> {
    PhaseEstimator::new(&config.estimator, buffer.sample_rate()).check_length(buffer.len())
}

/// Decode a WAV recording and compute its bearing with the default
/// configuration
///
/// # Errors
/// Returns `VorError::Decode` if the file cannot be read, otherwise any
/// error from the extraction stages, unchanged
pub fn get_bearing<P: AsRef<Path>>(path: P, offset_degrees: f32) -> Result<f32> {
    let config = VorConfig::default();
    let buffer = WavFileSource::new(path, config.audio.channel_mix).load()?;
    bearing_with_config(&config, &buffer, offset_degrees)
}

/// Bearing of an already decoded recording with the default configuration
pub fn get_bearing_from_samples(buffer: &SampleBuffer, offset_degrees: f32) -> Result<f32> {
    bearing_with_config(&VorConfig::default(), buffer, offset_degrees)
}

fn bearing_with_config(config: &VorConfig, buffer: &SampleBuffer, offset_degrees: f32) -> Result<f32> {
    check_length(config, buffer)?;
    VorDecoder::new(config, buffer.sample_rate())?.bearing(buffer, offset_degrees)
}

/// Reference phase of raw samples with the default configuration
pub fn extract_reference_phase(samples: &[f32], sample_rate: u32) -> Result<PhaseEstimate> {
    let config = VorConfig::default();
    let buffer = SampleBuffer::new(samples.to_vec(), sample_rate);
    check_length(&config, &buffer)?;
    ReferencePhaseExtractor::new(&config, sample_rate)?.extract(&buffer)
}

/// Variable phase of raw samples with the default configuration
pub fn extract_variable_phase(samples: &[f32], sample_rate: u32) -> Result<PhaseEstimate> {
    let config = VorConfig::default();
    let buffer = SampleBuffer::new(samples.to_vec(), sample_rate);
    check_length(&config, &buffer)?;
    VariablePhaseExtractor::new(&config, sample_rate)?.extract(&buffer)
}
