use crate::audio::{FilteredSignal, SampleBuffer, SignalBand, rms};
use crate::config::VorConfig;
use crate::constants::{MIN_RMS_THRESHOLD, SUBCARRIER_HZ};
use crate::error::{Result, VorError};
use crate::signal_processing::{FirBandpass, FmDemodulator, ZeroPhaseButterworth};

use super::{PhaseEstimate, PhaseEstimator, check_sample_rate};

/// Extracts the phase of the 30 Hz tone carried on the 9960 Hz FM subcarrier
///
/// Stages, each time-aligned with the input:
/// 1. linear-phase FIR band-pass around the subcarrier (delay removed)
/// 2. quadrature FM discriminator, output in Hz of deviation
/// 3. forward-backward Butterworth low-pass to drop discriminator noise
/// 4. the shared [`PhaseEstimator`]
#[derive(Debug, Clone)]
pub struct VariablePhaseExtractor {
    subcarrier: FirBandpass,
    demodulator: FmDemodulator,
    lowpass: ZeroPhaseButterworth,
    estimator: PhaseEstimator,
    sample_rate: u32,
    min_subcarrier_ratio: f32,
    min_deviation_hz: f32,
}

impl VariablePhaseExtractor {
    /// # Errors
    /// * `VorError::SubcarrierAboveNyquist` if `sample_rate` is too low for
    ///   the subcarrier band
    /// * `VorError::Config` or `VorError::FilterDesign` if the configuration
    ///   cannot be realised at `sample_rate`
    pub fn new(config: &VorConfig, sample_rate: u32) -> Result<Self> {
        config.validate(sample_rate)?;
        let v = &config.variable;
        let rate = sample_rate as f32;

        let subcarrier = FirBandpass::new(
            v.subcarrier_low,
            v.subcarrier_high,
            rate,
            v.subcarrier_taps,
            v.subcarrier_transition_hz,
        )?;
        let demodulator = FmDemodulator::new(
            SUBCARRIER_HZ,
            rate,
            v.baseband_cutoff_hz,
            v.baseband_taps,
            v.baseband_transition_hz,
        )?;
        let lowpass = ZeroPhaseButterworth::lowpass(v.demod_lowpass_hz, rate, v.demod_lowpass_order)?;

        Ok(Self {
            subcarrier,
            demodulator,
            lowpass,
            estimator: PhaseEstimator::new(&config.estimator, sample_rate),
            sample_rate,
            min_subcarrier_ratio: v.min_subcarrier_ratio,
            min_deviation_hz: v.min_deviation_hz,
        })
    }

    /// Band-pass the subcarrier and confirm it carries energy
    ///
    /// # Errors
    /// * `VorError::DegenerateSignal` if the whole recording is silent
    /// * `VorError::SubcarrierNotFound` if the band holds too little of the
    ///   recording's energy
    pub fn isolate_subcarrier(&self, buffer: &SampleBuffer) -> Result<FilteredSignal> {
        let total_rms = buffer.rms();
        if total_rms < MIN_RMS_THRESHOLD {
            return Err(VorError::DegenerateSignal(format!(
                "recording is silent (RMS {:.3e})",
                total_rms
            )));
        }

        let band = self.subcarrier.filter_aligned(buffer.samples());
        let band_rms = rms(&band);
        log::debug!(
            "Subcarrier band RMS {:.4} of total {:.4} ({} taps)",
            band_rms,
            total_rms,
            self.subcarrier.num_taps()
        );

        if band_rms < self.min_subcarrier_ratio * total_rms {
            return Err(VorError::SubcarrierNotFound {
                band_rms,
                total_rms,
            });
        }

        Ok(FilteredSignal::new(band, self.sample_rate, SignalBand::Subcarrier))
    }

    /// Demodulate the subcarrier to the recovered 30 Hz tone, in Hz of
    /// deviation with the carrier offset removed
    pub fn recover_tone(&self, subcarrier: &FilteredSignal) -> Result<FilteredSignal> {
        let deviation = self.demodulator.demodulate(subcarrier.samples());
        let mut tone = self.lowpass.filter_zero_phase(&deviation)?;

        // A mistuned subcarrier shows up as DC; measure it where the filters
        // have settled.
        let window = self.estimator.window(tone.len())?;
        let settled = &tone[window];
        let offset = settled.iter().map(|&x| x as f64).sum::<f64>() / settled.len() as f64;
        log::debug!("Subcarrier offset from nominal: {:.1} Hz", offset);
        for sample in tone.iter_mut() {
            *sample -= offset as f32;
        }

        Ok(FilteredSignal::new(tone, self.sample_rate, SignalBand::VariableTone))
    }

    /// Estimate the variable phase relative to the first sample
    ///
    /// # Errors
    /// * `VorError::InsufficientSignal` if the buffer holds too few periods
    /// * `VorError::SubcarrierNotFound` if there is no subcarrier
    /// * `VorError::DegenerateSignal` if the recording is silent or the
    ///   subcarrier is unmodulated
    pub fn extract(&self, buffer: &SampleBuffer) -> Result<PhaseEstimate> {
        self.extract_with_signal(buffer).map(|(estimate, _)| estimate)
    }

    /// Like [`Self::extract`], also returning the recovered tone
    pub fn extract_with_signal(
        &self,
        buffer: &SampleBuffer,
    ) -> Result<(PhaseEstimate, FilteredSignal)> {
        check_sample_rate(buffer, self.sample_rate)?;
        self.estimator.check_length(buffer.len())?;

        let subcarrier = self.isolate_subcarrier(buffer)?;
        let tone = self.recover_tone(&subcarrier)?;
        let estimate = self.estimator.estimate(tone.samples())?;

        if estimate.amplitude < self.min_deviation_hz {
            return Err(VorError::DegenerateSignal(format!(
                "30 Hz deviation on the subcarrier is only {:.1} Hz",
                estimate.amplitude
            )));
        }

        log::debug!(
            "Variable phase {:.2}° (deviation {:.1} Hz, coherence {:.3})",
            estimate.degrees,
            estimate.amplitude,
            estimate.coherence
        );

        Ok((estimate, tone))
    }
}
