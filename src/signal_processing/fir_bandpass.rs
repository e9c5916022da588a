use crate::constants::{MAX_NORMALIZED_FREQ, MIN_NORMALIZED_FREQ};
use crate::error::{Result, VorError};
use crate::signal_processing::FirFilterCore;
use pm_remez::{BandSetting, constant, pm_parameters, pm_remez};

/// FIR bandpass filter with linear phase response
///
/// Uses the Parks-McClellan (Remez) algorithm to design an optimal equiripple
/// FIR filter. Linear phase delays every component equally, so once the group
/// delay is removed the subcarrier keeps its timing relative to the input.
#[derive(Debug, Clone)]
pub struct FirBandpass {
    core: FirFilterCore,
    sample_rate: f32,
}

impl FirBandpass {
    /// Create a new FIR bandpass filter
    ///
    /// # Arguments
    /// * `low_hz` - Lower passband edge in Hz
    /// * `high_hz` - Upper passband edge in Hz
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `num_taps` - Number of filter taps (rounded up to odd for Type I linear phase)
    /// * `transition_hz` - Transition bandwidth in Hz
    ///
    /// # Errors
    /// Returns `VorError::FilterDesign` if filter parameters are invalid
    pub fn new(
        low_hz: f32,
        high_hz: f32,
        sample_rate: f32,
        num_taps: usize,
        transition_hz: f32,
    ) -> Result<Self> {
        let num_taps = if num_taps.is_multiple_of(2) {
            num_taps + 1
        } else {
            num_taps
        };

        let normalize = |hz: f32| (hz / sample_rate) as f64;

        let trans_norm = (transition_hz / sample_rate) as f64;

        let stop1_end = normalize(low_hz) - trans_norm;
        let pass_start = normalize(low_hz);
        let pass_end = normalize(high_hz);
        let stop2_start = normalize(high_hz) + trans_norm;

        let stop1_end = stop1_end.max(MIN_NORMALIZED_FREQ);
        let stop2_start = stop2_start.min(MAX_NORMALIZED_FREQ);

        if pass_start <= stop1_end || pass_end >= stop2_start {
            return Err(VorError::FilterDesign(format!(
                "Invalid filter frequencies: low={}, high={}, sample_rate={}, transition={}",
                low_hz, high_hz, sample_rate, transition_hz
            )));
        }

        let bands = [
            BandSetting::new(0.0, stop1_end, constant(0.0))
                .map_err(|e| VorError::FilterDesign(format!("Lower stopband: {:?}", e)))?,
            BandSetting::new(pass_start, pass_end, constant(1.0))
                .map_err(|e| VorError::FilterDesign(format!("Passband: {:?}", e)))?,
            BandSetting::new(stop2_start, 0.5, constant(0.0))
                .map_err(|e| VorError::FilterDesign(format!("Upper stopband: {:?}", e)))?,
        ];

        let params = pm_parameters(num_taps, &bands)
            .map_err(|e| VorError::FilterDesign(format!("PM parameters: {:?}", e)))?;

        let design =
            pm_remez(&params).map_err(|e| VorError::FilterDesign(format!("PM Remez: {:?}", e)))?;

        log::debug!(
            "Designed {}-tap bandpass {:.0}-{:.0} Hz at {} Hz",
            num_taps,
            low_hz,
            high_hz,
            sample_rate
        );

        Ok(Self {
            core: FirFilterCore::new(design.impulse_response),
            sample_rate,
        })
    }

    /// Filter a complete buffer, time-aligned with the input
    ///
    /// Runs on a fresh copy of the filter so the design can be shared.
    pub fn filter_aligned(&self, input: &[f32]) -> Vec<f32> {
        self.core.clone().filter_aligned(input)
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.core.num_taps()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        self.core.group_delay_samples()
    }

    /// Magnitude response at `freq_hz`
    pub fn gain_at(&self, freq_hz: f32) -> f32 {
        self.core.gain_at((freq_hz / self.sample_rate) as f64) as f32
    }
}
