use crate::constants::MAX_NORMALIZED_FREQ;
use crate::error::{Result, VorError};
use crate::signal_processing::FirFilterCore;
use pm_remez::{BandSetting, constant, pm_parameters, pm_remez};

/// FIR lowpass filter with linear phase response
///
/// Parks-McClellan design used as the channel filter on the complex baseband
/// after the subcarrier is mixed down.
#[derive(Debug, Clone)]
pub struct FirLowpass {
    core: FirFilterCore,
}

impl FirLowpass {
    /// Create a new FIR lowpass filter
    ///
    /// # Arguments
    /// * `cutoff_hz` - Passband edge in Hz
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `num_taps` - Number of filter taps (rounded up to odd)
    /// * `transition_hz` - Transition bandwidth in Hz
    ///
    /// # Errors
    /// Returns `VorError::FilterDesign` if filter parameters are invalid
    pub fn new(
        cutoff_hz: f32,
        sample_rate: f32,
        num_taps: usize,
        transition_hz: f32,
    ) -> Result<Self> {
        let num_taps = if num_taps.is_multiple_of(2) {
            num_taps + 1
        } else {
            num_taps
        };

        let pass_end = (cutoff_hz / sample_rate) as f64;
        let stop_start = ((cutoff_hz + transition_hz) / sample_rate) as f64;

        if pass_end <= 0.0 || stop_start >= MAX_NORMALIZED_FREQ || transition_hz <= 0.0 {
            return Err(VorError::FilterDesign(format!(
                "Invalid filter frequencies: cutoff={}, sample_rate={}, transition={}",
                cutoff_hz, sample_rate, transition_hz
            )));
        }

        let bands = [
            BandSetting::new(0.0, pass_end, constant(1.0))
                .map_err(|e| VorError::FilterDesign(format!("Passband: {:?}", e)))?,
            BandSetting::new(stop_start, 0.5, constant(0.0))
                .map_err(|e| VorError::FilterDesign(format!("Stopband: {:?}", e)))?,
        ];

        let params = pm_parameters(num_taps, &bands)
            .map_err(|e| VorError::FilterDesign(format!("PM parameters: {:?}", e)))?;

        let design =
            pm_remez(&params).map_err(|e| VorError::FilterDesign(format!("PM Remez: {:?}", e)))?;

        Ok(Self {
            core: FirFilterCore::new(design.impulse_response),
        })
    }

    /// Filter a complete buffer, time-aligned with the input
    pub fn filter_aligned(&self, input: &[f32]) -> Vec<f32> {
        self.core.clone().filter_aligned(input)
    }

    pub fn num_taps(&self) -> usize {
        self.core.num_taps()
    }

    pub fn group_delay_samples(&self) -> usize {
        self.core.group_delay_samples()
    }
}
