pub mod bearing;
pub mod decoder;
pub mod estimator;
pub mod reference;
pub mod variable;

pub use bearing::{BearingMeasurement, angle_error, compute_bearing};
pub use decoder::{
    DemodulatedSignals, VorDecoder, check_length, extract_reference_phase, extract_variable_phase,
    get_bearing, get_bearing_from_samples,
};
pub use estimator::{PhaseEstimate, PhaseEstimator};
pub use reference::ReferencePhaseExtractor;
pub use variable::VariablePhaseExtractor;

use crate::audio::SampleBuffer;
use crate::error::{Result, VorError};

fn check_sample_rate(buffer: &SampleBuffer, expected: u32) -> Result<()> {
    if buffer.sample_rate() != expected {
        return Err(VorError::Config(format!(
            "extractor built for {} Hz given a {} Hz recording",
            expected,
            buffer.sample_rate()
        )));
    }
    Ok(())
}
