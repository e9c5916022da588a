pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod signal_processing;
pub mod vor;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use audio::{SampleBuffer, decode};
pub use config::VorConfig;
pub use error::{ErrorKind, Result, VorError};
pub use vor::{
    BearingMeasurement, VorDecoder, compute_bearing, extract_reference_phase,
    extract_variable_phase, get_bearing, get_bearing_from_samples,
};
pub use wav::save_wav;
