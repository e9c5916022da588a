pub mod fir_bandpass;
pub mod fir_core;
pub mod fir_lowpass;
pub mod fm_demod;
pub mod iir_butterworth;
pub mod math;
pub mod zero_crossing_detector;

pub use fir_bandpass::FirBandpass;
pub use fir_core::FirFilterCore;
pub use fir_lowpass::FirLowpass;
pub use fm_demod::{FmDemodulator, discriminate};
pub use iir_butterworth::ZeroPhaseButterworth;
pub use math::{
    circular_mean_radians, normalize_degrees, oscillator_phase, phase_difference_degrees,
    wrap_radians,
};
pub use zero_crossing_detector::ZeroCrossingDetector;
