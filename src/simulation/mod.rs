mod measure;
mod noise;
mod signal;

pub use measure::{ErrorStats, measure_error_across_bearings};
pub use noise::{AdditiveNoiseConfig, ImpulseNoiseConfig, NoiseConfig, apply_noise, signal_power};
pub use signal::{VorSignalParams, generate_vor_signal};
