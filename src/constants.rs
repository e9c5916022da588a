//! Signal constants and numeric thresholds
//!
//! The VOR constants are fixed by the beacon format. The remaining values are
//! thresholds and epsilons that keep the pipeline numerically stable.

/// Frequency of both the reference and the variable tone.
pub const VOR_TONE_HZ: f32 = 30.0;

/// Nominal centre frequency of the FM subcarrier.
pub const SUBCARRIER_HZ: f32 = 9960.0;

/// Peak frequency deviation of the subcarrier.
pub const SUBCARRIER_DEVIATION_HZ: f32 = 480.0;

/// Frequency of the Morse identification tone.
pub const IDENT_TONE_HZ: f32 = 1020.0;

/// Epsilon for preventing division by zero in interpolation calculations.
/// Used when computing sub-sample zero-crossing positions.
pub const INTERPOLATION_EPSILON: f32 = 1e-10;

/// Minimum signal power threshold for coherence calculations.
pub const MIN_POWER_THRESHOLD: f64 = 1e-20;

/// Minimum RMS threshold below which a buffer is treated as silence.
pub const MIN_RMS_THRESHOLD: f32 = 1e-6;

/// Lowest normalized band edge handed to the Remez designer.
pub const MIN_NORMALIZED_FREQ: f64 = 1e-4;

/// Highest normalized band edge handed to the Remez designer.
pub const MAX_NORMALIZED_FREQ: f64 = 0.5 - 1e-4;
