use serde::Serialize;

use crate::signal_processing::normalize_degrees;

use super::PhaseEstimate;

/// Bearing from the circular phase difference `variable - reference`
///
/// The offset may be any finite number of degrees; it is normalized before
/// being added, and the result is always in `[0, 360)`.
pub fn compute_bearing(reference_degrees: f32, variable_degrees: f32, offset_degrees: f32) -> f32 {
    let raw = normalize_degrees(variable_degrees - reference_degrees);
    normalize_degrees(raw + normalize_degrees(offset_degrees))
}

/// Bearing measurement result
///
/// Carries the final bearing plus the intermediate phases it came from.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BearingMeasurement {
    /// Calibrated bearing in degrees (0-360)
    pub bearing_degrees: f32,
    /// Bearing before the calibration offset (0-360)
    pub raw_bearing: f32,
    /// Offset that was applied
    pub offset_degrees: f32,
    /// Reference tone phase (0-360)
    pub reference_phase: f32,
    /// Variable tone phase (0-360)
    pub variable_phase: f32,
    /// Weaker of the two phase coherences (0-1 range, higher is better)
    pub confidence: f32,
    /// Recovered subcarrier deviation in Hz
    pub deviation_hz: f32,
    /// Length of the analysed recording
    pub duration_secs: f32,
}

impl BearingMeasurement {
    pub fn new(
        reference: &PhaseEstimate,
        variable: &PhaseEstimate,
        offset_degrees: f32,
        duration_secs: f32,
    ) -> Self {
        Self {
            bearing_degrees: compute_bearing(reference.degrees, variable.degrees, offset_degrees),
            raw_bearing: compute_bearing(reference.degrees, variable.degrees, 0.0),
            offset_degrees,
            reference_phase: reference.degrees,
            variable_phase: variable.degrees,
            confidence: reference.coherence.min(variable.coherence),
            deviation_hz: variable.amplitude,
            duration_secs,
        }
    }
}

/// Absolute circular distance between two bearings, in [0, 180]
pub fn angle_error(measured: f32, expected: f32) -> f32 {
    let diff = normalize_degrees(measured - expected);
    diff.min(360.0 - diff)
}
