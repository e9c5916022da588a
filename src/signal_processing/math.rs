use std::f64::consts::TAU;

/// Normalize an angle in degrees to the canonical range [0, 360)
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest-path difference `a - b` in degrees, in (-180, 180]
pub fn phase_difference_degrees(a: f32, b: f32) -> f32 {
    let diff = normalize_degrees(a - b);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

/// Wrap a phase in radians to [0, 2π)
pub fn wrap_radians(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Phase of an oscillator at `freq_hz` after `n` samples, in [0, 2π)
///
/// The cycle count is reduced before scaling by 2π so long buffers do not
/// lose precision.
pub fn oscillator_phase(freq_hz: f64, sample_rate: f64, n: usize) -> f64 {
    let cycles = freq_hz * n as f64 / sample_rate;
    TAU * cycles.fract()
}

/// Circular mean of angles in radians
///
/// Returns `None` for an empty input or when the angles cancel out.
pub fn circular_mean_radians(angles: &[f64]) -> Option<f64> {
    if angles.is_empty() {
        return None;
    }
    let (sin_sum, cos_sum) = angles
        .iter()
        .fold((0.0, 0.0), |(s, c), a| (s + a.sin(), c + a.cos()));
    if sin_sum.hypot(cos_sum) < 1e-9 * angles.len() as f64 {
        return None;
    }
    Some(wrap_radians(sin_sum.atan2(cos_sum)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_degrees() {
        assert_abs_diff_eq!(normalize_degrees(0.0), 0.0);
        assert_abs_diff_eq!(normalize_degrees(360.0), 0.0);
        assert_abs_diff_eq!(normalize_degrees(-90.0), 270.0);
        assert_abs_diff_eq!(normalize_degrees(725.0), 5.0, epsilon = 1e-4);
        assert_abs_diff_eq!(normalize_degrees(-1e-8), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_idempotent() {
        for deg in [0.0, 0.5, 90.0, 179.9, 359.99] {
            let once = normalize_degrees(deg);
            assert_eq!(normalize_degrees(once), once);
        }
    }

    #[test]
    fn test_phase_difference_wraps() {
        assert_abs_diff_eq!(phase_difference_degrees(2.0, 359.0), 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(phase_difference_degrees(359.0, 2.0), -3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(phase_difference_degrees(90.0, 270.0), 180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_oscillator_phase() {
        // 30 Hz at 44100 Hz: exactly 1470 samples per cycle
        assert_abs_diff_eq!(oscillator_phase(30.0, 44100.0, 1470), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(oscillator_phase(30.0, 44100.0, 735), PI, epsilon = 1e-9);
        assert_abs_diff_eq!(
            oscillator_phase(30.0, 44100.0, 1470 * 1000 + 367),
            oscillator_phase(30.0, 44100.0, 367),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_circular_mean_across_zero() {
        let mean = circular_mean_radians(&[2.0 * PI - 0.1, 0.1]).unwrap();
        assert!(mean < 1e-9 || (2.0 * PI - mean) < 1e-9, "mean {}", mean);

        let mean = circular_mean_radians(&[1.0, 1.2]).unwrap();
        assert_abs_diff_eq!(mean, 1.1, epsilon = 1e-9);

        assert!(circular_mean_radians(&[]).is_none());
        assert!(circular_mean_radians(&[0.0, PI]).is_none());
    }
}
