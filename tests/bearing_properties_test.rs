use vorbearing::compute_bearing;
use vorbearing::signal_processing::{normalize_degrees, phase_difference_degrees};
use vorbearing::vor::angle_error;

const PHASES: [f32; 9] = [0.0, 0.5, 30.0, 89.9, 180.0, 200.25, 270.0, 333.0, 359.9];
const OFFSETS: [f32; 7] = [-725.0, -90.0, 0.0, 1.5, 223.0, 359.0, 1080.0];

#[test]
fn test_result_always_in_range() {
    for &r in &PHASES {
        for &v in &PHASES {
            for &o in &OFFSETS {
                let b = compute_bearing(r, v, o);
                assert!((0.0..360.0).contains(&b), "{} {} {} gave {}", r, v, o, b);
            }
        }
    }
}

#[test]
fn test_common_phase_shift_cancels() {
    for &r in &PHASES {
        for &v in &PHASES {
            let base = compute_bearing(r, v, 0.0);
            for k in [12.0, 90.0, 181.0, 359.0, 720.0] {
                let shifted = compute_bearing(r + k, v + k, 0.0);
                assert!(angle_error(base, shifted) < 1e-3, "{} {} shift {}", r, v, k);
            }
        }
    }
}

#[test]
fn test_offset_is_additive() {
    for &r in &PHASES {
        for &v in &PHASES {
            let raw = compute_bearing(r, v, 0.0);
            for &o in &OFFSETS {
                let expected = normalize_degrees(raw + o);
                assert!(angle_error(compute_bearing(r, v, o), expected) < 1e-3);
            }
        }
    }
}

#[test]
fn test_wraparound_difference() {
    assert!((compute_bearing(359.0, 2.0, 0.0) - 3.0).abs() < 1e-4);
    assert!((phase_difference_degrees(2.0, 359.0) - 3.0).abs() < 1e-4);
    assert!((phase_difference_degrees(359.0, 2.0) + 3.0).abs() < 1e-4);
}

#[test]
fn test_normalization_is_idempotent() {
    for x in [-1000.0, -360.0, -0.5, 0.0, 45.0, 359.999, 360.0, 721.0] {
        let once = normalize_degrees(x);
        assert!((0.0..360.0).contains(&once), "{} gave {}", x, once);
        assert_eq!(normalize_degrees(once), once);
    }
}
