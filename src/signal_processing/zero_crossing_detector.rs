use crate::constants::INTERPOLATION_EPSILON;

/// Rising-edge zero-crossing detector with hysteresis
///
/// A crossing only counts once the signal has been below `-hysteresis` and
/// then rises above `+hysteresis`. The reported position is the linearly
/// interpolated point where the signal passed through zero, not where it
/// crossed the threshold.
#[derive(Debug, Clone)]
pub struct ZeroCrossingDetector {
    hysteresis: f32,
}

impl ZeroCrossingDetector {
    /// Create a new zero-crossing detector
    ///
    /// # Arguments
    /// * `hysteresis` - Absolute hysteresis threshold
    pub fn new(hysteresis: f32) -> Self {
        Self {
            hysteresis: hysteresis.abs(),
        }
    }

    /// Detector whose hysteresis scales with the expected tone amplitude
    pub fn for_amplitude(amplitude: f32, fraction: f32) -> Self {
        Self::new(amplitude * fraction)
    }

    /// Find all rising crossings in a buffer with sub-sample interpolation
    ///
    /// Returns fractional sample positions relative to the start of `buffer`.
    pub fn find_all_crossings(&self, buffer: &[f32]) -> Vec<f32> {
        let mut crossings = Vec::new();
        let Some(&first) = buffer.first() else {
            return crossings;
        };

        let mut armed = first < -self.hysteresis;
        let mut prev_sample = first;
        let mut pending_crossing: Option<f32> = None;

        for (i, &sample) in buffer.iter().enumerate().skip(1) {
            if sample < -self.hysteresis {
                armed = true;
                pending_crossing = None;
            }

            if armed && pending_crossing.is_none() && prev_sample <= 0.0 && sample > 0.0 {
                let denominator = sample - prev_sample;
                let crossing = if denominator.abs() > INTERPOLATION_EPSILON {
                    let fraction = sample / denominator;
                    i as f32 - fraction
                } else {
                    i as f32
                };
                pending_crossing = Some(crossing);
            }

            if armed && sample > self.hysteresis {
                crossings.push(pending_crossing.unwrap_or(i as f32));
                armed = false;
                pending_crossing = None;
            }

            prev_sample = sample;
        }

        crossings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_crossing_detection() {
        let detector = ZeroCrossingDetector::new(0.01);

        // 0 to 20 radians is about 3.2 periods
        let signal: Vec<f32> = (0..200).map(|i| (i as f32 * 0.1).sin()).collect();

        let crossings = detector.find_all_crossings(&signal);

        assert_eq!(crossings.len(), 3, "crossings: {:?}", crossings);
        let period = 2.0 * std::f32::consts::PI / 0.1;
        for (k, c) in crossings.iter().enumerate() {
            let expected = period * (k + 1) as f32;
            assert!((c - expected).abs() < 0.05, "{} vs {}", c, expected);
        }
    }

    #[test]
    fn test_zero_crossing_hysteresis() {
        let detector = ZeroCrossingDetector::new(0.1);

        let signal = vec![-0.05, 0.05, -0.05, 0.05, -0.5, 0.5];

        let crossings = detector.find_all_crossings(&signal);

        assert_eq!(crossings.len(), 1);
        let expected = 5.0 - 0.5 / (0.5 - (-0.5));
        assert!((crossings[0] - expected).abs() < 0.01);
    }

    #[test]
    fn test_first_sample_arms_detector() {
        let detector = ZeroCrossingDetector::new(0.1);

        let crossings = detector.find_all_crossings(&[-0.5, 0.5]);

        assert_eq!(crossings.len(), 1);
        assert!((crossings[0] - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_interpolation_uses_zero_not_threshold() {
        let detector = ZeroCrossingDetector::for_amplitude(1.0, 0.1);

        // Zero crossing happens between samples 0 and 1, but the threshold is
        // only exceeded at sample 2.
        let signal = vec![-0.3, 0.05, 0.2, 0.4];
        let crossings = detector.find_all_crossings(&signal);

        assert_eq!(crossings.len(), 1);
        let expected = 1.0 - 0.05 / (0.05 - (-0.3));
        assert!(
            (crossings[0] - expected).abs() < 0.01,
            "Expected {}, got {}",
            expected,
            crossings[0]
        );
    }

    #[test]
    fn test_empty_and_flat_buffers() {
        let detector = ZeroCrossingDetector::new(0.1);
        assert!(detector.find_all_crossings(&[]).is_empty());
        assert!(detector.find_all_crossings(&[0.0; 64]).is_empty());
    }
}
