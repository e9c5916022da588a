use crate::audio::SampleBuffer;
use crate::config::VorConfig;
use crate::error::Result;
use crate::vor::{VorDecoder, angle_error};

use super::{NoiseConfig, VorSignalParams, apply_noise, generate_vor_signal};

/// Bearing error figures over a sweep of bearings
#[derive(Debug, Clone, Default)]
pub struct ErrorStats {
    pub max_error: f32,
    pub mean_error: f32,
    /// Bearings where decoding returned an error
    pub failures: usize,
}

/// Decode a noisy synthetic recording at each bearing and report the errors
///
/// `template` supplies everything but the bearing.
pub fn measure_error_across_bearings(
    template: &VorSignalParams,
    noise_config: &NoiseConfig,
    vor_config: &VorConfig,
    test_bearings: &[f32],
) -> Result<ErrorStats> {
    let decoder = VorDecoder::new(vor_config, template.sample_rate)?;

    let mut errors = Vec::with_capacity(test_bearings.len());
    let mut failures = 0;

    for &bearing in test_bearings {
        let params = VorSignalParams {
            bearing_degrees: bearing,
            ..template.clone()
        };
        let clean = generate_vor_signal(&params);
        let noisy = apply_noise(clean.samples(), noise_config, template.sample_rate as f32);
        let buffer = SampleBuffer::new(noisy, template.sample_rate);

        match decoder.bearing(&buffer, 0.0) {
            Ok(measured) => errors.push(angle_error(measured, bearing)),
            Err(e) => {
                log::debug!("Bearing {:.1}° failed: {}", bearing, e);
                failures += 1;
            }
        }
    }

    let mean_error = if errors.is_empty() {
        0.0
    } else {
        errors.iter().sum::<f32>() / errors.len() as f32
    };

    Ok(ErrorStats {
        max_error: errors.iter().fold(0.0f32, |a, &b| a.max(b)),
        mean_error,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_sweep() {
        let template = VorSignalParams {
            duration_secs: 0.5,
            ..VorSignalParams::default()
        };
        let stats = measure_error_across_bearings(
            &template,
            &NoiseConfig::default(),
            &VorConfig::default(),
            &[0.0, 120.0, 240.0],
        )
        .unwrap();
        assert_eq!(stats.failures, 0);
        assert!(stats.max_error < 1.0, "max error {}", stats.max_error);
    }
}
