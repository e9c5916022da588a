use std::path::Path;

use hound::{WavSpec, WavWriter};

/// Write interleaved samples as a 32-bit float WAV file
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;

    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    Ok(())
}

/// Interleave two equal-rate channels into stereo frames
///
/// The shorter channel is padded with silence.
pub fn interleave_stereo(left: &[f32], right: &[f32]) -> Vec<f32> {
    let frames = left.len().max(right.len());
    let mut out = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        out.push(left.get(i).copied().unwrap_or(0.0));
        out.push(right.get(i).copied().unwrap_or(0.0));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode;

    #[test]
    fn test_interleave_pads_shorter_channel() {
        let out = interleave_stereo(&[1.0, 2.0, 3.0], &[4.0]);
        assert_eq!(out, vec![1.0, 4.0, 2.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_save_and_decode_stereo() {
        let path = std::env::temp_dir().join(format!("vorbearing-wav-{}.wav", std::process::id()));
        let stereo = interleave_stereo(&[0.5, -0.5], &[0.25, 0.25]);
        save_wav(&path, &stereo, 8000, 2).unwrap();

        let buffer = decode(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(buffer.sample_rate(), 8000);
        assert_eq!(buffer.samples(), &[0.375, -0.125]);
    }
}
