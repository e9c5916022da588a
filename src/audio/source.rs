use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use hound::WavReader;

use super::SampleBuffer;
use crate::config::ChannelMix;
use crate::error::{Result, VorError};

/// Anything that can produce a complete mono recording
pub trait SampleSource {
    fn load(&self) -> Result<SampleBuffer>;
}

/// WAV file reader
///
/// Integer PCM is scaled to `[-1, 1]` by `2^(bits-1)`; float PCM is used
/// unchanged. Multi-channel files are reduced to mono per [`ChannelMix`].
pub struct WavFileSource {
    path: PathBuf,
    channel_mix: ChannelMix,
}

impl WavFileSource {
    pub fn new<P: AsRef<Path>>(path: P, channel_mix: ChannelMix) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            channel_mix,
        }
    }

    fn read_samples(
        &self,
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> Result<Vec<f32>> {
        let decode_err = |source| VorError::Decode {
            path: self.path.clone(),
            source,
        };
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(decode_err)?,
            hound::SampleFormat::Int => {
                let max_val = 2_i64.pow(spec.bits_per_sample as u32 - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(decode_err)?
            }
        };
        Ok(samples)
    }
}

impl SampleSource for WavFileSource {
    fn load(&self) -> Result<SampleBuffer> {
        let reader = WavReader::open(&self.path).map_err(|source| VorError::Decode {
            path: self.path.clone(),
            source,
        })?;
        let spec = reader.spec();

        if spec.channels == 0 {
            return Err(VorError::DecodeFormat(format!(
                "{}: no audio channels",
                self.path.display()
            )));
        }

        let interleaved = self.read_samples(reader, &spec)?;
        let mono = mix_to_mono(&interleaved, spec.channels as usize, self.channel_mix)?;

        log::debug!(
            "Decoded {}: {} Hz, {} channel(s), {} frames",
            self.path.display(),
            spec.sample_rate,
            spec.channels,
            mono.len()
        );

        Ok(SampleBuffer::new(mono, spec.sample_rate))
    }
}

/// Decode a WAV file, averaging channels
pub fn decode<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
    WavFileSource::new(path, ChannelMix::Average).load()
}

/// Reduce interleaved frames to a single channel
///
/// A trailing partial frame is dropped.
///
/// # Errors
/// Returns `VorError::DecodeFormat` if a selected channel does not exist
pub fn mix_to_mono(interleaved: &[f32], channels: usize, mix: ChannelMix) -> Result<Vec<f32>> {
    if channels <= 1 {
        return Ok(interleaved.to_vec());
    }

    match mix {
        ChannelMix::Average => {
            let scale = 1.0 / channels as f32;
            Ok(interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() * scale)
                .collect())
        }
        ChannelMix::Channel(index) => {
            let index = index as usize;
            if index >= channels {
                return Err(VorError::DecodeFormat(format!(
                    "channel {} requested from a {}-channel recording",
                    index, channels
                )));
            }
            Ok(interleaved
                .chunks_exact(channels)
                .map(|frame| frame[index])
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_mix_average() {
        let interleaved = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = mix_to_mono(&interleaved, 2, ChannelMix::Average).unwrap();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_mix_select_channel() {
        let interleaved = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mono = mix_to_mono(&interleaved, 3, ChannelMix::Channel(2)).unwrap();
        assert_eq!(mono, vec![3.0, 6.0]);
    }

    #[test]
    fn test_mix_drops_partial_frame() {
        let interleaved = [1.0, 1.0, 2.0];
        let mono = mix_to_mono(&interleaved, 2, ChannelMix::Average).unwrap();
        assert_eq!(mono, vec![1.0]);
    }

    #[test]
    fn test_mix_missing_channel() {
        let err = mix_to_mono(&[0.0, 0.0], 2, ChannelMix::Channel(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = decode("/nonexistent/definitely-missing.wav").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
