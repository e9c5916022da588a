pub mod buffer;
pub mod source;

pub use buffer::{FilteredSignal, SampleBuffer, SignalBand, rms};
pub use source::{SampleSource, WavFileSource, decode, mix_to_mono};
