use std::path::PathBuf;

use thiserror::Error;

/// Broad category of a [`VorError`]
///
/// Stays stable when binaries wrap the error with extra context, so callers
/// can decide whether a different recording or offset is worth trying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    InsufficientSignal,
    DegenerateSignal,
    SubcarrierNotFound,
    FilterDesign,
    Config,
}

#[derive(Error, Debug)]
pub enum VorError {
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported audio format: {0}")]
    DecodeFormat(String),

    #[error("Insufficient signal: need {needed} samples, have {available}")]
    InsufficientSignal { needed: usize, available: usize },

    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    #[error("No 9960 Hz subcarrier detected (band RMS {band_rms:.3e}, total RMS {total_rms:.3e})")]
    SubcarrierNotFound { band_rms: f32, total_rms: f32 },

    #[error("A {sample_rate} Hz recording cannot carry the subcarrier band up to {band_edge_hz} Hz")]
    SubcarrierAboveNyquist { sample_rate: u32, band_edge_hz: f32 },

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VorError::Decode { .. } | VorError::DecodeFormat(_) => ErrorKind::Decode,
            VorError::InsufficientSignal { .. } => ErrorKind::InsufficientSignal,
            VorError::DegenerateSignal(_) => ErrorKind::DegenerateSignal,
            VorError::SubcarrierNotFound { .. } | VorError::SubcarrierAboveNyquist { .. } => {
                ErrorKind::SubcarrierNotFound
            }
            VorError::FilterDesign(_) => ErrorKind::FilterDesign,
            VorError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, VorError>;
