mod csv;
mod json;
mod text;

use chrono::Utc;
use serde::Serialize;

use crate::vor::{BearingMeasurement, angle_error};

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Outcome of decoding one recording
#[derive(Debug, Clone, Serialize)]
pub struct BearingReport {
    pub file: String,
    pub bearing: Option<f32>,
    pub raw: Option<f32>,
    pub reference_phase: Option<f32>,
    pub variable_phase: Option<f32>,
    pub confidence: Option<f32>,
    pub deviation_hz: Option<f32>,
    pub expected: Option<f32>,
    pub error_degrees: Option<f32>,
    pub passed: Option<bool>,
    pub failure: Option<String>,
}

impl BearingReport {
    pub fn measured(file: impl Into<String>, measurement: &BearingMeasurement) -> Self {
        Self {
            file: file.into(),
            bearing: Some(measurement.bearing_degrees),
            raw: Some(measurement.raw_bearing),
            reference_phase: Some(measurement.reference_phase),
            variable_phase: Some(measurement.variable_phase),
            confidence: Some(measurement.confidence),
            deviation_hz: Some(measurement.deviation_hz),
            expected: None,
            error_degrees: None,
            passed: None,
            failure: None,
        }
    }

    pub fn failed(file: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            bearing: None,
            raw: None,
            reference_phase: None,
            variable_phase: None,
            confidence: None,
            deviation_hz: None,
            expected: None,
            error_degrees: None,
            passed: Some(false),
            failure: Some(failure.into()),
        }
    }

    /// Compare against an expected bearing; a failed decode never passes
    pub fn check(mut self, expected: f32, tolerance_degrees: f32) -> Self {
        self.expected = Some(expected);
        match self.bearing {
            Some(bearing) => {
                let error = angle_error(bearing, expected);
                self.error_degrees = Some(error);
                self.passed = Some(error <= tolerance_degrees);
            }
            None => self.passed = Some(false),
        }
        self
    }

    pub fn is_failure(&self) -> bool {
        self.passed == Some(false) || self.failure.is_some()
    }
}

pub trait Formatter: Send {
    fn format(&self, report: &BearingReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn optional(value: Option<f32>, precision: usize) -> String {
    value.map_or(String::new(), |v| format!("{:.*}", precision, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vor::PhaseEstimate;

    pub(super) fn sample_report() -> BearingReport {
        let reference = PhaseEstimate {
            degrees: 10.0,
            amplitude: 0.3,
            coherence: 0.99,
        };
        let variable = PhaseEstimate {
            degrees: 101.0,
            amplitude: 475.0,
            coherence: 0.97,
        };
        let m = BearingMeasurement::new(&reference, &variable, 0.0, 1.0);
        BearingReport::measured("vor-90Deg.wav", &m)
    }

    #[test]
    fn test_check_within_tolerance() {
        let report = sample_report().check(90.0, 2.0);
        assert_eq!(report.passed, Some(true));
        assert!((report.error_degrees.unwrap() - 1.0).abs() < 1e-4);
        assert!(!report.is_failure());
    }

    #[test]
    fn test_check_outside_tolerance() {
        let report = sample_report().check(95.0, 2.0);
        assert_eq!(report.passed, Some(false));
        assert!(report.is_failure());
    }

    #[test]
    fn test_failed_report() {
        let report = BearingReport::failed("x.wav", "no subcarrier").check(10.0, 2.0);
        assert_eq!(report.passed, Some(false));
        assert!(report.bearing.is_none());
        assert!(report.is_failure());
    }

    #[test]
    fn test_unchecked_report_is_not_failure() {
        assert!(!sample_report().is_failure());
        assert!(sample_report().passed.is_none());
    }
}
