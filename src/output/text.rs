use super::{BearingReport, Formatter};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &BearingReport) -> String {
        let Some(bearing) = report.bearing else {
            return format!(
                "{}: ERROR {}",
                report.file,
                report.failure.as_deref().unwrap_or("unknown failure")
            );
        };

        let mut line = format!("{}: {:>6.1}°", report.file, bearing);

        if self.verbose {
            line.push_str(&format!(
                " (raw: {:>6.1}°, ref: {:>6.1}°, var: {:>6.1}°, dev: {:>5.1} Hz, conf: {:.2})",
                report.raw.unwrap_or_default(),
                report.reference_phase.unwrap_or_default(),
                report.variable_phase.unwrap_or_default(),
                report.deviation_hz.unwrap_or_default(),
                report.confidence.unwrap_or_default(),
            ));
        }

        if let (Some(expected), Some(error), Some(passed)) =
            (report.expected, report.error_degrees, report.passed)
        {
            line.push_str(&format!(
                " expected {:>6.1}° error {:>5.2}° {}",
                expected,
                error,
                if passed { "PASS" } else { "FAIL" }
            ));
        }

        line
    }
}
