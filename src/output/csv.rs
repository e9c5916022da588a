use super::{BearingReport, Formatter, iso8601_timestamp, optional};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, report: &BearingReport) -> String {
        let passed = report
            .passed
            .map_or(String::new(), |p| p.to_string());
        // Commas would split the field
        let failure = report
            .failure
            .as_deref()
            .map_or(String::new(), |f| f.replace(',', ";"));
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            iso8601_timestamp(),
            report.file,
            optional(report.bearing, 1),
            optional(report.raw, 1),
            optional(report.reference_phase, 1),
            optional(report.variable_phase, 1),
            optional(report.deviation_hz, 1),
            optional(report.confidence, 2),
            optional(report.expected, 1),
            optional(report.error_degrees, 2),
            passed,
            failure
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some(
            "ts,file,bearing,raw,reference_phase,variable_phase,deviation_hz,confidence,expected,error_degrees,passed,failure",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_report;
    use super::*;

    #[test]
    fn test_column_count_matches_header() {
        let formatter = CsvFormatter;
        let columns = formatter.header().unwrap().split(',').count();
        let line = formatter.format(&sample_report());
        assert_eq!(line.split(',').count(), columns);

        let failed = formatter.format(&BearingReport::failed("b.wav", "bad, very bad"));
        assert_eq!(failed.split(',').count(), columns);
    }
}
