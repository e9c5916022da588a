use serde::Serialize;

use super::{BearingReport, Formatter, iso8601_timestamp};

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonLine<'a> {
    ts: String,
    #[serde(flatten)]
    report: &'a BearingReport,
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &BearingReport) -> String {
        let line = JsonLine {
            ts: iso8601_timestamp(),
            report,
        };
        serde_json::to_string(&line).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_report;
    use super::*;

    #[test]
    fn test_json_fields() {
        let line = JsonFormatter.format(&sample_report().check(90.0, 2.0));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["file"], "vor-90Deg.wav");
        assert_eq!(value["passed"], true);
        assert!(value["ts"].is_string());
        assert!((value["bearing"].as_f64().unwrap() - 91.0).abs() < 1e-3);
        assert!(value["failure"].is_null());
    }
}
