//! Report generation
//!
//! The decoded signal table is handed to a sink selected by
//! [`OutputFormat`]: a plain-text summary listing or a JSON document with
//! the statistics and, optionally, every point.

use crate::config::{OutputConfig, OutputFormat};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use signal_log_decoder::{DecodedSignals, PlotStyle, Signal, SignalSummary};
use std::io::Write;
use std::path::Path;

/// Everything a sink needs, borrowed from the decoded signals
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub generated_at: String,
    pub source: &'a Path,
    pub plot_style: PlotStyle,
    pub signals: Vec<SignalEntry<'a>>,
    pub unresolved: Vec<UnresolvedEntry>,
    pub skipped_lines: usize,
}

#[derive(Debug, Serialize)]
pub struct SignalEntry<'a> {
    #[serde(flatten)]
    pub summary: SignalSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<&'a [f64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<&'a [f64]>,
}

#[derive(Debug, Serialize)]
pub struct UnresolvedEntry {
    pub label: String,
    pub error: String,
}

impl<'a> Report<'a> {
    /// Build the report; per-signal statistics are computed in parallel
    pub fn build(source: &'a Path, decoded: &'a DecodedSignals, include_points: bool) -> Self {
        let signals = decoded
            .signals
            .as_slice()
            .par_iter()
            .map(|signal| SignalEntry::new(signal, include_points))
            .collect();

        let unresolved = decoded
            .unresolved
            .iter()
            .map(|(label, e)| UnresolvedEntry {
                label: label.clone(),
                error: e.to_string(),
            })
            .collect();

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source,
            plot_style: decoded.plot_style,
            signals,
            unresolved,
            skipped_lines: decoded.report.skipped_lines,
        }
    }
}

impl<'a> SignalEntry<'a> {
    fn new(signal: &'a Signal, include_points: bool) -> Self {
        Self {
            summary: SignalSummary::from_signal(signal),
            x: include_points.then_some(signal.x.as_slice()),
            y: include_points.then_some(signal.y.as_slice()),
        }
    }
}

/// Receives the finished report
pub trait SignalSink {
    fn write(&self, report: &Report<'_>, out: &mut dyn Write) -> Result<()>;
}

/// `signals:` listing, one summary line per signal
pub struct TextSink;

impl SignalSink for TextSink {
    fn write(&self, report: &Report<'_>, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "signals:")?;
        for entry in &report.signals {
            writeln!(out, "{}", entry.summary)?;
        }

        if !report.unresolved.is_empty() {
            writeln!(out, "unresolved:")?;
            for entry in &report.unresolved {
                writeln!(out, "> {}: {}", entry.label, entry.error)?;
            }
        }
        if report.skipped_lines > 0 {
            writeln!(out, "skipped lines: {}", report.skipped_lines)?;
        }
        Ok(())
    }
}

/// Pretty-printed JSON document
pub struct JsonSink;

impl SignalSink for JsonSink {
    fn write(&self, report: &Report<'_>, out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, report).context("Failed to serialize report")?;
        writeln!(out)?;
        Ok(())
    }
}

/// Pick the sink for an output format
pub fn sink_for(format: OutputFormat) -> Box<dyn SignalSink> {
    match format {
        OutputFormat::Txt => Box::new(TextSink),
        OutputFormat::Json => Box::new(JsonSink),
    }
}

/// Build the report and write it with the configured sink
pub fn write_report(
    source: &Path,
    decoded: &DecodedSignals,
    output: &OutputConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let report = Report::build(source, decoded, output.include_points);
    sink_for(output.format).write(&report, out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_log_decoder::{Decoder, DecoderConfig};
    use std::io::Cursor;

    fn decode(input: &str) -> DecodedSignals {
        Decoder::new(DecoderConfig::new().with_maximum(100.0))
            .decode_reader(Cursor::new(input.to_string()))
            .unwrap()
    }

    fn render(format: OutputFormat, decoded: &DecodedSignals) -> String {
        let output = OutputConfig {
            format,
            file: None,
            include_points: true,
        };
        let mut buf = Vec::new();
        write_report(Path::new("capture.txt"), decoded, &output, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_report() {
        let decoded = decode("sig1\n0 1.0\n* 1.0\n2 3.0\nEND_OF_SIGNAL\nbad\n* 1\nEND_OF_SIGNAL\n");
        let text = render(OutputFormat::Txt, &decoded);

        assert!(text.starts_with("signals:\n"));
        assert!(text.contains("> sig1: 3 datapoints / 2.000000 delta x = 1.500000\n"));
        assert!(text.contains("unresolved:\n> bad: "));
        assert!(!text.contains("skipped lines"));
    }

    #[test]
    fn test_skipped_lines_counted() {
        let decoded = decode("s\n0 1\nabc\ninf 2\n1 2\nEND_OF_SIGNAL\n");
        let text = render(OutputFormat::Txt, &decoded);

        assert!(text.contains("> s: 2 datapoints / 1.000000 delta x = 2.000000\n"));
        assert!(text.ends_with("skipped lines: 2\n"));
    }

    #[test]
    fn test_json_report() {
        let decoded = decode("flat\n1 1\nEND_OF_SIGNAL\nsig1\n0 1.0\n2 300\nEND_OF_SIGNAL\n");
        let json = render(OutputFormat::Json, &decoded);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["source"], "capture.txt");
        assert_eq!(value["plot_style"], "markers");

        let signals = value["signals"].as_array().unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0]["label"], "flat");
        assert!(signals[0]["avg_rate"].is_null());
        assert_eq!(signals[1]["count"], 2);
        assert_eq!(signals[1]["avg_rate"], 1.0);
        assert_eq!(signals[1]["y"], serde_json::json!([1.0, 100.0]));
    }

    #[test]
    fn test_json_without_points() {
        let decoded = decode("s\n0 1\n1 2\nEND_OF_SIGNAL\n");
        let report = Report::build(Path::new("capture.txt"), &decoded, false);
        let mut buf = Vec::new();
        JsonSink.write(&report, &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["signals"][0].get("x").is_none());
        assert_eq!(value["signals"][0]["x_extent"], 1.0);
    }

    #[test]
    fn test_signal_order_preserved() {
        let decoded = decode(
            "c\n0 1\n1 1\nEND_OF_SIGNAL\n\
             a\n0 1\n1 1\nEND_OF_SIGNAL\n\
             b\n0 1\n1 1\nEND_OF_SIGNAL\n",
        );
        let report = Report::build(Path::new("x"), &decoded, false);
        let labels: Vec<_> = report.signals.iter().map(|e| e.summary.label.as_str()).collect();
        assert_eq!(labels, vec!["c", "a", "b"]);
    }
}
