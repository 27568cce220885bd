//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct runs the whole pipeline: line reading, sample
//! decoding and accumulation, gap interpolation, then hands back the
//! resolved signals ready for statistics and rendering.

use crate::accumulator::{IngestReport, SignalAccumulator};
use crate::config::DecoderConfig;
use crate::interpolate::resolve_table;
use crate::reader::LineReader;
use crate::stats::SignalSummary;
use crate::types::{DecoderError, PlotStyle, Result, SignalTable};
use std::io::{BufRead, Seek};
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a decoder with the given configuration
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode a signal log file
    ///
    /// # Arguments
    /// * `path` - Path to the signal log
    ///
    /// # Returns
    /// * `Result<DecodedSignals>` - Resolved signals, or the fatal error that
    ///   aborted ingestion
    ///
    /// # Example
    /// ```no_run
    /// use signal_log_decoder::{Decoder, DecoderConfig};
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new(DecoderConfig::new().with_maximum(100.0));
    /// let decoded = decoder.decode_file(Path::new("capture.txt")).unwrap();
    ///
    /// for summary in decoded.summaries() {
    ///     println!("{}", summary);
    /// }
    /// ```
    pub fn decode_file(&self, path: &Path) -> Result<DecodedSignals> {
        let mut reader = LineReader::open(path, self.config.comment_marker)?;
        self.decode(&mut reader)
    }

    /// Decode from any seekable buffered source
    pub fn decode_reader<R: BufRead + Seek>(&self, source: R) -> Result<DecodedSignals> {
        let mut reader = LineReader::new(source, self.config.comment_marker);
        self.decode(&mut reader)
    }

    fn decode<R: BufRead + Seek>(&self, reader: &mut LineReader<R>) -> Result<DecodedSignals> {
        let (raw, report) = SignalAccumulator::new(&self.config).accumulate(reader)?;
        let resolution = resolve_table(raw);

        log::info!(
            "Resolved {} signal(s), {} unresolved",
            resolution.signals.len(),
            resolution.unresolved.len()
        );

        Ok(DecodedSignals {
            signals: resolution.signals,
            unresolved: resolution.unresolved,
            report,
            plot_style: self.config.plot_style,
        })
    }
}

/// Output of a successful decode
#[derive(Debug)]
pub struct DecodedSignals {
    /// Fully resolved signals in first-seen label order
    pub signals: SignalTable,
    /// Signals dropped because their gaps could not be filled
    pub unresolved: Vec<(String, DecoderError)>,
    /// Counters and skipped lines from ingestion
    pub report: IngestReport,
    /// Drawing hint for the renderer, copied from the configuration
    pub plot_style: PlotStyle,
}

impl DecodedSignals {
    /// One summary per resolved signal, in table order
    pub fn summaries(&self) -> Vec<SignalSummary> {
        self.signals.iter().map(SignalSummary::from_signal).collect()
    }
}
