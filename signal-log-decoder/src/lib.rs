//! Signal Log Decoder Library
//!
//! A reusable library for decoding plain-text signal logs: labeled blocks of
//! x/y samples in which some x-coordinates may be missing.
//!
//! # Architecture
//!
//! Data flows strictly forward through five stages:
//! - `reader`: strips `#` comments and blank lines, supports lookahead
//! - `sample`: decodes a sample line, `*` marks a missing value
//! - `accumulator`: groups samples by label, merges repeated labels, clamps y
//! - `interpolate`: fills missing x-coordinates by linear interpolation
//! - `stats`: datapoint count, x-extent and average sample rate
//!
//! The library does NOT:
//! - Draw or plot anything
//! - Resample signals onto a uniform time base
//! - Merge several input files
//!
//! Rendering and the command line live in the application layer
//! (signal-log-cli).
//!
//! # Input Format
//!
//! ```text
//! # comments run to end of line
//! sig1
//! 0 1.0
//! * 2.0        # x unknown, interpolated from its neighbours
//! 2 3.0
//! END_OF_SIGNAL
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use signal_log_decoder::{Decoder, DecoderConfig};
//! use std::path::Path;
//!
//! let config = DecoderConfig::new()
//!     .with_maximum(4096.0)
//!     .with_line_mode(true);
//!
//! let decoded = Decoder::new(config)
//!     .decode_file(Path::new("capture.txt"))
//!     .unwrap();
//!
//! for summary in decoded.summaries() {
//!     println!("{}", summary);
//! }
//! for (label, e) in &decoded.unresolved {
//!     eprintln!("{}: {}", label, e);
//! }
//! ```

// Public modules
pub mod accumulator;
pub mod config;
pub mod decoder;
pub mod interpolate;
pub mod reader;
pub mod sample;
pub mod stats;
pub mod types;

// Re-export main types for convenience
pub use accumulator::{IngestReport, SignalAccumulator, MAX_RECORDED_ERRORS};
pub use config::DecoderConfig;
pub use decoder::{DecodedSignals, Decoder};
pub use interpolate::{interpolate_at, resolve, resolve_table, KnownPoints, Resolution};
pub use reader::{LineReader, Mark};
pub use stats::{summarize, SignalStats, SignalSummary};
pub use types::{
    DecoderError, LabelTable, PlotStyle, RawLine, RawSignal, RawSignalTable, Result, Sample,
    Signal, SignalTable,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
