//! Decoder configuration types
//!
//! This module defines the small set of knobs the decoder needs: the clamp
//! applied to y-values and the tokens that shape the input format. Anything
//! about presentation is carried through untouched.

use crate::types::PlotStyle;
use serde::{Deserialize, Serialize};

/// Default clamp applied to every decoded y-value
pub const DEFAULT_MAXIMUM: f64 = 4096.0;

/// Default token marking a missing x-coordinate
pub const DEFAULT_WILDCARD: &str = "*";

/// Default literal line that closes a signal block
pub const DEFAULT_TERMINATOR: &str = "END_OF_SIGNAL";

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Every y-value above this is replaced by it
    #[serde(default = "default_maximum")]
    pub maximum: f64,

    /// Token that stands for an unknown x-coordinate
    #[serde(default = "default_wildcard")]
    pub wildcard: String,

    /// Everything from this character to end of line is ignored
    #[serde(default = "default_comment_marker")]
    pub comment_marker: char,

    /// Line that ends a signal's sample block
    #[serde(default = "default_terminator")]
    pub terminator: String,

    /// Minimum number of values on a sample line (x and y)
    #[serde(default = "default_min_columns")]
    pub min_columns: usize,

    /// How a renderer should draw the signals (not used by the decoder)
    #[serde(default)]
    pub plot_style: PlotStyle,
}

fn default_maximum() -> f64 {
    DEFAULT_MAXIMUM
}

fn default_wildcard() -> String {
    DEFAULT_WILDCARD.to_string()
}

fn default_comment_marker() -> char {
    '#'
}

fn default_terminator() -> String {
    DEFAULT_TERMINATOR.to_string()
}

fn default_min_columns() -> usize {
    2
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            maximum: default_maximum(),
            wildcard: default_wildcard(),
            comment_marker: default_comment_marker(),
            terminator: default_terminator(),
            min_columns: default_min_columns(),
            plot_style: PlotStyle::default(),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the y clamp
    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = maximum;
        self
    }

    /// Builder method: set the missing-value token
    pub fn with_wildcard(mut self, wildcard: impl Into<String>) -> Self {
        self.wildcard = wildcard.into();
        self
    }

    /// Builder method: set the comment marker
    pub fn with_comment_marker(mut self, marker: char) -> Self {
        self.comment_marker = marker;
        self
    }

    /// Builder method: set the block terminator
    pub fn with_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    /// Builder method: set the minimum sample arity.
    ///
    /// Values below 2 are raised to 2, since a sample always needs x and y.
    pub fn with_min_columns(mut self, columns: usize) -> Self {
        self.min_columns = columns.max(2);
        self
    }

    /// Builder method: connect points with lines instead of drawing markers
    pub fn with_line_mode(mut self, enabled: bool) -> Self {
        self.plot_style = PlotStyle::from_line_mode(enabled);
        self
    }

    /// Apply the configured clamp to a y-value
    pub fn clamp(&self, y: f64) -> f64 {
        y.min(self.maximum)
    }

    /// Check if a stripped line is the block terminator
    pub fn is_terminator(&self, line: &str) -> bool {
        line == self.terminator
    }
}
