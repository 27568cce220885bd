//! Core types for the signal log decoder library
//!
//! This module defines the data model shared by every decoding stage: raw
//! and resolved signals, the label-keyed tables that hold them, and the
//! error taxonomy. Missing x-coordinates are always `None`, never a sentinel
//! float, so "still missing" and "interpolated" cannot be confused.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("line {line}: malformed sample '{text}': {reason}")]
    MalformedSample {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("line {line}: sample '{text}' has {found} value(s), expected at least {expected}")]
    ShortSample {
        line: usize,
        text: String,
        found: usize,
        expected: usize,
    },

    #[error("signal '{label}' (line {line}): expected terminator '{terminator}', {found}")]
    MissingTerminator {
        label: String,
        line: usize,
        terminator: String,
        found: String,
    },

    #[error("line {line}: terminator '{terminator}' found where a signal label was expected")]
    UnexpectedTerminator { line: usize, terminator: String },

    #[error("signal '{label}': {gaps} missing x value(s) but no known x value to interpolate from")]
    InsufficientData { label: String, gaps: usize },

    #[error("signal '{label}': x extent is zero, sample rate is undefined")]
    DegenerateSignal { label: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DecoderError {
    /// True for errors that only affect a single line or a single signal.
    ///
    /// Recoverable errors are reported and skipped; the rest abort
    /// ingestion (or, for `InsufficientData`, drop the affected signal).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DecoderError::MalformedSample { .. }
                | DecoderError::ShortSample { .. }
                | DecoderError::DegenerateSignal { .. }
        )
    }

    /// Physical line number the error refers to, if it is line-scoped
    pub fn line(&self) -> Option<usize> {
        match self {
            DecoderError::MalformedSample { line, .. }
            | DecoderError::ShortSample { line, .. }
            | DecoderError::MissingTerminator { line, .. }
            | DecoderError::UnexpectedTerminator { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// A meaningful input line: comment-stripped, trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based physical line number in the source
    pub number: usize,
    /// Line content with comments and surrounding whitespace removed
    pub text: String,
}

impl RawLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// One decoded sample line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// x-coordinate, `None` when the input held the wildcard marker
    pub x: Option<f64>,
    /// y-value, always present
    pub y: f64,
}

/// A signal as accumulated from the input, x-coordinates possibly missing
#[derive(Debug, Clone, PartialEq)]
pub struct RawSignal {
    pub label: String,
    pub x: Vec<Option<f64>>,
    pub y: Vec<f64>,
}

impl RawSignal {
    /// Create an empty raw signal
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_capacity(label, 0)
    }

    /// Create an empty raw signal with room for `capacity` samples
    pub fn with_capacity(label: impl Into<String>, capacity: usize) -> Self {
        Self {
            label: label.into(),
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
        }
    }

    /// Append one sample, keeping x and y index-aligned
    pub fn push(&mut self, sample: Sample) {
        self.x.push(sample.x);
        self.y.push(sample.y);
    }

    /// Append another occurrence's data after the existing samples
    pub fn extend(&mut self, other: RawSignal) {
        self.x.extend(other.x);
        self.y.extend(other.y);
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Number of missing x-coordinates
    pub fn gap_count(&self) -> usize {
        self.x.iter().filter(|x| x.is_none()).count()
    }
}

/// A fully resolved signal: every x-coordinate is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Signal {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Convert back into a raw signal with every x marked known
    pub fn to_raw(&self) -> RawSignal {
        RawSignal {
            label: self.label.clone(),
            x: self.x.iter().copied().map(Some).collect(),
            y: self.y.clone(),
        }
    }
}

/// Anything stored in a [`LabelTable`] must expose its label
pub trait Labeled {
    fn label(&self) -> &str;
}

impl Labeled for RawSignal {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Labeled for Signal {
    fn label(&self) -> &str {
        &self.label
    }
}

/// Label-keyed table that keeps first-insertion order
///
/// Each label appears at most once. Iteration yields entries in the order
/// their label was first seen, which keeps output deterministic.
#[derive(Debug, Clone)]
pub struct LabelTable<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

/// Table of signals as accumulated, before gap resolution
pub type RawSignalTable = LabelTable<RawSignal>;

/// Table of resolved signals, read-only once handed downstream
pub type SignalTable = LabelTable<Signal>;

impl<T: Labeled> LabelTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Look up an entry by label
    pub fn get(&self, label: &str) -> Option<&T> {
        self.index.get(label).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Insert an entry, replacing any previous entry with the same label in place
    pub fn insert(&mut self, entry: T) {
        match self.index.get(entry.label()) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.label().to_string(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the entries in insertion order
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }
}

impl LabelTable<RawSignal> {
    /// Merge a newly read occurrence into the table.
    ///
    /// If the label already exists the new samples are appended after the
    /// existing ones; otherwise the signal is inserted as a new entry.
    pub fn merge(&mut self, signal: RawSignal) {
        match self.index.get(&signal.label) {
            Some(&i) => self.entries[i].extend(signal),
            None => self.insert(signal),
        }
    }
}

impl<T: Labeled> Default for LabelTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for LabelTable<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a LabelTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// How a downstream renderer should draw points.
///
/// The decoder never interprets this; it is carried through to the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotStyle {
    /// Connect consecutive points with lines
    Lines,
    /// Draw discrete markers only
    #[default]
    Markers,
}

impl PlotStyle {
    pub fn from_line_mode(line_mode: bool) -> Self {
        if line_mode {
            PlotStyle::Lines
        } else {
            PlotStyle::Markers
        }
    }
}

impl fmt::Display for PlotStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotStyle::Lines => write!(f, "lines"),
            PlotStyle::Markers => write!(f, "markers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(label: &str, x: &[Option<f64>], y: &[f64]) -> RawSignal {
        RawSignal {
            label: label.to_string(),
            x: x.to_vec(),
            y: y.to_vec(),
        }
    }

    fn signal(label: &str, x: &[f64], y: &[f64]) -> Signal {
        Signal {
            label: label.to_string(),
            x: x.to_vec(),
            y: y.to_vec(),
        }
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut table = RawSignalTable::new();
        table.merge(raw("sig1", &[Some(0.0)], &[1.0]));
        table.merge(raw("other", &[Some(5.0)], &[9.0]));
        table.merge(raw("sig1", &[Some(1.0), None], &[2.0, 3.0]));

        assert_eq!(table.len(), 2);
        let sig1 = table.get("sig1").unwrap();
        assert_eq!(sig1.x, vec![Some(0.0), Some(1.0), None]);
        assert_eq!(sig1.y, vec![1.0, 2.0, 3.0]);
        assert_eq!(sig1.gap_count(), 1);

        // First-seen order is preserved
        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["sig1", "other"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut table = SignalTable::new();
        table.insert(signal("a", &[0.0], &[1.0]));
        table.insert(signal("b", &[0.0], &[2.0]));
        table.insert(signal("a", &[1.0], &[3.0]));

        assert_eq!(table.len(), 2);
        assert_eq!(table.as_slice()[0].y, vec![3.0]);
        assert!(table.contains("b"));
        assert!(!table.contains("c"));
    }

    #[test]
    fn test_signal_to_raw() {
        let raw = signal("s", &[0.0, 1.0], &[4.0, 5.0]).to_raw();
        assert_eq!(raw.x, vec![Some(0.0), Some(1.0)]);
        assert_eq!(raw.gap_count(), 0);
    }

    #[test]
    fn test_error_classification() {
        let malformed = DecoderError::MalformedSample {
            line: 3,
            text: "abc".into(),
            reason: "invalid float literal".into(),
        };
        assert!(malformed.is_recoverable());
        assert_eq!(malformed.line(), Some(3));

        let missing = DecoderError::MissingTerminator {
            label: "sig".into(),
            line: 9,
            terminator: "END_OF_SIGNAL".into(),
            found: "end of input".into(),
        };
        assert!(!missing.is_recoverable());

        let degenerate = DecoderError::DegenerateSignal { label: "sig".into() };
        assert!(degenerate.is_recoverable());
        assert_eq!(degenerate.line(), None);
    }

    #[test]
    fn test_plot_style() {
        assert_eq!(PlotStyle::from_line_mode(true), PlotStyle::Lines);
        assert_eq!(PlotStyle::from_line_mode(false), PlotStyle::Markers);
        assert_eq!(format!("{}", PlotStyle::Lines), "lines");
        assert_eq!(PlotStyle::default(), PlotStyle::Markers);
    }
}
