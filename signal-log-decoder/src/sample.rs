//! Sample line decoding
//!
//! Turns one content line into a record of optional floats. The wildcard
//! token decodes to `None`; any other token must be a float literal other
//! than NaN. The x column must also be finite, while an infinite y is left
//! for the maximum to clamp.

use crate::types::{DecoderError, RawLine, Result, Sample};

/// Decode every whitespace-separated token of a line.
///
/// The wildcard maps to `None`. A token that does not parse as a float, or
/// that parses to NaN, fails the whole line with `MalformedSample`.
pub fn decode_values(line: &RawLine, wildcard: &str) -> Result<Vec<Option<f64>>> {
    line.text
        .split_whitespace()
        .map(|token| {
            if token == wildcard {
                return Ok(None);
            }
            match token.parse::<f64>() {
                Ok(v) if v.is_nan() => {
                    Err(malformed(line, format!("'{}' is not a number", token)))
                }
                Ok(v) => Ok(Some(v)),
                Err(e) => Err(malformed(line, format!("'{}': {}", token, e))),
            }
        })
        .collect()
}

impl Sample {
    /// Build a sample from decoded values, checking arity.
    ///
    /// The first value is x, the second is y. Values beyond the second are
    /// ignored. An infinite x is malformed. A wildcard y repeats `held_y`,
    /// the signal's previous y-value; without one the line is malformed.
    pub fn from_values(
        line: &RawLine,
        values: &[Option<f64>],
        min_columns: usize,
        held_y: Option<f64>,
    ) -> Result<Self> {
        if values.len() < min_columns.max(2) {
            return Err(DecoderError::ShortSample {
                line: line.number,
                text: line.text.clone(),
                found: values.len(),
                expected: min_columns.max(2),
            });
        }

        if let Some(x) = values[0].filter(|x| !x.is_finite()) {
            return Err(malformed(line, format!("x value {} is not finite", x)));
        }

        let y = values[1]
            .or(held_y)
            .ok_or_else(|| malformed(line, "wildcard y with no previous y value".to_string()))?;

        Ok(Sample { x: values[0], y })
    }
}

/// Decode a sample line in one step
pub fn decode_sample(
    line: &RawLine,
    wildcard: &str,
    min_columns: usize,
    held_y: Option<f64>,
) -> Result<Sample> {
    let values = decode_values(line, wildcard)?;
    Sample::from_values(line, &values, min_columns, held_y)
}

fn malformed(line: &RawLine, reason: String) -> DecoderError {
    DecoderError::MalformedSample {
        line: line.number,
        text: line.text.clone(),
        reason,
    }
}
