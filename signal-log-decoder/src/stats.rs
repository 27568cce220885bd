//! Per-signal statistics
//!
//! Datapoint count, x-extent and average sample rate of a resolved signal.

use crate::types::{DecoderError, Result, Signal};
use serde::Serialize;
use std::fmt;

/// Statistics of a signal with a finite, non-zero x-extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalStats {
    /// Number of datapoints
    pub count: usize,
    /// max(x) - min(x)
    pub x_extent: f64,
    /// count / x_extent
    pub avg_rate: f64,
}

/// Compute the statistics of a signal.
///
/// Fails with `DegenerateSignal` when the x-extent is zero (including the
/// empty signal) or not finite, since the rate would not be a number.
pub fn summarize(signal: &Signal) -> Result<SignalStats> {
    let count = signal.len();
    let x_extent = x_extent(&signal.x).unwrap_or(0.0);

    if x_extent == 0.0 || !x_extent.is_finite() {
        return Err(DecoderError::DegenerateSignal {
            label: signal.label.clone(),
        });
    }

    Ok(SignalStats {
        count,
        x_extent,
        avg_rate: count as f64 / x_extent,
    })
}

/// max(x) - min(x), or `None` for an empty sequence
pub fn x_extent(x: &[f64]) -> Option<f64> {
    let (min, max) = x.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    Some(max - min)
}

/// Display-ready summary that never fails.
///
/// A degenerate signal keeps its count and extent but has no rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSummary {
    pub label: String,
    pub count: usize,
    pub x_extent: f64,
    /// `None` when the rate is undefined
    pub avg_rate: Option<f64>,
}

impl SignalSummary {
    pub fn from_signal(signal: &Signal) -> Self {
        match summarize(signal) {
            Ok(stats) => Self {
                label: signal.label.clone(),
                count: stats.count,
                x_extent: stats.x_extent,
                avg_rate: Some(stats.avg_rate),
            },
            Err(e) => {
                log::warn!("{}", e);
                Self {
                    label: signal.label.clone(),
                    count: signal.len(),
                    x_extent: x_extent(&signal.x).unwrap_or(0.0),
                    avg_rate: None,
                }
            }
        }
    }
}

impl fmt::Display for SignalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "> {}: {} datapoints / {:.6} delta x = ",
            self.label, self.count, self.x_extent
        )?;
        match self.avg_rate {
            Some(rate) => write!(f, "{:.6}", rate),
            None => write!(f, "undefined"),
        }
    }
}
