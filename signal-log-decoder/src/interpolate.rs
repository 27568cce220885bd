//! Missing x-coordinate reconstruction
//!
//! Each gap is filled by piecewise-linear interpolation of the function that
//! maps sample index to known x-value. Gaps before the first known index or
//! after the last take the nearest boundary value; nothing is extrapolated.

use crate::types::{DecoderError, RawSignal, RawSignalTable, Result, Signal, SignalTable};

/// Known `(index, x)` points of a signal, strictly ascending by index
#[derive(Debug, Clone, PartialEq)]
pub struct KnownPoints(Vec<(usize, f64)>);

impl KnownPoints {
    /// Collect the known points of an x-sequence
    pub fn from_sequence(x: &[Option<f64>]) -> Self {
        Self(
            x.iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i, v)))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Evaluate at `index`, see [`interpolate_at`]
    pub fn value_at(&self, index: usize) -> Option<f64> {
        interpolate_at(&self.0, index)
    }
}

/// Piecewise-linear interpolation over points sorted by index.
///
/// Returns `None` when `points` is empty. Indices outside the known range
/// clamp to the first or last value.
pub fn interpolate_at(points: &[(usize, f64)], index: usize) -> Option<f64> {
    let (first, last) = (points.first()?, points.last()?);

    if index <= first.0 {
        return Some(first.1);
    }
    if index >= last.0 {
        return Some(last.1);
    }

    // First point strictly to the right of index; it has a left neighbour
    // because index > first.0
    let right = points.partition_point(|&(i, _)| i <= index);
    let (i0, v0) = points[right - 1];
    let (i1, v1) = points[right];

    if i0 == index {
        return Some(v0);
    }

    let t = (index - i0) as f64 / (i1 - i0) as f64;
    Some(v0 + t * (v1 - v0))
}

/// Fill every gap of a raw signal.
///
/// The label and y-values are passed through untouched. A signal without
/// gaps is returned as-is, even when empty. A signal with gaps but no known
/// x-value fails with `InsufficientData`.
pub fn resolve(raw: RawSignal) -> Result<Signal> {
    let gaps = raw.gap_count();
    let RawSignal { label, x, y } = raw;

    if gaps == 0 {
        return Ok(Signal {
            label,
            x: x.into_iter().flatten().collect(),
            y,
        });
    }

    let known = KnownPoints::from_sequence(&x);
    if known.is_empty() {
        return Err(DecoderError::InsufficientData { label, gaps });
    }

    log::debug!(
        "Signal '{}': interpolating {} gap(s) from {} known point(s)",
        label,
        gaps,
        known.len()
    );

    let mut resolved = Vec::with_capacity(x.len());
    for (i, value) in x.into_iter().enumerate() {
        match value {
            Some(v) => resolved.push(v),
            None => {
                // known is non-empty, so evaluation always yields a value
                let v = known.value_at(i).unwrap_or_default();
                log::trace!("Signal '{}': x[{}] = {}", label, i, v);
                resolved.push(v);
            }
        }
    }

    Ok(Signal { label, x: resolved, y })
}

/// Resolved signals plus the ones that could not be resolved
#[derive(Debug, Default)]
pub struct Resolution {
    pub signals: SignalTable,
    pub unresolved: Vec<(String, DecoderError)>,
}

/// Resolve every signal independently.
///
/// A signal that fails is reported in `unresolved` and left out of the
/// table; the rest are still resolved.
pub fn resolve_table(table: RawSignalTable) -> Resolution {
    let mut resolution = Resolution::default();

    for raw in table {
        let label = raw.label.clone();
        match resolve(raw) {
            Ok(signal) => resolution.signals.insert(signal),
            Err(e) => {
                log::warn!("Dropping signal '{}': {}", label, e);
                resolution.unresolved.push((label, e));
            }
        }
    }

    resolution
}
