use serde::Serialize;

// ---------------------------------------------------------------------------
// ForceTrace – the loaded, smoothed sample table
// ---------------------------------------------------------------------------

/// One captured test run: raw and smoothed force, sample index = time.
///
/// Both vectors always have the same length. The trace is immutable once
/// built; re-running the preprocessor produces a fresh `ForceTrace`.
#[derive(Debug, Clone)]
pub struct ForceTrace {
    /// Raw force readings, one per sample (absolute values — the instrument
    /// reports compression as negative).
    pub raw: Vec<f64>,
    /// Savitzky–Golay-smoothed force, same length as `raw`.
    pub filtered: Vec<f64>,
}

impl ForceTrace {
    pub fn new(raw: Vec<f64>, filtered: Vec<f64>) -> Self {
        debug_assert_eq!(raw.len(), filtered.len());
        ForceTrace { raw, filtered }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the trace holds no samples.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Largest smoothed force, used to normalize the force axis when
    /// measuring click-to-peak distances. 1.0 for an empty or flat-zero trace.
    pub fn force_normalizer(&self) -> f64 {
        let max = self
            .filtered
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        if max.is_finite() && max.abs() > f64::EPSILON {
            max
        } else {
            1.0
        }
    }
}

// ---------------------------------------------------------------------------
// Peak – one load-cycle maximum
// ---------------------------------------------------------------------------

/// How a peak entered the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakOrigin {
    /// Proposed by the local-maximum detector.
    Detected,
    /// Placed by the operator during curation.
    Manual,
}

/// A single maximum-force event. `id` is stable for the peak's lifetime in
/// the store; the displayed rank is not stored on the peak and is recomputed
/// on every [`view`](crate::data::curation::CurationStore::view).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub id: u64,
    /// Sample index into the trace.
    pub time: usize,
    pub force: f64,
    pub origin: PeakOrigin,
}

/// One row of the merged, time-ordered view: 1-based rank plus the peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedPeak {
    pub rank: usize,
    #[serde(flatten)]
    pub peak: Peak,
}
