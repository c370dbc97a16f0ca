use std::collections::BTreeSet;

use thiserror::Error;

use super::model::{Peak, PeakOrigin, RankedPeak};

// ---------------------------------------------------------------------------
// CurationStore – detected + manual peaks with tombstoned deletions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurationError {
    #[error("time {time} is outside the trace (0..{len})")]
    OutOfDomain { time: usize, len: usize },
}

/// Holds one curation session's peaks.
///
/// Three containers back the single merged view: the detector's proposal
/// (append-only, entries only ever tombstoned), the operator's manual
/// additions, and the tombstone set over detected ids. Ranks live nowhere —
/// [`view`](Self::view) recomputes them on every call, so no entry can go
/// stale when its neighbors change.
#[derive(Debug, Clone, Default)]
pub struct CurationStore {
    trace_len: usize,
    /// Detector output, ascending time, never edited in place.
    detected: Vec<Peak>,
    /// Operator-added peaks in insertion order.
    manual: Vec<Peak>,
    /// Permanently deleted detected ids.
    deleted_detected: BTreeSet<u64>,
    next_id: u64,
}

impl CurationStore {
    /// Build a store from the detector's proposal. One peak per index,
    /// force read off the smoothed trace, fresh ids in index order.
    pub fn seed(detected_indices: &[usize], filtered: &[f64]) -> Self {
        let detected: Vec<Peak> = detected_indices
            .iter()
            .enumerate()
            .map(|(i, &time)| Peak {
                id: i as u64,
                time,
                force: filtered[time],
                origin: PeakOrigin::Detected,
            })
            .collect();
        CurationStore {
            trace_len: filtered.len(),
            next_id: detected.len() as u64,
            detected,
            ..CurationStore::default()
        }
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an operator-placed peak. Duplicate times are allowed — both
    /// peaks show up in the view, ordered by insertion.
    pub fn add_manual(&mut self, time: usize, force: f64) -> Result<Peak, CurationError> {
        if time >= self.trace_len {
            return Err(CurationError::OutOfDomain {
                time,
                len: self.trace_len,
            });
        }
        let peak = Peak {
            id: self.fresh_id(),
            time,
            force,
            origin: PeakOrigin::Manual,
        };
        self.manual.push(peak);
        Ok(peak)
    }

    /// Remove the peak nearest to a click, measured as
    /// `sqrt(dt^2 + (df / force_normalizer)^2)` over every live peak.
    ///
    /// A detected peak is tombstoned, a manual peak is dropped from the set.
    /// Returns `None` when the view is empty (a no-op, not an error).
    ///
    /// Exact distance ties resolve to the candidate scanned first: all
    /// detected peaks in ascending id order, then all manual peaks in
    /// ascending id order. The strict `<` below is what makes that hold.
    pub fn delete_nearest(
        &mut self,
        query_time: f64,
        query_force: f64,
        force_normalizer: f64,
    ) -> Option<Peak> {
        let distance = |p: &Peak| {
            let dt = p.time as f64 - query_time;
            let df = (p.force - query_force) / force_normalizer;
            (dt * dt + df * df).sqrt()
        };

        let mut nearest: Option<(f64, Peak)> = None;
        for p in self.live_detected().chain(self.manual.iter().copied()) {
            let d = distance(&p);
            if nearest.map_or(true, |(best, _)| d < best) {
                nearest = Some((d, p));
            }
        }

        let (_, victim) = nearest?;
        match victim.origin {
            PeakOrigin::Detected => {
                self.deleted_detected.insert(victim.id);
            }
            PeakOrigin::Manual => {
                self.manual.retain(|p| p.id != victim.id);
            }
        }
        Some(victim)
    }

    /// The merged, time-ordered, 1-based-ranked projection.
    ///
    /// Read-only; calling it twice without a mutation in between yields
    /// identical output. Time ties keep insertion order: detected peaks were
    /// all inserted at seed time, so the detected-then-manual concatenation
    /// combined with a stable sort is exactly insertion order.
    pub fn view(&self) -> Vec<RankedPeak> {
        let mut peaks: Vec<Peak> = self
            .live_detected()
            .chain(self.manual.iter().copied())
            .collect();
        peaks.sort_by_key(|p| p.time);
        peaks
            .into_iter()
            .enumerate()
            .map(|(i, peak)| RankedPeak { rank: i + 1, peak })
            .collect()
    }

    /// Detected peaks that have not been tombstoned, ascending id.
    fn live_detected(&self) -> impl Iterator<Item = Peak> + '_ {
        self.detected
            .iter()
            .filter(|p| !self.deleted_detected.contains(&p.id))
            .copied()
    }

    /// Live peak count (detected minus tombstones, plus manual).
    pub fn len(&self) -> usize {
        self.detected.len() - self.deleted_detected.len() + self.manual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
