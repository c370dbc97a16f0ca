use std::path::PathBuf;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::data::curation::{CurationError, CurationStore};
use crate::data::detect::local_maxima;
use crate::data::loader;
use crate::data::model::{ForceTrace, Peak, RankedPeak};
use crate::data::smooth::{savgol_smooth, SmoothError};
use crate::data::stats::{analyze, PeakSummary};

// ---------------------------------------------------------------------------
// Curation session – the interactive editing state machine
// ---------------------------------------------------------------------------

/// One operator action while curating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditAction {
    /// Place a manual peak at a sample index (force read off the filtered
    /// curve, matching where the marker is drawn).
    Add { time: usize },
    /// Remove the peak nearest to a clicked plot position.
    DeleteNearest { time: f64, force: f64 },
    /// Freeze the session; the current view becomes the final result.
    Finish,
}

/// What an accepted action did, for logging and status display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    Added(Peak),
    Deleted(Peak),
    /// Delete requested on an empty view — observable, not an error.
    NothingToDelete,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    OutOfDomain(#[from] CurationError),
    #[error("curation is already finished")]
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Editing,
    Finalized,
}

/// A bounded curation session: trace + store + the cached merged view.
///
/// Every accepted action runs as one unit — store mutation, view and
/// summary recomputation, revision bump — before the next action is looked
/// at, so the renderer never observes a half-applied edit. `revision` is
/// the "view changed" signal: it increases exactly when the view may
/// differ from what was last drawn.
pub struct CurationSession {
    trace: ForceTrace,
    store: CurationStore,
    phase: SessionPhase,
    view: Vec<RankedPeak>,
    summary: Option<PeakSummary>,
    revision: u64,
}

impl CurationSession {
    /// Seed a fresh session from detector output.
    pub fn new(trace: ForceTrace, detected_indices: &[usize]) -> Self {
        let store = CurationStore::seed(detected_indices, &trace.filtered);
        let view = store.view();
        let summary = analyze(&view);
        CurationSession {
            trace,
            store,
            phase: SessionPhase::Editing,
            view,
            summary,
            revision: 0,
        }
    }

    /// Apply one action. Rejected actions (finalized session, out-of-domain
    /// add) leave the store, view and revision untouched.
    pub fn apply(&mut self, action: EditAction) -> Result<EditOutcome, SessionError> {
        if self.phase == SessionPhase::Finalized {
            return Err(SessionError::Finalized);
        }

        let outcome = match action {
            EditAction::Add { time } => {
                let force = self.trace.filtered.get(time).copied().unwrap_or(0.0);
                let peak = self.store.add_manual(time, force)?;
                EditOutcome::Added(peak)
            }
            EditAction::DeleteNearest { time, force } => {
                let normalizer = self.trace.force_normalizer();
                match self.store.delete_nearest(time, force, normalizer) {
                    Some(peak) => EditOutcome::Deleted(peak),
                    None => EditOutcome::NothingToDelete,
                }
            }
            EditAction::Finish => {
                self.phase = SessionPhase::Finalized;
                EditOutcome::Finished
            }
        };

        self.refresh_view();
        Ok(outcome)
    }

    /// Recompute the cached view and summary and signal the renderer.
    fn refresh_view(&mut self) {
        self.view = self.store.view();
        self.summary = analyze(&self.view);
        self.revision += 1;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_editing(&self) -> bool {
        self.phase == SessionPhase::Editing
    }

    pub fn trace(&self) -> &ForceTrace {
        &self.trace
    }

    /// The current merged view (final result once finalized).
    pub fn view(&self) -> &[RankedPeak] {
        &self.view
    }

    pub fn summary(&self) -> Option<&PeakSummary> {
        self.summary.as_ref()
    }

    /// Monotone counter bumped on every accepted action.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

// ---------------------------------------------------------------------------
// Detection parameters
// ---------------------------------------------------------------------------

/// Tunables for smoothing and detection, editable in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionParams {
    /// Savitzky–Golay window (odd, >= 3).
    pub window_size: usize,
    /// Savitzky–Golay polynomial order.
    pub poly_order: usize,
    /// Extrema neighborhood half-width in samples.
    pub order: usize,
    /// Instrument CSV preamble rows to skip.
    pub skip_rows: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        DetectionParams {
            window_size: 31,
            poly_order: 2,
            order: 50,
            skip_rows: loader::DEFAULT_PREAMBLE_ROWS,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Raw force samples of the loaded file (kept so detection can be
    /// re-run with new parameters).
    pub raw_samples: Option<Vec<f64>>,

    /// Path of the loaded instrument CSV.
    pub source_path: Option<PathBuf>,

    /// The active curation session (None until detection has run).
    pub session: Option<CurationSession>,

    /// Smoothing / detection tunables.
    pub params: DetectionParams,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load an instrument CSV and run detection with the current parameters.
    pub fn load_trace(&mut self, path: PathBuf) -> Result<()> {
        let raw = loader::load_trace_csv(&path, self.params.skip_rows)
            .with_context(|| format!("loading {}", path.display()))?;
        log::info!("Loaded {} samples from {}", raw.len(), path.display());

        self.raw_samples = Some(raw);
        self.source_path = Some(path);
        self.redetect().map_err(anyhow::Error::from)?;
        Ok(())
    }

    /// Smooth, detect, and seed a fresh session from the loaded samples.
    ///
    /// Discards any curation done so far — the detector proposal replaces
    /// the store wholesale. No-op when no file is loaded.
    pub fn redetect(&mut self) -> Result<(), SmoothError> {
        let Some(raw) = &self.raw_samples else {
            return Ok(());
        };

        let order = self.params.order.max(1);
        let filtered = savgol_smooth(raw, self.params.window_size, self.params.poly_order)?;
        let indices = local_maxima(&filtered, order);
        log::info!(
            "Detected {} maxima (window={}, poly={}, order={})",
            indices.len(),
            self.params.window_size,
            self.params.poly_order,
            order
        );

        let trace = ForceTrace::new(raw.clone(), filtered);
        self.session = Some(CurationSession::new(trace, &indices));
        self.status_message = None;
        Ok(())
    }

    /// Route an edit action to the session and turn rejections into a
    /// status-line message.
    pub fn apply_edit(&mut self, action: EditAction) {
        let Some(session) = &mut self.session else {
            return;
        };
        match session.apply(action) {
            Ok(EditOutcome::Added(p)) => {
                log::info!("Added point at time={}, force={:.2}", p.time, p.force);
            }
            Ok(EditOutcome::Deleted(p)) => {
                log::info!(
                    "Deleted {:?} point at time={}, force={:.2}",
                    p.origin,
                    p.time,
                    p.force
                );
            }
            Ok(EditOutcome::NothingToDelete) => {
                log::warn!("Delete requested but no points remain");
            }
            Ok(EditOutcome::Finished) => {
                log::info!(
                    "Curation finished with {} peaks",
                    session.view().len()
                );
            }
            Err(e) => {
                log::warn!("Edit rejected: {e}");
                self.status_message = Some(format!("Edit rejected: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PeakOrigin;

    fn session_with_two_peaks() -> CurationSession {
        let filtered = vec![0.0, 1.0, 3.0, 1.0, 0.0, 2.0, 5.0, 2.0, 0.0];
        let trace = ForceTrace::new(filtered.clone(), filtered);
        CurationSession::new(trace, &[2, 6])
    }

    #[test]
    fn add_samples_force_from_filtered_curve() {
        let mut session = session_with_two_peaks();
        let outcome = session.apply(EditAction::Add { time: 5 }).unwrap();
        match outcome {
            EditOutcome::Added(p) => {
                assert_eq!(p.force, 2.0);
                assert_eq!(p.origin, PeakOrigin::Manual);
            }
            other => panic!("expected Added, got {other:?}"),
        }
        assert_eq!(session.view().len(), 3);
    }

    #[test]
    fn every_accepted_action_bumps_revision() {
        let mut session = session_with_two_peaks();
        assert_eq!(session.revision(), 0);

        session.apply(EditAction::Add { time: 4 }).unwrap();
        assert_eq!(session.revision(), 1);

        session
            .apply(EditAction::DeleteNearest { time: 4.0, force: 0.0 })
            .unwrap();
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn rejected_add_is_atomic() {
        let mut session = session_with_two_peaks();
        let before = session.view().to_vec();
        let revision = session.revision();

        let err = session.apply(EditAction::Add { time: 99 }).unwrap_err();
        assert!(matches!(err, SessionError::OutOfDomain(_)));
        assert_eq!(session.view(), &before[..]);
        assert_eq!(session.revision(), revision);
        assert!(session.is_editing());
    }

    #[test]
    fn finish_is_terminal() {
        let mut session = session_with_two_peaks();
        assert_eq!(
            session.apply(EditAction::Finish).unwrap(),
            EditOutcome::Finished
        );
        assert_eq!(session.phase(), SessionPhase::Finalized);

        // No further edits of any kind are accepted.
        assert_eq!(
            session.apply(EditAction::Add { time: 1 }),
            Err(SessionError::Finalized)
        );
        assert_eq!(
            session.apply(EditAction::DeleteNearest { time: 2.0, force: 3.0 }),
            Err(SessionError::Finalized)
        );
        assert_eq!(session.apply(EditAction::Finish), Err(SessionError::Finalized));
        assert_eq!(session.view().len(), 2);
    }

    #[test]
    fn delete_on_empty_session_is_accepted_as_noop() {
        let trace = ForceTrace::new(vec![0.0; 4], vec![0.0; 4]);
        let mut session = CurationSession::new(trace, &[]);
        assert_eq!(
            session
                .apply(EditAction::DeleteNearest { time: 1.0, force: 0.0 })
                .unwrap(),
            EditOutcome::NothingToDelete
        );
    }

    #[test]
    fn summary_tracks_the_view() {
        let mut session = session_with_two_peaks();
        assert_eq!(session.summary().unwrap().count, 2);

        // Delete down to one peak: summary must switch to "insufficient".
        session
            .apply(EditAction::DeleteNearest { time: 6.0, force: 5.0 })
            .unwrap();
        assert!(session.summary().is_none());
    }

    #[test]
    fn redetect_replaces_the_session() {
        let mut state = AppState {
            raw_samples: Some(
                (0..200)
                    .map(|i| (i as f64 * 0.2).sin().abs() * 3.0)
                    .collect(),
            ),
            params: DetectionParams {
                window_size: 11,
                poly_order: 2,
                order: 5,
                skip_rows: 0,
            },
            ..AppState::default()
        };

        state.redetect().unwrap();
        let first_revision = state.session.as_ref().unwrap().revision();
        state.apply_edit(EditAction::Add { time: 10 });
        assert!(state.session.as_ref().unwrap().revision() > first_revision);

        state.redetect().unwrap();
        let session = state.session.as_ref().unwrap();
        assert_eq!(session.revision(), 0, "fresh session after redetect");
        assert!(session.is_editing());
    }

    #[test]
    fn redetect_surfaces_invalid_parameters() {
        let mut state = AppState {
            raw_samples: Some(vec![1.0; 10]),
            params: DetectionParams {
                window_size: 30, // even
                poly_order: 2,
                order: 1,
                skip_rows: 0,
            },
            ..AppState::default()
        };
        assert!(matches!(
            state.redetect(),
            Err(SmoothError::BadWindow(30))
        ));
        assert!(state.session.is_none());
    }
}
