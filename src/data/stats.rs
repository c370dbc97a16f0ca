use serde::Serialize;

use super::model::RankedPeak;

// ---------------------------------------------------------------------------
// Trend / summary statistics over the final curated peaks
// ---------------------------------------------------------------------------

/// Ordinary-least-squares fit of force against 1-based rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    /// N per cycle.
    pub slope: f64,
    pub intercept: f64,
    /// Squared Pearson correlation, 0 for a perfectly flat force sequence.
    pub r_squared: f64,
}

impl TrendLine {
    pub fn at(&self, rank: f64) -> f64 {
        self.slope * rank + self.intercept
    }
}

/// Summary of one curated peak sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub trend: TrendLine,
}

/// Summarize the curated peaks, or `None` when fewer than two points exist —
/// a single peak cannot carry a trend and reporting a 0 slope would be
/// misleading. The UI renders this case as "not enough maximum points".
pub fn analyze(view: &[RankedPeak]) -> Option<PeakSummary> {
    if view.len() < 2 {
        return None;
    }

    let n = view.len() as f64;
    let forces: Vec<f64> = view.iter().map(|r| r.peak.force).collect();
    let ranks: Vec<f64> = view.iter().map(|r| r.rank as f64).collect();

    let mean = forces.iter().sum::<f64>() / n;
    let var = forces.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;
    let min = forces.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = forces.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let rank_mean = ranks.iter().sum::<f64>() / n;
    let rank_var = ranks.iter().map(|r| (r - rank_mean).powi(2)).sum::<f64>() / n;
    let cov = ranks
        .iter()
        .zip(&forces)
        .map(|(r, f)| (r - rank_mean) * (f - mean))
        .sum::<f64>()
        / n;

    // rank_var > 0 always holds for n >= 2 distinct ranks.
    let slope = cov / rank_var;
    let intercept = mean - slope * rank_mean;
    let r_squared = if var > 0.0 {
        (cov * cov) / (rank_var * var)
    } else {
        0.0
    };

    Some(PeakSummary {
        count: view.len(),
        mean,
        std_dev: var.sqrt(),
        min,
        max,
        trend: TrendLine {
            slope,
            intercept,
            r_squared,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Peak, PeakOrigin};

    fn view_of(forces: &[f64]) -> Vec<RankedPeak> {
        forces
            .iter()
            .enumerate()
            .map(|(i, &force)| RankedPeak {
                rank: i + 1,
                peak: Peak {
                    id: i as u64,
                    time: i * 10,
                    force,
                    origin: PeakOrigin::Detected,
                },
            })
            .collect()
    }

    #[test]
    fn fewer_than_two_points_is_signalled() {
        assert!(analyze(&[]).is_none());
        assert!(analyze(&view_of(&[42.0])).is_none());
    }

    #[test]
    fn perfectly_linear_forces_fit_exactly() {
        // force = 2*rank + 1
        let summary = analyze(&view_of(&[3.0, 5.0, 7.0, 9.0])).unwrap();
        assert!((summary.trend.slope - 2.0).abs() < 1e-12);
        assert!((summary.trend.intercept - 1.0).abs() < 1e-12);
        assert!((summary.trend.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(summary.count, 4);
        assert!((summary.mean - 6.0).abs() < 1e-12);
        assert_eq!(summary.min, 3.0);
        assert_eq!(summary.max, 9.0);
    }

    #[test]
    fn flat_forces_have_zero_slope_and_zero_r2() {
        let summary = analyze(&view_of(&[5.0, 5.0, 5.0])).unwrap();
        assert_eq!(summary.trend.slope, 0.0);
        assert_eq!(summary.trend.r_squared, 0.0);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn population_std_dev() {
        // Var([2, 4]) = 1 (population), std = 1.
        let summary = analyze(&view_of(&[2.0, 4.0])).unwrap();
        assert!((summary.std_dev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn declining_forces_have_negative_slope() {
        let summary = analyze(&view_of(&[10.0, 9.2, 8.1, 7.3, 6.0])).unwrap();
        assert!(summary.trend.slope < 0.0);
        assert!(summary.trend.r_squared > 0.95);
    }
}
