// ---------------------------------------------------------------------------
// Local-maximum peak detection
// ---------------------------------------------------------------------------

/// Indices of local maxima in `filtered`, compared over `order` neighbors
/// on each side (scipy's `argrelextrema(.., np.greater, order)` semantics).
///
/// An index qualifies only if it is *strictly* greater than every sample
/// within `order` positions on both sides, and only if that full
/// neighborhood exists — the first and last `order` samples can never
/// qualify, no synthetic neighbors are invented. The result is strictly
/// increasing; an empty result just means no cycle maxima were found.
///
/// `order` must be >= 1.
pub fn local_maxima(filtered: &[f64], order: usize) -> Vec<usize> {
    debug_assert!(order >= 1, "neighborhood width must be >= 1");
    let n = filtered.len();
    if n < 2 * order + 1 {
        return Vec::new();
    }

    (order..n - order)
        .filter(|&i| {
            (1..=order).all(|k| filtered[i] > filtered[i - k] && filtered[i] > filtered[i + k])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_example() {
        // Two clear maxima; the boundary samples are excluded by definition.
        let signal = [0.0, 1.0, 3.0, 1.0, 0.0, 2.0, 5.0, 2.0, 0.0];
        assert_eq!(local_maxima(&signal, 1), vec![2, 6]);
    }

    #[test]
    fn boundary_samples_never_qualify() {
        // Largest value sits at each end; neither has a full neighborhood.
        let signal = [9.0, 1.0, 2.0, 1.0, 9.0];
        assert_eq!(local_maxima(&signal, 1), vec![2]);
    }

    #[test]
    fn wider_order_suppresses_small_bumps() {
        let signal = [0.0, 2.0, 1.0, 3.0, 1.0, 2.0, 0.0];
        // order=1 sees three bumps, order=2 keeps only the dominant one.
        assert_eq!(local_maxima(&signal, 1), vec![1, 3, 5]);
        assert_eq!(local_maxima(&signal, 2), vec![3]);
    }

    #[test]
    fn plateau_is_not_a_maximum() {
        // Strict comparison: equal neighbors disqualify both samples.
        let signal = [0.0, 1.0, 1.0, 0.0];
        assert!(local_maxima(&signal, 1).is_empty());
    }

    #[test]
    fn monotone_signal_has_no_maxima() {
        let signal: Vec<f64> = (0..10).map(f64::from).collect();
        assert!(local_maxima(&signal, 1).is_empty());
    }

    #[test]
    fn short_signal_yields_empty() {
        assert!(local_maxima(&[1.0, 5.0, 1.0], 2).is_empty());
        assert!(local_maxima(&[], 1).is_empty());
    }

    #[test]
    fn detection_is_deterministic() {
        let signal: Vec<f64> = (0..200)
            .map(|i| (i as f64 * 0.3).sin() * (1.0 + (i as f64 * 0.011).cos()))
            .collect();
        let a = local_maxima(&signal, 5);
        let b = local_maxima(&signal, 5);
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0] < w[1]), "strictly increasing");
    }
}
