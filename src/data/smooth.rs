use thiserror::Error;

// ---------------------------------------------------------------------------
// Savitzky–Golay smoothing (signal preprocessor)
// ---------------------------------------------------------------------------

/// Invalid smoothing parameters. Detection cannot proceed; the caller
/// surfaces these immediately and does not retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmoothError {
    #[error("window size {0} must be an odd number >= 3")]
    BadWindow(usize),
    #[error("window size {window} exceeds trace length {len}")]
    WindowTooLong { window: usize, len: usize },
    #[error("polynomial order {order} must be < window size {window}")]
    OrderTooHigh { order: usize, window: usize },
}

/// Smooth a force trace with a Savitzky–Golay filter.
///
/// Fits a least-squares polynomial of degree `poly_order` to a sliding
/// window of `window_size` samples and evaluates it at the window center.
/// Output has the same length as the input.
///
/// Boundary policy: the signal is mirrored about its first and last sample
/// (`raw[-j]` reads `raw[j]`, `raw[n-1+j]` reads `raw[n-1-j]`), so a window
/// never sees synthetic values outside the signal's range. Extrema found
/// near the boundaries by the detector therefore come from real data bent
/// back on itself, not from zero padding.
pub fn savgol_smooth(
    raw: &[f64],
    window_size: usize,
    poly_order: usize,
) -> Result<Vec<f64>, SmoothError> {
    if window_size < 3 || window_size % 2 == 0 {
        return Err(SmoothError::BadWindow(window_size));
    }
    if window_size > raw.len() {
        return Err(SmoothError::WindowTooLong {
            window: window_size,
            len: raw.len(),
        });
    }
    if poly_order >= window_size {
        return Err(SmoothError::OrderTooHigh {
            order: poly_order,
            window: window_size,
        });
    }

    let half = window_size / 2;
    let coeffs = smoothing_coefficients(half, poly_order);
    Ok(apply_mirrored(raw, &coeffs, half))
}

/// Convolution coefficients for the central smoothing row of the S-G
/// pseudoinverse, via normal equations and Gauss–Jordan elimination.
///
/// Window size is `2 * half + 1`; `poly_order < 2 * half + 1` must already
/// hold (checked by [`savgol_smooth`]).
fn smoothing_coefficients(half: usize, poly_order: usize) -> Vec<f64> {
    let n = 2 * half + 1;
    let p = poly_order + 1;

    // Vandermonde matrix J[i][k] = x^k for x in -half..=half.
    let mut j = vec![vec![0.0; p]; n];
    for (i, row) in j.iter_mut().enumerate() {
        let x = i as f64 - half as f64;
        let mut xk = 1.0;
        for cell in row.iter_mut() {
            *cell = xk;
            xk *= x;
        }
    }

    // Normal matrix J^T J.
    let mut jtj = vec![vec![0.0; p]; p];
    for r in 0..p {
        for c in 0..p {
            jtj[r][c] = (0..n).map(|i| j[i][r] * j[i][c]).sum();
        }
    }

    // Invert via Gauss–Jordan on [JTJ | I].
    let mut aug = vec![vec![0.0; 2 * p]; p];
    for i in 0..p {
        aug[i][..p].copy_from_slice(&jtj[i]);
        aug[i][p + i] = 1.0;
    }
    for col in 0..p {
        let pivot_row = (col..p)
            .max_by(|&a, &b| aug[a][col].abs().total_cmp(&aug[b][col].abs()))
            .unwrap_or(col);
        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        // JTJ is positive definite for poly_order < window, so the pivot
        // cannot vanish; guard anyway against pathological float input.
        if pivot.abs() < 1e-15 {
            continue;
        }
        for v in aug[col].iter_mut() {
            *v /= pivot;
        }
        for row in 0..p {
            if row != col {
                let factor = aug[row][col];
                for jj in 0..2 * p {
                    aug[row][jj] -= factor * aug[col][jj];
                }
            }
        }
    }

    // c_i = sum_k inv(JTJ)[0][k] * J[i][k]  — row 0 because we evaluate the
    // fitted polynomial (not a derivative) at the window center.
    (0..n)
        .map(|i| (0..p).map(|k| aug[0][p + k] * j[i][k]).sum())
        .collect()
}

/// Convolve with mirrored boundary handling.
fn apply_mirrored(data: &[f64], coeffs: &[f64], half: usize) -> Vec<f64> {
    let n = data.len() as i64;
    (0..data.len())
        .map(|i| {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| {
                    let j = i as i64 + k as i64 - half as i64;
                    let idx = if j < 0 {
                        -j
                    } else if j >= n {
                        2 * n - 2 - j
                    } else {
                        j
                    };
                    c * data[idx as usize]
                })
                .sum()
        })
        .collect()
}
