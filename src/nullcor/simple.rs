//! One-shot null correlation from presumed-null effects.
//!
//! Purpose
//! -------
//! Estimate `V` as the empirical correlation (or covariance) of z-scores
//! among effects that look null in every condition. The result seeds the
//! iterative estimator and is useful on its own as a quick diagnostic.
//!
//! Key behaviors
//! -------------
//! - An effect is null-like when `max_r |z_jr| < z_thresh` (strict).
//! - The sample covariance is column-centred with an `m − 1` denominator.
//! - With `est_cor`, [`cov_to_cor`] rescales to a unit diagonal.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least `max(R, 2)` null-like effects are required; otherwise
//!   [`NullCorError::InsufficientNullData`] is returned.
//! - Output is symmetric by construction; as a sample covariance of real
//!   data it is positive semi-definite.
use crate::{
    data::MashData,
    nullcor::{
        errors::{NullCorError, NullCorResult},
        options::SimpleOptions,
    },
};
use ndarray::{Array2, Axis};

/// Heuristic null correlation from effects with all |z| below `opts.z_thresh`.
///
/// # Errors
/// - [`NullCorError::InsufficientNullData`] when too few effects qualify.
/// - [`NullCorError::DegenerateVariance`] when `est_cor` is set and some
///   condition has zero variance among the selected effects.
pub fn estimate_null_correlation_simple(
    data: &MashData, opts: &SimpleOptions,
) -> NullCorResult<Array2<f64>> {
    let z = data.z_scores();
    let r = data.n_conditions();
    let null_rows: Vec<usize> = z
        .axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| row.fold(0.0_f64, |m, v| m.max(v.abs())) < opts.z_thresh)
        .map(|(j, _)| j)
        .collect();

    let required = r.max(2);
    if null_rows.len() < required {
        return Err(NullCorError::InsufficientNullData { found: null_rows.len(), required });
    }

    let selected = z.select(Axis(0), &null_rows);
    let cov = sample_covariance(&selected);
    if opts.est_cor { cov_to_cor(&cov) } else { Ok(cov) }
}

/// Column-centred `XᵀX / (m − 1)` for an m×R sample, m ≥ 2.
fn sample_covariance(x: &Array2<f64>) -> Array2<f64> {
    let m = x.nrows() as f64;
    let centred = match x.mean_axis(Axis(0)) {
        Some(mean) => x - &mean,
        None => x.clone(),
    };
    let mut cov = centred.t().dot(&centred) / (m - 1.0);
    symmetrize(&mut cov);
    cov
}

fn symmetrize(a: &mut Array2<f64>) {
    let n = a.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (a[[i, j]] + a[[j, i]]);
            a[[i, j]] = avg;
            a[[j, i]] = avg;
        }
    }
}

/// Rescale a covariance to a correlation: unit diagonal exactly, and
/// off-diagonals divided by `sqrt(c_ii · c_jj)`.
///
/// # Errors
/// [`NullCorError::DegenerateVariance`] for the first diagonal entry that
/// is not finite and strictly positive.
pub fn cov_to_cor(cov: &Array2<f64>) -> NullCorResult<Array2<f64>> {
    let sd = cov.diag().mapv(f64::sqrt);
    if let Some(index) = cov.diag().iter().position(|d| !(d.is_finite() && *d > 0.0)) {
        return Err(NullCorError::DegenerateVariance { index });
    }
    let r = cov.nrows();
    let mut cor = Array2::eye(r);
    for i in 0..r {
        for j in (i + 1)..r {
            let c = 0.5 * (cov[[i, j]] + cov[[j, i]]) / (sd[i] * sd[j]);
            cor[[i, j]] = c;
            cor[[j, i]] = c;
        }
    }
    Ok(cor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn unit_se(bhat: Array2<f64>) -> MashData {
        let shat = Array2::ones(bhat.dim());
        MashData::new(bhat, shat).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Only strictly sub-threshold rows are used, and the result is a
    // correlation matrix.
    //
    // Given
    // -----
    // - Four null-like rows and one row with |z| = 5.
    //
    // Expect
    // ------
    // - Unit diagonal, symmetric, off-diagonal equal to the Pearson
    //   correlation of the four null-like rows.
    fn simple_estimate_uses_null_like_rows() {
        let data = unit_se(array![
            [1.0, 0.5],
            [-1.0, -0.8],
            [0.5, 1.0],
            [-0.5, -0.2],
            [5.0, -5.0]
        ]);

        let v = estimate_null_correlation_simple(&data, &SimpleOptions::default()).unwrap();

        // Pearson correlation of x = (1, -1, .5, -.5), y = (.5, -.8, 1, -.2).
        let x = [1.0, -1.0, 0.5, -0.5];
        let y = [0.5, -0.8, 1.0, -0.2];
        let (mx, my) = (0.0, 0.125);
        let sxy: f64 = x.iter().zip(y.iter()).map(|(a, b)| (a - mx) * (b - my)).sum();
        let sxx: f64 = x.iter().map(|a| (a - mx) * (a - mx)).sum();
        let syy: f64 = y.iter().map(|b| (b - my) * (b - my)).sum();
        let rho = sxy / (sxx * syy).sqrt();

        assert_eq!(v[[0, 0]], 1.0);
        assert_eq!(v[[1, 1]], 1.0);
        assert_eq!(v[[0, 1]], v[[1, 0]]);
        assert_relative_eq!(v[[0, 1]], rho, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The threshold is strict and too few qualifying rows is an error.
    //
    // Given
    // -----
    // - R = 3; every row has max |z| = 2 exactly; z_thresh = 2.
    //
    // Expect
    // ------
    // - `InsufficientNullData { found: 0, required: 3 }`.
    fn simple_estimate_requires_enough_null_rows() {
        let data = unit_se(array![[2.0, 0.0, 0.0], [0.0, -2.0, 1.0], [1.0, 1.0, 2.0]]);

        let err = estimate_null_correlation_simple(&data, &SimpleOptions::default()).unwrap_err();

        assert_eq!(err, NullCorError::InsufficientNullData { found: 0, required: 3 });
    }

    #[test]
    // Purpose
    // -------
    // With `est_cor = false` the raw sample covariance is returned.
    //
    // Given
    // -----
    // - Four zero-mean rows: column sums of squares 4 and 2, cross product 2.
    //
    // Expect
    // ------
    // - Entries equal those sums divided by n − 1 = 3.
    fn simple_estimate_can_return_covariance() {
        let data = unit_se(array![[1.0, 0.0], [-1.0, 0.0], [1.0, 1.0], [-1.0, -1.0]]);
        let opts = SimpleOptions::new(2.0, false).unwrap();

        let cov = estimate_null_correlation_simple(&data, &opts).unwrap();

        assert_relative_eq!(cov[[0, 0]], 4.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(cov[[1, 1]], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(cov[[0, 1]], 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A constant column cannot be normalized.
    //
    // Given
    // -----
    // - Second column identically zero among null-like rows.
    //
    // Expect
    // ------
    // - `DegenerateVariance { index: 1 }`.
    fn constant_column_is_degenerate() {
        let data = unit_se(array![[1.0, 0.0], [-1.0, 0.0], [0.5, 0.0]]);

        let err = estimate_null_correlation_simple(&data, &SimpleOptions::default()).unwrap_err();

        assert_eq!(err, NullCorError::DegenerateVariance { index: 1 });
    }

    #[test]
    // Purpose
    // -------
    // `cov_to_cor` scales by the geometric mean of the variances.
    //
    // Given
    // -----
    // - [[4, 2], [2, 9]].
    //
    // Expect
    // ------
    // - Off-diagonal 2 / 6.
    fn cov_to_cor_scales_off_diagonals() {
        let cor = cov_to_cor(&array![[4.0, 2.0], [2.0, 9.0]]).unwrap();

        assert_eq!(cor[[0, 0]], 1.0);
        assert_relative_eq!(cor[[0, 1]], 1.0 / 3.0, epsilon = 1e-15);
    }
}
