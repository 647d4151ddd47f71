//! Multi-condition effect data for null-correlation estimation.
//!
//! Purpose
//! -------
//! Provide a validated container for per-effect estimates `Bhat` and their
//! standard errors `Shat` across `R` conditions, together with the residual
//! matrix `V` the mixture model conditions on and the standard-error
//! scaling implied by the `alpha` model.
//!
//! Key behaviors
//! -------------
//! - [`MashData::new`] enforces shape agreement, finiteness, and strict
//!   positivity of standard errors.
//! - [`MashData::with_alpha`] applies the exchangeable-z family: for
//!   `alpha = 1` the model is fitted on z-scores with unit standard errors,
//!   and `shat_alpha = Shat^alpha` records the removed scale.
//! - [`MashData::with_v`] swaps the residual matrix by value, so one
//!   estimation run can refit the same effects under successive `V`s
//!   without touching `Bhat`/`Shat`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `bhat`, `shat`, `shat_alpha` are n×R with n ≥ 1 and R ≥ 1.
//! - `shat > 0` and `shat_alpha > 0` elementwise; everything is finite.
//! - `v` is R×R, finite, and symmetric to within `1e-8`.
//! - The stored `bhat / shat` equals the caller's original z-score for
//!   every `alpha`.
//!
//! Conventions
//! -----------
//! - Rows are effects, columns are conditions; indices are 0-based.
//! - `effective_shat()` returns the caller's original standard errors
//!   (`shat * shat_alpha`), the scale on which posterior moments are
//!   reported.
use crate::data::errors::{DataError, DataResult};
use ndarray::{Array2, Zip};

const SYMMETRY_TOL: f64 = 1e-8;

/// `MashData` — validated effects, standard errors, residual matrix and
/// optional contrast.
///
/// Fields
/// ------
/// - `bhat`, `shat`: n×R model-scale estimates and standard errors.
/// - `shat_alpha`: n×R scale removed by the `alpha` model (all ones when
///   `alpha = 0`).
/// - `v`: R×R residual correlation (or covariance) matrix, identity by
///   default.
/// - `contrast`: optional contrast matrix `L` (one column per condition)
///   marking the data as contrasts of effects rather than raw effects.
#[derive(Debug, Clone, PartialEq)]
pub struct MashData {
    bhat: Array2<f64>,
    shat: Array2<f64>,
    shat_alpha: Array2<f64>,
    v: Array2<f64>,
    contrast: Option<Array2<f64>>,
}

impl MashData {
    /// Construct validated data with `alpha = 0` and `V = I`.
    ///
    /// Errors
    /// ------
    /// - `DataError::EmptyData` when either dimension is zero.
    /// - `DataError::ShapeMismatch` when `bhat.dim() != shat.dim()`.
    /// - `DataError::NonFiniteBhat` / `NonFiniteShat` / `NonPositiveShat`
    ///   pointing at the first offending entry in row-major order.
    pub fn new(bhat: Array2<f64>, shat: Array2<f64>) -> DataResult<Self> {
        let (n, r) = bhat.dim();
        if n == 0 || r == 0 {
            return Err(DataError::EmptyData { rows: n, cols: r });
        }
        if bhat.dim() != shat.dim() {
            return Err(DataError::ShapeMismatch { bhat: bhat.dim(), shat: shat.dim() });
        }
        for ((row, col), &value) in bhat.indexed_iter() {
            if !value.is_finite() {
                return Err(DataError::NonFiniteBhat { row, col, value });
            }
        }
        for ((row, col), &value) in shat.indexed_iter() {
            if !value.is_finite() {
                return Err(DataError::NonFiniteShat { row, col, value });
            }
            if value <= 0.0 {
                return Err(DataError::NonPositiveShat { row, col, value });
            }
        }
        Ok(Self {
            shat_alpha: Array2::ones((n, r)),
            v: Array2::eye(r),
            contrast: None,
            bhat,
            shat,
        })
    }

    /// Construct data under the `alpha` standard-error model.
    ///
    /// With `shat_alpha = Shat^alpha`, the stored estimates are
    /// `Bhat / shat_alpha` and the stored standard errors `Shat^(1 - alpha)`.
    /// `alpha = 0` is identical to [`MashData::new`].
    ///
    /// Errors
    /// ------
    /// - `DataError::InvalidAlpha` when `alpha` is not finite.
    /// - Any error from [`MashData::new`].
    pub fn with_alpha(bhat: Array2<f64>, shat: Array2<f64>, alpha: f64) -> DataResult<Self> {
        if !alpha.is_finite() {
            return Err(DataError::InvalidAlpha { alpha });
        }
        let mut data = Self::new(bhat, shat)?;
        if alpha != 0.0 {
            let shat_alpha = data.shat.mapv(|s| s.powf(alpha));
            data.bhat = &data.bhat / &shat_alpha;
            data.shat.mapv_inplace(|s| s.powf(1.0 - alpha));
            data.shat_alpha = shat_alpha;
        }
        Ok(data)
    }

    /// Replace the residual matrix.
    ///
    /// Errors
    /// ------
    /// - `DataError::VShapeMismatch` unless `v` is R×R.
    /// - `DataError::InvalidV` for non-finite or asymmetric entries.
    pub fn with_v(mut self, v: Array2<f64>) -> DataResult<Self> {
        validate_residual(&v, self.n_conditions())?;
        self.v = v;
        Ok(self)
    }

    /// Mark the data as contrasts `L · b` of the underlying effects.
    pub fn with_contrast(mut self, l: Array2<f64>) -> DataResult<Self> {
        let r = self.n_conditions();
        if l.ncols() != r || l.nrows() == 0 {
            return Err(DataError::ContrastShapeMismatch { expected_cols: r, found: l.dim() });
        }
        self.contrast = Some(l);
        Ok(self)
    }

    pub fn n_effects(&self) -> usize {
        self.bhat.nrows()
    }

    pub fn n_conditions(&self) -> usize {
        self.bhat.ncols()
    }

    pub fn is_contrast(&self) -> bool {
        self.contrast.is_some()
    }

    pub fn bhat(&self) -> &Array2<f64> {
        &self.bhat
    }

    pub fn shat(&self) -> &Array2<f64> {
        &self.shat
    }

    pub fn shat_alpha(&self) -> &Array2<f64> {
        &self.shat_alpha
    }

    pub fn v(&self) -> &Array2<f64> {
        &self.v
    }

    pub fn contrast(&self) -> Option<&Array2<f64>> {
        self.contrast.as_ref()
    }

    /// Elementwise `Bhat / Shat` on the stored scale.
    pub fn z_scores(&self) -> Array2<f64> {
        &self.bhat / &self.shat
    }

    /// Original standard errors, `Shat * Shat_alpha`.
    pub fn effective_shat(&self) -> Array2<f64> {
        &self.shat * &self.shat_alpha
    }
}

/// Check that `v` is an R×R finite symmetric matrix.
pub fn validate_residual(v: &Array2<f64>, r: usize) -> DataResult<()> {
    if v.dim() != (r, r) {
        return Err(DataError::VShapeMismatch { expected: r, found: v.dim() });
    }
    for ((row, col), &value) in v.indexed_iter() {
        if !value.is_finite() {
            return Err(DataError::InvalidV { row, col, reason: "entries must be finite" });
        }
    }
    let mut asym = None;
    Zip::indexed(v).and(&v.t()).for_each(|(row, col), &a, &b| {
        if asym.is_none() && (a - b).abs() > SYMMETRY_TOL * a.abs().max(b.abs()).max(1.0) {
            asym = Some((row, col));
        }
    });
    match asym {
        Some((row, col)) => Err(DataError::InvalidV { row, col, reason: "matrix must be symmetric" }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // ---- Helpers ----------------------------------------------------------

    fn small() -> (Array2<f64>, Array2<f64>) {
        (array![[1.0, -2.0], [0.5, 4.0], [3.0, 0.0]], array![[1.0, 2.0], [0.5, 4.0], [1.5, 1.0]])
    }

    #[test]
    // Purpose
    // -------
    // `new` accepts clean data and installs the defaults.
    //
    // Given
    // -----
    // - 3×2 estimates with strictly positive standard errors.
    //
    // Expect
    // ------
    // - `V = I₂`, `shat_alpha = 1`, no contrast.
    fn new_installs_identity_residual_and_unit_scale() {
        let (b, s) = small();
        let data = MashData::new(b, s).unwrap();

        assert_eq!(data.n_effects(), 3);
        assert_eq!(data.n_conditions(), 2);
        assert_eq!(data.v(), &Array2::<f64>::eye(2));
        assert!(data.shat_alpha().iter().all(|&x| x == 1.0));
        assert!(!data.is_contrast());
    }

    #[test]
    // Purpose
    // -------
    // Validation reports the first offending entry.
    //
    // Given
    // -----
    // - A zero standard error at (1, 0); a NaN estimate at (2, 1); mismatched
    //   shapes.
    //
    // Expect
    // ------
    // - `NonPositiveShat`, `NonFiniteBhat`, `ShapeMismatch` respectively.
    fn new_rejects_invalid_inputs() {
        let (b, mut s) = small();
        s[[1, 0]] = 0.0;
        assert_eq!(
            MashData::new(b.clone(), s),
            Err(DataError::NonPositiveShat { row: 1, col: 0, value: 0.0 })
        );

        let (mut b2, s2) = small();
        b2[[2, 1]] = f64::NAN;
        assert!(matches!(
            MashData::new(b2, s2),
            Err(DataError::NonFiniteBhat { row: 2, col: 1, .. })
        ));

        assert!(matches!(
            MashData::new(b, Array2::ones((2, 2))),
            Err(DataError::ShapeMismatch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The `alpha` model rescales while preserving z-scores and original
    // standard errors.
    //
    // Given
    // -----
    // - The small dataset with `alpha = 1`.
    //
    // Expect
    // ------
    // - Stored `shat` is all ones, `z_scores` equal `Bhat / Shat`, and
    //   `effective_shat` equals the original `Shat`.
    fn with_alpha_one_fits_on_z_scale() {
        let (b, s) = small();
        let z = &b / &s;
        let data = MashData::with_alpha(b, s.clone(), 1.0).unwrap();

        for (&x, &y) in data.z_scores().iter().zip(z.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }
        for (&x, &y) in data.effective_shat().iter().zip(s.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }
        assert!(data.shat().iter().all(|&x| (x - 1.0).abs() < 1e-12));
    }

    #[test]
    // Purpose
    // -------
    // `with_v` validates shape and symmetry before replacing `V`.
    //
    // Given
    // -----
    // - A 3×3 matrix, an asymmetric 2×2 matrix, a valid correlation matrix.
    //
    // Expect
    // ------
    // - `VShapeMismatch`, `InvalidV`, then success with the new `V` stored.
    fn with_v_validates_residual_matrix() {
        let (b, s) = small();
        let data = MashData::new(b, s).unwrap();

        assert!(matches!(
            data.clone().with_v(Array2::eye(3)),
            Err(DataError::VShapeMismatch { expected: 2, .. })
        ));
        assert!(matches!(
            data.clone().with_v(array![[1.0, 0.2], [0.3, 1.0]]),
            Err(DataError::InvalidV { .. })
        ));
        let v = array![[1.0, 0.4], [0.4, 1.0]];
        assert_eq!(data.with_v(v.clone()).unwrap().v(), &v);
    }

    #[test]
    // Purpose
    // -------
    // A contrast matrix must have one column per condition.
    //
    // Given
    // -----
    // - `L` of shape 1×3 for R = 2, then 1×2.
    //
    // Expect
    // ------
    // - `ContrastShapeMismatch`, then `is_contrast() == true`.
    fn with_contrast_checks_columns() {
        let (b, s) = small();
        let data = MashData::new(b, s).unwrap();

        assert!(matches!(
            data.clone().with_contrast(Array2::ones((1, 3))),
            Err(DataError::ContrastShapeMismatch { expected_cols: 2, .. })
        ));
        assert!(data.with_contrast(array![[1.0, -1.0]]).unwrap().is_contrast());
    }
}
