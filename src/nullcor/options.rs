//! Options for the null-correlation estimators.
//!
//! Both option types validate in `new` and document their defaults on
//! `Default`. `NullCorOptions` embeds the `SimpleOptions` used to build a
//! starting matrix when the caller supplies none.
use crate::nullcor::{
    errors::{NullCorError, NullCorResult},
    penalty::PriorScheme,
};

/// Settings for [`estimate_null_correlation_simple`](super::simple::estimate_null_correlation_simple).
///
/// Defaults: `z_thresh = 2.0`, `est_cor = true`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleOptions {
    /// Effects whose largest |z| is strictly below this are treated as null.
    pub z_thresh: f64,
    /// Return a correlation (unit diagonal) instead of a covariance.
    pub est_cor: bool,
}

impl SimpleOptions {
    /// # Errors
    /// [`NullCorError::InvalidZThresh`] unless `z_thresh` is finite and > 0.
    pub fn new(z_thresh: f64, est_cor: bool) -> NullCorResult<Self> {
        if !z_thresh.is_finite() || z_thresh <= 0.0 {
            return Err(NullCorError::InvalidZThresh { value: z_thresh });
        }
        Ok(Self { z_thresh, est_cor })
    }
}

impl Default for SimpleOptions {
    fn default() -> Self {
        Self { z_thresh: 2.0, est_cor: true }
    }
}

/// Settings for [`estimate_null_correlation`](super::estimator::estimate_null_correlation).
///
/// Defaults: `max_iter = 30`, `tol = 1.0`, `est_cor = true`,
/// `track_fit = false`, `prior = NullBiased`, `simple = SimpleOptions::default()`.
///
/// `tol` is an absolute threshold on the change in penalized
/// log-likelihood between successive fits. One nat is a coarse criterion
/// and usually stops the loop after a handful of iterations; pass a smaller
/// value for a tighter fit.
#[derive(Debug, Clone, PartialEq)]
pub struct NullCorOptions {
    pub max_iter: usize,
    pub tol: f64,
    pub est_cor: bool,
    pub track_fit: bool,
    pub prior: PriorScheme,
    /// Initializer settings; its `est_cor` is overridden by `self.est_cor`.
    pub simple: SimpleOptions,
}

impl NullCorOptions {
    /// # Errors
    /// - [`NullCorError::InvalidMaxIter`] when `max_iter == 0`.
    /// - [`NullCorError::InvalidTol`] when `tol` is not finite.
    pub fn new(
        max_iter: usize, tol: f64, est_cor: bool, track_fit: bool, prior: PriorScheme,
        simple: SimpleOptions,
    ) -> NullCorResult<Self> {
        if max_iter == 0 {
            return Err(NullCorError::InvalidMaxIter { max_iter });
        }
        if !tol.is_finite() {
            return Err(NullCorError::InvalidTol { tol });
        }
        Ok(Self { max_iter, tol, est_cor, track_fit, prior, simple })
    }
}

impl Default for NullCorOptions {
    fn default() -> Self {
        Self {
            max_iter: 30,
            tol: 1.0,
            est_cor: true,
            track_fit: false,
            prior: PriorScheme::NullBiased,
            simple: SimpleOptions::default(),
        }
    }
}
