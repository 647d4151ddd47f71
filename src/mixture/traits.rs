//! Fitter contract consumed by the null-correlation estimators.
//!
//! The estimators never look inside a mixture fit. They hand a
//! [`MixtureFitter`] the data, the candidate covariances, a residual matrix
//! and a prior scheme, and read back a [`FittedMixture`]: weights, a
//! log-likelihood, and per-effect posterior moments.
use crate::{
    data::MashData,
    mixture::{
        covariances::CovList,
        errors::{MixtureError, MixtureResult},
    },
    nullcor::penalty::PriorScheme,
};
use ndarray::{Array1, Array2, Array3};

const WEIGHT_SUM_TOL: f64 = 1e-6;

/// A mixture-model fit for one `(data, Ulist, V)` triple.
///
/// Fields
/// ------
/// - `weights`: length K, non-negative, summing to one; index 0 is the
///   null component when the fitter uses one.
/// - `loglik`: unpenalized log-likelihood on the caller's original scale.
/// - `posterior_mean`: n×R posterior means of the true effects.
/// - `posterior_cov`: n×R×R posterior covariances.
/// - `component_names`: one label per weight, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedMixture {
    weights: Array1<f64>,
    loglik: f64,
    posterior_mean: Array2<f64>,
    posterior_cov: Array3<f64>,
    component_names: Vec<String>,
}

impl FittedMixture {
    /// Assemble a fit, checking that the pieces agree with each other.
    ///
    /// # Errors
    /// [`MixtureError::InvalidFittedModel`] when weights are empty, negative,
    /// non-finite or do not sum to one (±1e-6); when the log-likelihood is
    /// NaN; when the posterior arrays disagree in shape; or when the name
    /// count differs from the weight count.
    pub fn new(
        weights: Array1<f64>, loglik: f64, posterior_mean: Array2<f64>,
        posterior_cov: Array3<f64>, component_names: Vec<String>,
    ) -> MixtureResult<Self> {
        let invalid = |reason| Err(MixtureError::InvalidFittedModel { reason });
        if weights.is_empty() {
            return invalid("weights must be non-empty");
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return invalid("weights must be finite and non-negative");
        }
        if (weights.sum() - 1.0).abs() > WEIGHT_SUM_TOL {
            return invalid("weights must sum to one");
        }
        if loglik.is_nan() {
            return invalid("log-likelihood is NaN");
        }
        let (n, r) = posterior_mean.dim();
        if posterior_cov.dim() != (n, r, r) {
            return invalid("posterior covariances must be n x R x R matching the means");
        }
        if component_names.len() != weights.len() {
            return invalid("one component name per weight is required");
        }
        Ok(Self { weights, loglik, posterior_mean, posterior_cov, component_names })
    }

    pub fn loglikelihood(&self) -> f64 {
        self.loglik
    }

    pub fn mixture_weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn posterior_means(&self) -> &Array2<f64> {
        &self.posterior_mean
    }

    pub fn posterior_covariances(&self) -> &Array3<f64> {
        &self.posterior_cov
    }

    pub fn component_names(&self) -> &[String] {
        &self.component_names
    }
}

/// Anything that can fit the mixture model for a fixed residual matrix.
///
/// Implementations must be stateless across calls: two calls with the same
/// arguments return the same fit. `v` overrides whatever `data.v()` holds.
pub trait MixtureFitter {
    fn fit(
        &self, data: &MashData, ulist: &CovList, v: &Array2<f64>, prior: PriorScheme,
    ) -> MixtureResult<FittedMixture>;
}

impl<F: MixtureFitter + ?Sized> MixtureFitter for &F {
    fn fit(
        &self, data: &MashData, ulist: &CovList, v: &Array2<f64>, prior: PriorScheme,
    ) -> MixtureResult<FittedMixture> {
        (**self).fit(data, ulist, v, prior)
    }
}
