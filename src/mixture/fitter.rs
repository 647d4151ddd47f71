//! Reference mixture fitter for multivariate adaptive shrinkage.
//!
//! Purpose
//! -------
//! Fit the mixture prior `b_j ~ Σ_c π_c N(0, U_c)` to effect estimates
//! observed with noise `N(0, S_j V S_j)` for a fixed residual matrix `V`,
//! and return the weights, log-likelihood, and posterior moments the
//! null-correlation estimators need.
//!
//! Key behaviors
//! -------------
//! - Candidate covariances are optionally normalized, expanded over the
//!   scale grid, and prefixed with a null component.
//! - Weights maximize the prior-penalized log-likelihood
//!   (see [`weights`](crate::mixture::weights)); the reported
//!   log-likelihood is unpenalized.
//! - Posterior moments are mixed by responsibility and reported on the
//!   caller's original scale, i.e. multiplied back by `shat_alpha`.
//!
//! Conventions
//! -----------
//! - The log-likelihood includes the Jacobian of the `alpha` rescaling,
//!   `−Σ_{j,r} ln shat_alpha_{jr}`, so fits under different `alpha` are
//!   comparable.
//! - The fitter is stateless: repeated calls with identical arguments give
//!   identical results.
use crate::{
    data::{MashData, validate_residual},
    mixture::{
        covariances::CovList,
        errors::{MixtureError, MixtureResult},
        grid::Grid,
        likelihood::{Components, log_likelihood_matrix, posterior_moments},
        traits::{FittedMixture, MixtureFitter},
        weights::{WeightData, estimate_weights},
    },
    nullcor::penalty::PriorScheme,
    optimization::loglik_optimizer::MLEOptions,
};
use ndarray::{Array2, Array3, Axis};

/// Configuration for [`MashFitter`].
///
/// Defaults: automatic grid with ratio √2, normalized candidates, null
/// component included, default L-BFGS options.
#[derive(Debug, Clone, PartialEq)]
pub struct FitterOptions {
    pub grid: Grid,
    pub normalize_u: bool,
    /// Prepend the null component. When off, `PriorScheme::NullBiased`
    /// still favors component 0, which is then the first grid component.
    pub use_point_mass: bool,
    pub mle_opts: MLEOptions,
}

impl FitterOptions {
    /// # Errors
    /// Any error from [`Grid::validate`].
    pub fn new(
        grid: Grid, normalize_u: bool, use_point_mass: bool, mle_opts: MLEOptions,
    ) -> MixtureResult<Self> {
        grid.validate()?;
        Ok(Self { grid, normalize_u, use_point_mass, mle_opts })
    }
}

impl Default for FitterOptions {
    fn default() -> Self {
        Self {
            grid: Grid::default(),
            normalize_u: true,
            use_point_mass: true,
            mle_opts: MLEOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MashFitter {
    opts: FitterOptions,
}

impl MashFitter {
    pub fn new(opts: FitterOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &FitterOptions {
        &self.opts
    }
}

impl MixtureFitter for MashFitter {
    fn fit(
        &self, data: &MashData, ulist: &CovList, v: &Array2<f64>, prior: PriorScheme,
    ) -> MixtureResult<FittedMixture> {
        let r = data.n_conditions();
        if ulist.dim() != r {
            return Err(MixtureError::CovDimMismatch {
                name: ulist.names().next().unwrap_or_default().to_string(),
                expected: r,
                found: ulist.dim(),
            });
        }
        if v.dim() != (r, r) {
            return Err(MixtureError::ResidualShapeMismatch { expected: r, found: v.dim() });
        }
        validate_residual(v, r)?;

        let ulist = if self.opts.normalize_u { ulist.normalized() } else { ulist.clone() };
        let grid = self.opts.grid.resolve(data)?;
        let comps = Components::expand(&ulist, &grid, self.opts.use_point_mass);

        let log_lik = log_likelihood_matrix(data, v, &comps)?;
        let prior_vec = prior.prior_vector(comps.len());
        let (weight_data, row_max) = WeightData::from_log_lik(&log_lik, &prior_vec)?;
        let pi = estimate_weights(&weight_data, &self.opts.mle_opts)?;

        let density = weight_data.lik.dot(&pi);
        if let Some((effect, _)) = density.iter().enumerate().find(|(_, f)| **f <= 0.0) {
            return Err(MixtureError::ZeroLikelihood { effect });
        }
        let jacobian: f64 = data.shat_alpha().iter().map(|a| a.ln()).sum();
        let loglik = density.iter().zip(row_max.iter()).map(|(f, m)| f.ln() + m).sum::<f64>()
            - jacobian;

        let mut resp = &weight_data.lik * &pi;
        for (mut row, &f) in resp.axis_iter_mut(Axis(0)).zip(density.iter()) {
            row.mapv_inplace(|w| w / f);
        }
        let (mean, cov) = posterior_moments(data, v, &comps, &resp)?;
        let (mean, cov) = to_original_scale(data, mean, cov);

        FittedMixture::new(pi, loglik, mean, cov, comps.names().to_vec())
    }
}

/// Multiply means by `shat_alpha_j` and covariances by
/// `diag(shat_alpha_j) · C_j · diag(shat_alpha_j)`.
fn to_original_scale(
    data: &MashData, mut mean: Array2<f64>, mut cov: Array3<f64>,
) -> (Array2<f64>, Array3<f64>) {
    let scale = data.shat_alpha();
    mean *= scale;
    for (j, mut c) in cov.axis_iter_mut(Axis(0)).enumerate() {
        let a = scale.row(j);
        for ((p, q), x) in c.indexed_iter_mut() {
            *x *= a[p] * a[q];
        }
    }
    (mean, cov)
}
