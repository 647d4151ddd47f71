//! Gaussian kernels for the multivariate normal mixture.
//!
//! Purpose
//! -------
//! Evaluate, for every effect `j` and prior component `c`, the marginal
//! log-density `ln N(b_j; 0, Σ_j + U_c)` with `Σ_j = S_j V S_j`,
//! `S_j = diag(shat_j)`, and the per-component posterior moments of the
//! true effect.
//!
//! Key behaviors
//! -------------
//! - Components are expanded grid-major: the null component (zero matrix)
//!   first when requested, then `ω_1² U_1, …, ω_1² U_K, ω_2² U_1, …`.
//! - Densities and posteriors share one Cholesky factor of `Σ_j + U_c`;
//!   the posterior uses `μ = U (Σ + U)⁻¹ b` and `C = U − U (Σ + U)⁻¹ U`,
//!   which equals `U (Σ⁻¹ U + I)⁻¹` without inverting `Σ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `Σ_j + U_c` must be positive definite; failures are reported with
//!   the effect and component index rather than clamped.
//! - All quantities are on the model scale (stored `bhat`/`shat`); callers
//!   rescale by `shat_alpha` afterwards.
use crate::{
    data::MashData,
    mixture::{
        covariances::CovList,
        errors::{MixtureError, MixtureResult},
    },
};
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use ndarray::{Array2, Array3, ArrayView2};
use statrs::consts::LN_SQRT_2PI;

/// Expanded prior components `ω_l² U_k` in fitting order.
#[derive(Debug, Clone)]
pub struct Components {
    names: Vec<String>,
    covs: Vec<DMatrix<f64>>,
}

impl Components {
    /// Expand `ulist` over `grid`, optionally prepending the null component.
    pub fn expand(ulist: &CovList, grid: &[f64], use_point_mass: bool) -> Self {
        let r = ulist.dim();
        let capacity = grid.len() * ulist.len() + usize::from(use_point_mass);
        let mut names = Vec::with_capacity(capacity);
        let mut covs = Vec::with_capacity(capacity);
        if use_point_mass {
            names.push("null".to_string());
            covs.push(DMatrix::zeros(r, r));
        }
        for (l, &omega) in grid.iter().enumerate() {
            let scale = omega * omega;
            for (name, u) in ulist.iter() {
                names.push(format!("{name}.{}", l + 1));
                covs.push(to_dmatrix(u.view()) * scale);
            }
        }
        Self { names, covs }
    }

    pub fn len(&self) -> usize {
        self.covs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.covs.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

pub(crate) fn to_dmatrix(a: ArrayView2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// `Σ_j = S_j V S_j` for effect `j`.
fn residual_cov(data: &MashData, v: &DMatrix<f64>, j: usize) -> DMatrix<f64> {
    let s = data.shat().row(j);
    DMatrix::from_fn(v.nrows(), v.ncols(), |a, b| v[(a, b)] * s[a] * s[b])
}

fn factor(
    sigma: &DMatrix<f64>, u: &DMatrix<f64>, effect: usize, component: usize,
) -> MixtureResult<Cholesky<f64, Dyn>> {
    (sigma + u).cholesky().ok_or(MixtureError::NotPositiveDefinite { effect, component })
}

/// n×K matrix of `ln N(b_j; 0, Σ_j + U_c)`.
///
/// # Errors
/// [`MixtureError::NotPositiveDefinite`] for the first `(j, c)` whose
/// marginal covariance has no Cholesky factor.
pub fn log_likelihood_matrix(
    data: &MashData, v: &Array2<f64>, comps: &Components,
) -> MixtureResult<Array2<f64>> {
    let (n, r) = data.bhat().dim();
    let v = to_dmatrix(v.view());
    let norm = r as f64 * LN_SQRT_2PI;
    let mut out = Array2::zeros((n, comps.len()));
    for j in 0..n {
        let sigma = residual_cov(data, &v, j);
        let b = DVector::from_iterator(r, data.bhat().row(j).iter().copied());
        for (c, u) in comps.covs.iter().enumerate() {
            let chol = factor(&sigma, u, j, c)?;
            let log_det: f64 = chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum();
            let quad = b.dot(&chol.solve(&b));
            out[[j, c]] = -norm - log_det - 0.5 * quad;
        }
    }
    Ok(out)
}

/// Posterior mean (n×R) and covariance (n×R×R) of the true effects given
/// responsibilities `resp` (n×K, rows summing to one), on the model scale.
pub fn posterior_moments(
    data: &MashData, v: &Array2<f64>, comps: &Components, resp: &Array2<f64>,
) -> MixtureResult<(Array2<f64>, Array3<f64>)> {
    let (n, r) = data.bhat().dim();
    let v = to_dmatrix(v.view());
    let mut mean = Array2::zeros((n, r));
    let mut cov = Array3::zeros((n, r, r));
    for j in 0..n {
        let sigma = residual_cov(data, &v, j);
        let b = DVector::from_iterator(r, data.bhat().row(j).iter().copied());
        let mut m1 = DVector::<f64>::zeros(r);
        let mut m2 = DMatrix::<f64>::zeros(r, r);
        for (c, u) in comps.covs.iter().enumerate() {
            let w = resp[[j, c]];
            if w == 0.0 {
                continue;
            }
            let chol = factor(&sigma, u, j, c)?;
            let mu = u * chol.solve(&b);
            let post = u - u * chol.solve(u);
            m2 += (post + &mu * mu.transpose()) * w;
            m1 += mu * w;
        }
        let c_j = m2 - &m1 * m1.transpose();
        for a in 0..r {
            mean[[j, a]] = m1[a];
            for b2 in 0..r {
                cov[[j, a, b2]] = c_j[(a, b2)];
            }
        }
    }
    Ok((mean, cov))
}
