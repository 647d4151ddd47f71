//! Mixture-weight estimation on the probability simplex.
//!
//! Given the n×K component likelihoods `L_jc` and a prior vector `p`, the
//! weights maximize the penalized log-likelihood
//!
//! ```text
//! Σ_j ln Σ_c π_c L_jc + Σ_c (p_c − 1) ln π_c
//! ```
//!
//! The primary solver works on logits `θ` with `π = softmax(θ)` and hands
//! the problem to the crate's L-BFGS maximizer with an analytic gradient.
//! If that solver fails, a MAP-EM fixed point
//! `π_c ← (Σ_j r_jc + p_c − 1) / (n + Σ_c (p_c − 1))` takes over.
//!
//! Likelihoods enter row-rescaled (`exp(ℓ_jc − max_c ℓ_jc)`), which shifts
//! the objective by a constant and leaves the maximizer unchanged.
use crate::{
    mixture::errors::{MixtureError, MixtureResult},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Grad, LogLikelihood, MLEOptions, Theta, maximize},
        numerical_stability::{log_softmax, safe_softmax, softmax_jvp},
    },
};
use ndarray::{Array1, Array2, Axis};

const EM_MAX_ITER: usize = 1000;
const EM_TOL: f64 = 1e-8;

/// Row-rescaled likelihoods and the prior excess `p − 1`.
#[derive(Debug, Clone)]
pub struct WeightData {
    pub lik: Array2<f64>,
    pub prior_excess: Array1<f64>,
}

impl WeightData {
    /// Rescale each row of log-likelihoods by its maximum. Returns the data
    /// and the per-row maxima, which must be added back to recover the
    /// log-likelihood.
    pub fn from_log_lik(
        log_lik: &Array2<f64>, prior: &Array1<f64>,
    ) -> MixtureResult<(Self, Array1<f64>)> {
        let row_max = log_lik.map_axis(Axis(1), |row| row.fold(f64::NEG_INFINITY, |m, &v| m.max(v)));
        if let Some((effect, _)) = row_max.iter().enumerate().find(|(_, m)| !m.is_finite()) {
            return Err(MixtureError::ZeroLikelihood { effect });
        }
        let mut lik = log_lik.clone();
        for (mut row, &m) in lik.rows_mut().into_iter().zip(row_max.iter()) {
            row.mapv_inplace(|v| (v - m).exp());
        }
        let prior_excess = prior.mapv(|p| p - 1.0);
        Ok((Self { lik, prior_excess }, row_max))
    }
}

/// Penalized mixture log-likelihood in logit space.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightObjective;

impl WeightObjective {
    fn mixture_density(pi: &Array1<f64>, data: &WeightData) -> Array1<f64> {
        data.lik.dot(pi)
    }
}

impl LogLikelihood for WeightObjective {
    type Data = WeightData;

    fn value(&self, theta: &Theta, data: &WeightData) -> OptResult<f64> {
        let pi = safe_softmax(theta.view());
        let f = Self::mixture_density(&pi, data);
        let fit: f64 = f.iter().map(|v| v.ln()).sum();
        let log_pi = log_softmax(theta.view());
        let penalty: f64 = data
            .prior_excess
            .iter()
            .zip(log_pi.iter())
            .filter(|(b, _)| **b != 0.0)
            .map(|(b, lp)| b * lp)
            .sum();
        Ok(fit + penalty)
    }

    fn check(&self, theta: &Theta, data: &WeightData) -> OptResult<()> {
        let k = data.lik.ncols();
        if data.lik.nrows() == 0 || k == 0 {
            return Err(OptError::InvalidObjectiveData { reason: "likelihood matrix is empty" });
        }
        if data.prior_excess.len() != k {
            return Err(OptError::InvalidObjectiveData {
                reason: "prior length differs from component count",
            });
        }
        if theta.len() != k {
            return Err(OptError::ThetaLengthMismatch { expected: k, actual: theta.len() });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, data: &WeightData) -> OptResult<Grad> {
        let pi = safe_softmax(theta.view());
        let f = Self::mixture_density(&pi, data);
        let g = data.lik.t().dot(&f.mapv(|v| 1.0 / v));
        let mut out = softmax_jvp(pi.view(), g.view());
        let total_excess = data.prior_excess.sum();
        out += &(&data.prior_excess - &(&pi * total_excess));
        Ok(out)
    }
}

/// Maximize the penalized weight objective with L-BFGS from uniform weights.
pub fn lbfgs_weights(data: &WeightData, opts: &MLEOptions) -> MixtureResult<Array1<f64>> {
    let k = data.lik.ncols();
    if k == 1 {
        return Ok(Array1::ones(1));
    }
    let outcome = maximize(&WeightObjective, Array1::zeros(k), data, opts)?;
    Ok(safe_softmax(outcome.theta_hat.view()))
}

/// MAP-EM fixed point for the weights, started from uniform weights.
pub fn em_weights(data: &WeightData) -> MixtureResult<Array1<f64>> {
    let (n, k) = data.lik.dim();
    let mut pi = Array1::from_elem(k, 1.0 / k as f64);
    let denom = n as f64 + data.prior_excess.sum();
    for _ in 0..EM_MAX_ITER {
        let f = data.lik.dot(&pi);
        if let Some((effect, _)) = f.iter().enumerate().find(|(_, v)| **v <= 0.0) {
            return Err(MixtureError::ZeroLikelihood { effect });
        }
        let counts = data.lik.t().dot(&f.mapv(|v| 1.0 / v)) * &pi;
        let next = (counts + &data.prior_excess).mapv(|v| v.max(0.0) / denom);
        let change = (&next - &pi).fold(0.0_f64, |m, d| m.max(d.abs()));
        pi = next;
        if change < EM_TOL {
            break;
        }
    }
    let total = pi.sum();
    Ok(pi / total)
}

/// L-BFGS weights, falling back to EM if the optimizer errors.
pub fn estimate_weights(data: &WeightData, opts: &MLEOptions) -> MixtureResult<Array1<f64>> {
    match lbfgs_weights(data, opts) {
        Ok(pi) => Ok(pi),
        Err(MixtureError::Optimization(err)) => {
            tracing::warn!(error = %err, "L-BFGS weight estimation failed; using EM updates");
            em_weights(data)
        }
        Err(err) => Err(err),
    }
}
