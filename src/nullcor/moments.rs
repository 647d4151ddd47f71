//! Residual-matrix update from posterior moments.
//!
//! Under `z_j = μ_j + e_j`, `e_j ~ N(0, V)`, with `μ_j` the true effect on
//! the z-scale, the expected complete-data log-likelihood is maximized by
//!
//! ```text
//! V = (1/n) Σ_j E[(z_j − μ_j)(z_j − μ_j)ᵀ]
//!   = (ZᵀZ − (MᵀZ + ZᵀM) + Σ_j (C̃_j + m_j m_jᵀ)) / n
//! ```
//!
//! where `m_j` and `C̃_j` are the posterior mean and covariance of `μ_j`,
//! obtained from the fitted model by dividing by the original standard
//! errors `S_j = shat_j · shat_alpha_j` (rows and columns for `C̃_j`).
use crate::{
    data::MashData,
    mixture::FittedMixture,
    nullcor::errors::{NullCorError, NullCorResult},
};
use ndarray::{Array2, Axis, Zip};

/// M-step update of `V` given a model fitted at the current `V`.
///
/// The output is symmetric whenever the posterior covariances are.
///
/// # Errors
/// [`NullCorError::ModelShapeMismatch`] when the model's posterior means are
/// not n×R for the data's n effects and R conditions.
pub fn e_v(data: &MashData, model: &FittedMixture) -> NullCorResult<Array2<f64>> {
    let (n, r) = data.bhat().dim();
    let means = model.posterior_means();
    if means.dim() != (n, r) {
        return Err(NullCorError::ModelShapeMismatch { expected: (n, r), found: means.dim() });
    }

    let z = data.z_scores();
    let s = data.effective_shat();
    let m = means / &s;

    let t1 = z.t().dot(&z);
    let a = m.t().dot(&z);
    let t2 = &a + &a.t();

    let mut t3 = m.t().dot(&m);
    for (j, c) in model.posterior_covariances().axis_iter(Axis(0)).enumerate() {
        let s_j = s.row(j);
        Zip::indexed(&mut t3).and(&c).for_each(|(p, q), acc, &c_pq| {
            *acc += c_pq / (s_j[p] * s_j[q]);
        });
    }

    Ok((t1 - t2 + t3) / n as f64)
}
