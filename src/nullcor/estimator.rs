//! Iterative maximum-likelihood null correlation.
//!
//! Purpose
//! -------
//! Alternate between fitting the mixture model at the current residual
//! matrix `V` and replacing `V` by its closed-form M-step update
//! ([`e_v`]), scoring every fit by its prior-penalized log-likelihood.
//!
//! Key behaviors
//! -------------
//! - Initialization: a supplied matrix is validated and used as is;
//!   otherwise the simple estimator seeds the loop, and if it fails the
//!   identity is used. The fallback is logged and recorded in
//!   [`InitSource::IdentityFallback`].
//! - Iteration `k` (1-based) optionally snapshots the current `(V, model)`,
//!   computes `V' = e_v(data, model)` (normalized to a correlation when
//!   `est_cor`), refits, and stops as soon as `L_k − L_{k−1} ≤ tol`. A
//!   decrease therefore also stops the loop.
//! - Exhausting `max_iter` is a normal outcome reported as
//!   [`Termination::IterationBudgetExhausted`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `loglik.len() == niter`, where `niter` counts fits: the initial fit
//!   plus one per loop iteration, so `niter ≤ max_iter + 1`.
//! - Every recorded step before the last has `Δ > tol`.
//! - When tracked, `trace.len() == niter − 1` and entry `k − 1` holds the
//!   `(V, model)` pair in force at the start of iteration `k`.
//! - Data carrying a contrast matrix are rejected up front.
//!
//! Conventions
//! -----------
//! - Logging goes through `tracing`: `warn` for the identity fallback,
//!   `debug` per iteration, `info` on termination.
use crate::{
    data::{DataResult, MashData, validate_residual},
    mixture::{CovList, FittedMixture, MixtureFitter},
    nullcor::{
        errors::{NullCorError, NullCorResult},
        moments::e_v,
        options::{NullCorOptions, SimpleOptions},
        penalty::{PriorScheme, penalty},
        simple::{cov_to_cor, estimate_null_correlation_simple},
    },
};
use ndarray::Array2;
use tracing::{debug, info, warn};

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An iteration improved the penalized log-likelihood by at most `tol`.
    Converged,
    /// `max_iter` iterations ran without meeting the tolerance.
    IterationBudgetExhausted,
}

/// Where the starting matrix came from.
#[derive(Debug, Clone, PartialEq)]
pub enum InitSource {
    /// Caller supplied `init`.
    Supplied,
    /// The simple estimator succeeded.
    Simple,
    /// The simple estimator failed with `reason`; the identity was used.
    IdentityFallback { reason: NullCorError },
}

/// Pre-update snapshot of one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub v: Array2<f64>,
    pub model: FittedMixture,
}

/// Output of [`estimate_null_correlation`].
#[derive(Debug, Clone, PartialEq)]
pub struct NullCorEstimate {
    /// Final residual matrix.
    pub v: Array2<f64>,
    /// Model fitted at `v`.
    pub model: FittedMixture,
    /// Penalized log-likelihood of every fit, initial fit first.
    pub loglik: Vec<f64>,
    /// Number of fits performed (`loglik.len()`).
    pub niter: usize,
    /// Per-iteration snapshots when `track_fit` was requested.
    pub trace: Option<Vec<TraceEntry>>,
    pub termination: Termination,
    pub init_source: InitSource,
}

impl NullCorEstimate {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    pub fn used_identity_fallback(&self) -> bool {
        matches!(self.init_source, InitSource::IdentityFallback { .. })
    }

    /// Install the estimated `V` into `data`.
    pub fn update_data(&self, data: MashData) -> DataResult<MashData> {
        data.with_v(self.v.clone())
    }
}

/// Estimate the null correlation by alternating mixture fits and M-step
/// updates of `V`.
///
/// # Errors
/// - [`NullCorError::UnsupportedDataShape`] for contrast data.
/// - [`NullCorError::InvalidMaxIter`] / [`NullCorError::InvalidTol`] for
///   invalid options.
/// - [`NullCorError::InvalidInit`] for a malformed `init`.
/// - [`NullCorError::Fit`] when the fitter fails; moment, penalty and
///   normalization errors propagate unchanged.
pub fn estimate_null_correlation<F: MixtureFitter>(
    data: &MashData, ulist: &CovList, fitter: &F, init: Option<Array2<f64>>,
    opts: &NullCorOptions,
) -> NullCorResult<NullCorEstimate> {
    if data.is_contrast() {
        return Err(NullCorError::UnsupportedDataShape);
    }
    if opts.max_iter == 0 {
        return Err(NullCorError::InvalidMaxIter { max_iter: opts.max_iter });
    }
    if !opts.tol.is_finite() {
        return Err(NullCorError::InvalidTol { tol: opts.tol });
    }

    let (mut v, init_source) = initial_v(data, init, opts)?;
    let mut model = fitter.fit(data, ulist, &v, opts.prior)?;
    let mut loglik = vec![penalized_loglik(&model, opts.prior)?];
    let mut trace = opts.track_fit.then(Vec::new);
    let mut termination = Termination::IterationBudgetExhausted;

    for iteration in 1..=opts.max_iter {
        if let Some(trace) = trace.as_mut() {
            trace.push(TraceEntry { v: v.clone(), model: model.clone() });
        }
        let mut v_next = e_v(data, &model)?;
        if opts.est_cor {
            v_next = cov_to_cor(&v_next)?;
        }
        model = fitter.fit(data, ulist, &v_next, opts.prior)?;
        v = v_next;

        let current = penalized_loglik(&model, opts.prior)?;
        let delta = current - loglik[loglik.len() - 1];
        loglik.push(current);
        debug!(iteration, loglik = current, delta, "null correlation update");

        if delta <= opts.tol {
            termination = Termination::Converged;
            break;
        }
    }

    let niter = loglik.len();
    info!(
        niter,
        ?termination,
        loglik = loglik[niter - 1],
        "null correlation estimation finished"
    );
    Ok(NullCorEstimate { v, model, loglik, niter, trace, termination, init_source })
}

fn initial_v(
    data: &MashData, init: Option<Array2<f64>>, opts: &NullCorOptions,
) -> NullCorResult<(Array2<f64>, InitSource)> {
    if let Some(v) = init {
        validate_residual(&v, data.n_conditions()).map_err(NullCorError::InvalidInit)?;
        return Ok((v, InitSource::Supplied));
    }
    let simple = SimpleOptions { est_cor: opts.est_cor, ..opts.simple };
    match estimate_null_correlation_simple(data, &simple) {
        Ok(v) => Ok((v, InitSource::Simple)),
        Err(reason) => {
            warn!(
                error = %reason,
                "simple null correlation failed; starting from the identity matrix"
            );
            Ok((Array2::eye(data.n_conditions()), InitSource::IdentityFallback { reason }))
        }
    }
}

fn penalized_loglik(model: &FittedMixture, prior: PriorScheme) -> NullCorResult<f64> {
    let pi = model.mixture_weights();
    Ok(model.loglikelihood() + penalty(&prior.prior_vector(pi.len()), pi)?)
}
