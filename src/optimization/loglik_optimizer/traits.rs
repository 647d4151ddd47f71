//! User-facing contract and configuration for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: the objective a model implements.
//! - [`Tolerances`], [`LineSearcher`], [`MLEOptions`]: validated settings.
//! - [`OptimOutcome`]: normalized solver result.
//!
//! The objective is always expressed as a log-likelihood `ℓ(θ)` to be
//! maximized; the argmin adapter turns it into the cost `c(θ) = -ℓ(θ)`.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Objective interface for [`maximize`](crate::optimization::loglik_optimizer::maximize).
///
/// `value` returns `ℓ(θ)`; `check` is called once on the starting point;
/// `grad`, when implemented, returns `∇ℓ(θ)` (not the cost gradient).
/// Objectives that leave `grad` at its default get finite differences.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside L-BFGS. Parses case-insensitively from
/// `"MoreThuente"` / `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Stopping rules. At least one must be set; set values must be valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Stop when `‖∇c‖` drops below this.
    pub tol_grad: Option<f64>,
    /// Stop when the change in cost drops below this.
    pub tol_cost: Option<f64>,
    /// Hard iteration cap.
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Validated constructor.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if every field is `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] for `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Solver configuration handed to `maximize`.
///
/// Defaults: `tol_grad = 1e-6`, `tol_cost = 1e-10`, `max_iter = 500`,
/// More–Thuente line search, quiet, default L-BFGS memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    /// Attach the slog observer (requires the `obs_slog` feature).
    pub verbose: bool,
    /// L-BFGS history length; `None` uses [`DEFAULT_LBFGS_MEM`](super::types::DEFAULT_LBFGS_MEM).
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] when `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: Some(1e-10), max_iter: Some(500) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Result of a `maximize` run, reported on the log-likelihood scale.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    /// Best parameter vector found.
    pub theta_hat: Theta,
    /// `ℓ(θ̂)`, not the cost.
    pub value: f64,
    /// Whether argmin reported any termination reason.
    pub converged: bool,
    /// Termination reason as text.
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    /// Norm of the last gradient, when the solver kept one.
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Assemble an outcome from raw solver state, validating the estimate
    /// and the objective value.
    pub fn new(
        theta_hat: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `Tolerances::new` requires at least one stopping rule and rejects a
    // zero iteration cap.
    //
    // Given
    // -----
    // - All `None`; `max_iter = Some(0)`; a valid mix.
    //
    // Expect
    // ------
    // - `NoTolerancesProvided`, `InvalidMaxIter`, `Ok`.
    fn tolerances_new_enforces_stopping_rules() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(Some(1e-6), None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        assert!(Tolerances::new(None, Some(1e-9), Some(10)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively and unknown names fail.
    //
    // Given
    // -----
    // - `"hagerzhang"`, `"MORETHUENTE"`, `"backtracking"`.
    //
    // Expect
    // ------
    // - Two successes and an `InvalidLineSearch`.
    fn line_searcher_parses_case_insensitively() {
        assert_eq!("hagerzhang".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert_eq!("MORETHUENTE".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert!(matches!(
            "backtracking".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `MLEOptions::new` rejects an empty L-BFGS history.
    //
    // Given
    // -----
    // - `lbfgs_mem = Some(0)`.
    //
    // Expect
    // ------
    // - `InvalidLBFGSMem`.
    fn mle_options_reject_zero_memory() {
        let tols = Tolerances::new(Some(1e-6), None, Some(50)).unwrap();
        assert!(matches!(
            MLEOptions::new(tols, LineSearcher::HagerZhang, false, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `OptimOutcome::new` maps `NotTerminated` to `converged = false` and
    // records the gradient norm.
    //
    // Given
    // -----
    // - A finite estimate, finite value, `NotTerminated`, gradient `[3, 4]`.
    //
    // Expect
    // ------
    // - `converged == false`, `grad_norm == Some(5)`.
    fn optim_outcome_records_status_and_grad_norm() {
        let out = OptimOutcome::new(
            Some(array![0.5, -0.5]),
            -12.0,
            TerminationStatus::NotTerminated,
            4,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .unwrap();

        assert!(!out.converged);
        assert_eq!(out.iterations, 4);
        assert_eq!(out.grad_norm, Some(5.0));
    }
}
