//! Entry point for maximizing a [`LogLikelihood`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `f` over `θ` starting at `theta0`.
///
/// `f.check` runs once on the starting point before any solver state is
/// built, so malformed inputs fail fast with the objective's own error.
/// The line search named in `opts` picks the L-BFGS flavor.
///
/// # Errors
/// Any [`OptError`](crate::optimization::errors::OptError) raised by the
/// objective, the option validation, or the argmin backend.
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            run_lbfgs(theta0, opts, problem, build_optimizer_more_thuente(opts)?)
        }
        LineSearcher::HagerZhang => {
            run_lbfgs(theta0, opts, problem, build_optimizer_hager_zhang(opts)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        loglik_optimizer::{Grad, Tolerances},
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // ℓ(θ) = -(θ₀ - 1)² - 2(θ₁ + 0.5)², maximized at (1, -0.5) with ℓ = 0.
    struct Bowl;

    impl LogLikelihood for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            Ok(-(theta[0] - 1.0).powi(2) - 2.0 * (theta[1] + 0.5).powi(2))
        }

        fn check(&self, theta: &Theta, _: &()) -> OptResult<()> {
            if theta.len() != 2 {
                return Err(OptError::ThetaLengthMismatch { expected: 2, actual: theta.len() });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            Ok(array![-2.0 * (theta[0] - 1.0), -4.0 * (theta[1] + 0.5)])
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches locate the maximizer of a separable concave bowl.
    //
    // Given
    // -----
    // - `Bowl` started at (0, 0) with default options and with Hager–Zhang.
    //
    // Expect
    // ------
    // - θ̂ ≈ (1, -0.5) and ℓ(θ̂) ≈ 0.
    fn maximize_finds_bowl_optimum_with_either_line_search() {
        let mut opts = MLEOptions::default();
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            opts.line_searcher = ls;
            let out = maximize(&Bowl, array![0.0, 0.0], &(), &opts).unwrap();

            assert_relative_eq!(out.theta_hat[0], 1.0, epsilon = 1e-4);
            assert_relative_eq!(out.theta_hat[1], -0.5, epsilon = 1e-4);
            assert_relative_eq!(out.value, 0.0, epsilon = 1e-7);
        }
    }

    #[test]
    // Purpose
    // -------
    // `check` failures surface before the solver runs.
    //
    // Given
    // -----
    // - A length-3 starting point for a 2-parameter objective.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch { expected: 2, actual: 3 }`.
    fn maximize_propagates_check_errors() {
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).unwrap();
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, false, None).unwrap();

        let err = maximize(&Bowl, array![0.0, 0.0, 0.0], &(), &opts).unwrap_err();

        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 2, actual: 3 });
    }
}
