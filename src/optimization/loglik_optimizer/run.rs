//! Executor wiring shared by every L-BFGS flavor.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, IterState, Solver, State};

/// Run `solver` from `theta0` and normalize the final state into an
/// [`OptimOutcome`] on the log-likelihood scale.
///
/// The executor gets `opts.tols.max_iter` as its cap; with the `obs_slog`
/// feature and `opts.verbose` the argmin terminal observer is attached.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    let ll0 = -problem.cost(&theta0)?;
    tracing::trace!(loglik = ll0, dim = theta0.len(), "starting L-BFGS");

    let mut executor = Executor::new(problem, solver).configure(|state| state.param(theta0));
    if let Some(max_iter) = opts.tols.max_iter {
        executor = executor.configure(|state| state.max_iters(max_iter as u64));
    }
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut state = executor.run()?.state().clone();
    let iterations = state.get_iter();
    let fn_evals = state.get_func_counts().clone();
    let termination = state.get_termination_status().clone();
    let grad = state.take_gradient();
    let outcome = OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        termination,
        iterations,
        fn_evals,
        grad,
    )?;
    tracing::trace!(
        loglik = outcome.value,
        iterations = outcome.iterations,
        status = %outcome.status,
        "L-BFGS finished"
    );
    Ok(outcome)
}
