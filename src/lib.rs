//! mash_nullcor — null correlation estimation for multivariate adaptive
//! shrinkage, with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the null-correlation estimators to Python via the `_mash_nullcor`
//! extension module. Effects measured in several conditions share
//! measurement noise whose correlation `V` must be estimated before a mash
//! mixture fit; this crate provides both the quick heuristic and the
//! maximum-likelihood estimator.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules (`data`, `mixture`, `nullcor`,
//!   `optimization`) as the public crate surface.
//! - Under the `python-bindings` feature, define the `nullcor` Python
//!   submodule with the `estimate_null_correlation_simple` function and the
//!   `NullCorrelation` class.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue and error mapping.
//! - Python callers always get the reference fitter ([`MashFitter`]) with the
//!   canonical covariance list for the data's number of conditions.
//!
//! Conventions
//! -----------
//! - Matrices cross the boundary as 2-D `float64` numpy arrays, effects in
//!   rows and conditions in columns.
//! - Errors from core Rust code convert to `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should build a [`MashData`], pick a [`CovList`] and a
//!   [`MixtureFitter`], and call [`estimate_null_correlation`] directly.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` runs the full pipeline on
//!   simulated data with the reference fitter.

pub mod data;
pub mod mixture;
pub mod nullcor;
pub mod optimization;
pub mod utils;

pub use crate::{
    data::{DataError, MashData},
    mixture::{CovList, FittedMixture, FitterOptions, Grid, MashFitter, MixtureError, MixtureFitter},
    nullcor::{
        InitSource, NullCorError, NullCorEstimate, NullCorOptions, PriorScheme, SimpleOptions,
        Termination, estimate_null_correlation, estimate_null_correlation_simple,
    },
};

#[cfg(feature = "python-bindings")]
use numpy::PyArray2;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::utils::{array2_to_py, build_mash_data, extract_f64_matrix, extract_nullcor_opts};

/// Heuristic null correlation from effects with every |z| below `z_thresh`.
///
/// Parameters
/// ----------
/// - `bhat`, `shat`: n×R array-likes of estimates and standard errors.
/// - `z_thresh`: strict threshold on `max_r |z_jr|`; defaults to `2.0`.
/// - `est_cor`: return a correlation rather than a covariance.
/// - `alpha`: EZ-model exponent applied to `shat` before computing z.
///
/// Returns
/// -------
/// R×R `numpy.ndarray`.
///
/// Errors
/// ------
/// `ValueError` for invalid data or when fewer than `max(R, 2)` effects
/// qualify.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    name = "estimate_null_correlation_simple",
    text_signature = "(bhat, shat, /, z_thresh=2.0, est_cor=True, alpha=0.0)",
    signature = (bhat, shat, z_thresh = 2.0, est_cor = true, alpha = 0.0)
)]
pub fn py_estimate_null_correlation_simple<'py>(
    py: Python<'py>, bhat: &Bound<'py, PyAny>, shat: &Bound<'py, PyAny>, z_thresh: f64,
    est_cor: bool, alpha: f64,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let data = build_mash_data(bhat, shat, alpha)?;
    let opts = SimpleOptions::new(z_thresh, est_cor)?;
    let v = estimate_null_correlation_simple(&data, &opts)?;
    Ok(array2_to_py(py, v))
}

/// NullCorrelation — Python-facing wrapper for the iterative estimator.
///
/// Purpose
/// -------
/// Run [`estimate_null_correlation`] with the reference [`MashFitter`] on
/// the canonical covariance list and expose the result as read-only
/// properties.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `NullCorrelation(bhat, shat, init=None, z_thresh=2.0, est_cor=True,
/// max_iter=30, tol=1.0, prior="nullbiased", alpha=0.0, grid_mult=√2,
/// use_point_mass=True)`:
/// - `init`: optional R×R starting matrix; when omitted the simple estimate
///   is used, falling back to the identity if it fails.
/// - `prior`: `"nullbiased"` or `"uniform"`.
/// - remaining arguments map one-to-one onto [`NullCorOptions`] and
///   [`FitterOptions`].
///
/// Notes
/// -----
/// - Per-iteration tracing is not exposed to Python.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "mash_nullcor.nullcor")]
pub struct NullCorrelation {
    inner: NullCorEstimate,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl NullCorrelation {
    #[new]
    #[pyo3(
        text_signature = "(bhat, shat, /, init=None, z_thresh=2.0, est_cor=True, max_iter=30, \
                          tol=1.0, prior=\"nullbiased\", alpha=0.0, grid_mult=1.4142135623730951, \
                          use_point_mass=True)",
        signature = (
            bhat, shat, init = None, z_thresh = 2.0, est_cor = true, max_iter = 30, tol = 1.0,
            prior = "nullbiased", alpha = 0.0, grid_mult = std::f64::consts::SQRT_2,
            use_point_mass = true
        )
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new<'py>(
        bhat: &Bound<'py, PyAny>, shat: &Bound<'py, PyAny>, init: Option<&Bound<'py, PyAny>>,
        z_thresh: f64, est_cor: bool, max_iter: usize, tol: f64, prior: &str, alpha: f64,
        grid_mult: f64, use_point_mass: bool,
    ) -> PyResult<NullCorrelation> {
        let data = build_mash_data(bhat, shat, alpha)?;
        let (opts, fitter_opts) = extract_nullcor_opts(
            z_thresh, est_cor, max_iter, tol, false, prior, grid_mult, use_point_mass,
        )?;
        let init = init.map(extract_f64_matrix).transpose()?;
        let ulist = CovList::canonical(data.n_conditions())?;
        let fitter = MashFitter::new(fitter_opts);
        let inner = estimate_null_correlation(&data, &ulist, &fitter, init, &opts)?;
        Ok(NullCorrelation { inner })
    }

    /// Estimated residual matrix `V`.
    #[getter]
    pub fn v<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        array2_to_py(py, self.inner.v.clone())
    }

    /// Penalized log-likelihood of every fit, initial fit first.
    #[getter]
    pub fn loglik(&self) -> Vec<f64> {
        self.inner.loglik.clone()
    }

    #[getter]
    pub fn niter(&self) -> usize {
        self.inner.niter
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged()
    }

    /// `True` when the simple initializer failed and the identity was used.
    #[getter]
    pub fn init_fallback(&self) -> bool {
        self.inner.used_identity_fallback()
    }

    #[getter]
    pub fn mixture_weights(&self) -> Vec<f64> {
        self.inner.model.mixture_weights().to_vec()
    }

    #[getter]
    pub fn component_names(&self) -> Vec<String> {
        self.inner.model.component_names().to_vec()
    }

    /// Log-likelihood of the final mixture fit, without the prior penalty.
    #[getter]
    pub fn fit_loglik(&self) -> f64 {
        self.inner.model.loglikelihood()
    }
}

/// _mash_nullcor — PyO3 module initializer for the Python extension.
///
/// Creates the `nullcor` submodule, attaches it to `_mash_nullcor`, and
/// registers it in `sys.modules` so `import mash_nullcor.nullcor` works.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _mash_nullcor<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let nullcor_mod = PyModule::new(_py, "nullcor")?;
    nullcor_submodule(_py, m, &nullcor_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("mash_nullcor.nullcor", nullcor_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn nullcor_submodule<'py>(
    _py: Python, mash_nullcor: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_estimate_null_correlation_simple, m)?)?;
    m.add_class::<NullCorrelation>()?;
    mash_nullcor.add_submodule(m)?;
    Ok(())
}
