//! utils — conversion helpers for the Python bindings.
//!
//! Everything here is compiled only with the `python-bindings` feature and
//! performs input coercion: array-likes to owned `Array2<f64>`, those arrays
//! to [`MashData`], and keyword arguments to option structs. Validation is
//! left to the Rust constructors; their errors reach Python as `ValueError`
//! through the `From<…> for PyErr` impls in each `errors` module.
#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    data::MashData,
    mixture::{FitterOptions, Grid},
    nullcor::{NullCorOptions, PriorScheme, SimpleOptions},
    optimization::loglik_optimizer::MLEOptions,
};

/// Copy a 2-D `float64` array-like into an owned `Array2<f64>`.
///
/// Accepts a numpy array (any memory layout), an object with a
/// `to_numpy()` method such as a pandas DataFrame, or a nested sequence of
/// floats with rows of equal length.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw.call_method0("to_numpy") {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(frame_ro.as_array().to_owned());
        }
    }

    let rows: Vec<Vec<f64>> = raw.extract().map_err(|_| {
        PyTypeError::new_err(
            "expected a 2-D numpy.ndarray, pandas.DataFrame, or nested sequence of float64",
        )
    })?;
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(PyTypeError::new_err("rows of a nested sequence must have equal length"));
    }
    let nrows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| PyTypeError::new_err(format!("could not build a matrix: {e}")))
}

/// Build validated [`MashData`] from Python `bhat` and `shat` under the
/// `alpha` standard-error model.
#[cfg(feature = "python-bindings")]
pub fn build_mash_data<'py>(
    bhat: &Bound<'py, PyAny>, shat: &Bound<'py, PyAny>, alpha: f64,
) -> PyResult<MashData> {
    let bhat = extract_f64_matrix(bhat)?;
    let shat = extract_f64_matrix(shat)?;
    Ok(MashData::with_alpha(bhat, shat, alpha)?)
}

/// Assemble [`NullCorOptions`] and the [`FitterOptions`] of the reference
/// fitter from Python keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn extract_nullcor_opts(
    z_thresh: f64, est_cor: bool, max_iter: usize, tol: f64, track_fit: bool, prior: &str,
    grid_mult: f64, use_point_mass: bool,
) -> PyResult<(NullCorOptions, FitterOptions)> {
    use std::str::FromStr;

    let simple = SimpleOptions::new(z_thresh, est_cor)?;
    let prior = PriorScheme::from_str(prior)?;
    let opts = NullCorOptions::new(max_iter, tol, est_cor, track_fit, prior, simple)?;
    let fitter =
        FitterOptions::new(Grid::Auto { mult: grid_mult }, true, use_point_mass, MLEOptions::default())?;
    Ok((opts, fitter))
}

/// Hand an owned matrix to Python as a new numpy array.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn array2_to_py<'py>(py: Python<'py>, a: Array2<f64>) -> Bound<'py, PyArray2<f64>> {
    a.into_pyarray(py)
}
