//! Errors for the mixture-model layer (covariance lists, grids, Gaussian
//! kernels, weight estimation).
//!
//! Optimizer failures arrive as [`OptError`] and are wrapped rather than
//! flattened, so callers can still distinguish "bad input" from "solver did
//! not cooperate".
use crate::{data::errors::DataError, optimization::errors::OptError};

/// Result alias for mixture operations that may produce [`MixtureError`].
pub type MixtureResult<T> = Result<T, MixtureError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MixtureError {
    // ---- Covariance list ----
    /// At least one candidate covariance is required.
    EmptyCovList,

    /// Candidate is not square.
    CovNotSquare { name: String, shape: (usize, usize) },

    /// Candidate dimension differs from the rest of the list or the data.
    CovDimMismatch { name: String, expected: usize, found: usize },

    /// Candidate contains NaN/±inf or is not symmetric.
    InvalidCov { name: String, reason: &'static str },

    // ---- Grid ----
    /// Grid multiplier must be finite and either 0 or > 1.
    InvalidGridMult { mult: f64 },

    /// Fixed grid values must be finite and ≥ 0.
    InvalidGridValue { index: usize, value: f64 },

    /// A grid must contain at least one value.
    EmptyGrid,

    // ---- Kernels ----
    /// `Σ_j + U_c` is not positive definite for some effect and component.
    NotPositiveDefinite { effect: usize, component: usize },

    /// The residual matrix passed to the fitter has the wrong dimension.
    ResidualShapeMismatch { expected: usize, found: (usize, usize) },

    /// Every component has zero likelihood for this effect.
    ZeroLikelihood { effect: usize },

    // ---- Fitted model ----
    /// Fitted weights, moments and log-likelihood disagree in shape or value.
    InvalidFittedModel { reason: &'static str },

    // ---- Wrapped ----
    /// Invalid data supplied to the fitter.
    Data(DataError),

    /// Weight estimation failed inside the optimizer.
    Optimization(OptError),
}

impl std::error::Error for MixtureError {}

impl std::fmt::Display for MixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Covariance list ----
            MixtureError::EmptyCovList => write!(f, "Covariance list is empty"),
            MixtureError::CovNotSquare { name, shape } => {
                write!(f, "Covariance '{name}' is {}x{}; must be square", shape.0, shape.1)
            }
            MixtureError::CovDimMismatch { name, expected, found } => {
                write!(f, "Covariance '{name}' has dimension {found}; expected {expected}")
            }
            MixtureError::InvalidCov { name, reason } => {
                write!(f, "Invalid covariance '{name}': {reason}")
            }

            // ---- Grid ----
            MixtureError::InvalidGridMult { mult } => {
                write!(f, "Invalid grid multiplier {mult}: must be 0 or finite and > 1")
            }
            MixtureError::InvalidGridValue { index, value } => {
                write!(f, "Invalid grid value at index {index}: {value}; must be finite and >= 0")
            }
            MixtureError::EmptyGrid => write!(f, "Grid must contain at least one value"),

            // ---- Kernels ----
            MixtureError::NotPositiveDefinite { effect, component } => write!(
                f,
                "Marginal covariance for effect {effect}, component {component} is not positive definite"
            ),
            MixtureError::ResidualShapeMismatch { expected, found } => write!(
                f,
                "Residual matrix must be {expected}x{expected}; got {}x{}",
                found.0, found.1
            ),
            MixtureError::ZeroLikelihood { effect } => {
                write!(f, "All mixture components have zero likelihood for effect {effect}")
            }

            // ---- Fitted model ----
            MixtureError::InvalidFittedModel { reason } => {
                write!(f, "Invalid fitted mixture: {reason}")
            }

            // ---- Wrapped ----
            MixtureError::Data(e) => write!(f, "Data error: {e}"),
            MixtureError::Optimization(e) => write!(f, "Weight estimation failed: {e}"),
        }
    }
}

impl From<DataError> for MixtureError {
    fn from(err: DataError) -> Self {
        MixtureError::Data(err)
    }
}

impl From<OptError> for MixtureError {
    fn from(err: OptError) -> Self {
        MixtureError::Optimization(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<MixtureError> for pyo3::PyErr {
    fn from(err: MixtureError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
