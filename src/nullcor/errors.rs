//! Errors for null-correlation estimation.
//!
//! This module defines [`NullCorError`], covering option validation, the
//! three estimator-level failure modes (too few null-like effects, contrast
//! data, an undefined penalty), shape checks between data and fitted
//! models, and wrapped data / mixture errors.
//!
//! ## Conventions
//! - **Indices are 0-based** (component index for penalties, condition index
//!   for variances).
//! - `InsufficientNullData` is the one recoverable error: the iterative
//!   estimator replaces it with an identity start and records the fallback.
//! - Running out of iterations is a terminal state, never an error.
use crate::{data::errors::DataError, mixture::errors::MixtureError};

/// Result alias for null-correlation operations that may produce [`NullCorError`].
pub type NullCorResult<T> = Result<T, NullCorError>;

#[derive(Debug, Clone, PartialEq)]
pub enum NullCorError {
    // ---- Estimation ----
    /// Fewer null-like effects than conditions.
    InsufficientNullData { found: usize, required: usize },

    /// Contrast-transformed data cannot be used by the iterative estimator.
    UnsupportedDataShape,

    /// A zero weight under a prior entry different from one.
    UndefinedPenalty { index: usize, prior: f64 },

    /// Prior and weight vectors differ in length.
    PenaltyLengthMismatch { prior: usize, weights: usize },

    /// A condition has zero (or non-finite) variance among the selected
    /// effects, so the correlation is undefined.
    DegenerateVariance { index: usize },

    /// Fitted model and data disagree in shape.
    ModelShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    /// A supplied starting matrix is not a valid R×R residual matrix.
    InvalidInit(DataError),

    // ---- Options ----
    /// `z_thresh` must be finite and > 0.
    InvalidZThresh { value: f64 },

    /// `max_iter` must be ≥ 1.
    InvalidMaxIter { max_iter: usize },

    /// `tol` must be finite.
    InvalidTol { tol: f64 },

    /// Unknown prior-scheme name.
    InvalidPriorScheme { name: String },

    // ---- Wrapped ----
    Data(DataError),
    Fit(MixtureError),
}

impl std::error::Error for NullCorError {}

impl std::fmt::Display for NullCorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Estimation ----
            NullCorError::InsufficientNullData { found, required } => write!(
                f,
                "Found {found} null-like effects but at least {required} are needed; \
                 consider raising z_thresh"
            ),
            NullCorError::UnsupportedDataShape => write!(
                f,
                "Null correlation cannot be estimated from contrast-transformed data"
            ),
            NullCorError::UndefinedPenalty { index, prior } => write!(
                f,
                "Penalty undefined: weight {index} is zero under prior value {prior}"
            ),
            NullCorError::PenaltyLengthMismatch { prior, weights } => write!(
                f,
                "Prior has length {prior} but there are {weights} mixture weights"
            ),
            NullCorError::DegenerateVariance { index } => write!(
                f,
                "Condition {index} has zero variance among null-like effects; correlation undefined"
            ),
            NullCorError::ModelShapeMismatch { expected, found } => write!(
                f,
                "Fitted model has posterior means of shape {}x{}; data are {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            NullCorError::InvalidInit(e) => write!(f, "Invalid starting matrix: {e}"),

            // ---- Options ----
            NullCorError::InvalidZThresh { value } => {
                write!(f, "Invalid z threshold {value}: must be finite and > 0")
            }
            NullCorError::InvalidMaxIter { max_iter } => {
                write!(f, "Invalid max_iter {max_iter}: must be at least 1")
            }
            NullCorError::InvalidTol { tol } => write!(f, "Invalid tolerance {tol}: must be finite"),
            NullCorError::InvalidPriorScheme { name } => write!(
                f,
                "Unknown prior scheme '{name}': valid options are 'nullbiased' or 'uniform'"
            ),

            // ---- Wrapped ----
            NullCorError::Data(e) => write!(f, "Data error: {e}"),
            NullCorError::Fit(e) => write!(f, "Mixture fit failed: {e}"),
        }
    }
}

impl From<DataError> for NullCorError {
    fn from(err: DataError) -> Self {
        NullCorError::Data(err)
    }
}

impl From<MixtureError> for NullCorError {
    fn from(err: MixtureError) -> Self {
        NullCorError::Fit(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<NullCorError> for pyo3::PyErr {
    fn from(err: NullCorError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
