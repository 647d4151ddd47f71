//! Errors raised while constructing or modifying [`MashData`](super::MashData).
//!
//! ## Conventions
//! - **Indices are 0-based** `(row, column)` pairs into the n×R inputs.
//! - Standard errors must be **strictly positive and finite**; effect
//!   estimates must be finite.
//! - Converts to a Python `ValueError` when the `python-bindings` feature is
//!   enabled.

/// Result alias for data-construction paths that may produce [`DataError`].
pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    // ---- Shape ----
    /// `Bhat` has no rows or no columns.
    EmptyData { rows: usize, cols: usize },

    /// `Bhat` and `Shat` disagree in shape.
    ShapeMismatch { bhat: (usize, usize), shat: (usize, usize) },

    // ---- Values ----
    /// An effect estimate is NaN/±inf.
    NonFiniteBhat { row: usize, col: usize, value: f64 },

    /// A standard error is NaN/±inf.
    NonFiniteShat { row: usize, col: usize, value: f64 },

    /// A standard error is ≤ 0.
    NonPositiveShat { row: usize, col: usize, value: f64 },

    /// The standard-error exponent must be finite.
    InvalidAlpha { alpha: f64 },

    // ---- Residual matrix ----
    /// `V` must be R×R.
    VShapeMismatch { expected: usize, found: (usize, usize) },

    /// `V` must be finite and symmetric.
    InvalidV { row: usize, col: usize, reason: &'static str },

    // ---- Contrast ----
    /// A contrast matrix needs one column per condition.
    ContrastShapeMismatch { expected_cols: usize, found: (usize, usize) },
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::EmptyData { rows, cols } => {
                write!(f, "Data must be non-empty; got {rows}x{cols}")
            }
            DataError::ShapeMismatch { bhat, shat } => write!(
                f,
                "Bhat is {}x{} but Shat is {}x{}; shapes must match",
                bhat.0, bhat.1, shat.0, shat.1
            ),
            DataError::NonFiniteBhat { row, col, value } => {
                write!(f, "Bhat[{row}, {col}] = {value}; effect estimates must be finite")
            }
            DataError::NonFiniteShat { row, col, value } => {
                write!(f, "Shat[{row}, {col}] = {value}; standard errors must be finite")
            }
            DataError::NonPositiveShat { row, col, value } => {
                write!(f, "Shat[{row}, {col}] = {value}; standard errors must be > 0")
            }
            DataError::InvalidAlpha { alpha } => write!(f, "Invalid alpha {alpha}: must be finite"),
            DataError::VShapeMismatch { expected, found } => write!(
                f,
                "V must be {expected}x{expected}; got {}x{}",
                found.0, found.1
            ),
            DataError::InvalidV { row, col, reason } => {
                write!(f, "Invalid V at [{row}, {col}]: {reason}")
            }
            DataError::ContrastShapeMismatch { expected_cols, found } => write!(
                f,
                "Contrast matrix must have {expected_cols} columns; got {}x{}",
                found.0, found.1
            ),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<DataError> for pyo3::PyErr {
    fn from(err: DataError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
