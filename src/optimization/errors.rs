//! Error surface for the log-likelihood optimizer.
//!
//! [`OptError`] collects configuration mistakes (tolerances, iteration caps,
//! line-search names), numerical failures raised while evaluating a
//! log-likelihood or its gradient, and normalized `argmin` backend errors.
//! Mixture-level code converts it into its own error type at the boundary,
//! so callers of the estimators never see `argmin` types.
use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// No analytic gradient; the adapter falls back to finite differences.
    GradientNotImplemented,

    /// Gradient length differs from the parameter length.
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient entries must be finite.
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- MLEOptions ----
    /// Gradient tolerance must be positive and finite.
    InvalidTolGrad { tol: f64, reason: &'static str },

    /// Cost-change tolerance must be positive and finite.
    InvalidTolCost { tol: f64, reason: &'static str },

    /// Iteration cap must be positive.
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// At least one stopping rule is required.
    NoTolerancesProvided,

    /// Unknown line-search name.
    InvalidLineSearch { name: String, reason: &'static str },

    /// L-BFGS history must hold at least one pair.
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Objective ----
    /// Log-likelihood evaluated to NaN or ±∞.
    NonFiniteCost { value: f64 },

    /// Parameter vector has the wrong length for the objective.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// Parameter entries must be finite.
    InvalidThetaInput { index: usize, value: f64 },

    /// Objective was handed data it cannot evaluate.
    InvalidObjectiveData { reason: &'static str },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    /// Solver finished without a best parameter.
    MissingThetaHat,

    // ---- Argmin ----
    InvalidParameter { text: String },
    NotImplemented { text: String },
    NotInitialized { text: String },
    ConditionViolated { text: String },
    CheckPointNotFound { text: String },
    PotentialBug { text: String },
    ImpossibleError { text: String },
    /// Any other backend error, carried as text.
    BackendError { text: String },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => write!(f, "Analytic gradient not implemented"),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- MLEOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => write!(f, "No stopping rule provided"),
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }

            // ---- Objective ----
            OptError::NonFiniteCost { value } => write!(f, "Non-finite objective value: {value}"),
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Parameter length mismatch: expected {expected}, got {actual}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Parameter at index {index} is {value}; must be finite")
            }
            OptError::InvalidObjectiveData { reason } => {
                write!(f, "Objective data rejected: {reason}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => write!(f, "Solver returned no best parameter"),

            // ---- Argmin ----
            OptError::InvalidParameter { text } => write!(f, "Invalid parameter: {text}"),
            OptError::NotImplemented { text } => write!(f, "Not implemented: {text}"),
            OptError::NotInitialized { text } => write!(f, "Not initialized: {text}"),
            OptError::ConditionViolated { text } => write!(f, "Condition violated: {text}"),
            OptError::CheckPointNotFound { text } => write!(f, "Checkpoint not found: {text}"),
            OptError::PotentialBug { text } => write!(f, "Potential bug: {text}"),
            OptError::ImpossibleError { text } => write!(f, "Impossible error: {text}"),
            OptError::BackendError { text } => write!(f, "Backend error: {text}"),

            // ---- Fallback ----
            OptError::UnknownError => write!(f, "Unknown optimizer error"),
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Our own errors travel through argmin boxed; unwrap them first.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast::<ArgminError>() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}
