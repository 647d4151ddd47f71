//! nullcor — null correlation estimation for multi-condition z-scores.
//!
//! Purpose
//! -------
//! Estimate the residual correlation `V` among conditions that remains
//! after removing true effects, either heuristically from null-like effects
//! or by maximum likelihood through repeated mixture fits.
//!
//! Key behaviors
//! -------------
//! - [`estimate_null_correlation_simple`]: empirical correlation of z-scores
//!   among effects with every |z| below a threshold.
//! - [`estimate_null_correlation`]: EM-style alternation between a
//!   [`MixtureFitter`](crate::mixture::MixtureFitter) and the closed-form
//!   update [`e_v`], tracked by the penalized log-likelihood.
//! - [`PriorScheme`] and [`penalty`]: the weight prior and its log-penalty.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input data are raw effects, never contrasts.
//! - Every returned `V` is R×R and symmetric; with `est_cor` its diagonal is
//!   exactly one.
//!
//! Downstream usage
//! ----------------
//! - Feed [`NullCorEstimate::v`] back into the data with
//!   [`NullCorEstimate::update_data`] before the final mixture fit.
//!
//! Testing notes
//! -------------
//! - Unit tests drive the loop with scripted fitters to pin down iteration
//!   counts, stopping, tracing, and error propagation; integration tests in
//!   `tests/` run the full pipeline with the reference fitter on simulated
//!   data.

pub mod errors;
pub mod estimator;
pub mod moments;
pub mod options;
pub mod penalty;
pub mod simple;

pub use self::errors::{NullCorError, NullCorResult};
pub use self::estimator::{
    InitSource, NullCorEstimate, Termination, TraceEntry, estimate_null_correlation,
};
pub use self::moments::e_v;
pub use self::options::{NullCorOptions, SimpleOptions};
pub use self::penalty::{PriorScheme, penalty};
pub use self::simple::{cov_to_cor, estimate_null_correlation_simple};

pub mod prelude {
    pub use super::errors::{NullCorError, NullCorResult};
    pub use super::estimator::{InitSource, NullCorEstimate, Termination, estimate_null_correlation};
    pub use super::options::{NullCorOptions, SimpleOptions};
    pub use super::penalty::PriorScheme;
    pub use super::simple::estimate_null_correlation_simple;
}
