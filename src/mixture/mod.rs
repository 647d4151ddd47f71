//! mixture — the multivariate normal mixture model behind the estimators.
//!
//! Purpose
//! -------
//! Define the contract the null-correlation estimators consume
//! ([`MixtureFitter`] → [`FittedMixture`]) and ship a reference
//! implementation ([`MashFitter`]) built on Gaussian kernels, a scale grid,
//! and L-BFGS weight estimation.
//!
//! Key behaviors
//! -------------
//! - [`CovList`] holds the named candidate covariances `U_k`.
//! - [`Grid`] resolves the scale values `ω_l` from the data or a fixed list.
//! - [`likelihood`] evaluates component log-densities and posteriors via
//!   Cholesky factors; [`weights`] estimates simplex weights under a prior.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every candidate covariance is R×R, finite, and symmetric, with R equal
//!   to the data's condition count.
//! - Fitted weights are non-negative and sum to one; posterior moments are
//!   on the caller's original effect scale.
//!
//! Conventions
//! -----------
//! - Component order is null first (when enabled), then grid-major.
//! - Errors are reported as [`MixtureError`]; optimizer failures are wrapped,
//!   not flattened.

pub mod covariances;
pub mod errors;
pub mod fitter;
pub mod grid;
pub mod likelihood;
pub mod traits;
pub mod weights;

pub use self::covariances::CovList;
pub use self::errors::{MixtureError, MixtureResult};
pub use self::fitter::{FitterOptions, MashFitter};
pub use self::grid::Grid;
pub use self::traits::{FittedMixture, MixtureFitter};

pub mod prelude {
    pub use super::covariances::CovList;
    pub use super::errors::{MixtureError, MixtureResult};
    pub use super::fitter::{FitterOptions, MashFitter};
    pub use super::grid::Grid;
    pub use super::traits::{FittedMixture, MixtureFitter};
}
