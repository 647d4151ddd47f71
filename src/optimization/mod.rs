//! Optimization infrastructure: error types, the L-BFGS log-likelihood
//! maximizer, and numerically stable simplex transforms.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
