//! Overflow-safe transforms used by the optimizer and the mixture layer.

pub mod transformations;

pub use self::transformations::{log_softmax, log_sum_exp, safe_softmax, softmax_jvp};

pub mod prelude {
    pub use super::transformations::{log_softmax, log_sum_exp, safe_softmax, softmax_jvp};
}
