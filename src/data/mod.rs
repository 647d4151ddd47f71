//! data — validated multi-condition effect data.
//!
//! [`MashData`] carries effect estimates, standard errors, the `alpha`
//! scaling, the residual matrix `V`, and an optional contrast matrix. All
//! estimators and mixture fitters in the crate take their input through it.

pub mod errors;
pub mod mash_data;

pub use self::errors::{DataError, DataResult};
pub use self::mash_data::{MashData, validate_residual};

pub mod prelude {
    pub use super::errors::{DataError, DataResult};
    pub use super::mash_data::MashData;
}
