//! Bridge from a [`LogLikelihood`] to argmin's `CostFunction`/`Gradient`.
//!
//! argmin minimizes, so the adapter reports `c(θ) = -ℓ(θ)` and negates any
//! analytic gradient. Objectives without an analytic gradient are
//! differentiated numerically on the cost scale (central differences first,
//! forward differences when the central stencil leaves the valid region).
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Borrowed objective plus the data it is evaluated on.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// Numerical cost gradient. The first evaluation error seen inside the
    /// stencil is surfaced instead of a NaN-filled gradient.
    fn numerical_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let first_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost = |t: &Theta| -> f64 {
            self.cost(t).unwrap_or_else(|e| {
                first_err.borrow_mut().get_or_insert(e);
                f64::NAN
            })
        };

        let central = theta.central_diff(&cost);
        if first_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }

        first_err.replace(None);
        let forward = theta.forward_diff(&cost);
        if let Some(err) = first_err.take() {
            return Err(err);
        }
        validate_grad(&forward, theta.len())?;
        Ok(forward)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.f.value(theta, self.data)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value }.into());
        }
        Ok(-value)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.numerical_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_relative_eq;
    use ndarray::array;

    // Concave quadratic ℓ(θ) = -Σ (θ_i - c_i)², optionally with an analytic gradient.
    struct Quadratic {
        analytic: bool,
    }

    impl LogLikelihood for Quadratic {
        type Data = Theta;

        fn value(&self, theta: &Theta, data: &Theta) -> OptResult<f64> {
            Ok(-(theta - data).mapv(|d| d * d).sum())
        }

        fn check(&self, _theta: &Theta, _data: &Theta) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, data: &Theta) -> OptResult<Grad> {
            if self.analytic {
                Ok((data - theta) * 2.0)
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The adapter flips the sign of the objective and of an analytic gradient.
    //
    // Given
    // -----
    // - ℓ(θ) = -‖θ - c‖² with c = [1, -2], evaluated at θ = [0, 0].
    //
    // Expect
    // ------
    // - cost = 5 and cost gradient = [-2, 4].
    fn adapter_negates_value_and_analytic_gradient() {
        let f = Quadratic { analytic: true };
        let c = array![1.0, -2.0];
        let adapter = ArgMinAdapter::new(&f, &c);
        let theta = array![0.0, 0.0];

        assert_relative_eq!(adapter.cost(&theta).unwrap(), 5.0);
        let g = adapter.gradient(&theta).unwrap();
        assert_relative_eq!(g[0], -2.0);
        assert_relative_eq!(g[1], 4.0);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the numerical fallback matches the
    // closed form of the cost gradient.
    //
    // Given
    // -----
    // - Same quadratic with `analytic = false`.
    //
    // Expect
    // ------
    // - Finite-difference gradient within 1e-5 of [-2, 4].
    fn adapter_falls_back_to_finite_differences() {
        let f = Quadratic { analytic: false };
        let c = array![1.0, -2.0];
        let adapter = ArgMinAdapter::new(&f, &c);

        let g = adapter.gradient(&array![0.0, 0.0]).unwrap();

        assert_relative_eq!(g[0], -2.0, epsilon = 1e-5);
        assert_relative_eq!(g[1], 4.0, epsilon = 1e-5);
    }
}
