//! Consistency checks shared by the optimizer configuration and outcome
//! types: tolerance sanity, gradient shape/finiteness, and the finiteness
//! of the returned estimate and objective value.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::types::{Grad, Theta},
};

/// Optional gradient-norm tolerance: `None` is accepted, otherwise finite and > 0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) if !tol.is_finite() => {
            Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." })
        }
        Some(tol) if tol <= 0.0 => {
            Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." })
        }
        _ => Ok(()),
    }
}

/// Optional cost-change tolerance: `None` is accepted, otherwise finite and > 0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) if !tol.is_finite() => {
            Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." })
        }
        Some(tol) if tol <= 0.0 => {
            Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." })
        }
        _ => Ok(()),
    }
}

/// Reject gradients of the wrong length or with non-finite entries.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] when `grad.len() != dim`.
/// - [`OptError::InvalidGradient`] naming the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    if let Some((index, &value)) = grad.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidGradient {
            index,
            value,
            reason: "Gradient elements must be finite.",
        });
    }
    Ok(())
}

/// Unwrap the solver's best parameter, insisting that it exists and is finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value,
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(theta)
}

/// A log-likelihood value may be any finite real.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Tolerance checks accept `None` and positive values, reject the rest.
    //
    // Given
    // -----
    // - `None`, `Some(1e-8)`, `Some(0.0)`, `Some(NaN)`.
    //
    // Expect
    // ------
    // - First two pass; zero and NaN fail with `InvalidTolGrad`/`InvalidTolCost`.
    fn tolerance_checks_reject_zero_and_nan() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_grad(Some(1e-8)).is_ok());
        assert!(matches!(verify_tol_grad(Some(0.0)), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_cost(Some(f64::NAN)), Err(OptError::InvalidTolCost { .. })));
    }

    #[test]
    // Purpose
    // -------
    // `validate_grad` reports the first non-finite entry and length mismatches.
    //
    // Given
    // -----
    // - `[1, NaN, ∞]` against `dim = 3`, and `[1, 2]` against `dim = 3`.
    //
    // Expect
    // ------
    // - `InvalidGradient { index: 1, .. }` and `GradientDimMismatch`.
    fn validate_grad_reports_first_bad_entry() {
        let bad = array![1.0, f64::NAN, f64::INFINITY];
        match validate_grad(&bad, 3) {
            Err(OptError::InvalidGradient { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(
            validate_grad(&array![1.0, 2.0], 3),
            Err(OptError::GradientDimMismatch { expected: 3, found: 2 })
        );
    }

    #[test]
    // Purpose
    // -------
    // A missing best parameter is an error, not a panic.
    //
    // Given
    // -----
    // - `None`.
    //
    // Expect
    // ------
    // - `OptError::MissingThetaHat`.
    fn validate_theta_hat_rejects_missing_estimate() {
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
        assert!(validate_theta_hat(Some(array![0.0, -3.0])).is_ok());
    }
}
