//! Numerical stability utilities for simplex-valued parameters.
//!
//! Mixture weights live on the probability simplex; the optimizer works on
//! unconstrained logits `θ ∈ ℝᴷ` and maps them through a max-shifted softmax.
//! Every helper here subtracts the running maximum before exponentiating, so
//! `f64` never overflows regardless of how far the logits drift.
//!
//! # Provided items
//! - [`log_sum_exp`]: `ln Σ exp(x_k)` without overflow.
//! - [`safe_softmax`]: `exp(x_k - lse(x))`, always summing to one.
//! - [`log_softmax`]: `x_k - lse(x)`, finite even where the softmax underflows.
//! - [`softmax_jvp`]: pulls a gradient with respect to `π` back to `θ`.
use ndarray::{Array1, ArrayView1};

/// Stable `ln Σ_k exp(x_k)`.
///
/// Returns `-∞` for an empty slice or when every entry is `-∞`, matching
/// the limit of an empty sum. A `+∞` entry yields `+∞`.
pub fn log_sum_exp(x: ArrayView1<f64>) -> f64 {
    let max = x.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    if !max.is_finite() {
        return max;
    }
    max + x.fold(0.0, |acc, &v| acc + (v - max).exp()).ln()
}

/// Softmax with the maximum logit subtracted first.
///
/// An empty input maps to an empty output.
pub fn safe_softmax(theta: ArrayView1<f64>) -> Array1<f64> {
    if theta.is_empty() {
        return Array1::zeros(0);
    }
    let max = theta.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let mut out = theta.mapv(|v| (v - max).exp());
    let total = out.sum();
    out.mapv_inplace(|v| v / total);
    out
}

/// `ln softmax(θ)_k = θ_k - lse(θ)`.
pub fn log_softmax(theta: ArrayView1<f64>) -> Array1<f64> {
    let lse = log_sum_exp(theta);
    theta.mapv(|v| v - lse)
}

/// Chain rule through the softmax: given `g = ∂f/∂π` and `π = softmax(θ)`,
/// returns `∂f/∂θ_k = π_k (g_k - Σ_c π_c g_c)`.
///
/// The result always sums to zero, reflecting the softmax's invariance to
/// a common shift of the logits.
pub fn softmax_jvp(pi: ArrayView1<f64>, g: ArrayView1<f64>) -> Array1<f64> {
    let mean = pi.dot(&g);
    let mut out = g.mapv(|v| v - mean);
    out *= &pi;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `log_sum_exp` stays finite for logits that would overflow `exp`.
    //
    // Given
    // -----
    // - x = [1000, 1000].
    //
    // Expect
    // ------
    // - 1000 + ln 2.
    fn log_sum_exp_handles_large_inputs() {
        let x = array![1000.0, 1000.0];

        assert_relative_eq!(log_sum_exp(x.view()), 1000.0 + 2f64.ln(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Degenerate inputs follow the empty-sum convention.
    //
    // Given
    // -----
    // - An empty vector and a vector of `-∞`.
    //
    // Expect
    // ------
    // - Both return `-∞`.
    fn log_sum_exp_of_empty_or_neg_infinite_is_neg_infinity() {
        let empty: Array1<f64> = Array1::zeros(0);
        let neg = array![f64::NEG_INFINITY, f64::NEG_INFINITY];

        assert_eq!(log_sum_exp(empty.view()), f64::NEG_INFINITY);
        assert_eq!(log_sum_exp(neg.view()), f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Softmax output is a probability vector that is invariant to shifts.
    //
    // Given
    // -----
    // - θ = [0, ln 3] and θ + 500.
    //
    // Expect
    // ------
    // - Both give [0.25, 0.75].
    fn safe_softmax_is_shift_invariant() {
        let theta = array![0.0, 3f64.ln()];
        let shifted = theta.mapv(|v| v + 500.0);

        for pi in [safe_softmax(theta.view()), safe_softmax(shifted.view())] {
            assert_relative_eq!(pi[0], 0.25, epsilon = 1e-12);
            assert_relative_eq!(pi[1], 0.75, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // `log_softmax` agrees with `ln(safe_softmax)` where both are finite.
    //
    // Given
    // -----
    // - θ = [1, 2, 3].
    //
    // Expect
    // ------
    // - Elementwise agreement.
    fn log_softmax_matches_log_of_softmax() {
        let theta = array![1.0, 2.0, 3.0];
        let pi = safe_softmax(theta.view());
        let lpi = log_softmax(theta.view());

        for k in 0..3 {
            assert_relative_eq!(lpi[k], pi[k].ln(), epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // `softmax_jvp` reproduces a finite-difference derivative of a linear
    // functional of the softmax.
    //
    // Given
    // -----
    // - f(θ) = Σ g_k softmax(θ)_k with g = [1, -2, 0.5], θ = [0.3, -0.1, 0.2].
    //
    // Expect
    // ------
    // - Analytic pullback within 1e-6 of central differences, summing to 0.
    fn softmax_jvp_matches_finite_differences() {
        let theta = array![0.3, -0.1, 0.2];
        let g = array![1.0, -2.0, 0.5];
        let f = |t: &Array1<f64>| safe_softmax(t.view()).dot(&g);

        let pi = safe_softmax(theta.view());
        let analytic = softmax_jvp(pi.view(), g.view());

        let h = 1e-6;
        for k in 0..3 {
            let mut up = theta.clone();
            let mut dn = theta.clone();
            up[k] += h;
            dn[k] -= h;
            let numeric = (f(&up) - f(&dn)) / (2.0 * h);
            assert_relative_eq!(analytic[k], numeric, epsilon = 1e-6);
        }
        assert_relative_eq!(analytic.sum(), 0.0, epsilon = 1e-12);
    }
}
