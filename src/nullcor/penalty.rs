//! Prior schemes for mixture weights and the penalty they induce.
//!
//! A prior vector `p` (one entry per weight, `p_k ≥ 1`) contributes
//! `Σ_{p_k ≠ 1} (p_k − 1) ln π_k` to the penalized log-likelihood. Entries
//! equal to one are skipped outright, so a zero weight there is harmless;
//! a zero weight anywhere else makes the penalty undefined and is reported
//! as [`NullCorError::UndefinedPenalty`].
use crate::nullcor::errors::{NullCorError, NullCorResult};
use ndarray::Array1;
use std::str::FromStr;

/// Prior value placed on the null component by [`PriorScheme::NullBiased`].
pub const NULL_PRIOR: f64 = 10.0;

/// Named prior schemes, resolved to a vector by [`PriorScheme::prior_vector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorScheme {
    /// Weight 10 on the first component, 1 elsewhere. The first component
    /// is the null only when the fitter includes a point mass; without one
    /// the bias lands on the first `ω² U` component.
    #[default]
    NullBiased,
    /// All ones: no penalty.
    Uniform,
}

impl PriorScheme {
    /// Concrete prior for `k` mixture weights.
    pub fn prior_vector(self, k: usize) -> Array1<f64> {
        let mut prior = Array1::ones(k);
        if let (PriorScheme::NullBiased, Some(first)) = (self, prior.get_mut(0)) {
            *first = NULL_PRIOR;
        }
        prior
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriorScheme::NullBiased => "nullbiased",
            PriorScheme::Uniform => "uniform",
        }
    }
}

impl FromStr for PriorScheme {
    type Err = NullCorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nullbiased" => Ok(PriorScheme::NullBiased),
            "uniform" => Ok(PriorScheme::Uniform),
            _ => Err(NullCorError::InvalidPriorScheme { name: s.to_string() }),
        }
    }
}

/// `Σ_{prior_k ≠ 1} (prior_k − 1) · ln(pi_k)`.
///
/// # Errors
/// - [`NullCorError::PenaltyLengthMismatch`] when lengths differ.
/// - [`NullCorError::UndefinedPenalty`] for the first `k` with
///   `prior_k ≠ 1` and `pi_k == 0`.
pub fn penalty(prior: &Array1<f64>, pi: &Array1<f64>) -> NullCorResult<f64> {
    if prior.len() != pi.len() {
        return Err(NullCorError::PenaltyLengthMismatch { prior: prior.len(), weights: pi.len() });
    }
    let mut total = 0.0;
    for (index, (&p, &w)) in prior.iter().zip(pi.iter()).enumerate() {
        if p == 1.0 {
            continue;
        }
        if w == 0.0 {
            return Err(NullCorError::UndefinedPenalty { index, prior: p });
        }
        total += (p - 1.0) * w.ln();
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Prior vectors follow the scheme definitions.
    //
    // Given
    // -----
    // - k = 4 for both schemes, and k = 0 for the null-biased scheme.
    //
    // Expect
    // ------
    // - [10, 1, 1, 1], [1, 1, 1, 1], and an empty vector.
    fn prior_vector_matches_scheme() {
        assert_eq!(PriorScheme::NullBiased.prior_vector(4), array![10.0, 1.0, 1.0, 1.0]);
        assert_eq!(PriorScheme::Uniform.prior_vector(4), array![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(PriorScheme::NullBiased.prior_vector(0).len(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Scheme names parse case-insensitively.
    //
    // Given
    // -----
    // - "NullBiased", "uniform", "flat".
    //
    // Expect
    // ------
    // - Two successes and an `InvalidPriorScheme`.
    fn prior_scheme_parses_names() {
        assert_eq!("NullBiased".parse::<PriorScheme>(), Ok(PriorScheme::NullBiased));
        assert_eq!("uniform".parse::<PriorScheme>(), Ok(PriorScheme::Uniform));
        assert!(matches!(
            "flat".parse::<PriorScheme>(),
            Err(NullCorError::InvalidPriorScheme { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Only entries with prior ≠ 1 contribute; zeros under prior 1 are fine.
    //
    // Given
    // -----
    // - prior = [10, 1, 1], pi = [0.5, 0.5, 0].
    //
    // Expect
    // ------
    // - 9 · ln 0.5.
    fn penalty_skips_unit_prior_entries() {
        let value = penalty(&array![10.0, 1.0, 1.0], &array![0.5, 0.5, 0.0]).unwrap();

        assert_relative_eq!(value, 9.0 * 0.5f64.ln(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Uniform priors yield exactly zero penalty.
    //
    // Given
    // -----
    // - Uniform prior of length 3 and arbitrary weights.
    //
    // Expect
    // ------
    // - 0.
    fn uniform_prior_has_zero_penalty() {
        let prior = PriorScheme::Uniform.prior_vector(3);

        assert_eq!(penalty(&prior, &array![0.2, 0.0, 0.8]).unwrap(), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // A zero weight under a non-unit prior is surfaced, not masked.
    //
    // Given
    // -----
    // - prior = [10, 1], pi = [0, 1].
    //
    // Expect
    // ------
    // - `UndefinedPenalty { index: 0, prior: 10 }`.
    fn zero_weight_under_penalty_is_undefined() {
        let err = penalty(&array![10.0, 1.0], &array![0.0, 1.0]).unwrap_err();

        assert_eq!(err, NullCorError::UndefinedPenalty { index: 0, prior: 10.0 });
    }

    #[test]
    // Purpose
    // -------
    // Length mismatches are reported.
    //
    // Given
    // -----
    // - prior of length 2, pi of length 3.
    //
    // Expect
    // ------
    // - `PenaltyLengthMismatch { prior: 2, weights: 3 }`.
    fn penalty_rejects_length_mismatch() {
        assert_eq!(
            penalty(&array![1.0, 1.0], &array![0.2, 0.3, 0.5]),
            Err(NullCorError::PenaltyLengthMismatch { prior: 2, weights: 3 })
        );
    }
}
