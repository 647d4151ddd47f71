//! Candidate covariance matrices for the mixture prior.
//!
//! Purpose
//! -------
//! Hold the ordered, named list of R×R matrices `U_k` describing
//! hypothesised patterns of effect sharing across conditions. The list is
//! passed unchanged to the fitter on every iteration of the null-correlation
//! loop.
//!
//! Key behaviors
//! -------------
//! - [`CovList::new`] validates squareness, a common dimension, finiteness,
//!   and symmetry.
//! - [`CovList::normalized`] rescales each matrix so its largest diagonal
//!   entry is one, leaving the grid to carry the scale.
//! - [`CovList::canonical`] builds the standard shapes: identity, one
//!   singleton per condition, equal effects, and three simple
//!   heterogeneity levels.
use crate::mixture::errors::{MixtureError, MixtureResult};
use ndarray::Array2;

const SYMMETRY_TOL: f64 = 1e-8;

/// Heterogeneity levels used by the `simple_het` canonical covariances.
pub const SIMPLE_HET_CORRELATIONS: [f64; 3] = [0.25, 0.5, 0.75];

#[derive(Debug, Clone, PartialEq)]
pub struct CovList {
    entries: Vec<(String, Array2<f64>)>,
    dim: usize,
}

impl CovList {
    /// Build a validated list from `(name, matrix)` pairs, preserving order.
    ///
    /// # Errors
    /// - [`MixtureError::EmptyCovList`] for an empty input.
    /// - [`MixtureError::CovNotSquare`], [`MixtureError::CovDimMismatch`]
    ///   (dimension taken from the first entry), or
    ///   [`MixtureError::InvalidCov`] naming the offending candidate.
    pub fn new(entries: Vec<(String, Array2<f64>)>) -> MixtureResult<Self> {
        let dim = match entries.first() {
            Some((_, m)) => m.nrows(),
            None => return Err(MixtureError::EmptyCovList),
        };
        for (name, m) in &entries {
            if !m.is_square() {
                return Err(MixtureError::CovNotSquare { name: name.clone(), shape: m.dim() });
            }
            if m.nrows() != dim {
                return Err(MixtureError::CovDimMismatch {
                    name: name.clone(),
                    expected: dim,
                    found: m.nrows(),
                });
            }
            if m.iter().any(|v| !v.is_finite()) {
                return Err(MixtureError::InvalidCov {
                    name: name.clone(),
                    reason: "entries must be finite",
                });
            }
            let asymmetric = m
                .indexed_iter()
                .any(|((i, j), &a)| (a - m[[j, i]]).abs() > SYMMETRY_TOL * a.abs().max(1.0));
            if asymmetric {
                return Err(MixtureError::InvalidCov {
                    name: name.clone(),
                    reason: "matrix must be symmetric",
                });
            }
        }
        Ok(Self { entries, dim })
    }

    /// Canonical covariances for `r` conditions.
    ///
    /// Order: `identity`, `singleton_1..=r`, `equal_effects`,
    /// `simple_het_1..=3`.
    pub fn canonical(r: usize) -> MixtureResult<Self> {
        if r == 0 {
            return Err(MixtureError::EmptyCovList);
        }
        let mut entries = Vec::with_capacity(r + 5);
        entries.push(("identity".to_string(), Array2::eye(r)));
        for k in 0..r {
            let mut e = Array2::zeros((r, r));
            e[[k, k]] = 1.0;
            entries.push((format!("singleton_{}", k + 1), e));
        }
        entries.push(("equal_effects".to_string(), Array2::ones((r, r))));
        for (i, &rho) in SIMPLE_HET_CORRELATIONS.iter().enumerate() {
            let het = Array2::from_shape_fn((r, r), |(a, b)| if a == b { 1.0 } else { rho });
            entries.push((format!("simple_het_{}", i + 1), het));
        }
        Self::new(entries)
    }

    /// Divide each matrix by its largest diagonal entry. Matrices whose
    /// diagonal is entirely non-positive are kept as they are.
    pub fn normalized(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(name, m)| {
                let scale = m.diag().fold(f64::NEG_INFINITY, |acc, &d| acc.max(d));
                let m = if scale > 0.0 { m / scale } else { m.clone() };
                (name.clone(), m)
            })
            .collect();
        Self { entries, dim: self.dim }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Common matrix dimension R.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array2<f64>)> {
        self.entries.iter().map(|(n, m)| (n.as_str(), m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Canonical list has the expected names, order and shapes.
    //
    // Given
    // -----
    // - r = 3.
    //
    // Expect
    // ------
    // - 3 + 5 = 8 matrices; singleton_2 has a single one at (1, 1);
    //   simple_het_2 has off-diagonals 0.5.
    fn canonical_builds_expected_shapes() {
        let ulist = CovList::canonical(3).unwrap();
        let names: Vec<&str> = ulist.names().collect();

        assert_eq!(ulist.len(), 8);
        assert_eq!(ulist.dim(), 3);
        assert_eq!(names[0], "identity");
        assert_eq!(names[4], "equal_effects");

        let (_, s2) = ulist.iter().nth(2).unwrap();
        assert_eq!(s2.sum(), 1.0);
        assert_eq!(s2[[1, 1]], 1.0);

        let (name, het) = ulist.iter().nth(6).unwrap();
        assert_eq!(name, "simple_het_2");
        assert_relative_eq!(het[[0, 2]], 0.5);
    }

    #[test]
    // Purpose
    // -------
    // Validation names the offending candidate.
    //
    // Given
    // -----
    // - A list mixing 2×2 and 3×3 matrices; an asymmetric matrix; no matrices.
    //
    // Expect
    // ------
    // - `CovDimMismatch`, `InvalidCov`, `EmptyCovList`.
    fn new_rejects_inconsistent_candidates() {
        let mixed = vec![("a".to_string(), Array2::eye(2)), ("b".to_string(), Array2::eye(3))];
        assert!(matches!(
            CovList::new(mixed),
            Err(MixtureError::CovDimMismatch { expected: 2, found: 3, .. })
        ));

        let asym = vec![("c".to_string(), array![[1.0, 0.1], [0.0, 1.0]])];
        assert!(matches!(CovList::new(asym), Err(MixtureError::InvalidCov { .. })));

        assert_eq!(CovList::new(Vec::new()), Err(MixtureError::EmptyCovList));
    }

    #[test]
    // Purpose
    // -------
    // Normalization scales by the largest diagonal and leaves zero matrices alone.
    //
    // Given
    // -----
    // - diag(4, 2) and the zero matrix.
    //
    // Expect
    // ------
    // - diag(1, 0.5) and the zero matrix.
    fn normalized_divides_by_max_diagonal() {
        let ulist = CovList::new(vec![
            ("scaled".to_string(), array![[4.0, 0.0], [0.0, 2.0]]),
            ("zero".to_string(), Array2::zeros((2, 2))),
        ])
        .unwrap()
        .normalized();

        let mats: Vec<&Array2<f64>> = ulist.iter().map(|(_, m)| m).collect();
        assert_relative_eq!(mats[0][[0, 0]], 1.0);
        assert_relative_eq!(mats[0][[1, 1]], 0.5);
        assert_eq!(mats[1], &Array2::<f64>::zeros((2, 2)));
    }
}
