//! Scale grid `ω` for the mixture prior.
//!
//! Each candidate covariance `U_k` enters the prior as `ω_l² U_k` for every
//! grid value `ω_l`. The automatic grid spans from a tenth of the smallest
//! standard error up to roughly twice the largest excess effect size, with
//! geometric spacing `mult`.
use crate::{
    data::MashData,
    mixture::errors::{MixtureError, MixtureResult},
};
use std::f64::consts::SQRT_2;

#[derive(Debug, Clone, PartialEq)]
pub enum Grid {
    /// Data-driven grid with geometric ratio `mult` (`0` gives the two-point
    /// grid `[0, ω_max / 2]`).
    Auto { mult: f64 },
    /// Caller-supplied scale values.
    Fixed(Vec<f64>),
}

impl Default for Grid {
    fn default() -> Self {
        Grid::Auto { mult: SQRT_2 }
    }
}

impl Grid {
    /// Check the grid settings without looking at any data.
    ///
    /// # Errors
    /// - [`MixtureError::InvalidGridMult`] unless `mult == 0` or `mult > 1`.
    /// - [`MixtureError::EmptyGrid`] for an empty fixed grid.
    /// - [`MixtureError::InvalidGridValue`] for the first fixed value that is
    ///   negative or not finite.
    pub fn validate(&self) -> MixtureResult<()> {
        match self {
            Grid::Auto { mult } => validate_mult(*mult),
            Grid::Fixed(values) => {
                if values.is_empty() {
                    return Err(MixtureError::EmptyGrid);
                }
                if let Some((index, &value)) =
                    values.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0)
                {
                    return Err(MixtureError::InvalidGridValue { index, value });
                }
                Ok(())
            }
        }
    }

    /// Resolve to concrete scale values for `data`.
    ///
    /// # Errors
    /// Any error from [`Grid::validate`].
    pub fn resolve(&self, data: &MashData) -> MixtureResult<Vec<f64>> {
        self.validate()?;
        match self {
            Grid::Auto { mult } => Ok(auto_grid(data, *mult)),
            Grid::Fixed(values) => Ok(values.clone()),
        }
    }
}

fn validate_mult(mult: f64) -> MixtureResult<()> {
    if !mult.is_finite() || (mult != 0.0 && mult <= 1.0) {
        return Err(MixtureError::InvalidGridMult { mult });
    }
    Ok(())
}

/// Smallest grid value: a tenth of the smallest standard error.
fn grid_min(data: &MashData) -> f64 {
    data.shat().fold(f64::INFINITY, |m, &s| m.min(s)) / 10.0
}

/// Largest grid value: `8 · ω_min` when no effect exceeds its standard
/// error, else `2 · sqrt(max(Bhat² − Shat²))`.
fn grid_max(data: &MashData) -> f64 {
    let excess = data
        .bhat()
        .iter()
        .zip(data.shat().iter())
        .map(|(&b, &s)| b * b - s * s)
        .fold(f64::NEG_INFINITY, f64::max);
    if excess <= 0.0 { 8.0 * grid_min(data) } else { 2.0 * excess.sqrt() }
}

/// Geometric grid `mult^(-npoint..=0) · ω_max` with
/// `npoint = ceil(log2(ω_max / ω_min) / log2(mult))`, clamped at zero.
pub fn autoselect_grid(data: &MashData, mult: f64) -> MixtureResult<Vec<f64>> {
    validate_mult(mult)?;
    Ok(auto_grid(data, mult))
}

fn auto_grid(data: &MashData, mult: f64) -> Vec<f64> {
    let gmax = grid_max(data);
    if mult == 0.0 {
        return vec![0.0, gmax / 2.0];
    }
    let gmin = grid_min(data);
    let npoint = ((gmax / gmin).log2() / mult.log2()).ceil().max(0.0) as i32;
    (-npoint..=0).map(|p| mult.powi(p) * gmax).collect()
}
