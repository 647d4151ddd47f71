//! Numeric aliases and pre-wired solver types for the optimizer.
//!
//! Everything downstream talks about `Theta`, `Grad` and `Cost` rather than
//! raw `ndarray`/`argmin` generics, so swapping the backend only touches
//! this file.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Unconstrained parameter vector `θ` (e.g. mixture-weight logits).
pub type Theta = Array1<f64>;

/// Gradient `∇ℓ(θ)` (user side) or `∇c(θ)` (solver side); same shape as `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Function-evaluation counters reported by argmin, keyed by counter name.
pub type FnEvalMap = HashMap<String, u64>;

/// History length used when `MLEOptions::lbfgs_mem` is `None`.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
