//! # quintus-theta
//!
//! Rigorous summation of the Jacobi theta and Dedekind eta q-series.
//!
//! Everything here is a straight series engine: given `tau` (and for the
//! jets a point `z`), choose a truncation order from the size of the
//! nome, build an addition sequence so the sparse q-powers cost one
//! multiplication each, sum with per-term working precision, and charge
//! a rigorous tail bound to the radius. Large constant series switch to
//! rectangular splitting past a crossover.
//!
//! No modular reduction happens in this crate. Feeding it a `tau` far
//! from the fundamental domain just means a slow series or an
//! indeterminate result; the modular layer is responsible for reducing
//! first so the nome is comfortably small.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod addseq;
mod jets;
mod plan;
mod qpow;
mod series;

pub use addseq::{AdditionSequence, Rule};
pub use jets::{theta_jet, ThetaQuadruple};
pub use series::{eta_sum, nome, nome_quarter, theta1_derivatives, theta_const};
