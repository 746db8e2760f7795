//! # quintus-modular
//!
//! PSL(2,Z) machinery and the modular functions built on it.
//!
//! The crate owns the group element type and its Moebius action, the
//! two-tier fundamental-domain reduction, the exact Dedekind-sum
//! epsilon for the eta transformation, and the function layer (eta, j,
//! lambda, Delta, Eisenstein series, Weierstrass invariants) that
//! reduces first and evaluates theta series only at well-conditioned
//! points. Complete elliptic K and E live here too: they come from the
//! AGM, whose quadratic convergence beats the series at order zero,
//! with derivative jets from the same recursion over short power
//! series.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod agm;
pub mod dedekind;
pub mod functions;
pub mod reduce;
pub mod transform;

#[cfg(test)]
mod proptests;

pub use agm::{agm, elliptic_e, elliptic_k, elliptic_k_jet};
pub use dedekind::{dedekind_sum, epsilon_arg};
pub use functions::{
    delta, eisenstein_e2, eisenstein_e4, eisenstein_e6, eisenstein_g2, eisenstein_g4,
    eisenstein_g6, eta, j_invariant, lambda, weierstrass_invariants,
};
pub use reduce::reduce_fundamental;
pub use transform::ModularGroupElement;
