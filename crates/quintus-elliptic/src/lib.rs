//! # quintus-elliptic
//!
//! Incomplete Legendre integrals and Weierstrass elliptic functions.
//!
//! The Legendre layer peels exact special cases, counts half-periods
//! (with branch-union handling when the count is ambiguous), and hands
//! the principal strip to the Carlson integrals. The Weierstrass layer
//! assembles wp, zeta and sigma from theta jets and the quasi-modular
//! G2. Complete K and E re-export the AGM implementations from the
//! modular layer so callers have one obvious place to find them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod legendre;
pub mod weierstrass;

pub use legendre::{
    complete_pi, legendre_e, legendre_e_times_pi, legendre_f, legendre_f_times_pi, legendre_pi,
    legendre_pi_times_pi,
};
pub use quintus_modular::{elliptic_e as complete_e, elliptic_k as complete_k};
pub use weierstrass::{
    weierstrass_p, weierstrass_p_jet, weierstrass_p_prime, weierstrass_sigma, weierstrass_zeta,
};
