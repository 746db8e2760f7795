//! # Quintus
//!
//! Certified evaluation of modular forms, Jacobi theta functions and
//! elliptic integrals over complex ball arithmetic.
//!
//! Every public function takes ball-valued inputs and a precision in
//! bits, and returns a ball guaranteed to enclose the true value. All
//! functions are total: mathematical edge cases (divergent nomes,
//! poles, ambiguous branch configurations) come back as indeterminate
//! balls — infinite-radius enclosures that propagate — never as
//! errors. Callers inspect the radius and retry at higher precision if
//! they need more bits; that policy decision stays with the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quintus::prelude::*;
//!
//! let tau = BallComplex::from_f64_pair(0.0, 1.0, 128);
//! let j = j_invariant(&tau, 128);   // encloses 1728
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use quintus_ball as ball;
pub use quintus_carlson as carlson;
pub use quintus_elliptic as elliptic;
pub use quintus_exact as exact;
pub use quintus_modular as modular;
pub use quintus_quad as quad;
pub use quintus_theta as theta;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use quintus_ball::{BallComplex, BallReal, Mag};
    pub use quintus_carlson::{rc, rd, rf, rg, rj};
    pub use quintus_elliptic::{
        complete_e, complete_k, complete_pi, legendre_e, legendre_e_times_pi, legendre_f,
        legendre_f_times_pi, legendre_pi, legendre_pi_times_pi, weierstrass_p,
        weierstrass_p_jet, weierstrass_p_prime, weierstrass_sigma, weierstrass_zeta,
    };
    pub use quintus_exact::{Integer, Rational};
    pub use quintus_modular::{
        delta, eisenstein_e2, eisenstein_e4, eisenstein_e6, eisenstein_g2, eisenstein_g4,
        eisenstein_g6, eta, j_invariant, lambda, reduce_fundamental, weierstrass_invariants,
        ModularGroupElement,
    };
    pub use quintus_theta::{eta_sum, nome, theta_const, theta_jet, ThetaQuadruple};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_end_to_end_j_invariant() {
        let tau = BallComplex::i(128);
        let j = j_invariant(&tau, 128);
        assert!(j.overlaps(&BallComplex::from_i64(1728, 128)));
    }

    #[test]
    fn test_end_to_end_carlson_vector() {
        let v = rf(
            &BallComplex::zero(96),
            &BallComplex::from_i64(2, 96),
            &BallComplex::one(96),
            96,
        );
        let mut expect = BallComplex::from_f64_pair(1.311_028_777_146_059_9, 0.0, 96);
        expect.add_error(&Mag::from_f64(1.0e-12));
        assert!(v.overlaps(&expect));
    }

    #[test]
    fn test_end_to_end_k_zero() {
        let k = complete_k(&BallComplex::zero(256), 256);
        let half_pi = BallComplex::from_real(BallReal::pi(256).mul_2exp(-1), 256);
        assert!(k.overlaps(&half_pi));
        assert!(k.rel_accuracy_bits() >= 250);
    }
}
