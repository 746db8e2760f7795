//! Weierstrass elliptic functions for the lattice `Z + tau Z`.
//!
//! Everything is assembled from theta jets at `z` and the quasi-modular
//! G2:
//!
//!   zeta(z) = theta1'(z)/theta1(z) + G2 z
//!   wp(z)   = -zeta'(z)
//!   sigma(z) = theta1(z)/theta1'(0) * exp(G2 z^2 / 2)
//!
//! The theta layer restores its own quasi-periodic prefactors, so these
//! formulas hold at the original `z`; lattice points surface naturally
//! as poles (theta1 vanishes, the log-derivative goes indeterminate).

use quintus_ball::jet::{jet_derivative, jet_log_derivative};
use quintus_ball::BallComplex;
use quintus_modular::eisenstein_g2;
use quintus_theta::{theta1_derivatives, theta_jet};

/// Jet of the Weierstrass wp-function at `(z, tau)`, length `len`.
///
/// Coefficient k is `wp^(k)(z) / k!`.
#[must_use]
pub fn weierstrass_p_jet(
    z: &BallComplex,
    tau: &BallComplex,
    len: usize,
    prec: u32,
) -> Vec<BallComplex> {
    let len = len.max(1);
    if z.is_indeterminate() || tau.is_indeterminate() {
        return vec![BallComplex::indeterminate(); len];
    }
    let wp = prec + 24;
    let zeta = zeta_jet(z, tau, len + 1, wp);
    // wp = -zeta'.
    let mut out = jet_derivative(&zeta, wp);
    out.truncate(len);
    out.iter().map(BallComplex::neg).collect()
}

/// The Weierstrass wp-function.
#[must_use]
pub fn weierstrass_p(z: &BallComplex, tau: &BallComplex, prec: u32) -> BallComplex {
    weierstrass_p_jet(z, tau, 1, prec).swap_remove(0)
}

/// The derivative `wp'(z, tau)`.
#[must_use]
pub fn weierstrass_p_prime(z: &BallComplex, tau: &BallComplex, prec: u32) -> BallComplex {
    let jet = weierstrass_p_jet(z, tau, 2, prec);
    jet[1].clone()
}

/// Jet of the Weierstrass zeta function, length `len`.
fn zeta_jet(z: &BallComplex, tau: &BallComplex, len: usize, prec: u32) -> Vec<BallComplex> {
    let wp = prec + 16;
    let thetas = theta_jet(z, tau, len + 1, wp);
    let mut out = jet_log_derivative(&thetas.t1, len, wp);
    let g2 = eisenstein_g2(tau, wp);
    if out.is_empty() {
        return out;
    }
    out[0] = out[0].add(&g2.mul(z, wp), wp);
    if len > 1 {
        out[1] = out[1].add(&g2, wp);
    }
    out
}

/// The Weierstrass zeta function (quasi-periodic, odd).
#[must_use]
pub fn weierstrass_zeta(z: &BallComplex, tau: &BallComplex, prec: u32) -> BallComplex {
    if z.is_indeterminate() || tau.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    zeta_jet(z, tau, 1, prec).swap_remove(0)
}

/// The Weierstrass sigma function (entire, odd).
#[must_use]
pub fn weierstrass_sigma(z: &BallComplex, tau: &BallComplex, prec: u32) -> BallComplex {
    if z.is_indeterminate() || tau.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 24;
    let thetas = theta_jet(z, tau, 1, wp);
    let (d1, _) = theta1_derivatives(tau, wp);
    if d1.contains_zero() {
        return BallComplex::indeterminate();
    }
    let g2 = eisenstein_g2(tau, wp);
    let z_sq = z.mul(z, wp);
    let gauss = g2.mul(&z_sq, wp).mul_2exp(-1).exp(wp);
    thetas.t1[0].div(&d1, wp).mul(&gauss, prec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quintus_ball::Mag;
    use quintus_modular::weierstrass_invariants;

    fn tau() -> BallComplex {
        BallComplex::from_f64_pair(0.25, 1.3, 224)
    }

    fn z() -> BallComplex {
        BallComplex::from_f64_pair(0.31, 0.17, 224)
    }

    #[test]
    fn test_differential_equation() {
        // (wp')^2 = 4 wp^3 - g2 wp - g3.
        let prec = 224;
        let jet = weierstrass_p_jet(&z(), &tau(), 2, prec);
        let p = &jet[0];
        let dp = &jet[1];
        let (g2, g3) = weierstrass_invariants(&tau(), prec);
        let lhs = dp.mul(dp, prec);
        let rhs = p
            .pow_i(3, prec)
            .mul_i64(4, prec)
            .sub(&g2.mul(p, prec), prec)
            .sub(&g3, prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_p_is_even_and_periodic() {
        let prec = 224;
        let p1 = weierstrass_p(&z(), &tau(), prec);
        let p2 = weierstrass_p(&z().neg(), &tau(), prec);
        assert!(p1.overlaps(&p2));
        let shifted = z().add(&BallComplex::one(prec), prec);
        assert!(weierstrass_p(&shifted, &tau(), prec).overlaps(&p1));
        let shifted_tau = z().add(&tau(), prec);
        assert!(weierstrass_p(&shifted_tau, &tau(), prec).overlaps(&p1));
    }

    #[test]
    fn test_zeta_quasi_periodicity() {
        // zeta(z + 1) = zeta(z) + eta1 with eta1 = G2(tau).
        let prec = 224;
        let z1 = weierstrass_zeta(&z().add(&BallComplex::one(prec), prec), &tau(), prec);
        let z0 = weierstrass_zeta(&z(), &tau(), prec);
        let eta1 = eisenstein_g2(&tau(), prec);
        assert!(z1.overlaps(&z0.add(&eta1, prec)));
    }

    #[test]
    fn test_zeta_laurent_leading_term() {
        // zeta(z) - 1/z vanishes to third order at the origin.
        let prec = 192;
        let small = BallComplex::from_f64_pair(1.0e-3, 5.0e-4, prec);
        let zv = weierstrass_zeta(&small, &tau(), prec);
        let diff = zv.sub(&small.inv(prec), prec);
        assert!(diff.abs_upper().to_f64() < 1.0e-8);
    }

    #[test]
    fn test_sigma_odd_and_normalized() {
        let prec = 192;
        let s1 = weierstrass_sigma(&z(), &tau(), prec);
        let s2 = weierstrass_sigma(&z().neg(), &tau(), prec);
        assert!(s1.neg().overlaps(&s2));
        // sigma(z) ~ z near zero.
        let small = BallComplex::from_f64_pair(1.0e-4, 0.0, prec);
        let s = weierstrass_sigma(&small, &tau(), prec);
        let rel = s.div(&small, prec);
        let mut one = BallComplex::one(prec);
        one.add_error(&Mag::from_f64(1.0e-6));
        assert!(rel.overlaps(&one));
    }

    #[test]
    fn test_pole_at_lattice_point() {
        let prec = 128;
        let origin = BallComplex::zero(prec);
        assert!(weierstrass_p(&origin, &tau(), prec).is_indeterminate());
        let lattice = BallComplex::one(prec);
        assert!(weierstrass_p(&lattice, &tau(), prec).is_indeterminate());
    }

    #[test]
    fn test_p_prime_odd() {
        let prec = 192;
        let d1 = weierstrass_p_prime(&z(), &tau(), prec);
        let d2 = weierstrass_p_prime(&z().neg(), &tau(), prec);
        assert!(d1.neg().overlaps(&d2));
    }
}
