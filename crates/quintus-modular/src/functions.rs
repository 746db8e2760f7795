//! Modular functions and forms via reduced theta series.
//!
//! Every function here follows one template: reduce tau to the
//! fundamental domain, evaluate the theta machinery at the reduced
//! point where the nome is small, then undo the transformation with
//! the appropriate automorphy factor — the exact 24th-root epsilon for
//! eta, `(c tau + d)^k` for weight-k forms, the anharmonic action for
//! lambda, and the extra `c (c tau + d)` correction for the
//! quasi-modular E2.

use crate::dedekind::epsilon_arg;
use crate::reduce::reduce_fundamental;
use crate::transform::ModularGroupElement;
use num_traits::Zero;
use quintus_ball::{BallComplex, BallReal};
use quintus_theta::{eta_sum, theta1_derivatives, theta_const};

/// Tolerance for the internal fundamental-domain reduction.
const REDUCE_EPS: f64 = 1.0e-6;

/// True when the reduced point sits exactly on one of the vertical
/// lines `Re = 0, +/-1/2` where j (and friends) are provably real.
fn on_real_locus(w: &BallComplex) -> bool {
    let re = w.re();
    if !re.is_exact() {
        return false;
    }
    if re.is_exact_zero() {
        return true;
    }
    let doubled = re.mul_2exp(1);
    doubled.mid().is_integer() && doubled.mid().clone().abs() == 1.0
}

/// The Dedekind eta function `eta(tau)`.
///
/// Reduces tau, sums the pentagonal series at the reduced point, and
/// restores `eta(tau) = eps(g)^-1 (c tau + d)^(-1/2) eta(g tau)`.
#[must_use]
pub fn eta(tau: &BallComplex, prec: u32) -> BallComplex {
    if tau.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 16;
    let (g, w) = reduce_fundamental(tau, REDUCE_EPS, wp);
    let base = eta_sum(&w, wp);
    if g.is_identity() {
        return base;
    }
    let eps_inv = BallComplex::root_of_unity_24(-epsilon_arg(&g), wp);
    let cocycle = g.cocycle(tau, wp);
    let scale = cocycle.sqrt(wp).inv(wp);
    base.mul(&eps_inv, wp).mul(&scale, prec)
}

/// The modular discriminant `Delta(tau) = eta(tau)^24`, weight 12.
#[must_use]
pub fn delta(tau: &BallComplex, prec: u32) -> BallComplex {
    let wp = prec + 16;
    // Going through eta keeps the reduction and epsilon in one place;
    // the 24th power kills the root of unity but not the cocycle.
    eta(tau, wp).pow_i(24, prec)
}

/// The Klein j-invariant.
///
/// Fully modular, so no factor comes back after reduction:
/// `j = 32 (t2^8 + t3^8 + t4^8)^3 / (t2 t3 t4)^8`. On the vertical
/// boundary lines the value is provably real and the enclosure is
/// tightened accordingly.
#[must_use]
pub fn j_invariant(tau: &BallComplex, prec: u32) -> BallComplex {
    if tau.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 24;
    let (_, w) = reduce_fundamental(tau, REDUCE_EPS, wp);
    let (t2, t3, t4) = theta_const(&w, wp);
    let p2 = t2.pow_i(8, wp);
    let p3 = t3.pow_i(8, wp);
    let p4 = t4.pow_i(8, wp);
    let num = p2.add(&p3, wp).add(&p4, wp).pow_i(3, wp).mul_i64(32, wp);
    let den = t2.mul(&t3, wp).mul(&t4, wp).pow_i(8, wp);
    let j = num.div(&den, prec);
    if on_real_locus(&w) && j.is_finite() {
        j.demote_to_real(prec)
    } else {
        j
    }
}

/// The elliptic lambda function `lambda = theta2^4 / theta3^4`.
///
/// Lambda is only Gamma(2)-invariant; the reducing matrix acts on it
/// through the anharmonic group, so the reduction is undone by the
/// inverse of that Moebius action.
#[must_use]
pub fn lambda(tau: &BallComplex, prec: u32) -> BallComplex {
    if tau.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 24;
    let (g, w) = reduce_fundamental(tau, REDUCE_EPS, wp);
    let (t2, t3, _) = theta_const(&w, wp);
    let at_w = t2.pow_i(4, wp).div(&t3.pow_i(4, wp), wp);
    let action = anharmonic_action(&g);
    apply_anharmonic_inverse(action, &at_w, prec)
}

/// The quasi-modular Eisenstein series E2 (q-expansion normalization
/// `E2 = 1 - 24 q^2 - ...` in the nome `q = exp(i pi tau)`).
#[must_use]
pub fn eisenstein_e2(tau: &BallComplex, prec: u32) -> BallComplex {
    if tau.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 24;
    let (g, w) = reduce_fundamental(tau, REDUCE_EPS, wp);
    let (d1, d3) = theta1_derivatives(&w, wp);
    let pi = BallReal::pi(wp);
    let pi_sq = pi.mul(&pi, wp);
    // theta1'''(0)/theta1'(0) = -pi^2 E2.
    let at_w = d3.div(&d1, wp).div_real(&pi_sq, wp).neg();
    if g.is_identity() {
        return at_w;
    }
    // E2(g tau) = (c tau + d)^2 E2(tau) - (6 i / pi) c (c tau + d).
    let (_, _, c, _) = g.entries();
    let cocycle = g.cocycle(tau, wp);
    let c_ball = BallComplex::from_integer(c, wp);
    let correction = c_ball
        .mul(&cocycle, wp)
        .mul_i64(6, wp)
        .div_real(&pi, wp)
        .mul_i();
    at_w
        .add(&correction, wp)
        .div(&cocycle.mul(&cocycle, wp), prec)
}

/// The Eisenstein series E4 (normalized, `E4(i inf) = 1`).
#[must_use]
pub fn eisenstein_e4(tau: &BallComplex, prec: u32) -> BallComplex {
    let (at_w, cocycle) = reduced_theta_form(tau, prec, |t2, t3, t4, wp| {
        let p2 = t2.pow_i(8, wp);
        let p3 = t3.pow_i(8, wp);
        let p4 = t4.pow_i(8, wp);
        p2.add(&p3, wp).add(&p4, wp).mul_2exp(-1)
    });
    match cocycle {
        None => at_w,
        Some((cz, prec)) => at_w.div(&cz.pow_i(4, prec + 8), prec),
    }
}

/// The Eisenstein series E6 (normalized, `E6(i inf) = 1`).
#[must_use]
pub fn eisenstein_e6(tau: &BallComplex, prec: u32) -> BallComplex {
    let (at_w, cocycle) = reduced_theta_form(tau, prec, |t2, t3, t4, wp| {
        let f2 = t2.pow_i(4, wp);
        let f3 = t3.pow_i(4, wp);
        let f4 = t4.pow_i(4, wp);
        let a = f3.add(&f4, wp);
        let b = f3.add(&f2, wp);
        let c = f4.sub(&f2, wp);
        a.mul(&b, wp).mul(&c, wp).mul_2exp(-1)
    });
    match cocycle {
        None => at_w,
        Some((cz, prec)) => at_w.div(&cz.pow_i(6, prec + 8), prec),
    }
}

/// The weight-2 Eisenstein series `G2 = 2 zeta(2) E2 = pi^2 E2 / 3`
/// (lattice `Z + tau Z`; equals the quasi-period eta1).
#[must_use]
pub fn eisenstein_g2(tau: &BallComplex, prec: u32) -> BallComplex {
    let wp = prec + 8;
    let pi = BallReal::pi(wp);
    let scale = pi.mul(&pi, wp).div(&BallReal::from_i64(3, wp), wp);
    eisenstein_e2(tau, wp).mul_real(&scale, prec)
}

/// The weight-4 Eisenstein series `G4 = 2 zeta(4) E4 = pi^4 E4 / 45`.
#[must_use]
pub fn eisenstein_g4(tau: &BallComplex, prec: u32) -> BallComplex {
    let wp = prec + 8;
    let pi = BallReal::pi(wp);
    let pi4 = pi.pow_i(4, wp);
    let scale = pi4.div(&BallReal::from_i64(45, wp), wp);
    eisenstein_e4(tau, wp).mul_real(&scale, prec)
}

/// The weight-6 Eisenstein series `G6 = 2 zeta(6) E6 = 2 pi^6 E6 / 945`.
#[must_use]
pub fn eisenstein_g6(tau: &BallComplex, prec: u32) -> BallComplex {
    let wp = prec + 8;
    let pi = BallReal::pi(wp);
    let pi6 = pi.pow_i(6, wp);
    let scale = pi6
        .mul_2exp(1)
        .div(&BallReal::from_i64(945, wp), wp);
    eisenstein_e6(tau, wp).mul_real(&scale, prec)
}

/// The Weierstrass invariants `(g2, g3)` for the lattice `Z + tau Z`:
/// `g2 = 60 G4`, `g3 = 140 G6`.
#[must_use]
pub fn weierstrass_invariants(tau: &BallComplex, prec: u32) -> (BallComplex, BallComplex) {
    let wp = prec + 8;
    (
        eisenstein_g4(tau, wp).mul_i64(60, prec),
        eisenstein_g6(tau, wp).mul_i64(140, prec),
    )
}

/// Shared reduce-evaluate scaffolding for theta-built forms. Returns
/// the value at the reduced point plus the cocycle (if any) for the
/// caller to divide out at its weight.
fn reduced_theta_form(
    tau: &BallComplex,
    prec: u32,
    build: impl Fn(&BallComplex, &BallComplex, &BallComplex, u32) -> BallComplex,
) -> (BallComplex, Option<(BallComplex, u32)>) {
    if tau.is_indeterminate() {
        return (BallComplex::indeterminate(), None);
    }
    let wp = prec + 24;
    let (g, w) = reduce_fundamental(tau, REDUCE_EPS, wp);
    let (t2, t3, t4) = theta_const(&w, wp);
    let at_w = build(&t2, &t3, &t4, wp);
    if g.is_identity() {
        (at_w, None)
    } else {
        (at_w, Some((g.cocycle(tau, wp), prec)))
    }
}

/// The anharmonic (Moebius-on-lambda) matrix of a group element:
/// the image of g under the homomorphism `PSL(2,Z) -> S3` sending
/// `T -> x/(x-1)` and `S -> 1-x`, as an integer Moebius matrix.
fn anharmonic_action(g: &ModularGroupElement) -> [i64; 4] {
    // Decompose g into T^q S factors by the Euclidean algorithm on the
    // bottom row, composing the lambda-side images as we go.
    const T: [i64; 4] = [1, 0, 1, -1]; // x -> x/(x-1), an involution
    const S: [i64; 4] = [-1, 1, 0, 1]; // x -> 1-x, an involution

    let (a, b, c, d) = g.entries();
    let mut m = [a.clone(), b.clone(), c.clone(), d.clone()];
    let mut acc = [1i64, 0, 0, 1];
    let mut steps = 0u32;
    while !m[2].is_zero() {
        steps += 1;
        assert!(steps < 10_000, "anharmonic decomposition runaway");
        // m = T^q * m', peel q = floor(a/c) translations.
        let (q, r) = m[0].div_rem_euclid(&m[2]);
        if !q.is_even() {
            acc = mobius_mul(acc, T);
        }
        // T^-q m = (r, b - q d; c, d); then S^-1 (T^-q m) swaps rows.
        let b_new = &m[1] - &(&q * &m[3]);
        m = [m[2].clone(), m[3].clone(), -r, -b_new];
        acc = mobius_mul(acc, S);
    }
    // Remaining translation T^b (with a = d = +/-1).
    let shift = &m[1] * &m[3];
    if !shift.is_even() {
        acc = mobius_mul(acc, T);
    }
    acc
}

/// 2x2 integer Moebius composition with sign normalization.
fn mobius_mul(p: [i64; 4], q: [i64; 4]) -> [i64; 4] {
    let r = [
        p[0] * q[0] + p[1] * q[2],
        p[0] * q[1] + p[1] * q[3],
        p[2] * q[0] + p[3] * q[2],
        p[2] * q[1] + p[3] * q[3],
    ];
    // The anharmonic group is finite; keep representatives small.
    let g = r
        .iter()
        .map(|v| v.abs())
        .fold(0i64, |acc, v| gcd_i64(acc, v));
    if g > 1 {
        [r[0] / g, r[1] / g, r[2] / g, r[3] / g]
    } else {
        r
    }
}

fn gcd_i64(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd_i64(b, a % b)
    }
}

/// Applies the inverse of an anharmonic matrix to a lambda value.
fn apply_anharmonic_inverse(m: [i64; 4], x: &BallComplex, prec: u32) -> BallComplex {
    let wp = prec + 8;
    // Inverse of (a b; c d) up to scale is (d -b; -c a).
    let (a, b, c, d) = (m[3], -m[1], -m[2], m[0]);
    let num = x.mul_i64(a, wp).add(&BallComplex::from_i64(b, wp), wp);
    let den = x.mul_i64(c, wp).add(&BallComplex::from_i64(d, wp), wp);
    num.div(&den, prec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quintus_ball::Mag;
    use quintus_exact::Rational;

    fn approx_real(v: f64, prec: u32) -> BallComplex {
        let mut b = BallComplex::from_f64_pair(v, 0.0, prec);
        b.add_error(&Mag::from_f64(1.0e-10 * v.abs().max(1.0)));
        b
    }

    #[test]
    fn test_j_at_i_is_1728() {
        let j = j_invariant(&BallComplex::i(160), 160);
        assert!(j.overlaps(&BallComplex::from_i64(1728, 160)));
        assert!(j.is_real());
    }

    #[test]
    fn test_j_at_rho_is_tiny() {
        // rho = exp(2 pi i / 3); j has a triple zero there, so even from
        // an f64 approximation of rho the value is microscopic.
        let rho = BallComplex::from_f64_pair(-0.5, 0.866_025_403_784_438_6, 160);
        let j = j_invariant(&rho, 160);
        assert!(j.is_finite());
        assert!(j.abs_upper().to_f64() < 1.0e-28);
    }

    #[test]
    fn test_j_modular_invariance() {
        let tau = BallComplex::from_f64_pair(0.21, 1.4, 192);
        let g = ModularGroupElement::from_i64(2, 1, 5, 3);
        let moved = g.apply(&tau, 192);
        let a = j_invariant(&tau, 192);
        let b = j_invariant(&moved, 192);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_eta_at_i() {
        // eta(i) = Gamma(1/4) / (2 pi^(3/4)).
        let e = eta(&BallComplex::i(160), 160);
        assert!(e.overlaps(&approx_real(0.768_225_422_326_056_66, 160)));
    }

    #[test]
    fn test_eta_transformation_under_s() {
        // eta(-1/tau) = sqrt(-i tau) eta(tau), with tau unreduced so the
        // epsilon machinery actually runs.
        let prec = 192;
        let tau = BallComplex::from_f64_pair(0.37, 0.41, prec);
        let s = ModularGroupElement::inversion();
        let lhs = eta(&s.apply(&tau, prec), prec);
        let factor = tau.mul_i().neg().sqrt(prec);
        let rhs = factor.mul(&eta(&tau, prec), prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_eta_translation_period_24() {
        let prec = 160;
        let tau = BallComplex::from_f64_pair(0.1, 0.8, prec);
        let shifted = tau.add(&BallComplex::from_i64(24, prec), prec);
        assert!(eta(&shifted, prec).overlaps(&eta(&tau, prec)));
    }

    #[test]
    fn test_lambda_at_i() {
        // lambda(i) = 1/2.
        let l = lambda(&BallComplex::i(160), 160);
        let half = BallComplex::from_rational(&Rational::from_i64(1, 2), 160);
        assert!(l.overlaps(&half));
    }

    #[test]
    fn test_lambda_t_translation() {
        // lambda(tau + 1) = lambda / (lambda - 1).
        let prec = 192;
        let tau = BallComplex::from_f64_pair(0.15, 1.2, prec);
        let l = lambda(&tau, prec);
        let l1 = lambda(&tau.add(&BallComplex::one(prec), prec), prec);
        let expect = l.div(&l.sub(&BallComplex::one(prec), prec), prec);
        assert!(l1.overlaps(&expect));
    }

    #[test]
    fn test_e4_automorphy() {
        let prec = 192;
        let tau = BallComplex::from_f64_pair(0.31, 0.77, prec);
        let g = ModularGroupElement::from_i64(1, 0, 1, 1);
        let moved = g.apply(&tau, prec);
        let lhs = eisenstein_e4(&moved, prec);
        let cz = g.cocycle(&tau, prec);
        let rhs = cz.pow_i(4, prec).mul(&eisenstein_e4(&tau, prec), prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_e2_quasi_modularity_under_s() {
        // E2(-1/tau) = tau^2 E2(tau) - 6 i tau / pi.
        let prec = 192;
        let tau = BallComplex::from_f64_pair(0.2, 0.9, prec);
        let s = ModularGroupElement::inversion();
        let lhs = eisenstein_e2(&s.apply(&tau, prec), prec);
        let pi = BallReal::pi(prec);
        let corr = tau.mul_i64(6, prec).div_real(&pi, prec).mul_i();
        let rhs = tau
            .mul(&tau, prec)
            .mul(&eisenstein_e2(&tau, prec), prec)
            .sub(&corr, prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_discriminant_identity() {
        // 1728 Delta = (4 pi^4 E4 / 3... ) — use j = E4^3 * 1728 / (E4^3 - E6^2)
        // in the equivalent form E4^3 - E6^2 = 1728 eta^24.
        let prec = 224;
        let tau = BallComplex::from_f64_pair(0.123, 1.05, prec);
        let e4 = eisenstein_e4(&tau, prec);
        let e6 = eisenstein_e6(&tau, prec);
        let lhs = e4.pow_i(3, prec).sub(&e6.pow_i(2, prec), prec);
        let rhs = delta(&tau, prec).mul_i64(1728, prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_j_from_eisenstein() {
        let prec = 224;
        let tau = BallComplex::from_f64_pair(-0.4, 1.3, prec);
        let e4 = eisenstein_e4(&tau, prec);
        let num = e4.pow_i(3, prec).mul_i64(1728, prec);
        let den = delta(&tau, prec).mul_i64(1728, prec);
        let viaforms = num.div(&den, prec);
        assert!(j_invariant(&tau, prec).overlaps(&viaforms));
    }
}
