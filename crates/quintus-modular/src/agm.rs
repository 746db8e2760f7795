//! The arithmetic-geometric mean and complete elliptic integrals.
//!
//! `K(m) = pi / (2 AGM(1, sqrt(1-m)))` converges quadratically, which
//! is why the zeroth-order value comes from the AGM rather than theta
//! series. Derivative jets run the same recursion over short power
//! series: the constant terms converge exactly as in the scalar case
//! and the higher coefficients are dragged along, after which the K
//! jet is one series division away.
//!
//! Branch discipline: each geometric-mean step picks the square root
//! lying within a quarter turn of the arithmetic mean. When ball
//! arithmetic cannot decide that test the result is indeterminate; no
//! silent branch guessing.

use quintus_ball::jet::{jet_add, jet_div_trunc, jet_mul_trunc, jet_one, jet_sqrt_trunc};
use quintus_ball::{BallComplex, BallReal, Mag};

/// Iteration cap: quadratic convergence makes this generous.
fn agm_iter_cap(prec: u32) -> u32 {
    2 * (32 - prec.leading_zeros()) + 40
}

/// The arithmetic-geometric mean of two complex balls.
///
/// Exact zeros collapse to zero; an argument that merely straddles
/// zero, or a branch test that cannot be decided, yields indeterminate.
#[must_use]
pub fn agm(a: &BallComplex, b: &BallComplex, prec: u32) -> BallComplex {
    if a.is_indeterminate() || b.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    if a.is_exact_zero() || b.is_exact_zero() {
        return BallComplex::zero(prec);
    }
    if a.contains_zero() || b.contains_zero() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 24;
    let mut x = a.clone();
    let mut y = b.clone();
    let target = Mag::from_2exp(-i64::from(prec + 10));
    for _ in 0..agm_iter_cap(prec) {
        let diff = x.sub(&y, wp);
        let scale = x.abs_upper().max(&Mag::from_2exp(0));
        if diff.abs_upper().cmp_mag(&scale.mul(&target)) != std::cmp::Ordering::Greater {
            // The limit is a mean: it lies within |x - y| of x.
            let mut out = x;
            out.add_error(&diff.abs_upper());
            return out;
        }
        let am = x.add(&y, wp).mul_2exp(-1);
        let gm = match oriented_sqrt(&x.mul(&y, wp), &am, wp) {
            Some(g) => g,
            None => return BallComplex::indeterminate(),
        };
        x = am;
        y = gm;
    }
    BallComplex::indeterminate()
}

/// The square root of `p` on the branch within a quarter turn of
/// `anchor`, or `None` when the test cannot be decided.
fn oriented_sqrt(p: &BallComplex, anchor: &BallComplex, wp: u32) -> Option<BallComplex> {
    let s = p.sqrt(wp);
    if s.is_indeterminate() {
        return None;
    }
    let dot = s.mul(&anchor.conj(), wp);
    if dot.re().is_positive() {
        Some(s)
    } else if dot.re().is_negative() {
        Some(s.neg())
    } else if s.contains_zero() {
        // Degenerate product; the root is tiny and either sign encloses.
        Some(s)
    } else {
        None
    }
}

/// Complete elliptic integral of the first kind, parameter convention
/// `K(m) = int_0^(pi/2) (1 - m sin^2 t)^(-1/2) dt`.
///
/// `m = 0` returns the exact `pi/2` ball; `m = 1` diverges and returns
/// indeterminate, as does any `m` whose ball meets 1.
#[must_use]
pub fn elliptic_k(m: &BallComplex, prec: u32) -> BallComplex {
    if m.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    if m.is_exact_zero() {
        return BallComplex::from_real(BallReal::pi(prec).mul_2exp(-1), prec);
    }
    let wp = prec + 16;
    let one = BallComplex::one(wp);
    let one_minus = one.sub(m, wp);
    if one_minus.contains_zero() {
        return BallComplex::indeterminate();
    }
    let mean = agm(&one, &one_minus.sqrt(wp), wp);
    if mean.contains_zero() {
        return BallComplex::indeterminate();
    }
    BallComplex::from_real(BallReal::pi(wp), wp)
        .div(&mean.mul_2exp(1), prec)
}

/// Complete elliptic integral of the second kind
/// `E(m) = int_0^(pi/2) (1 - m sin^2 t)^(1/2) dt`.
///
/// Runs the AGM with the classical `c_n` bookkeeping:
/// `E = K (1 - sum 2^(n-1) c_n^2)`.
#[must_use]
pub fn elliptic_e(m: &BallComplex, prec: u32) -> BallComplex {
    if m.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    if m.is_exact_zero() {
        return BallComplex::from_real(BallReal::pi(prec).mul_2exp(-1), prec);
    }
    let one_test = BallComplex::one(prec).sub(m, prec);
    if one_test.is_exact_zero() {
        return BallComplex::one(prec);
    }
    let wp = prec + 24;
    let one = BallComplex::one(wp);
    let kprime_sq = one.sub(m, wp);
    if kprime_sq.contains_zero() {
        return BallComplex::indeterminate();
    }
    let mut x = one.clone();
    let mut y = kprime_sq.sqrt(wp);
    // c_0^2 = m, weight 2^(-1).
    let mut csum = m.mul_2exp(-1);
    let mut weight: i32 = 0;
    let target = Mag::from_2exp(-i64::from(prec + 10));
    for _ in 0..agm_iter_cap(prec) {
        let c = x.sub(&y, wp).mul_2exp(-1);
        let c_sq = c.mul(&c, wp);
        let term = c_sq.mul_2exp(weight);
        let diff_small = x
            .sub(&y, wp)
            .abs_upper()
            .cmp_mag(&x.abs_lower().mul_2exp(-3))
            != std::cmp::Ordering::Greater;
        if term.abs_upper().cmp_mag(&target) != std::cmp::Ordering::Greater
            && weight > 0
            && diff_small
        {
            // With |x - y| <= |x|/8 the next weighted term is below a
            // four-hundredth of this one; the rest of the sum is below
            // twice this term.
            csum.add_error(&term.abs_upper().mul_2exp(1));
            let diff = x.sub(&y, wp);
            let mut mean = x;
            mean.add_error(&diff.abs_upper());
            if mean.contains_zero() {
                return BallComplex::indeterminate();
            }
            let k = BallComplex::from_real(BallReal::pi(wp), wp).div(&mean.mul_2exp(1), wp);
            return one.sub(&csum, wp).mul(&k, prec);
        }
        csum = csum.add(&term, wp);
        weight += 1;
        let am = x.add(&y, wp).mul_2exp(-1);
        let gm = match oriented_sqrt(&x.mul(&y, wp), &am, wp) {
            Some(g) => g,
            None => return BallComplex::indeterminate(),
        };
        x = am;
        y = gm;
    }
    BallComplex::indeterminate()
}

/// Length-`len` jet of `K` around `m`: coefficient k is the k-th
/// derivative over k!.
///
/// The AGM recursion runs directly on jets in the parameter; once the
/// scalar parts meet, the series have converged to the same order and
/// `K`'s jet is `pi/2` times the reciprocal jet.
#[must_use]
pub fn elliptic_k_jet(m: &BallComplex, len: usize, prec: u32) -> Vec<BallComplex> {
    let len = len.max(1);
    if len == 1 {
        return vec![elliptic_k(m, prec)];
    }
    if m.is_indeterminate() {
        return vec![BallComplex::indeterminate(); len];
    }
    let wp = prec + 24 + 4 * u32::try_from(len).unwrap_or(32);
    // Jet of 1 - m - t in the perturbation t.
    let mut inner = vec![BallComplex::zero(wp); len];
    inner[0] = BallComplex::one(wp).sub(m, wp);
    inner[1] = BallComplex::one(wp).neg();
    if inner[0].contains_zero() {
        return vec![BallComplex::indeterminate(); len];
    }
    let mut x = jet_one(len, wp);
    let mut y = jet_sqrt_trunc(&inner, len, wp);
    let target = Mag::from_2exp(-i64::from(prec + 10));
    for _ in 0..agm_iter_cap(prec) {
        let mut worst = Mag::zero();
        for (xc, yc) in x.iter().zip(y.iter()) {
            worst = worst.max(&xc.sub(yc, wp).abs_upper());
        }
        if worst.cmp_mag(&target) != std::cmp::Ordering::Greater {
            for (xc, yc) in x.iter_mut().zip(y.iter()) {
                let d = xc.sub(yc, wp).abs_upper();
                xc.add_error(&d);
            }
            if x[0].contains_zero() {
                return vec![BallComplex::indeterminate(); len];
            }
            let pi_jet = {
                let mut p = vec![BallComplex::zero(wp); len];
                p[0] = BallComplex::from_real(BallReal::pi(wp).mul_2exp(-1), wp);
                p
            };
            return jet_div_trunc(&pi_jet, &x, len, prec);
        }
        let am: Vec<BallComplex> = jet_add(&x, &y, wp)
            .iter()
            .map(|c| c.mul_2exp(-1))
            .collect();
        let prod = jet_mul_trunc(&x, &y, len, wp);
        let mut gm = jet_sqrt_trunc(&prod, len, wp);
        if gm[0].is_indeterminate() {
            return vec![BallComplex::indeterminate(); len];
        }
        // Same branch test as the scalar AGM, on the constant terms.
        let dot = gm[0].mul(&am[0].conj(), wp);
        if dot.re().is_negative() {
            gm = gm.iter().map(BallComplex::neg).collect();
        } else if !dot.re().is_positive() {
            return vec![BallComplex::indeterminate(); len];
        }
        x = am;
        y = gm;
    }
    vec![BallComplex::indeterminate(); len]
}
