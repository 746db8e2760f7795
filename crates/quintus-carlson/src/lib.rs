//! # quintus-carlson
//!
//! Carlson symmetric elliptic integrals R_F, R_C, R_D, R_J and R_G
//! over complex balls.
//!
//! Each evaluation is a small state machine: validate the arguments
//! (indeterminate and multi-zero configurations are answered with an
//! indeterminate ball, never an error), run the AGM-style duplication
//! until the arguments cluster around their mean, then sum the
//! multivariate Taylor tail with exact rational coefficients and a
//! rigorous geometric bound on the neglected degrees. R_J additionally
//! dispatches on cheap sufficient validity conditions and falls back
//! to contour integration when duplication is not provably applicable
//! to its arguments.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod integration;
pub mod series;

#[cfg(test)]
mod proptests;

use integration::rj_via_integration;
use quintus_ball::{BallComplex, Mag};
use series::{inv_sqrt, rf_series_sum, rj_series_sum, series_order, series_tail};

/// Duplication iteration cap; each step shrinks the spread fourfold.
fn dup_iter_cap(prec: u32) -> u32 {
    prec / 2 + 80
}

/// Spread target so the tail at the chosen order clears the precision.
fn eps_target(prec: u32, order: u32) -> Mag {
    let bits = (i64::from(prec) + 20) / (i64::from(order) + 1) + 1;
    Mag::from_2exp(-bits)
}

/// True when the ball is certainly a non-negative real number.
fn certainly_nonneg_real(x: &BallComplex) -> bool {
    x.is_real() && (x.re().is_positive() || x.re().is_exact_zero())
}

/// True when the ball is certainly a positive real number.
fn certainly_pos_real(x: &BallComplex) -> bool {
    x.is_real() && x.re().is_positive()
}

/// Counts arguments that may be zero.
fn possible_zeros(args: &[&BallComplex]) -> usize {
    args.iter().filter(|a| a.contains_zero()).count()
}

/// Carlson's R_F(x, y, z).
///
/// Indeterminate for non-finite arguments or when more than one of the
/// three may vanish.
#[must_use]
pub fn rf(x: &BallComplex, y: &BallComplex, z: &BallComplex, prec: u32) -> BallComplex {
    if x.is_indeterminate() || y.is_indeterminate() || z.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    if possible_zeros(&[x, y, z]) > 1 {
        return BallComplex::indeterminate();
    }
    let order = series_order(prec);
    let wp = prec + 32;
    let third = BallComplex::from_i64(3, wp).inv(wp);
    let mut a = x.add(y, wp).add(z, wp).mul(&third, wp);
    let mut xx = x.clone();
    let mut yy = y.clone();
    let mut zz = z.clone();

    let target = eps_target(prec, order);
    let mut prev = Mag::inf();
    let mut stall = 0u32;
    for _ in 0..dup_iter_cap(prec) {
        let eps = spread3(&xx, &yy, &zz, &a, wp);
        if eps.cmp_mag(&target) != std::cmp::Ordering::Greater {
            break;
        }
        // Guard against non-convergence: demand real progress.
        if eps.cmp_mag(&prev.mul(&Mag::from_f64(0.875))) != std::cmp::Ordering::Less {
            stall += 1;
            if stall >= 3 {
                break;
            }
        } else {
            stall = 0;
        }
        prev = eps;
        let sx = xx.sqrt(wp);
        let sy = yy.sqrt(wp);
        let sz = zz.sqrt(wp);
        let lam = sx.mul(&sy, wp).add(&sy.mul(&sz, wp), wp).add(&sz.mul(&sx, wp), wp);
        xx = xx.add(&lam, wp).mul_2exp(-2);
        yy = yy.add(&lam, wp).mul_2exp(-2);
        zz = zz.add(&lam, wp).mul_2exp(-2);
        a = a.add(&lam, wp).mul_2exp(-2);
    }
    let one = BallComplex::one(wp);
    let bx = one.sub(&xx.div(&a, wp), wp);
    let by = one.sub(&yy.div(&a, wp), wp);
    let bz = bx.add(&by, wp).neg();
    let e2 = bx.mul(&by, wp).sub(&bz.mul(&bz, wp), wp);
    let e3 = bx.mul(&by, wp).mul(&bz, wp);
    let mut sum = rf_series_sum(&e2, &e3, order, wp);
    let eps_final = bx.abs_upper().max(&by.abs_upper()).max(&bz.abs_upper());
    sum.add_error(&series_tail(&eps_final, order));
    inv_sqrt(&a, wp).mul(&sum, prec)
}

/// Largest relative deviation of the iterates from their mean.
fn spread3(
    xx: &BallComplex,
    yy: &BallComplex,
    zz: &BallComplex,
    a: &BallComplex,
    wp: u32,
) -> Mag {
    let one = BallComplex::one(wp);
    let dx = one.sub(&xx.div(a, wp), wp).abs_upper();
    let dy = one.sub(&yy.div(a, wp), wp).abs_upper();
    let dz = one.sub(&zz.div(a, wp), wp).abs_upper();
    dx.max(&dy).max(&dz)
}

/// Carlson's degenerate R_C(x, y) = R_F(x, y, y).
#[must_use]
pub fn rc(x: &BallComplex, y: &BallComplex, prec: u32) -> BallComplex {
    rf(x, y, y, prec)
}

/// `R_C(1, 1 + e)`: the auxiliary value feeding R_J's correction sum.
///
/// A short alternating series `sum (-1)^k e^k / (2k+1)` when `e` is
/// small, the arctangent closed form otherwise.
fn rc1(e: &BallComplex, prec: u32) -> BallComplex {
    if e.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 16;
    let emag = e.abs_upper();
    if emag.cmp_mag(&Mag::from_2exp(-1)) == std::cmp::Ordering::Less {
        let mut sum = BallComplex::zero(wp);
        let mut pow = BallComplex::one(wp);
        let cutoff = Mag::from_2exp(-i64::from(prec + 12));
        let mut k: i64 = 0;
        loop {
            let term = pow.div(&BallComplex::from_i64(2 * k + 1, wp), wp);
            sum = if k % 2 == 0 {
                sum.add(&term, wp)
            } else {
                sum.sub(&term, wp)
            };
            let next_mag = emag.pow(u32::try_from(k + 1).unwrap_or(u32::MAX));
            if next_mag.cmp_mag(&cutoff) != std::cmp::Ordering::Greater || k > 4 * i64::from(prec)
            {
                sum.add_error(&next_mag.geom_series(&emag));
                return sum;
            }
            pow = pow.mul(e, wp);
            k += 1;
        }
    }
    // atan(sqrt(e)) / sqrt(e); |e| >= 1/2 keeps the root off zero.
    let q = e.sqrt(wp);
    if q.contains_zero() {
        return BallComplex::indeterminate();
    }
    q.atan(wp).div(&q, prec)
}

/// `R_C(alpha, beta) = alpha^(-1/2) R_C(1, beta/alpha)` via the
/// homogeneity of R_C, with the second argument written `1 + e`.
fn rc_scaled(alpha: &BallComplex, beta: &BallComplex, prec: u32) -> BallComplex {
    if alpha.contains_zero() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 8;
    let e = beta.div(alpha, wp).sub(&BallComplex::one(wp), wp);
    inv_sqrt(alpha, wp).mul(&rc1(&e, wp), prec)
}

/// Carlson's R_J(x, y, z, p).
///
/// Dispatch: duplication runs directly when a cheap sufficient
/// condition certifies it (non-negative reals with positive real p, a
/// conjugate pair with real x and p, or all arguments in the open
/// right half-plane); otherwise the integral is split and the head
/// integrated along a deformed contour. Branch-cut-straddling
/// configurations that defeat both roads come back indeterminate.
#[must_use]
pub fn rj(
    x: &BallComplex,
    y: &BallComplex,
    z: &BallComplex,
    p: &BallComplex,
    prec: u32,
) -> BallComplex {
    if x.is_indeterminate()
        || y.is_indeterminate()
        || z.is_indeterminate()
        || p.is_indeterminate()
    {
        return BallComplex::indeterminate();
    }
    if p.contains_zero() {
        return BallComplex::indeterminate();
    }
    if possible_zeros(&[x, y, z]) > 1 {
        return BallComplex::indeterminate();
    }
    if rj_duplication_applies(x, y, z, p) {
        return rj_duplication(x, y, z, p, prec);
    }
    rj_via_integration(x, y, z, p, prec, rj_duplication)
}

/// Cheap sufficient conditions for duplication to be provably valid.
fn rj_duplication_applies(
    x: &BallComplex,
    y: &BallComplex,
    z: &BallComplex,
    p: &BallComplex,
) -> bool {
    // All non-negative reals, positive p.
    if certainly_nonneg_real(x)
        && certainly_nonneg_real(y)
        && certainly_nonneg_real(z)
        && certainly_pos_real(p)
    {
        return true;
    }
    // A conjugate pair among x, y, z with the remaining argument (and
    // p) real; R_J is symmetric in the first three, so all pairings
    // count.
    let pairs = [(x, y, z), (x, z, y), (y, z, x)];
    for (u, v, rest) in pairs {
        if certainly_nonneg_real(rest)
            && certainly_pos_real(p)
            && u.sub(&v.conj(), 64).is_exact_zero()
        {
            return true;
        }
    }
    // Everything strictly in the right half-plane.
    x.re().is_positive() && y.re().is_positive() && z.re().is_positive() && p.re().is_positive()
}

/// Duplication plus series for R_J, assuming validity was established.
fn rj_duplication(
    x: &BallComplex,
    y: &BallComplex,
    z: &BallComplex,
    p: &BallComplex,
    prec: u32,
) -> BallComplex {
    let order = series_order(prec);
    let wp = prec + 32;
    let fifth = BallComplex::from_i64(5, wp).inv(wp);
    let mut a = x
        .add(y, wp)
        .add(z, wp)
        .add(&p.mul_2exp(1), wp)
        .mul(&fifth, wp);
    let mut xx = x.clone();
    let mut yy = y.clone();
    let mut zz = z.clone();
    let mut pp = p.clone();
    let mut csum = BallComplex::zero(wp);
    let mut fac = BallComplex::one(wp);

    let target = eps_target(prec, order);
    let mut prev = Mag::inf();
    let mut stall = 0u32;
    for _ in 0..dup_iter_cap(prec) {
        let eps = spread3(&xx, &yy, &zz, &a, wp).max(&spread1(&pp, &a, wp));
        if eps.cmp_mag(&target) != std::cmp::Ordering::Greater {
            break;
        }
        if eps.cmp_mag(&prev.mul(&Mag::from_f64(0.875))) != std::cmp::Ordering::Less {
            stall += 1;
            if stall >= 3 {
                break;
            }
        } else {
            stall = 0;
        }
        prev = eps;
        let sx = xx.sqrt(wp);
        let sy = yy.sqrt(wp);
        let sz = zz.sqrt(wp);
        let lam = sx.mul(&sy, wp).add(&sy.mul(&sz, wp), wp).add(&sz.mul(&sx, wp), wp);
        let root_sum = sx.add(&sy, wp).add(&sz, wp);
        let root_prod = sx.mul(&sy, wp).mul(&sz, wp);
        let alpha_root = pp.mul(&root_sum, wp).add(&root_prod, wp);
        let alpha = alpha_root.mul(&alpha_root, wp);
        let plam = pp.add(&lam, wp);
        let beta = pp.mul(&plam.mul(&plam, wp), wp);
        csum = csum.add(&fac.mul(&rc_scaled(&alpha, &beta, wp), wp), wp);
        fac = fac.mul_2exp(-2);
        xx = xx.add(&lam, wp).mul_2exp(-2);
        yy = yy.add(&lam, wp).mul_2exp(-2);
        zz = zz.add(&lam, wp).mul_2exp(-2);
        pp = pp.add(&lam, wp).mul_2exp(-2);
        a = a.add(&lam, wp).mul_2exp(-2);
    }
    let one = BallComplex::one(wp);
    let bx = one.sub(&xx.div(&a, wp), wp);
    let by = one.sub(&yy.div(&a, wp), wp);
    let bz = one.sub(&zz.div(&a, wp), wp);
    // X + Y + Z + 2P = 0 exactly.
    let bp = bx.add(&by, wp).add(&bz, wp).mul_2exp(-1).neg();

    let pair2 = bx.mul(&by, wp).add(&bx.mul(&bz, wp), wp).add(&by.mul(&bz, wp), wp);
    let s1 = bx.add(&by, wp).add(&bz, wp);
    let triple = bx.mul(&by, wp).mul(&bz, wp);
    let psq = bp.mul(&bp, wp);
    let e2 = pair2
        .add(&bp.mul(&s1, wp).mul_2exp(1), wp)
        .add(&psq, wp);
    let e3 = triple
        .add(&bp.mul(&pair2, wp).mul_2exp(1), wp)
        .add(&psq.mul(&s1, wp), wp);
    let e4 = bp
        .mul(&triple, wp)
        .mul_2exp(1)
        .add(&psq.mul(&pair2, wp), wp);
    let e5 = psq.mul(&triple, wp);

    let mut series = rj_series_sum(&e2, &e3, &e4, &e5, order, wp);
    let eps_final = bx
        .abs_upper()
        .max(&by.abs_upper())
        .max(&bz.abs_upper())
        .max(&bp.abs_upper());
    series.add_error(&series_tail(&eps_final, order));

    let a_pow = inv_sqrt(&a, wp).pow_i(3, wp);
    csum.mul_i64(3, wp)
        .add(&fac.mul(&a_pow, wp).mul(&series, wp), prec)
}

fn spread1(pp: &BallComplex, a: &BallComplex, wp: u32) -> Mag {
    BallComplex::one(wp)
        .sub(&pp.div(a, wp), wp)
        .abs_upper()
}

/// Carlson's R_D(x, y, z) = R_J(x, y, z, z), exactly.
#[must_use]
pub fn rd(x: &BallComplex, y: &BallComplex, z: &BallComplex, prec: u32) -> BallComplex {
    rj(x, y, z, z, prec)
}

/// Carlson's R_G(x, y, z).
///
/// Evaluated through the R_F/R_D relation pivoted on an argument that
/// is certainly non-zero; the doubly-degenerate cases collapse to a
/// square root.
#[must_use]
pub fn rg(x: &BallComplex, y: &BallComplex, z: &BallComplex, prec: u32) -> BallComplex {
    if x.is_indeterminate() || y.is_indeterminate() || z.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    // R_G tolerates two zeros: R_G(0, 0, z) = sqrt(z)/2.
    let exact_zeros = [x, y, z].iter().filter(|a| a.is_exact_zero()).count();
    if exact_zeros >= 2 {
        let live = if !x.is_exact_zero() {
            x
        } else if !y.is_exact_zero() {
            y
        } else {
            z
        };
        return live.sqrt(prec).mul_2exp(-1);
    }
    if possible_zeros(&[x, y, z]) > 1 {
        return BallComplex::indeterminate();
    }
    // Pivot on the largest certainly-nonzero argument.
    let mut args = [x, y, z];
    let mut pivot = 0usize;
    for (i, a) in args.iter().enumerate() {
        if a.abs_lower().cmp_mag(&args[pivot].abs_lower()) == std::cmp::Ordering::Greater {
            pivot = i;
        }
    }
    args.swap(2, pivot);
    let (px, py, pz) = (args[0], args[1], args[2]);
    if pz.contains_zero() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 16;
    let f = rf(px, py, pz, wp);
    let d = rd(px, py, pz, wp);
    let dx = px.sub(pz, wp);
    let dy = py.sub(pz, wp);
    let third = BallComplex::from_i64(3, wp).inv(wp);
    let correction = dx.mul(&dy, wp).mul(&d, wp).mul(&third, wp);
    let root = px
        .sqrt(wp)
        .mul(&py.sqrt(wp), wp)
        .div(&pz.sqrt(wp), wp);
    pz.mul(&f, wp)
        .sub(&correction, wp)
        .add(&root, prec)
        .mul_2exp(-1)
}
