//! # quintus-quad
//!
//! Ball-valued tanh-sinh quadrature along straight segments and polyline
//! paths in the complex plane.
//!
//! The integrand is evaluated at every node in ball arithmetic, so all
//! function-evaluation error lands rigorously in the result radius. The
//! quadrature discretization error is controlled the standard tanh-sinh
//! way: levels halve the step until two successive levels agree, and the
//! observed level-to-level difference plus the truncation tail of the
//! node sum are folded into the radius. An integrand that is analytic in
//! a neighbourhood of the path converges double-exponentially; one that
//! is not will stall the refinement, and the integrator answers with an
//! indeterminate ball rather than a confident wrong one.
//!
//! Consumed by the Carlson layer for arguments that defeat the
//! duplication algorithm; nothing else in the library integrates.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use quintus_ball::{BallComplex, BallReal, Mag};

/// Hard cap on refinement levels; each level doubles the node count.
const MAX_LEVEL: u32 = 12;

/// Consecutive negligible terms required before a level's sum is cut off.
const TAIL_RUN: u32 = 3;

/// Integrates `f` along the straight segment from `a` to `b`.
///
/// `tol` is the absolute accuracy requested of the discretization; the
/// returned radius also carries the (rigorous) per-node enclosure error.
/// Returns an indeterminate ball when refinement stalls before reaching
/// `tol`, which is what happens when the integrand is not analytic near
/// the path.
pub fn integrate_segment<F>(f: &F, a: &BallComplex, b: &BallComplex, prec: u32, tol: &Mag) -> BallComplex
where
    F: Fn(&BallComplex, u32) -> BallComplex,
{
    if a.is_indeterminate() || b.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    let wp = prec + 16;
    let center = a.add(b, wp).mul_2exp(-1);
    let half = b.sub(a, wp).mul_2exp(-1);

    let mut prev: Option<BallComplex> = None;
    let mut prev_err = Mag::inf();
    let mut stalls = 0u32;

    for level in 0..=MAX_LEVEL {
        let sum = level_sum(f, &center, &half, level, wp, tol);
        if sum.is_indeterminate() {
            return BallComplex::indeterminate();
        }
        if let Some(ref p) = prev {
            let err = level_delta(p, &sum, wp);
            if err.cmp_mag(tol) != std::cmp::Ordering::Greater {
                let mut out = sum;
                out.add_error(&err);
                return out;
            }
            // Require at least a halving per level, else count a stall.
            if err.cmp_mag(&prev_err.mul_2exp(-1)) == std::cmp::Ordering::Greater {
                stalls += 1;
                if stalls >= 2 {
                    return BallComplex::indeterminate();
                }
            } else {
                stalls = 0;
            }
            prev_err = err;
        }
        prev = Some(sum);
    }
    BallComplex::indeterminate()
}

/// Integrates `f` along the polyline through `points`.
///
/// The tolerance applies per segment; segments report indeterminate
/// independently and indeterminacy propagates to the total.
pub fn integrate_polyline<F>(f: &F, points: &[BallComplex], prec: u32, tol: &Mag) -> BallComplex
where
    F: Fn(&BallComplex, u32) -> BallComplex,
{
    if points.len() < 2 {
        return BallComplex::zero(prec);
    }
    let mut total = BallComplex::zero(prec + 16);
    for pair in points.windows(2) {
        let part = integrate_segment(f, &pair[0], &pair[1], prec, tol);
        total = total.add(&part, prec + 16);
    }
    total
}

/// One tanh-sinh level: step `2^-level`, summed over nodes `k * h` until
/// the weighted terms drop below notice for a few nodes running.
fn level_sum<F>(
    f: &F,
    center: &BallComplex,
    half: &BallComplex,
    level: u32,
    wp: u32,
    tol: &Mag,
) -> BallComplex
where
    F: Fn(&BallComplex, u32) -> BallComplex,
{
    #[allow(clippy::cast_possible_wrap)]
    let h_exp = -(level as i32);
    let h = BallReal::one(wp).mul_2exp(h_exp);
    let cutoff = tol.mul_2exp(-8);

    let mut sum = BallComplex::zero(wp);
    // Center node (k = 0).
    let (x0, w0) = tanh_sinh_node(&BallReal::zero(wp), wp);
    sum = sum.add(&weighted_eval(f, center, half, &x0, &w0, wp), wp);

    for sign in [1i64, -1i64] {
        let mut quiet = 0u32;
        let mut k: i64 = 1;
        loop {
            let t = h.mul_i64(sign * k, wp);
            let (x, w) = tanh_sinh_node(&t, wp);
            if w.is_indeterminate() {
                return BallComplex::indeterminate();
            }
            let term = weighted_eval(f, center, half, &x, &w, wp);
            if term.is_indeterminate() {
                return BallComplex::indeterminate();
            }
            sum = sum.add(&term, wp);
            let mag = term.abs_upper();
            if mag.cmp_mag(&cutoff) != std::cmp::Ordering::Greater {
                quiet += 1;
                if quiet >= TAIL_RUN {
                    // The tail decays double-exponentially; charge a
                    // geometric bound on what was cut off.
                    let tail = mag.geom_series(&Mag::from_f64(0.5));
                    sum.add_error(&tail);
                    break;
                }
            } else {
                quiet = 0;
            }
            k += 1;
            if k > (1_i64 << 24) {
                return BallComplex::indeterminate();
            }
        }
    }
    sum.mul_real(&h, wp)
}

/// The tanh-sinh abscissa and weight at parameter `t`:
/// `x = tanh(u)`, `w = (pi/2) cosh(t) / cosh(u)^2` with
/// `u = (pi/2) sinh(t)`.
fn tanh_sinh_node(t: &BallReal, wp: u32) -> (BallReal, BallReal) {
    let half_pi = BallReal::pi(wp).mul_2exp(-1);
    let (sinh_t, cosh_t) = t.sinh_cosh(wp);
    let u = half_pi.mul(&sinh_t, wp);
    let (sinh_u, cosh_u) = u.sinh_cosh(wp);
    let x = sinh_u.div(&cosh_u, wp);
    let w = half_pi
        .mul(&cosh_t, wp)
        .div(&cosh_u.mul(&cosh_u, wp), wp);
    (x, w)
}

/// Evaluates `w * f(center + x * half) * half`.
fn weighted_eval<F>(
    f: &F,
    center: &BallComplex,
    half: &BallComplex,
    x: &BallReal,
    w: &BallReal,
    wp: u32,
) -> BallComplex
where
    F: Fn(&BallComplex, u32) -> BallComplex,
{
    let z = center.add(&half.mul_real(x, wp), wp);
    f(&z, wp).mul_real(w, wp).mul(half, wp)
}

/// Magnitude of the difference of two successive level sums.
fn level_delta(a: &BallComplex, b: &BallComplex, wp: u32) -> Mag {
    a.sub(b, wp).abs_upper()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_constant() {
        // Integral of 1 from 0 to 1+i is 1+i.
        let a = BallComplex::zero(64);
        let b = BallComplex::from_f64_pair(1.0, 1.0, 64);
        let one = |_z: &BallComplex, p: u32| BallComplex::one(p);
        let r = integrate_segment(&one, &a, &b, 64, &Mag::from_2exp(-60));
        assert!(r.overlaps(&b));
    }

    #[test]
    fn test_integrate_quadratic() {
        // Integral of z^2 from 0 to 2 is 8/3.
        let a = BallComplex::zero(96);
        let b = BallComplex::from_i64(2, 96);
        let sq = |z: &BallComplex, p: u32| z.mul(z, p);
        let r = integrate_segment(&sq, &a, &b, 96, &Mag::from_2exp(-80));
        let expected =
            BallComplex::from_rational(&quintus_exact::Rational::from_i64(8, 3), 96);
        assert!(r.overlaps(&expected));
        assert!(r.rel_accuracy_bits() > 60);
    }

    #[test]
    fn test_integrate_reciprocal_quarter_circle_path() {
        // Integral of 1/z along the polyline 1 -> 1+i -> i equals
        // i*pi/2 (log branch: from 1 to i counterclockwise).
        let pts = [
            BallComplex::one(128),
            BallComplex::from_f64_pair(1.0, 1.0, 128),
            BallComplex::i(128),
        ];
        let inv = |z: &BallComplex, p: u32| z.inv(p);
        let r = integrate_polyline(&inv, &pts, 128, &Mag::from_2exp(-100));
        let expected = BallComplex::from_re_im(
            BallReal::zero(128),
            BallReal::pi(128).mul_2exp(-1),
        );
        assert!(r.overlaps(&expected));
    }

    #[test]
    fn test_singular_on_path_is_indeterminate() {
        // 1/z with the path through the origin: nodes hit enclosures of
        // zero and the evaluation goes indeterminate.
        let a = BallComplex::from_i64(-1, 64);
        let b = BallComplex::one(64);
        let inv = |z: &BallComplex, p: u32| z.inv(p);
        let r = integrate_segment(&inv, &a, &b, 64, &Mag::from_2exp(-40));
        assert!(r.is_indeterminate());
    }
}
