//! Contour-integration fallback for R_J.
//!
//! Duplication for R_J is only provably correct under sign and reality
//! conditions on the arguments. When none of the cheap sufficient
//! conditions hold, the integral is split as
//!
//!   R_J(x,y,z,p) = (3/2) int_0^N f(t) dt + R_J(x+N, y+N, z+N, p+N)
//!
//! with `N` real and large enough that the shifted arguments all have
//! strictly positive real part (where duplication is valid again), and
//! the head integrated along a path deformed off the real axis to
//! stay clear of the branch points `-x, -y, -z` and the pole `-p`.
//! A path that still runs into a cut shows up as indeterminate node
//! evaluations, and the fallback reports indeterminate rather than
//! pick a sheet — the known hard case, left best-effort on purpose.

use quintus_ball::{BallComplex, Mag};
use quintus_quad::integrate_polyline;

/// The integrand `1 / ((t+p) sqrt(t+x) sqrt(t+y) sqrt(t+z))`, with the
/// root of each factor taken separately so each stays on its own
/// principal branch.
fn rj_integrand(
    t: &BallComplex,
    x: &BallComplex,
    y: &BallComplex,
    z: &BallComplex,
    p: &BallComplex,
    prec: u32,
) -> BallComplex {
    let wp = prec + 8;
    let sx = t.add(x, wp).sqrt(wp);
    let sy = t.add(y, wp).sqrt(wp);
    let sz = t.add(z, wp).sqrt(wp);
    let pole = t.add(p, wp);
    let den = pole.mul(&sx, wp).mul(&sy, wp).mul(&sz, wp);
    den.inv(prec)
}

/// Head integral plus shifted tail. `shifted_rj` evaluates R_J at the
/// shifted arguments (the caller supplies its duplication routine, so
/// this module stays free of the dispatch above it).
pub(crate) fn rj_via_integration(
    x: &BallComplex,
    y: &BallComplex,
    z: &BallComplex,
    p: &BallComplex,
    prec: u32,
    shifted_rj: impl Fn(&BallComplex, &BallComplex, &BallComplex, &BallComplex, u32) -> BallComplex,
) -> BallComplex {
    let wp = prec + 16;
    // Push everything into the right half-plane.
    let biggest = x
        .abs_upper()
        .max(&y.abs_upper())
        .max(&z.abs_upper())
        .max(&p.abs_upper());
    let shift = biggest.mul_2exp(1).add(&Mag::from_2exp(0)).to_f64().ceil();
    if !shift.is_finite() {
        return BallComplex::indeterminate();
    }
    let n_shift = BallComplex::from_f64_pair(shift, 0.0, wp);

    let xs = x.add(&n_shift, wp);
    let ys = y.add(&n_shift, wp);
    let zs = z.add(&n_shift, wp);
    let ps = p.add(&n_shift, wp);
    let tail = shifted_rj(&xs, &ys, &zs, &ps, wp);
    if tail.is_indeterminate() {
        return BallComplex::indeterminate();
    }

    // Deform away from the branch points: arguments with positive
    // imaginary part put their branch points -xi below the axis, so
    // the path bumps up, and vice versa.
    let im_sum = x.im().mid_f64() + y.im().mid_f64() + z.im().mid_f64() + p.im().mid_f64();
    let magnitude = (shift / 4.0).max(1.0);
    let bump = if im_sum >= 0.0 { magnitude } else { -magnitude };
    let path = [
        BallComplex::zero(wp),
        BallComplex::from_f64_pair(0.0, bump, wp),
        BallComplex::from_f64_pair(shift, bump, wp),
        BallComplex::from_f64_pair(shift, 0.0, wp),
    ];
    let tol = Mag::from_2exp(-i64::from(prec + 8));
    let integrand =
        |t: &BallComplex, ip: u32| rj_integrand(t, x, y, z, p, ip);
    let head = integrate_polyline(&integrand, &path, wp, &tol);
    if head.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    let three_halves = BallComplex::from_i64(3, wp).mul_2exp(-1);
    head.mul(&three_halves, wp).add(&tail, prec)
}
