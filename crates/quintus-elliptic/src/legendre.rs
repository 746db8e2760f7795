//! Incomplete Legendre elliptic integrals F, E and Pi.
//!
//! Everything funnels through one scheme: peel the exact special cases
//! off the top (zero amplitude, zero parameter, complete amplitude),
//! count how many half-periods pi the real part of phi spans, reduce
//! to the principal strip `|Re phi| <= pi/2`, and evaluate there via
//! the Carlson integrals. The half-period count comes from a floor
//! whose enclosure can straddle two integers; both branches are then
//! evaluated and their union returned, which keeps the result an
//! enclosure at the cost of width instead of guessing a branch.
//!
//! The `_times_pi` conventions take the amplitude as a multiple of pi,
//! which makes the floor exact wherever the caller's amplitude is.

use quintus_ball::{BallComplex, BallReal};
use quintus_carlson::{rf, rj, rd};
use quintus_modular::{elliptic_e as complete_e, elliptic_k as complete_k};

/// Half-period counts: one or (for a straddling floor) two candidates.
enum HalfPeriods {
    Unique(i64),
    Straddle(i64, i64),
    OutOfRange,
}

/// Floor of a real ball, admitting a one-step straddle.
fn floor_candidates(t: &BallReal) -> HalfPeriods {
    if t.is_indeterminate() {
        return HalfPeriods::OutOfRange;
    }
    let mid = t.mid_f64();
    let rad = t.rad().to_f64();
    if !mid.is_finite() || !rad.is_finite() || mid.abs() > 1.0e15 || rad > 0.75 {
        return HalfPeriods::OutOfRange;
    }
    let lo = (mid - rad).floor();
    let hi = (mid + rad).floor();
    #[allow(clippy::cast_possible_truncation)]
    let (dl, dh) = (lo as i64, hi as i64);
    if dl == dh {
        HalfPeriods::Unique(dl)
    } else if dh == dl + 1 {
        HalfPeriods::Straddle(dl, dh)
    } else {
        HalfPeriods::OutOfRange
    }
}

/// The three integral kinds share their reduction skeleton; this
/// carries the kind-specific pieces.
#[derive(Clone, Copy)]
enum Kind<'a> {
    First,
    Second,
    Third(&'a BallComplex),
}

impl Kind<'_> {
    /// The complete integral added per half period (times two).
    fn complete(&self, m: &BallComplex, prec: u32) -> BallComplex {
        match self {
            Kind::First => complete_k(m, prec),
            Kind::Second => complete_e(m, prec),
            Kind::Third(n) => complete_pi(n, m, prec),
        }
    }

    /// The principal-strip evaluation via Carlson integrals.
    fn reduced(&self, phi: &BallComplex, m: &BallComplex, prec: u32) -> BallComplex {
        let wp = prec + 16;
        let (s, c) = phi.sin_cos(wp);
        let s_sq = s.mul(&s, wp);
        let c_sq = c.mul(&c, wp);
        let one = BallComplex::one(wp);
        let w = one.sub(&m.mul(&s_sq, wp), wp);
        let f_part = s.mul(&rf(&c_sq, &w, &one, wp), wp);
        match self {
            Kind::First => f_part,
            Kind::Second => {
                // E = s R_F - (m/3) s^3 R_D.
                let s_cu = s_sq.mul(&s, wp);
                let d = rd(&c_sq, &w, &one, wp);
                let third = BallComplex::from_i64(3, wp).inv(wp);
                f_part.sub(&m.mul(&third, wp).mul(&s_cu, wp).mul(&d, wp), prec)
            }
            Kind::Third(n) => {
                // Pi = s R_F + (n/3) s^3 R_J(..., 1 - n s^2).
                let s_cu = s_sq.mul(&s, wp);
                let p = one.sub(&n.mul(&s_sq, wp), wp);
                let j = rj(&c_sq, &w, &one, &p, wp);
                let third = BallComplex::from_i64(3, wp).inv(wp);
                f_part.add(&n.mul(&third, wp).mul(&s_cu, wp).mul(&j, wp), prec)
            }
        }
    }
}

/// Shared reduction driver. `phi_over_pi` is `Re(phi)/pi + 1/2` as a
/// ball; `phi_shift(d)` produces the principal-strip amplitude for a
/// given half-period count.
fn reduce_and_eval(
    kind: Kind<'_>,
    m: &BallComplex,
    phi_over_pi: &BallReal,
    phi_shift: impl Fn(i64, u32) -> BallComplex,
    prec: u32,
) -> BallComplex {
    let wp = prec + 16;
    match floor_candidates(phi_over_pi) {
        HalfPeriods::OutOfRange => BallComplex::indeterminate(),
        HalfPeriods::Unique(d) => {
            let principal = kind.reduced(&phi_shift(d, wp), m, prec);
            if d == 0 {
                principal
            } else {
                let per = kind.complete(m, wp);
                principal.add(&per.mul_i64(2 * d, wp), prec)
            }
        }
        HalfPeriods::Straddle(d0, d1) => {
            // The amplitude sits at a strip boundary: evaluate both
            // reductions and take the union enclosure.
            let branch = |d: i64| {
                let principal = kind.reduced(&phi_shift(d, wp), m, prec);
                if d == 0 {
                    principal
                } else {
                    let per = kind.complete(m, wp);
                    principal.add(&per.mul_i64(2 * d, wp), prec)
                }
            };
            branch(d0).union(&branch(d1))
        }
    }
}

/// Common special cases shared by the three kinds; `None` means no
/// special case applies.
fn shared_guards(phi: &BallComplex, m: &BallComplex) -> Option<BallComplex> {
    if phi.is_indeterminate() || m.is_indeterminate() {
        return Some(BallComplex::indeterminate());
    }
    if phi.is_exact_zero() {
        return Some(BallComplex::zero(8));
    }
    None
}

/// Incomplete elliptic integral of the first kind F(phi, m).
#[must_use]
pub fn legendre_f(phi: &BallComplex, m: &BallComplex, prec: u32) -> BallComplex {
    if let Some(early) = shared_guards(phi, m) {
        return early;
    }
    if m.is_exact_zero() {
        return phi.clone();
    }
    let wp = prec + 16;
    let t = phi
        .re()
        .div(&BallReal::pi(wp), wp)
        .add(&BallReal::from_i64(1, wp).mul_2exp(-1), wp);
    let shift = |d: i64, p: u32| {
        if d == 0 {
            phi.clone()
        } else {
            let pi = BallComplex::from_real(BallReal::pi(p), p);
            phi.sub(&pi.mul_i64(d, p), p)
        }
    };
    reduce_and_eval(Kind::First, m, &t, shift, prec)
}

/// Incomplete elliptic integral of the second kind E(phi, m).
#[must_use]
pub fn legendre_e(phi: &BallComplex, m: &BallComplex, prec: u32) -> BallComplex {
    if let Some(early) = shared_guards(phi, m) {
        return early;
    }
    if m.is_exact_zero() {
        return phi.clone();
    }
    let wp = prec + 16;
    let t = phi
        .re()
        .div(&BallReal::pi(wp), wp)
        .add(&BallReal::from_i64(1, wp).mul_2exp(-1), wp);
    let shift = |d: i64, p: u32| {
        if d == 0 {
            phi.clone()
        } else {
            let pi = BallComplex::from_real(BallReal::pi(p), p);
            phi.sub(&pi.mul_i64(d, p), p)
        }
    };
    reduce_and_eval(Kind::Second, m, &t, shift, prec)
}

/// Incomplete elliptic integral of the third kind Pi(n; phi, m).
#[must_use]
pub fn legendre_pi(
    n: &BallComplex,
    phi: &BallComplex,
    m: &BallComplex,
    prec: u32,
) -> BallComplex {
    if let Some(early) = shared_guards(phi, m) {
        return early;
    }
    if n.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    if n.is_exact_zero() {
        return legendre_f(phi, m, prec);
    }
    let wp = prec + 16;
    let t = phi
        .re()
        .div(&BallReal::pi(wp), wp)
        .add(&BallReal::from_i64(1, wp).mul_2exp(-1), wp);
    let shift = |d: i64, p: u32| {
        if d == 0 {
            phi.clone()
        } else {
            let pi = BallComplex::from_real(BallReal::pi(p), p);
            phi.sub(&pi.mul_i64(d, p), p)
        }
    };
    reduce_and_eval(Kind::Third(n), m, &t, shift, prec)
}

/// F with the amplitude given as a multiple of pi.
#[must_use]
pub fn legendre_f_times_pi(phi: &BallComplex, m: &BallComplex, prec: u32) -> BallComplex {
    times_pi_driver(Kind::First, phi, m, prec)
}

/// E with the amplitude given as a multiple of pi.
#[must_use]
pub fn legendre_e_times_pi(phi: &BallComplex, m: &BallComplex, prec: u32) -> BallComplex {
    times_pi_driver(Kind::Second, phi, m, prec)
}

/// Pi with the amplitude given as a multiple of pi.
#[must_use]
pub fn legendre_pi_times_pi(
    n: &BallComplex,
    phi: &BallComplex,
    m: &BallComplex,
    prec: u32,
) -> BallComplex {
    if n.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    if n.is_exact_zero() {
        return legendre_f_times_pi(phi, m, prec);
    }
    times_pi_driver(Kind::Third(n), phi, m, prec)
}

fn times_pi_driver(
    kind: Kind<'_>,
    phi: &BallComplex,
    m: &BallComplex,
    prec: u32,
) -> BallComplex {
    if let Some(early) = shared_guards(phi, m) {
        return early;
    }
    // F and E collapse to the amplitude at m = 0; Pi does not (its
    // characteristic survives) and takes the general path.
    if m.is_exact_zero() && !matches!(kind, Kind::Third(_)) {
        return phi.exact_pi_multiple(prec);
    }
    let wp = prec + 16;
    // The exact half amplitude is the complete integral, no reduction
    // noise at all.
    if phi.is_real() && phi.re().mul_2exp(1).is_exact_one() {
        return kind.complete(m, prec);
    }
    let t = phi
        .re()
        .add(&BallReal::from_i64(1, wp).mul_2exp(-1), wp);
    let shift = |d: i64, p: u32| {
        let reduced = phi.sub(&BallComplex::from_i64(d, p), p);
        let pi = BallComplex::from_real(BallReal::pi(p), p);
        reduced.mul(&pi, p)
    };
    reduce_and_eval(kind, m, &t, shift, prec)
}

/// Complete elliptic integral of the third kind
/// `Pi(n, m) = R_F(0, 1-m, 1) + (n/3) R_J(0, 1-m, 1, 1-n)`.
#[must_use]
pub fn complete_pi(n: &BallComplex, m: &BallComplex, prec: u32) -> BallComplex {
    if n.is_indeterminate() || m.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    if n.is_exact_zero() {
        return complete_k(m, prec);
    }
    let wp = prec + 16;
    let zero = BallComplex::zero(wp);
    let one = BallComplex::one(wp);
    let mc = one.sub(m, wp);
    let f = rf(&zero, &mc, &one, wp);
    let j = rj(&zero, &mc, &one, &one.sub(n, wp), wp);
    let third = BallComplex::from_i64(3, wp).inv(wp);
    f.add(&n.mul(&third, wp).mul(&j, wp), prec)
}

/// Small extension helpers the reductions lean on.
trait AmplitudeExt {
    /// `phi * pi` as an enclosure (for the m = 0 times-pi shortcut).
    fn exact_pi_multiple(&self, prec: u32) -> BallComplex;
}

impl AmplitudeExt for BallComplex {
    fn exact_pi_multiple(&self, prec: u32) -> BallComplex {
        let wp = prec + 8;
        self.mul(&BallComplex::from_real(BallReal::pi(wp), wp), prec)
    }
}

trait HalfExt {
    fn is_exact_one(&self) -> bool;
}

impl HalfExt for BallReal {
    fn is_exact_one(&self) -> bool {
        self.is_exact() && *self.mid() == 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quintus_ball::Mag;

    fn real(v: f64, prec: u32) -> BallComplex {
        BallComplex::from_f64_pair(v, 0.0, prec)
    }

    #[test]
    fn test_f_zero_parameter_is_identity() {
        let prec = 128;
        let phi = BallComplex::from_f64_pair(0.7, 0.2, prec);
        let f = legendre_f(&phi, &BallComplex::zero(prec), prec);
        assert!(f.overlaps(&phi));
    }

    #[test]
    fn test_f_complete_matches_k() {
        let prec = 160;
        let m = real(0.4, prec);
        let via_tp = legendre_f_times_pi(&real(0.5, prec), &m, prec);
        let k = complete_k(&m, prec);
        assert!(via_tp.overlaps(&k));
    }

    #[test]
    fn test_e_at_m_one_is_sine() {
        // E(phi, 1) = sin(phi) on the principal strip.
        let prec = 160;
        let phi = real(0.8, prec);
        let e = legendre_e(&phi, &BallComplex::one(prec), prec);
        let (s, _) = phi.sin_cos(prec);
        assert!(e.overlaps(&s));
    }

    #[test]
    fn test_f_derivative_quotient() {
        // dF/dphi = 1/sqrt(1 - m sin^2 phi).
        let prec = 192;
        let m = real(0.35, prec);
        let phi = real(0.6, prec);
        let h = 1.0e-9;
        let fp = legendre_f(&real(0.6 + h, prec), &m, prec);
        let f0 = legendre_f(&phi, &m, prec);
        let dq = fp.sub(&f0, prec).div(&real(h, prec), prec);
        let (s, _) = phi.sin_cos(prec);
        let expect = BallComplex::one(prec)
            .sub(&m.mul(&s.mul(&s, prec), prec), prec)
            .sqrt(prec)
            .inv(prec);
        let mut coarse = expect;
        coarse.add_error(&Mag::from_f64(1.0e-6));
        assert!(coarse.overlaps(&dq));
    }

    #[test]
    fn test_f_periodicity() {
        // F(phi + pi, m) = F(phi, m) + 2 K(m).
        let prec = 160;
        let m = real(0.3, prec);
        let phi = real(0.4, prec);
        let pi = BallComplex::from_real(BallReal::pi(prec), prec);
        let lhs = legendre_f(&phi.add(&pi, prec), &m, prec);
        let rhs = legendre_f(&phi, &m, prec).add(&complete_k(&m, prec).mul_2exp(1), prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_f_periodicity_times_pi() {
        let prec = 160;
        let m = real(0.3, prec);
        let phi = real(0.13, prec);
        let lhs = legendre_f_times_pi(&phi.add(&BallComplex::one(prec), prec), &m, prec);
        let rhs = legendre_f_times_pi(&phi, &m, prec)
            .add(&complete_k(&m, prec).mul_2exp(1), prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_e_periodicity_times_pi() {
        let prec = 160;
        let m = real(0.45, prec);
        let phi = real(0.21, prec);
        let lhs = legendre_e_times_pi(&phi.add(&BallComplex::one(prec), prec), &m, prec);
        let rhs = legendre_e_times_pi(&phi, &m, prec)
            .add(&complete_e(&m, prec).mul_2exp(1), prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_pi_periodicity_times_pi() {
        let prec = 160;
        let n = real(0.35, prec);
        let m = real(0.2, prec);
        let phi = real(-0.17, prec);
        let lhs = legendre_pi_times_pi(&n, &phi.add(&BallComplex::one(prec), prec), &m, prec);
        let rhs = legendre_pi_times_pi(&n, &phi, &m, prec)
            .add(&complete_pi(&n, &m, prec).mul_2exp(1), prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_e_periodicity() {
        let prec = 160;
        let m = real(0.45, prec);
        let phi = real(-0.7, prec);
        let pi = BallComplex::from_real(BallReal::pi(prec), prec);
        let lhs = legendre_e(&phi.add(&pi, prec), &m, prec);
        let rhs = legendre_e(&phi, &m, prec).add(&complete_e(&m, prec).mul_2exp(1), prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_pi_periodicity() {
        let prec = 160;
        let n = real(0.2, prec);
        let m = real(0.5, prec);
        let phi = real(0.9, prec);
        let pi = BallComplex::from_real(BallReal::pi(prec), prec);
        let lhs = legendre_pi(&n, &phi.add(&pi, prec), &m, prec);
        let rhs = legendre_pi(&n, &phi, &m, prec)
            .add(&complete_pi(&n, &m, prec).mul_2exp(1), prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_pi_reduces_to_f_at_zero_characteristic() {
        let prec = 128;
        let m = real(0.6, prec);
        let phi = real(1.1, prec);
        let a = legendre_pi(&BallComplex::zero(prec), &phi, &m, prec);
        let b = legendre_f(&phi, &m, prec);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_multi_period_reduction() {
        // Seven half-periods out, still consistent with the addition law.
        let prec = 192;
        let m = real(0.25, prec);
        let phi = real(0.3, prec);
        let pi = BallComplex::from_real(BallReal::pi(prec), prec);
        let far = phi.add(&pi.mul_i64(7, prec), prec);
        let lhs = legendre_f(&far, &m, prec);
        let rhs = legendre_f(&phi, &m, prec)
            .add(&complete_k(&m, prec).mul_i64(14, prec), prec);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_straddling_half_period_still_encloses() {
        // Re(phi)/pi + 1/2 lands (within the ball) on an integer: the
        // union of both branches must still enclose the true value,
        // here checked against a slightly perturbed amplitude.
        let prec = 128;
        let m = real(0.4, prec);
        let mut phi = real(std::f64::consts::FRAC_PI_2, prec);
        phi.add_error(&Mag::from_f64(1.0e-12));
        let v = legendre_f(&phi, &m, prec);
        assert!(v.is_finite());
        let nearby = legendre_f(&real(std::f64::consts::FRAC_PI_2 - 1.0e-13, prec), &m, prec);
        assert!(v.overlaps(&nearby));
    }

    #[test]
    fn test_complex_amplitude() {
        // Consistency of the complex amplitude against the defining
        // derivative along the imaginary direction.
        let prec = 160;
        let m = real(0.3, prec);
        let phi = BallComplex::from_f64_pair(0.5, 0.25, prec);
        let f = legendre_f(&phi, &m, prec);
        assert!(f.is_finite());
        // F is odd in phi.
        let neg = legendre_f(&phi.neg(), &m, prec);
        assert!(f.neg().overlaps(&neg));
    }
}
