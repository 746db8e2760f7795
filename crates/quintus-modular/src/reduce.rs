//! Reduction to the fundamental domain of PSL(2,Z).
//!
//! Given z in the (closed) upper half-plane, find g with w = g z
//! satisfying `|Re w| <= 1/2 + eps` and `|w| >= 1 - eps`. The search
//! alternates integer translations with the inversion `z -> -1/z`, and
//! runs in two tiers: a double-precision pass that guesses the matrix
//! cheaply, verified afterwards in ball arithmetic; and, when the guess
//! fails verification (deep starting points, precision beyond what
//! doubles can steer), the same loop carried out entirely in balls.
//! The matrix search is a numerical hunt either way; only the
//! verification needs to be rigorous.

use crate::transform::ModularGroupElement;
use num_traits::Zero;
use quintus_ball::{BallComplex, BallReal};
use quintus_exact::Integer;
use rug::float::Round;

/// Fast-path iteration cap; the fallback gets `10 + prec/4`.
const FAST_STEPS: u32 = 20;

/// Inputs whose real part exceeds this bail out to the identity; the
/// translation count would overflow any useful representation.
const HUGE_SHIFT: f64 = 1.0e15;

/// Imaginary parts below this are numerically pinned to the real axis
/// and cannot be moved into the domain.
const TINY_IMAG: f64 = 1.0e-300;

/// Reduces `z` toward the fundamental domain.
///
/// Returns `(g, w)` with `w = g z` meeting the `eps`-relaxed domain
/// bounds, or `(identity, z)` when `z` is out of workable range, or
/// `(identity, indeterminate)` for inputs below the real axis.
#[must_use]
pub fn reduce_fundamental(
    z: &BallComplex,
    eps: f64,
    prec: u32,
) -> (ModularGroupElement, BallComplex) {
    if z.is_indeterminate() {
        return (ModularGroupElement::identity(), BallComplex::indeterminate());
    }
    if z.im().is_negative() {
        // Below the axis the reduction is undefined; propagate.
        return (ModularGroupElement::identity(), BallComplex::indeterminate());
    }
    let (x, y) = z.mid_f64();
    if !x.is_finite() || !y.is_finite() || x.abs() > HUGE_SHIFT || y > HUGE_SHIFT {
        return (ModularGroupElement::identity(), z.clone());
    }
    if y < TINY_IMAG {
        return (ModularGroupElement::identity(), z.clone());
    }

    if let Some(g) = fast_path(x, y, eps) {
        let w = g.apply(z, prec + 10);
        if verified_in_domain(&w, eps) {
            return (g.clone(), g.apply(z, prec));
        }
    }
    fallback(z, eps, prec)
}

/// Double-precision matrix hunt. Returns `None` on overflow of the
/// tracked matrix entries or failure to settle.
fn fast_path(mut x: f64, mut y: f64, eps: f64) -> Option<ModularGroupElement> {
    let mut m: [i64; 4] = [1, 0, 0, 1];
    for _ in 0..FAST_STEPS {
        if x.abs() <= 0.5 + eps && x * x + y * y >= 1.0 - eps {
            return Some(ModularGroupElement::from_i64(m[0], m[1], m[2], m[3]));
        }
        let n = x.round();
        if n != 0.0 {
            if n.abs() > 9.0e17 {
                return None;
            }
            #[allow(clippy::cast_possible_truncation)]
            let ni = n as i64;
            // T^(-n) g
            m[0] = m[0].checked_sub(ni.checked_mul(m[2])?)?;
            m[1] = m[1].checked_sub(ni.checked_mul(m[3])?)?;
            x -= n;
        }
        let r2 = x * x + y * y;
        if r2 < 1.0 - eps {
            if r2 < 1.0e-300 {
                return None;
            }
            // S g
            m = [-m[2], -m[3], m[0], m[1]];
            x = -x / r2;
            y /= r2;
        }
    }
    if x.abs() <= 0.5 + eps && x * x + y * y >= 1.0 - eps {
        return Some(ModularGroupElement::from_i64(m[0], m[1], m[2], m[3]));
    }
    None
}

/// Rigorous domain membership at tolerance `eps`.
fn verified_in_domain(w: &BallComplex, eps: f64) -> bool {
    if w.is_indeterminate() {
        return false;
    }
    let re_hi = w.re().upper_mag().to_f64();
    if !(re_hi <= 0.5 + eps) {
        return false;
    }
    let r2_lo = w.norm_sq(64).lower_mag().to_f64();
    r2_lo >= (1.0 - eps) * (1.0 - eps)
}

/// The same loop over balls at working precision, for inputs the
/// double-precision pass cannot steer.
fn fallback(z: &BallComplex, eps: f64, prec: u32) -> (ModularGroupElement, BallComplex) {
    let wp = prec + 20;
    let max_steps = 10 + prec / 4;
    let mut g = ModularGroupElement::identity();
    let mut w = z.clone();
    for _ in 0..max_steps {
        if verified_in_domain(&w, eps) {
            break;
        }
        if w.is_indeterminate() {
            break;
        }
        if let Some(n) = nearest_integer(w.re()) {
            if !n.is_zero() {
                let t = ModularGroupElement::translation(&(-n.clone()));
                g = t.compose(&g);
                w = w.sub(&BallComplex::from_integer(&n, wp), wp);
            }
        } else {
            break;
        }
        // Invert when the midpoint estimate of |w|^2 is inside the
        // unit circle; the decision is heuristic, the arithmetic is not.
        let r2 = w.norm_sq(wp);
        if r2.mid_f64() < 1.0 - eps {
            g = ModularGroupElement::inversion().compose(&g);
            w = w.inv(wp).neg();
        }
    }
    // Recompute the image in one application for a tight enclosure.
    let w = g.apply(z, prec);
    (g, w)
}

/// The nearest integer to a real ball's midpoint, as an exact integer.
fn nearest_integer(x: &BallReal) -> Option<Integer> {
    if !x.mid().is_finite() {
        return None;
    }
    let (i, _) = x.mid().clone().to_integer_round(Round::Nearest)?;
    let negative = i.cmp0() == std::cmp::Ordering::Less;
    let digits = i.to_digits::<u8>(rug::integer::Order::Lsf);
    Some(Integer::from_le_bytes_sign(&digits, negative))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(re: f64, im: f64, prec: u32) -> BallComplex {
        BallComplex::from_f64_pair(re, im, prec)
    }

    #[test]
    fn test_already_reduced() {
        let z = ball(0.25, 1.5, 128);
        let (g, w) = reduce_fundamental(&z, 1.0e-9, 128);
        assert!(g.is_identity());
        assert!(w.overlaps(&z));
    }

    #[test]
    fn test_translation_only() {
        let z = ball(7.3, 2.0, 128);
        let (g, w) = reduce_fundamental(&z, 1.0e-9, 128);
        assert!(w.overlaps(&ball(0.3, 2.0, 128)));
        // Round-trip: g^-1 w must re-enclose z.
        let back = g.inverse().apply(&w, 128);
        assert!(back.overlaps(&z));
    }

    #[test]
    fn test_deep_point_reduces() {
        let z = ball(0.49, 0.002, 192);
        let (g, w) = reduce_fundamental(&z, 1.0e-9, 192);
        assert!(verified_in_domain(&w, 1.0e-6));
        let back = g.inverse().apply(&w, 192);
        assert!(back.overlaps(&z));
    }

    #[test]
    fn test_negative_imaginary_is_indeterminate() {
        let z = ball(0.3, -1.0, 64);
        let (_, w) = reduce_fundamental(&z, 1.0e-9, 64);
        assert!(w.is_indeterminate());
    }

    #[test]
    fn test_huge_shift_bails_to_identity() {
        let z = ball(1.0e18, 1.0, 64);
        let (g, w) = reduce_fundamental(&z, 1.0e-9, 64);
        assert!(g.is_identity());
        assert!(w.overlaps(&z));
    }
}
