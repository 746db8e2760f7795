//! Complex balls as rectangular pairs of real balls.
//!
//! A complex enclosure is a pair of real enclosures for the real and
//! imaginary parts. All operations are built from the real-ball
//! primitives, so radii propagate without per-operation error analysis;
//! only the branch-cut functions (sqrt, ln, atan) need case handling.

use crate::mag::Mag;
use crate::real::BallReal;
use quintus_exact::{Integer, Rational};
use std::fmt;

/// A complex number enclosure.
#[derive(Clone)]
pub struct BallComplex {
    re: BallReal,
    im: BallReal,
}

impl BallComplex {
    /// Creates a complex ball from real and imaginary enclosures.
    #[must_use]
    pub fn from_re_im(re: BallReal, im: BallReal) -> Self {
        Self { re, im }
    }

    /// A purely real complex ball.
    #[must_use]
    pub fn from_real(re: BallReal, prec: u32) -> Self {
        Self {
            re,
            im: BallReal::zero(prec),
        }
    }

    /// The exact zero.
    #[must_use]
    pub fn zero(prec: u32) -> Self {
        Self {
            re: BallReal::zero(prec),
            im: BallReal::zero(prec),
        }
    }

    /// The exact one.
    #[must_use]
    pub fn one(prec: u32) -> Self {
        Self {
            re: BallReal::one(prec),
            im: BallReal::zero(prec),
        }
    }

    /// The imaginary unit.
    #[must_use]
    pub fn i(prec: u32) -> Self {
        Self {
            re: BallReal::zero(prec),
            im: BallReal::one(prec),
        }
    }

    /// An exact small-integer ball.
    #[must_use]
    pub fn from_i64(v: i64, prec: u32) -> Self {
        Self {
            re: BallReal::from_i64(v, prec),
            im: BallReal::zero(prec),
        }
    }

    /// An exact f64 pair.
    #[must_use]
    pub fn from_f64_pair(re: f64, im: f64, prec: u32) -> Self {
        Self {
            re: BallReal::from_f64(re, prec),
            im: BallReal::from_f64(im, prec),
        }
    }

    /// Encloses an exact integer.
    #[must_use]
    pub fn from_integer(n: &Integer, prec: u32) -> Self {
        Self {
            re: BallReal::from_integer(n, prec),
            im: BallReal::zero(prec),
        }
    }

    /// Encloses an exact rational.
    #[must_use]
    pub fn from_rational(q: &Rational, prec: u32) -> Self {
        Self {
            re: BallReal::from_rational(q, prec),
            im: BallReal::zero(prec),
        }
    }

    /// The indeterminate complex ball.
    #[must_use]
    pub fn indeterminate() -> Self {
        Self {
            re: BallReal::indeterminate(),
            im: BallReal::indeterminate(),
        }
    }

    /// Real part.
    #[must_use]
    pub fn re(&self) -> &BallReal {
        &self.re
    }

    /// Imaginary part.
    #[must_use]
    pub fn im(&self) -> &BallReal {
        &self.im
    }

    /// Decomposes into parts.
    #[must_use]
    pub fn into_parts(self) -> (BallReal, BallReal) {
        (self.re, self.im)
    }

    /// True when either component is indeterminate.
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        self.re.is_indeterminate() || self.im.is_indeterminate()
    }

    /// True when both components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        !self.is_indeterminate()
    }

    /// True when both components are exact points.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.re.is_exact() && self.im.is_exact()
    }

    /// True when the imaginary part is exactly zero.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.im.is_exact_zero()
    }

    /// True when the enclosure certainly contains zero, or is useless.
    #[must_use]
    pub fn contains_zero(&self) -> bool {
        self.re.contains_zero() && self.im.contains_zero()
    }

    /// True when the ball is exactly the point zero.
    #[must_use]
    pub fn is_exact_zero(&self) -> bool {
        self.re.is_exact_zero() && self.im.is_exact_zero()
    }

    /// Upper bound on `|z|` over the enclosure.
    #[must_use]
    pub fn abs_upper(&self) -> Mag {
        let r = self.re.upper_mag();
        let i = self.im.upper_mag();
        // |z| <= |re| + |im|, cheap and within sqrt(2) of tight.
        r.add(&i)
    }

    /// Lower bound on `|z|` over the enclosure.
    #[must_use]
    pub fn abs_lower(&self) -> Mag {
        self.re.lower_mag().max(&self.im.lower_mag())
    }

    /// Enclosure of `|z|`.
    #[must_use]
    pub fn abs(&self, prec: u32) -> BallReal {
        let p = prec + 8;
        let rr = self.re.mul(&self.re, p);
        let ii = self.im.mul(&self.im, p);
        rr.add(&ii, p).sqrt(prec)
    }

    /// Inflates both component radii.
    pub fn add_error(&mut self, err: &Mag) {
        self.re.add_error(err);
        self.im.add_error(err);
    }

    /// Smallest certified relative accuracy of the two components.
    #[must_use]
    pub fn rel_accuracy_bits(&self) -> i64 {
        // Accuracy is relative to the larger component, so a tiny noisy
        // component does not mask an accurate big one.
        if self.is_indeterminate() {
            return i64::MIN;
        }
        let rad = self.re.rad().max(&self.im.rad());
        if rad.is_zero() {
            return i64::MAX;
        }
        let m = Mag::from_float(self.re.mid()).max(&Mag::from_float(self.im.mid()));
        if m.is_zero() {
            return 0;
        }
        m.exponent() - rad.exponent()
    }

    /// Negation (exact).
    #[must_use]
    pub fn neg(&self) -> Self {
        Self {
            re: self.re.neg(),
            im: self.im.neg(),
        }
    }

    /// Complex conjugate (exact).
    #[must_use]
    pub fn conj(&self) -> Self {
        Self {
            re: self.re.clone(),
            im: self.im.neg(),
        }
    }

    /// Multiplication by `i` (exact rotation).
    #[must_use]
    pub fn mul_i(&self) -> Self {
        Self {
            re: self.im.neg(),
            im: self.re.clone(),
        }
    }

    /// Addition.
    #[must_use]
    pub fn add(&self, other: &Self, prec: u32) -> Self {
        Self {
            re: self.re.add(&other.re, prec),
            im: self.im.add(&other.im, prec),
        }
    }

    /// Subtraction.
    #[must_use]
    pub fn sub(&self, other: &Self, prec: u32) -> Self {
        Self {
            re: self.re.sub(&other.re, prec),
            im: self.im.sub(&other.im, prec),
        }
    }

    /// Multiplication.
    #[must_use]
    pub fn mul(&self, other: &Self, prec: u32) -> Self {
        let p = prec + 4;
        let ac = self.re.mul(&other.re, p);
        let bd = self.im.mul(&other.im, p);
        let ad = self.re.mul(&other.im, p);
        let bc = self.im.mul(&other.re, p);
        Self {
            re: ac.sub(&bd, prec),
            im: ad.add(&bc, prec),
        }
    }

    /// Multiplication by a real ball.
    #[must_use]
    pub fn mul_real(&self, other: &BallReal, prec: u32) -> Self {
        Self {
            re: self.re.mul(other, prec),
            im: self.im.mul(other, prec),
        }
    }

    /// Multiplication by a small exact integer.
    #[must_use]
    pub fn mul_i64(&self, k: i64, prec: u32) -> Self {
        Self {
            re: self.re.mul_i64(k, prec),
            im: self.im.mul_i64(k, prec),
        }
    }

    /// Exact scaling by `2^e`.
    #[must_use]
    pub fn mul_2exp(&self, e: i32) -> Self {
        Self {
            re: self.re.mul_2exp(e),
            im: self.im.mul_2exp(e),
        }
    }

    /// Squared modulus as a real ball.
    #[must_use]
    pub fn norm_sq(&self, prec: u32) -> BallReal {
        let p = prec + 4;
        let rr = self.re.mul(&self.re, p);
        let ii = self.im.mul(&self.im, p);
        rr.add(&ii, prec)
    }

    /// Division. Indeterminate when the divisor may contain zero.
    #[must_use]
    pub fn div(&self, other: &Self, prec: u32) -> Self {
        if other.contains_zero() {
            return Self::indeterminate();
        }
        let p = prec + 8;
        let num = self.mul(&other.conj(), p);
        let den = other.norm_sq(p);
        Self {
            re: num.re.div(&den, prec),
            im: num.im.div(&den, prec),
        }
    }

    /// Multiplicative inverse.
    #[must_use]
    pub fn inv(&self, prec: u32) -> Self {
        Self::one(prec).div(self, prec)
    }

    /// Division by a real ball.
    #[must_use]
    pub fn div_real(&self, other: &BallReal, prec: u32) -> Self {
        Self {
            re: self.re.div(other, prec),
            im: self.im.div(other, prec),
        }
    }

    /// Principal square root.
    ///
    /// On an enclosure that straddles the branch cut (negative real axis)
    /// the result degrades to the origin-centered disc of radius
    /// `sqrt(|z|_hi)`, which contains the image of both sheets.
    #[must_use]
    pub fn sqrt(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return Self::indeterminate();
        }
        if self.is_exact_zero() {
            return Self::zero(prec);
        }
        let p = prec + 8;
        // Exact non-positive real axis: sqrt(-x) = i sqrt(x).
        if self.im.is_exact_zero() {
            if self.re.is_negative() {
                let root = self.re.neg().sqrt(prec);
                return Self {
                    re: BallReal::zero(prec),
                    im: root,
                };
            }
            if self.re.is_positive() {
                return Self {
                    re: self.re.sqrt(prec),
                    im: BallReal::zero(prec),
                };
            }
            // A real interval straddling zero picks up an imaginary
            // component from its negative part; the disc fallback below
            // covers both.
        }
        // A ball that may touch the cut or the origin: cover both sheets.
        if self.contains_zero() || (!self.re.is_positive() && self.im.contains_zero()) {
            let s = self.abs_upper().sqrt_upper();
            let mut out = Self::zero(prec);
            out.re.add_error(&s);
            out.im.add_error(&s);
            return out;
        }
        let modulus = self.abs(p);
        if self.re.mid().is_sign_positive() {
            // u = sqrt((|z| + re)/2), v = im/(2u)
            let u = modulus.add(&self.re, p).mul_2exp(-1).sqrt(p);
            let v = self.im.div(&u.mul_2exp(1), prec);
            Self { re: u, im: v }
        } else {
            // v = sign(im) sqrt((|z| - re)/2), u = im/(2v)
            let root = modulus.sub(&self.re, p).mul_2exp(-1).sqrt(p);
            let v = if self.im.mid().is_sign_positive() {
                root
            } else {
                root.neg()
            };
            let u = self.im.div(&v.mul_2exp(1), prec);
            Self { re: u, im: v }
        }
    }

    /// Exponential.
    #[must_use]
    pub fn exp(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return Self::indeterminate();
        }
        let p = prec + 8;
        let r = self.re.exp(p);
        let (s, c) = self.im.sin_cos(p);
        Self {
            re: r.mul(&c, prec),
            im: r.mul(&s, prec),
        }
    }

    /// `exp(i pi z)`, the nome-style exponential.
    #[must_use]
    pub fn exp_pi_i(&self, prec: u32) -> Self {
        let p = prec + 8;
        let pi = BallReal::pi(p);
        let scaled = Self {
            re: self.re.mul(&pi, p),
            im: self.im.mul(&pi, p),
        };
        scaled.mul_i().exp(prec)
    }

    /// Principal natural logarithm.
    ///
    /// Indeterminate when the enclosure touches the branch cut or the
    /// origin.
    #[must_use]
    pub fn ln(&self, prec: u32) -> Self {
        if self.is_indeterminate() || self.contains_zero() {
            return Self::indeterminate();
        }
        let p = prec + 8;
        let re = self.abs(p).ln(prec);
        let im = self.arg(prec);
        Self { re, im }
    }

    /// Principal argument in (-pi, pi].
    ///
    /// Indeterminate on enclosures touching the branch cut.
    #[must_use]
    pub fn arg(&self, prec: u32) -> BallReal {
        if self.is_indeterminate() || self.contains_zero() {
            return BallReal::indeterminate();
        }
        let p = prec + 8;
        if self.re.is_positive() {
            return self.im.div(&self.re, p).atan(prec);
        }
        if self.im.is_positive() {
            // pi/2 - atan(x/y)
            let half_pi = BallReal::pi(p).mul_2exp(-1);
            return half_pi.sub(&self.re.div(&self.im, p).atan(p), prec);
        }
        if self.im.is_negative() {
            let half_pi = BallReal::pi(p).mul_2exp(-1);
            return half_pi.neg().sub(&self.re.div(&self.im, p).atan(p), prec);
        }
        if self.re.is_negative() && self.im.is_exact_zero() {
            // On the cut itself: arg = pi by convention.
            return BallReal::pi(prec);
        }
        BallReal::indeterminate()
    }

    /// Arctangent via logarithms.
    #[must_use]
    pub fn atan(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return Self::indeterminate();
        }
        if self.im.is_exact_zero() {
            return Self {
                re: self.re.atan(prec),
                im: BallReal::zero(prec),
            };
        }
        let p = prec + 8;
        let one = Self::one(p);
        let iz = self.mul_i();
        let a = one.sub(&iz, p).ln(p);
        let b = one.add(&iz, p).ln(p);
        let diff = a.sub(&b, p);
        diff.mul_i().mul_2exp(-1)
    }

    /// Sine and cosine.
    #[must_use]
    pub fn sin_cos(&self, prec: u32) -> (Self, Self) {
        if self.is_indeterminate() {
            return (Self::indeterminate(), Self::indeterminate());
        }
        let p = prec + 8;
        let (sx, cx) = self.re.sin_cos(p);
        if self.im.is_exact_zero() {
            let zero = BallReal::zero(prec);
            return (
                Self { re: sx, im: zero.clone() },
                Self { re: cx, im: zero },
            );
        }
        let (shy, chy) = self.im.sinh_cosh(p);
        let sin = Self {
            re: sx.mul(&chy, prec),
            im: cx.mul(&shy, prec),
        };
        let cos = Self {
            re: cx.mul(&chy, prec),
            im: sx.mul(&shy, prec).neg(),
        };
        (sin, cos)
    }

    /// Integer power by binary exponentiation.
    #[must_use]
    pub fn pow_i(&self, n: i64, prec: u32) -> Self {
        let p = prec + 8;
        if n == 0 {
            return Self::one(prec);
        }
        let mut base = if n < 0 { self.inv(p) } else { self.clone() };
        let mut e = n.unsigned_abs();
        let mut acc = Self::one(p);
        while e > 0 {
            if e & 1 == 1 {
                acc = acc.mul(&base, p);
            }
            base = base.mul(&base, p);
            e >>= 1;
        }
        acc
    }

    /// `exp(i pi k / 12)`: the 24th root of unity used by the eta
    /// transformation, for `k` taken modulo 24.
    #[must_use]
    pub fn root_of_unity_24(k: i64, prec: u32) -> Self {
        let p = prec + 8;
        let k = k.rem_euclid(24);
        // Exact axis cases keep the result exact.
        match k {
            0 => return Self::one(prec),
            6 => return Self::i(prec),
            12 => return Self::one(prec).neg(),
            18 => return Self::i(prec).neg(),
            _ => {}
        }
        let angle = BallReal::pi(p).mul_i64(k, p).div(&BallReal::from_i64(12, p), p);
        let (s, c) = angle.sin_cos(prec);
        Self { re: c, im: s }
    }

    /// True when the two enclosures could describe the same number.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.re.overlaps(&other.re) && self.im.overlaps(&other.im)
    }

    /// True when `other` is certainly contained in `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.re.contains(&other.re) && self.im.contains(&other.im)
    }

    /// Componentwise union.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            re: self.re.union(&other.re),
            im: self.im.union(&other.im),
        }
    }

    /// Clears the imaginary part, for results proven to be real.
    #[must_use]
    pub fn demote_to_real(&self, prec: u32) -> Self {
        Self {
            re: self.re.clone(),
            im: BallReal::zero(prec),
        }
    }

    /// A fast, non-rigorous f64 estimate of the midpoint.
    #[must_use]
    pub fn mid_f64(&self) -> (f64, f64) {
        (self.re.mid_f64(), self.im.mid_f64())
    }
}

impl fmt::Debug for BallComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BallComplex({:?}, {:?})", self.re, self.im)
    }
}

impl fmt::Display for BallComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} + {}i)", self.re, self.im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_i_squared_is_minus_one() {
        let i = BallComplex::i(64);
        let m = i.mul(&i, 64);
        assert!(m.overlaps(&BallComplex::from_i64(-1, 64)));
        assert!(m.is_exact());
    }

    #[test]
    fn test_sqrt_of_minus_four() {
        let z = BallComplex::from_i64(-4, 64);
        let s = z.sqrt(64);
        let expected = BallComplex::from_i64(2, 64).mul_i();
        assert!(s.overlaps(&expected));
    }

    #[test]
    fn test_sqrt_squares_back() {
        let z = BallComplex::from_f64_pair(-3.0, 4.0, 128);
        let s = z.sqrt(128);
        assert!(s.mul(&s, 128).overlaps(&z));
        // Principal branch: non-negative real part.
        assert!(!s.re().is_negative());
    }

    #[test]
    fn test_exp_pi_i_of_one() {
        // exp(i pi) = -1
        let one = BallComplex::one(128);
        let e = one.exp_pi_i(128);
        assert!(e.overlaps(&BallComplex::from_i64(-1, 128)));
        assert!(e.rel_accuracy_bits() > 120);
    }

    #[test]
    fn test_ln_exp_roundtrip() {
        let z = BallComplex::from_f64_pair(0.5, 1.25, 128);
        let w = z.exp(128).ln(128);
        assert!(w.overlaps(&z));
    }

    #[test]
    fn test_ln_on_cut_is_indeterminate() {
        let mut z = BallComplex::from_i64(-1, 64);
        z.add_error(&Mag::from_f64(0.001));
        assert!(z.ln(64).is_indeterminate());
    }

    #[test]
    fn test_div_roundtrip() {
        let a = BallComplex::from_f64_pair(3.0, -2.0, 128);
        let b = BallComplex::from_f64_pair(-1.5, 0.25, 128);
        let q = a.div(&b, 128);
        assert!(q.mul(&b, 128).overlaps(&a));
    }

    #[test]
    fn test_root_of_unity_order() {
        let w = BallComplex::root_of_unity_24(1, 128);
        let one = BallComplex::one(128);
        assert!(w.pow_i(24, 128).overlaps(&one));
        assert!(!w.pow_i(12, 128).overlaps(&one));
    }

    #[test]
    fn test_atan_of_one() {
        // atan(1) = pi/4
        let z = BallComplex::one(128);
        let a = z.atan(128);
        let quarter_pi = BallReal::pi(128).mul_2exp(-2);
        assert!(a.re().overlaps(&quarter_pi));
        assert!(a.im().contains_zero());
    }

    #[test]
    fn test_complex_atan_off_axis() {
        // atan should satisfy tan(atan(z)) = z; check via sin/cos.
        let z = BallComplex::from_f64_pair(0.3, 0.4, 192);
        let a = z.atan(192);
        let (s, c) = a.sin_cos(192);
        let t = s.div(&c, 192);
        assert!(t.overlaps(&z));
    }
}
