//! Real balls: midpoint-radius intervals over MPFR floats.

use crate::mag::Mag;
use crate::clamp_prec;
use quintus_exact::{Integer, Rational};
use rug::float::{Constant, Round, Special};
use rug::ops::CompleteRound;
use rug::Float;
use std::cmp::Ordering;
use std::fmt;

/// A real number enclosure: every true value lies within `rad` of `mid`.
///
/// An *indeterminate* ball (non-finite midpoint or infinite radius) is the
/// sole failure signal in the library; it propagates through arithmetic.
#[derive(Clone)]
pub struct BallReal {
    mid: Float,
    rad: Mag,
}

/// Converts a `quintus_exact::Integer` into an exact MPFR integer.
fn rug_integer(n: &Integer) -> rug::Integer {
    let (neg, bytes) = n.to_sign_bytes();
    let mag = rug::Integer::from_digits(&bytes, rug::integer::Order::Lsf);
    if neg {
        -mag
    } else {
        mag
    }
}

impl BallReal {
    /// Creates a ball from midpoint and radius.
    #[must_use]
    pub fn new(mid: Float, rad: Mag) -> Self {
        Self { mid, rad }
    }

    /// An exact ball around a float.
    #[must_use]
    pub fn exact(mid: Float) -> Self {
        Self { mid, rad: Mag::zero() }
    }

    /// The exact zero ball.
    #[must_use]
    pub fn zero(prec: u32) -> Self {
        Self::exact(Float::new(clamp_prec(prec)))
    }

    /// The exact one ball.
    #[must_use]
    pub fn one(prec: u32) -> Self {
        Self::exact(Float::with_val(clamp_prec(prec), 1))
    }

    /// An exact ball holding a small integer.
    #[must_use]
    pub fn from_i64(v: i64, prec: u32) -> Self {
        Self::exact(Float::with_val(clamp_prec(prec).max(64), v))
    }

    /// An exact ball holding an f64.
    #[must_use]
    pub fn from_f64(v: f64, prec: u32) -> Self {
        if !v.is_finite() {
            return Self::indeterminate();
        }
        Self::exact(Float::with_val(clamp_prec(prec).max(53), v))
    }

    /// Encloses an arbitrary precision integer at the given precision.
    #[must_use]
    pub fn from_integer(n: &Integer, prec: u32) -> Self {
        let p = clamp_prec(prec);
        let (mid, ord) = Float::with_val_round(p, rug_integer(n), Round::Nearest);
        let rad = if ord == Ordering::Equal {
            Mag::zero()
        } else {
            Mag::ulp(&mid, p)
        };
        Self { mid, rad }
    }

    /// Encloses an arbitrary precision rational at the given precision.
    #[must_use]
    pub fn from_rational(q: &Rational, prec: u32) -> Self {
        let p = clamp_prec(prec);
        let num = rug_integer(&q.numerator());
        let den = rug_integer(&q.denominator());
        let rat = rug::Rational::from((num, den));
        let (mid, ord) = Float::with_val_round(p, &rat, Round::Nearest);
        let rad = if ord == Ordering::Equal {
            Mag::zero()
        } else {
            Mag::ulp(&mid, p)
        };
        Self { mid, rad }
    }

    /// The indeterminate ball.
    #[must_use]
    pub fn indeterminate() -> Self {
        Self {
            mid: Float::with_val(crate::MIN_PREC, Special::Nan),
            rad: Mag::inf(),
        }
    }

    /// An enclosure of pi.
    #[must_use]
    pub fn pi(prec: u32) -> Self {
        let p = clamp_prec(prec);
        let mid = Float::with_val(p, Constant::Pi);
        let rad = Mag::ulp(&mid, p);
        Self { mid, rad }
    }

    /// The midpoint.
    #[must_use]
    pub fn mid(&self) -> &Float {
        &self.mid
    }

    /// The radius.
    #[must_use]
    pub fn rad(&self) -> Mag {
        self.rad
    }

    /// Inflates the radius by the given magnitude.
    pub fn add_error(&mut self, err: &Mag) {
        self.rad = self.rad.add(err);
    }

    /// True when the enclosure is useless (non-finite midpoint or radius).
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        !self.mid.is_finite() || self.rad.is_inf()
    }

    /// True when both midpoint and radius are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        !self.is_indeterminate()
    }

    /// True when the radius is exactly zero.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.rad.is_zero() && self.mid.is_finite()
    }

    /// True when the interval certainly contains zero... and when
    /// indeterminate, since zero cannot be excluded.
    #[must_use]
    pub fn contains_zero(&self) -> bool {
        if self.is_indeterminate() {
            return true;
        }
        if self.mid.is_zero() {
            return true;
        }
        Mag::from_float_lower(&self.mid).cmp_mag(&self.rad) != Ordering::Greater
    }

    /// True when every point of the interval is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.is_finite() && self.mid.is_sign_positive() && !self.contains_zero()
    }

    /// True when every point of the interval is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.is_finite() && self.mid.is_sign_negative() && !self.contains_zero()
    }

    /// True when the ball is exactly the point zero.
    #[must_use]
    pub fn is_exact_zero(&self) -> bool {
        self.rad.is_zero() && self.mid.is_zero()
    }

    /// Upper bound on the absolute value over the interval.
    #[must_use]
    pub fn upper_mag(&self) -> Mag {
        if self.is_indeterminate() {
            return Mag::inf();
        }
        Mag::from_float(&self.mid).add(&self.rad)
    }

    /// Lower bound on the absolute value over the interval (zero when the
    /// interval contains zero).
    #[must_use]
    pub fn lower_mag(&self) -> Mag {
        if self.is_indeterminate() {
            return Mag::zero();
        }
        Mag::from_float_lower(&self.mid)
            .checked_sub_lower(&self.rad)
            .unwrap_or_else(Mag::zero)
    }

    /// Relative accuracy in bits: how many leading bits of the midpoint
    /// are certified by the radius.
    #[must_use]
    pub fn rel_accuracy_bits(&self) -> i64 {
        if self.is_indeterminate() {
            return i64::MIN;
        }
        if self.rad.is_zero() {
            return i64::MAX;
        }
        if self.mid.is_zero() {
            return 0;
        }
        let mid_exp = i64::from(self.mid.get_exp().unwrap_or(0));
        mid_exp - self.rad.exponent()
    }

    /// Negation (exact).
    #[must_use]
    pub fn neg(&self) -> Self {
        Self {
            mid: (-&self.mid).complete(self.mid.prec()),
            rad: self.rad,
        }
    }

    /// Absolute value enclosure.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            mid: self.mid.clone().abs(),
            rad: self.rad,
        }
    }

    /// Addition.
    #[must_use]
    pub fn add(&self, other: &Self, prec: u32) -> Self {
        if self.is_indeterminate() || other.is_indeterminate() {
            return Self::indeterminate();
        }
        let p = clamp_prec(prec);
        let (mid, ord) = (&self.mid + &other.mid).complete_round(p, Round::Nearest);
        let mut rad = self.rad.add(&other.rad);
        if ord != Ordering::Equal {
            rad = rad.add(&Mag::ulp(&mid, p));
        }
        Self { mid, rad }
    }

    /// Subtraction.
    #[must_use]
    pub fn sub(&self, other: &Self, prec: u32) -> Self {
        self.add(&other.neg(), prec)
    }

    /// Multiplication.
    #[must_use]
    pub fn mul(&self, other: &Self, prec: u32) -> Self {
        if self.is_indeterminate() || other.is_indeterminate() {
            return Self::indeterminate();
        }
        let p = clamp_prec(prec);
        let (mid, ord) = (&self.mid * &other.mid).complete_round(p, Round::Nearest);
        let am = Mag::from_float(&self.mid);
        let bm = Mag::from_float(&other.mid);
        let mut rad = am
            .mul(&other.rad)
            .add(&bm.mul(&self.rad))
            .add(&self.rad.mul(&other.rad));
        if ord != Ordering::Equal {
            rad = rad.add(&Mag::ulp(&mid, p));
        }
        Self { mid, rad }
    }

    /// Multiplication by a small exact integer.
    #[must_use]
    pub fn mul_i64(&self, k: i64, prec: u32) -> Self {
        self.mul(&Self::from_i64(k, prec), prec)
    }

    /// Exact scaling by `2^e`.
    #[must_use]
    pub fn mul_2exp(&self, e: i32) -> Self {
        if self.is_indeterminate() {
            return Self::indeterminate();
        }
        Self {
            mid: (&self.mid).clone() << e,
            rad: self.rad.mul_2exp(i64::from(e)),
        }
    }

    /// Division. Indeterminate when the divisor may contain zero.
    #[must_use]
    pub fn div(&self, other: &Self, prec: u32) -> Self {
        if self.is_indeterminate() || other.is_indeterminate() || other.contains_zero() {
            return Self::indeterminate();
        }
        let p = clamp_prec(prec);
        let (mid, ord) = (&self.mid / &other.mid).complete_round(p, Round::Nearest);
        let lb = other.lower_mag();
        let qm = Mag::from_float(&mid);
        let mut rad = self
            .rad
            .add(&qm.mul(&other.rad))
            .mul(&lb.recip_lower());
        if ord != Ordering::Equal {
            rad = rad.add(&Mag::ulp(&mid, p));
        }
        Self { mid, rad }
    }

    /// Square root. Indeterminate when the interval is entirely negative;
    /// widened to cover `[0, sqrt(hi)]` when it straddles zero.
    #[must_use]
    pub fn sqrt(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return Self::indeterminate();
        }
        let p = clamp_prec(prec);
        if self.is_negative() {
            return Self::indeterminate();
        }
        if self.contains_zero() {
            let hi = self.upper_mag().sqrt_upper();
            let mid = if self.mid.is_sign_positive() {
                Float::with_val(p, self.mid.sqrt_ref())
            } else {
                Float::new(p)
            };
            return Self { mid, rad: hi };
        }
        let (mid, ord) = Float::with_val_round(p, self.mid.sqrt_ref(), Round::Nearest);
        let lb = self.lower_mag().sqrt_lower().mul_2exp(1);
        let mut rad = self.rad.mul(&lb.recip_lower());
        if ord != Ordering::Equal {
            rad = rad.add(&Mag::ulp(&mid, p));
        }
        Self { mid, rad }
    }

    /// Exponential.
    #[must_use]
    pub fn exp(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return Self::indeterminate();
        }
        let p = clamp_prec(prec);
        let (mid, ord) = Float::with_val_round(p, self.mid.exp_ref(), Round::Nearest);
        if !mid.is_finite() {
            return Self::indeterminate();
        }
        let mut rad = Mag::from_float(&mid).mul(&self.rad.expm1_upper());
        if ord != Ordering::Equal {
            rad = rad.add(&Mag::ulp(&mid, p));
        }
        Self { mid, rad }
    }

    /// Natural logarithm. Indeterminate unless the interval is strictly
    /// positive.
    #[must_use]
    pub fn ln(&self, prec: u32) -> Self {
        if self.is_indeterminate() || !self.is_positive() {
            return Self::indeterminate();
        }
        let p = clamp_prec(prec);
        let (mid, ord) = Float::with_val_round(p, self.mid.ln_ref(), Round::Nearest);
        let mut rad = self.rad.mul(&self.lower_mag().recip_lower());
        if ord != Ordering::Equal {
            rad = rad.add(&Mag::ulp(&mid, p));
        }
        Self { mid, rad }
    }

    /// Sine and cosine, evaluated together.
    #[must_use]
    pub fn sin_cos(&self, prec: u32) -> (Self, Self) {
        if self.is_indeterminate() {
            return (Self::indeterminate(), Self::indeterminate());
        }
        let p = clamp_prec(prec);
        let (s, s_ord) = Float::with_val_round(p, self.mid.sin_ref(), Round::Nearest);
        let (c, c_ord) = Float::with_val_round(p, self.mid.cos_ref(), Round::Nearest);
        // |sin'| and |cos'| are bounded by 1.
        let mut s_rad = self.rad;
        let mut c_rad = self.rad;
        if s_ord != Ordering::Equal {
            s_rad = s_rad.add(&Mag::ulp(&s, p));
        }
        if c_ord != Ordering::Equal {
            c_rad = c_rad.add(&Mag::ulp(&c, p));
        }
        (Self { mid: s, rad: s_rad }, Self { mid: c, rad: c_rad })
    }

    /// Hyperbolic sine and cosine via exponentials.
    #[must_use]
    pub fn sinh_cosh(&self, prec: u32) -> (Self, Self) {
        let p = clamp_prec(prec) + 4;
        let e = self.exp(p);
        let en = self.neg().exp(p);
        let sinh = e.sub(&en, p).mul_2exp(-1);
        let cosh = e.add(&en, p).mul_2exp(-1);
        (sinh, cosh)
    }

    /// Arctangent.
    #[must_use]
    pub fn atan(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return Self::indeterminate();
        }
        let p = clamp_prec(prec);
        let (mid, ord) = Float::with_val_round(p, self.mid.atan_ref(), Round::Nearest);
        // |atan'| <= 1.
        let mut rad = self.rad;
        if ord != Ordering::Equal {
            rad = rad.add(&Mag::ulp(&mid, p));
        }
        Self { mid, rad }
    }

    /// Integer power by binary exponentiation.
    #[must_use]
    pub fn pow_i(&self, n: i64, prec: u32) -> Self {
        let p = clamp_prec(prec) + 4;
        if n == 0 {
            return Self::one(prec);
        }
        let mut base = if n < 0 {
            Self::one(p).div(self, p)
        } else {
            self.clone()
        };
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

    /// True when the two enclosures could describe the same number.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.is_indeterminate() || other.is_indeterminate() {
            return true;
        }
        let p = self.mid.prec().max(other.mid.prec());
        let (d, _) = (&self.mid - &other.mid).complete_round(p, Round::Nearest);
        let d_lo = Mag::from_float_lower(&d)
            .checked_sub_lower(&Mag::ulp(&d, p))
            .unwrap_or_else(Mag::zero);
        let slack = self.rad.add(&other.rad);
        d_lo.cmp_mag(&slack) != Ordering::Greater
    }

    /// True when `other` is certainly contained in `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        if self.is_indeterminate() {
            return true;
        }
        if other.is_indeterminate() {
            return false;
        }
        let p = self.mid.prec().max(other.mid.prec());
        let (d, _) = (&self.mid - &other.mid).complete_round(p, Round::Nearest);
        let reach = Mag::from_float(&d)
            .add(&Mag::ulp(&d, p))
            .add(&other.rad);
        reach.cmp_mag(&self.rad) != Ordering::Greater
    }

    /// The smallest ball (anchored at `self`'s midpoint) containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_indeterminate() || other.is_indeterminate() {
            return Self::indeterminate();
        }
        let p = self.mid.prec().max(other.mid.prec());
        let (d, _) = (&self.mid - &other.mid).complete_round(p, Round::Nearest);
        let reach = Mag::from_float(&d)
            .add(&Mag::ulp(&d, p))
            .add(&other.rad);
        Self {
            mid: self.mid.clone(),
            rad: self.rad.max(&reach),
        }
    }

    /// A fast, non-rigorous f64 estimate of the midpoint.
    #[must_use]
    pub fn mid_f64(&self) -> f64 {
        self.mid.to_f64()
    }
}

impl fmt::Debug for BallReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BallReal({} +/- {:e})", self.mid, self.rad.to_f64())
    }
}

impl fmt::Display for BallReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} +/- {:e}]", self.mid, self.rad.to_f64())
    }
}
