//! PSL(2,Z) group elements and their Moebius action.
//!
//! A group element is an integer matrix (a b; c d) with ad - bc = 1,
//! identified up to global sign. The stored representative is
//! normalized so that c >= 0, and d > 0 when c = 0; composition and
//! inversion re-apply the normalization. All entries are exact
//! arbitrary precision integers, so the group algebra never rounds.

use num_traits::{One, Zero};
use quintus_ball::BallComplex;
use quintus_exact::Integer;
use std::fmt;

/// An element of PSL(2,Z).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModularGroupElement {
    a: Integer,
    b: Integer,
    c: Integer,
    d: Integer,
}

impl ModularGroupElement {
    /// The identity element.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            a: Integer::one(),
            b: Integer::zero(),
            c: Integer::zero(),
            d: Integer::one(),
        }
    }

    /// Builds an element from matrix entries.
    ///
    /// # Panics
    ///
    /// Panics unless ad - bc = 1.
    #[must_use]
    pub fn new(a: Integer, b: Integer, c: Integer, d: Integer) -> Self {
        let g = Self { a, b, c, d }.normalized();
        assert!(g.det_is_one(), "modular group element must have determinant 1");
        g
    }

    /// Builds an element from machine-integer entries.
    ///
    /// # Panics
    ///
    /// Panics unless ad - bc = 1.
    #[must_use]
    pub fn from_i64(a: i64, b: i64, c: i64, d: i64) -> Self {
        Self::new(
            Integer::new(a),
            Integer::new(b),
            Integer::new(c),
            Integer::new(d),
        )
    }

    /// The translation tau -> tau + n.
    #[must_use]
    pub fn translation(n: &Integer) -> Self {
        Self {
            a: Integer::one(),
            b: n.clone(),
            c: Integer::zero(),
            d: Integer::one(),
        }
    }

    /// The inversion S: tau -> -1/tau.
    #[must_use]
    pub fn inversion() -> Self {
        Self::from_i64(0, -1, 1, 0)
    }

    /// Matrix entries (a, b, c, d).
    #[must_use]
    pub fn entries(&self) -> (&Integer, &Integer, &Integer, &Integer) {
        (&self.a, &self.b, &self.c, &self.d)
    }

    /// True for the identity representative.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.a.is_one() && self.b.is_zero() && self.c.is_zero() && self.d.is_one()
    }

    fn det_is_one(&self) -> bool {
        (&(&self.a * &self.d) - &(&self.b * &self.c)).is_one()
    }

    fn normalized(self) -> Self {
        let flip = self.c.is_negative() || (self.c.is_zero() && self.d.is_negative());
        if flip {
            Self {
                a: -self.a,
                b: -self.b,
                c: -self.c,
                d: -self.d,
            }
        } else {
            self
        }
    }

    /// Group composition: the element acting as `self` after `other`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            a: &(&self.a * &other.a) + &(&self.b * &other.c),
            b: &(&self.a * &other.b) + &(&self.b * &other.d),
            c: &(&self.c * &other.a) + &(&self.d * &other.c),
            d: &(&self.c * &other.b) + &(&self.d * &other.d),
        }
        .normalized()
    }

    /// The inverse element.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            a: self.d.clone(),
            b: -self.b.clone(),
            c: -self.c.clone(),
            d: self.a.clone(),
        }
        .normalized()
    }

    /// The Moebius action `(az + b) / (cz + d)`.
    ///
    /// Uses `a/c - 1/(c(cz+d))` in the general case, which keeps the
    /// large integer part exact instead of dividing two large balls;
    /// the `c = 0` and `a = 0` cases skip the division entirely.
    #[must_use]
    pub fn apply(&self, z: &BallComplex, prec: u32) -> BallComplex {
        if z.is_indeterminate() {
            return BallComplex::indeterminate();
        }
        let wp = prec + 8;
        if self.c.is_zero() {
            // Normalized c = 0 forces a = d = 1: a pure translation.
            return z.add(&BallComplex::from_integer(&self.b, wp), prec);
        }
        if self.a.is_zero() {
            // Then -bc = 1 with c > 0, so c = 1, b = -1: z -> -1/(z+d).
            let den = z.add(&BallComplex::from_integer(&self.d, wp), wp);
            return den.inv(prec).neg();
        }
        let c_ball = BallComplex::from_integer(&self.c, wp);
        let den = z
            .mul(&c_ball, wp)
            .add(&BallComplex::from_integer(&self.d, wp), wp);
        let head = BallComplex::from_rational(
            &quintus_exact::Rational::new(self.a.clone(), self.c.clone()),
            wp,
        );
        let tail = c_ball.mul(&den, wp).inv(wp);
        head.sub(&tail, prec)
    }

    /// The automorphy denominator `c tau + d` as a ball.
    #[must_use]
    pub fn cocycle(&self, tau: &BallComplex, prec: u32) -> BallComplex {
        let wp = prec + 8;
        tau.mul(&BallComplex::from_integer(&self.c, wp), wp)
            .add(&BallComplex::from_integer(&self.d, wp), prec)
    }
}

impl fmt::Display for ModularGroupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}; {} {}]", self.a, self.b, self.c, self.d)
    }
}
