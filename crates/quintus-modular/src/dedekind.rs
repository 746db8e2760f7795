//! Dedekind sums and the eta transformation epsilon.
//!
//! The multiplier in `eta(g tau) = eps(g) (c tau + d)^(1/2) eta(tau)`
//! is a 24th root of unity. Its argument is computed here as an exact
//! integer multiple of pi/12 through the Dedekind sum `s(d, c)` — all
//! rational arithmetic, no floating trigonometry, so the root of unity
//! is known exactly and only its final complex embedding rounds.

use crate::transform::ModularGroupElement;
use num_traits::{One, Zero};
use quintus_exact::{Integer, Rational};

/// The Dedekind sum `s(h, k)` for `k > 0`, by the reciprocity law.
///
/// Runs in O(log k) exact rational steps, like the Euclidean algorithm
/// it shadows.
///
/// # Panics
///
/// Panics if `k <= 0` or `gcd(h, k) != 1`.
#[must_use]
pub fn dedekind_sum(h: &Integer, k: &Integer) -> Rational {
    assert!(
        !k.is_negative() && !k.is_zero(),
        "dedekind sum needs k > 0"
    );
    assert!(h.gcd(k).is_one(), "dedekind sum needs gcd(h, k) = 1");

    let mut h = h.div_rem_euclid(k).1;
    let mut k = k.clone();
    let mut sum = Rational::zero();
    let mut negate = false;
    let quarter = Rational::from_i64(1, 4);
    while !h.is_zero() {
        // s(h,k) = -1/4 + (h^2 + k^2 + 1)/(12hk) - s(k mod h, h)
        let hh = &h * &h;
        let kk = &k * &k;
        let num = &(&hh + &kk) + &Integer::one();
        let den = Integer::new(12) * &h * &k;
        let term = &Rational::new(num, den) - &quarter;
        sum = if negate { sum - term } else { sum + term };
        negate = !negate;
        let r = k.div_rem_euclid(&h).1;
        k = h;
        h = r;
    }
    sum
}

/// The eta epsilon argument for `g`, in units of `pi i / 12`, reduced
/// modulo 24.
///
/// For `c = 0` the transformation is a translation and the argument is
/// just `b`. For `c > 0` it is `(a + d)/c - 12 s(d, c) - 3`, which the
/// transformation theory guarantees is an integer; a non-integer here
/// is an internal bug and panics.
#[must_use]
pub fn epsilon_arg(g: &ModularGroupElement) -> i64 {
    let (a, b, c, d) = g.entries();
    if c.is_zero() {
        let (_, r) = b.div_rem_euclid(&Integer::new(24));
        return r.to_i64().expect("residue fits i64");
    }
    let s = dedekind_sum(d, c);
    let twelve_s = Rational::from_i64(12, 1) * s;
    let head = Rational::new(a + d, c.clone());
    let arg = &(&head - &twelve_s) - &Rational::from_i64(3, 1);
    assert!(
        arg.is_integer(),
        "eta epsilon argument must be an integer multiple of pi/12"
    );
    let (_, r) = arg.numerator().div_rem_euclid(&Integer::new(24));
    r.to_i64().expect("residue fits i64")
}
