//! Truncation planning and rigorous tail bounds.
//!
//! The truncation order is *chosen* from a fast non-rigorous estimate of
//! `log2 |q|`, then the tail actually *charged* to the result is a
//! rigorous magnitude bound: the order is pushed up until the term ratio
//! beyond it is provably at most 1/2, at which point the neglected tail
//! is at most twice the first neglected term.

use quintus_ball::Mag;

/// Hard cap on series terms; past this the nome is so close to 1 that
/// summation is hopeless and the caller reports indeterminate.
pub(crate) const TERM_CAP: u64 = 1 << 26;

/// Crossover (in table size) past which rectangular splitting replaces
/// the plain addition-sequence walk for constant series.
pub(crate) const RECT_CROSSOVER: usize = 1800;

/// `m^e` for u64 exponents, rounding up.
pub(crate) fn mag_pow_u64(m: &Mag, e: u64) -> Mag {
    if e == 0 {
        return Mag::from_2exp(0);
    }
    let mut result = Mag::from_2exp(0);
    let mut base = *m;
    let mut k = e;
    while k > 0 {
        if k & 1 == 1 {
            result = result.mul(&base);
        }
        base = base.mul(&base);
        k >>= 1;
    }
    result
}

/// Bits of decay per unit exponent: `-log2 |q|`, or `None` when the
/// series cannot converge (`|q| >= 1` as far as the bound knows).
pub(crate) fn bits_per_exponent(qmag: &Mag) -> Option<f64> {
    let l = qmag.log2_estimate();
    if l < -1.0e-9 && l.is_finite() {
        Some(-l)
    } else {
        None
    }
}

/// A chosen truncation order together with the rigorous bound on
/// everything beyond it.
pub(crate) struct TailPlan {
    /// Sum terms with index `n <= order`.
    pub order: u64,
    /// Upper bound on the absolute sum of all terms with `n > order`.
    pub tail: Mag,
}

/// Finds an order at which the series tail is certified small.
///
/// `exponent(n)` is the q-exponent of term n (strictly increasing),
/// `coeff(n)` an upper bound on the coefficient magnitude, and
/// `ratio(n)` an upper bound on `coeff(n+1)/coeff(n)`, non-increasing
/// in n. Starting from `estimate`, the order grows until the term ratio
/// past it is at most 1/2 and the first neglected term is below
/// `2^-(prec + 20)`; the tail is then at most twice that term.
pub(crate) fn plan_series(
    qmag: &Mag,
    prec: u32,
    estimate: u64,
    exponent: &dyn Fn(u64) -> u64,
    coeff: &dyn Fn(u64) -> Mag,
    ratio: &dyn Fn(u64) -> Mag,
) -> Option<TailPlan> {
    let target = Mag::from_2exp(-(i64::from(prec) + 20));
    let half = Mag::from_2exp(-1);
    let mut order = estimate.max(1);
    for _ in 0..200 {
        if order > TERM_CAP {
            return None;
        }
        let gap = exponent(order + 2) - exponent(order + 1);
        let step = ratio(order + 1).mul(&mag_pow_u64(qmag, gap));
        let first = coeff(order + 1).mul(&mag_pow_u64(qmag, exponent(order + 1)));
        if step.cmp_mag(&half) != std::cmp::Ordering::Greater
            && first.cmp_mag(&target) != std::cmp::Ordering::Greater
        {
            return Some(TailPlan {
                order,
                tail: first.mul_2exp(1),
            });
        }
        order += (order / 4).max(8);
    }
    None
}

/// First-guess order for a series with q-exponents `n^2`.
pub(crate) fn square_estimate(bits: f64, prec: u32) -> u64 {
    guess(f64::from(prec + 30) / bits)
}

/// First-guess order for a series with q-exponents `n(n+1)`.
pub(crate) fn oblong_estimate(bits: f64, prec: u32) -> u64 {
    guess(f64::from(prec + 30) / bits)
}

/// First-guess order (in k) for the pentagonal exponents `3k^2 +/- k`.
pub(crate) fn pentagonal_estimate(bits: f64, prec: u32) -> u64 {
    guess(f64::from(prec + 30) / (3.0 * bits))
}

fn guess(x: f64) -> u64 {
    if !x.is_finite() || x < 0.0 {
        return TERM_CAP + 1;
    }
    let r = x.sqrt().ceil() + 2.0;
    if r >= 9.0e18 {
        TERM_CAP + 1
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = r as u64;
        n
    }
}
