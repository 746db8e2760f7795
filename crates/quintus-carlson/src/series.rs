//! Taylor tails of the Carlson integrals in elementary symmetric terms.
//!
//! After duplication the arguments sit near their mean A, and the
//! integral is `A^(-1/2)` (or `A^(-3/2)`) times a multivariate series
//! in the elementary symmetric functions of the relative differences.
//! The coefficients are exact rationals from the Pochhammer closed
//! forms
//!
//!   R_F:  c(m,n) = (-1)^m (1/2)_(m+n) / (m! n! (4m + 6n + 1))
//!   R_J:  c(m2..m5) = 3 (-1)^(k + m3 + m5) (1/2)_k
//!                     / (m2! m3! m4! m5! (2d + 3)),
//!
//! with k the coefficient count and d the weighted degree; evaluation
//! is Horner in E2 inside an ascending walk over the other powers, so
//! each power of each symmetric function is formed once. The neglected
//! degrees are charged with the crude-but-sound coefficient bound
//! `2 (9/8)^d`.

use num_traits::One;
use quintus_ball::{BallComplex, Mag};
use quintus_exact::{Integer, Rational};

/// Expansion order from the empirical power law, clamped to [5, 500].
///
/// The constants are tuned, not sacred: any order passing the accuracy
/// properties is acceptable, this one just balances duplication steps
/// against series terms well in practice.
#[must_use]
pub fn series_order(prec: u32) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (2.2 * f64::from(prec).powf(0.45)).ceil() as u32;
    n.clamp(5, 500)
}

/// The tail magnitude for everything past weighted degree `order`,
/// given `eps` bounding the symmetric-difference magnitudes: a
/// geometric series in `(9/8) eps` starting at degree `order + 1`.
/// Infinite (indeterminate downstream) when that ratio reaches 1.
#[must_use]
pub fn series_tail(eps: &Mag, order: u32) -> Mag {
    let ratio = eps.mul(&Mag::from_f64(9.0 / 8.0));
    if ratio.cmp_mag(&Mag::from_2exp(0)) != std::cmp::Ordering::Less {
        return Mag::inf();
    }
    ratio.pow(order + 1).mul_2exp(1).geom_series(&ratio)
}

/// Incremental tables of factorials and `(1/2)_k`.
struct CoeffTables {
    factorial: Vec<Integer>,
    poch_half: Vec<Rational>,
}

impl CoeffTables {
    fn new(max_k: usize) -> Self {
        let mut factorial = Vec::with_capacity(max_k + 1);
        let mut poch_half = Vec::with_capacity(max_k + 1);
        factorial.push(Integer::one());
        poch_half.push(Rational::one());
        for k in 1..=max_k {
            #[allow(clippy::cast_possible_wrap)]
            let kk = k as i64;
            factorial.push(&factorial[k - 1] * &Integer::new(kk));
            let step = Rational::from_i64(2 * kk - 1, 2);
            poch_half.push(&poch_half[k - 1] * &step);
        }
        Self {
            factorial,
            poch_half,
        }
    }
}

/// The R_F tail series `sum c(m,n) E2^m E3^n` over `2m + 3n <= order`.
#[must_use]
pub fn rf_series_sum(
    e2: &BallComplex,
    e3: &BallComplex,
    order: u32,
    prec: u32,
) -> BallComplex {
    let wp = prec + 16;
    let order = order as usize;
    let tables = CoeffTables::new(order / 2 + order / 3 + 2);

    let mut sum = BallComplex::zero(wp);
    let mut e3_pow = BallComplex::one(wp);
    for n in 0..=(order / 3) {
        let m_max = (order - 3 * n) / 2;
        // Horner in E2 over m = m_max .. 0.
        let mut inner = BallComplex::zero(wp);
        for m in (0..=m_max).rev() {
            let c = rf_coeff(&tables, m, n);
            inner = inner
                .mul(e2, wp)
                .add(&BallComplex::from_rational(&c, wp), wp);
        }
        sum = sum.add(&inner.mul(&e3_pow, wp), wp);
        if 3 * (n + 1) <= order {
            e3_pow = e3_pow.mul(e3, wp);
        }
    }
    sum
}

fn rf_coeff(t: &CoeffTables, m: usize, n: usize) -> Rational {
    #[allow(clippy::cast_possible_wrap)]
    let denom_scalar = (4 * m + 6 * n + 1) as i64;
    let num = t.poch_half[m + n].clone();
    let den = Rational::from_integer(
        &(&t.factorial[m] * &t.factorial[n]) * &Integer::new(denom_scalar),
    );
    let c = num / den;
    if m % 2 == 1 {
        -c
    } else {
        c
    }
}

/// The R_J/R_D tail series over the five-variable symmetric functions,
/// `sum c(m2..m5) E2^m2 E3^m3 E4^m4 E5^m5` with `2m2+3m3+4m4+5m5 <= order`.
#[must_use]
pub fn rj_series_sum(
    e2: &BallComplex,
    e3: &BallComplex,
    e4: &BallComplex,
    e5: &BallComplex,
    order: u32,
    prec: u32,
) -> BallComplex {
    let wp = prec + 16;
    let order = order as usize;
    let tables = CoeffTables::new(order + 2);

    let mut sum = BallComplex::zero(wp);
    let mut e5_pow = BallComplex::one(wp);
    for m5 in 0..=(order / 5) {
        let rem5 = order - 5 * m5;
        let mut e4_pow = BallComplex::one(wp);
        for m4 in 0..=(rem5 / 4) {
            let rem4 = rem5 - 4 * m4;
            let mut e3_pow = BallComplex::one(wp);
            for m3 in 0..=(rem4 / 3) {
                let rem3 = rem4 - 3 * m3;
                let m2_max = rem3 / 2;
                let mut inner = BallComplex::zero(wp);
                for m2 in (0..=m2_max).rev() {
                    let c = rj_coeff(&tables, m2, m3, m4, m5);
                    inner = inner
                        .mul(e2, wp)
                        .add(&BallComplex::from_rational(&c, wp), wp);
                }
                let outer = e5_pow.mul(&e4_pow, wp).mul(&e3_pow, wp);
                sum = sum.add(&inner.mul(&outer, wp), wp);
                if 3 * (m3 + 1) <= rem4 {
                    e3_pow = e3_pow.mul(e3, wp);
                }
            }
            if 4 * (m4 + 1) <= rem5 {
                e4_pow = e4_pow.mul(e4, wp);
            }
        }
        if 5 * (m5 + 1) <= order {
            e5_pow = e5_pow.mul(e5, wp);
        }
    }
    sum
}

fn rj_coeff(t: &CoeffTables, m2: usize, m3: usize, m4: usize, m5: usize) -> Rational {
    let k = m2 + m3 + m4 + m5;
    let d = 2 * m2 + 3 * m3 + 4 * m4 + 5 * m5;
    #[allow(clippy::cast_possible_wrap)]
    let denom_scalar = (2 * d + 3) as i64;
    let num = &t.poch_half[k] * &Rational::from_i64(3, 1);
    let den = &(&t.factorial[m2] * &t.factorial[m3])
        * &(&(&t.factorial[m4] * &t.factorial[m5]) * &Integer::new(denom_scalar));
    let c = num / Rational::from_integer(den);
    if (k + m3 + m5) % 2 == 1 {
        -c
    } else {
        c
    }
}

/// `A^(-1/2)` with the principal branch.
#[must_use]
pub fn inv_sqrt(a: &BallComplex, prec: u32) -> BallComplex {
    a.sqrt(prec + 8).inv(prec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rf_low_order_coefficients() {
        // 1 - E2/10 + E3/14 + E2^2/24 - 3 E2 E3/44 ...
        let t = CoeffTables::new(8);
        assert_eq!(rf_coeff(&t, 0, 0), Rational::from_i64(1, 1));
        assert_eq!(rf_coeff(&t, 1, 0), Rational::from_i64(-1, 10));
        assert_eq!(rf_coeff(&t, 0, 1), Rational::from_i64(1, 14));
        assert_eq!(rf_coeff(&t, 2, 0), Rational::from_i64(1, 24));
        assert_eq!(rf_coeff(&t, 1, 1), Rational::from_i64(-3, 44));
        assert_eq!(rf_coeff(&t, 3, 0), Rational::from_i64(-5, 208));
        assert_eq!(rf_coeff(&t, 0, 2), Rational::from_i64(3, 104));
    }

    #[test]
    fn test_rj_low_order_coefficients() {
        // 1 - 3 E2/14 + E3/6 + 9 E2^2/88 - 3 E4/22 - 9 E2 E3/52 + 3 E5/26.
        let t = CoeffTables::new(8);
        assert_eq!(rj_coeff(&t, 0, 0, 0, 0), Rational::from_i64(1, 1));
        assert_eq!(rj_coeff(&t, 1, 0, 0, 0), Rational::from_i64(-3, 14));
        assert_eq!(rj_coeff(&t, 0, 1, 0, 0), Rational::from_i64(1, 6));
        assert_eq!(rj_coeff(&t, 2, 0, 0, 0), Rational::from_i64(9, 88));
        assert_eq!(rj_coeff(&t, 0, 0, 1, 0), Rational::from_i64(-3, 22));
        assert_eq!(rj_coeff(&t, 1, 1, 0, 0), Rational::from_i64(-9, 52));
        assert_eq!(rj_coeff(&t, 0, 0, 0, 1), Rational::from_i64(3, 26));
    }

    #[test]
    fn test_series_order_clamps() {
        assert_eq!(series_order(2), 5);
        assert!(series_order(64) >= 10);
        assert!(series_order(64) <= 30);
        assert_eq!(series_order(2_000_000), 500);
    }

    #[test]
    fn test_series_tail_behaviour() {
        let eps = Mag::from_f64(1.0 / 64.0);
        let t8 = series_tail(&eps, 8);
        let t16 = series_tail(&eps, 16);
        assert!(t16.cmp_mag(&t8) == std::cmp::Ordering::Less);
        assert!(series_tail(&Mag::from_f64(0.9), 8).is_inf());
    }

    #[test]
    fn test_rf_series_at_zero_is_one() {
        let z = BallComplex::zero(64);
        let s = rf_series_sum(&z, &z, 7, 64);
        assert!(s.overlaps(&BallComplex::one(64)));
    }

    #[test]
    fn test_rj_series_at_zero_is_one() {
        let z = BallComplex::zero(64);
        let s = rj_series_sum(&z, &z, &z, &z, 7, 64);
        assert!(s.overlaps(&BallComplex::one(64)));
    }
}
