//! Theta-constant, theta-derivative and eta q-series.
//!
//! These are the `w = 1` specializations: theta1 vanishes identically
//! at `z = 0`, so the constant evaluator is a three-function routine,
//! and the odd z-derivatives of theta1 get their own sum. Nothing here
//! reduces to the fundamental domain; callers that want reduction (all
//! of them, normally) go through the modular layer first, and a nome
//! with `|q| >= 1` yields indeterminate results, not an error.

use crate::addseq::AdditionSequence;
use crate::plan::{
    bits_per_exponent, oblong_estimate, pentagonal_estimate, plan_series, square_estimate,
    RECT_CROSSOVER,
};
use crate::qpow::{eval_power_table, rect_sum};
use quintus_ball::{BallComplex, BallReal, Mag};

/// The nome `q = exp(i pi tau)`.
#[must_use]
pub fn nome(tau: &BallComplex, prec: u32) -> BallComplex {
    tau.exp_pi_i(prec)
}

/// The quarter nome `q^(1/4) = exp(i pi tau / 4)`, principal throughout.
#[must_use]
pub fn nome_quarter(tau: &BallComplex, prec: u32) -> BallComplex {
    tau.mul_2exp(-2).exp_pi_i(prec)
}

/// The three non-vanishing theta constants `(theta2, theta3, theta4)`
/// at `z = 0`.
///
/// Indeterminate when the nome fails to converge (`|q| >= 1`) or is so
/// close to 1 that the series cannot be summed within the term cap.
#[must_use]
pub fn theta_const(tau: &BallComplex, prec: u32) -> (BallComplex, BallComplex, BallComplex) {
    let wp = prec + 32;
    let q4 = nome_quarter(tau, wp);
    let q = q4.pow_i(4, wp);
    if q.is_indeterminate() {
        return (
            BallComplex::indeterminate(),
            BallComplex::indeterminate(),
            BallComplex::indeterminate(),
        );
    }
    let qmag = q.abs_upper();
    let one_mag = |_: u64| Mag::from_2exp(0);
    let Some(bits) = bits_per_exponent(&qmag) else {
        return (
            BallComplex::indeterminate(),
            BallComplex::indeterminate(),
            BallComplex::indeterminate(),
        );
    };
    let sq_plan = plan_series(
        &qmag,
        prec,
        square_estimate(bits, prec),
        &|n| n * n,
        &one_mag,
        &one_mag,
    );
    let ob_plan = plan_series(
        &qmag,
        prec,
        oblong_estimate(bits, prec),
        &|n| n * (n + 1),
        &one_mag,
        &one_mag,
    );
    let (Some(sq_plan), Some(ob_plan)) = (sq_plan, ob_plan) else {
        return (
            BallComplex::indeterminate(),
            BallComplex::indeterminate(),
            BallComplex::indeterminate(),
        );
    };

    let use_rect = sq_plan.order + ob_plan.order > RECT_CROSSOVER as u64;
    let (mut s3, mut s4, mut s2) = if use_rect {
        let plus: Vec<(u64, i64)> = (1..=sq_plan.order).map(|n| (n * n, 1)).collect();
        let alt: Vec<(u64, i64)> = (1..=sq_plan.order)
            .map(|n| (n * n, if n % 2 == 0 { 1 } else { -1 }))
            .collect();
        let ob: Vec<(u64, i64)> = (1..=ob_plan.order).map(|n| (n * (n + 1), 1)).collect();
        (
            rect_sum(&plus, &q, bits, wp),
            rect_sum(&alt, &q, bits, wp),
            rect_sum(&ob, &q, bits, wp),
        )
    } else {
        let mut targets: Vec<u64> = (1..=sq_plan.order).map(|n| n * n).collect();
        targets.extend((1..=ob_plan.order).map(|n| n * (n + 1)));
        targets.sort_unstable();
        targets.dedup();
        let seq = AdditionSequence::build(&targets);
        let table = eval_power_table(&seq, &q, bits, wp);
        let mut s3 = BallComplex::zero(wp);
        let mut s4 = BallComplex::zero(wp);
        for n in 1..=sq_plan.order {
            let p = &table[seq.position(n * n)];
            s3 = s3.add(p, wp);
            s4 = if n % 2 == 0 {
                s4.add(p, wp)
            } else {
                s4.sub(p, wp)
            };
        }
        let mut s2 = BallComplex::zero(wp);
        for n in 1..=ob_plan.order {
            s2 = s2.add(&table[seq.position(n * (n + 1))], wp);
        }
        (s3, s4, s2)
    };
    s3.add_error(&sq_plan.tail);
    s4.add_error(&sq_plan.tail);
    s2.add_error(&ob_plan.tail);

    let one = BallComplex::one(wp);
    let t3 = one.add(&s3.mul_2exp(1), prec);
    let t4 = one.add(&s4.mul_2exp(1), prec);
    let t2 = q4.mul(&one.add(&s2, wp), prec).mul_2exp(1);
    (t2, t3, t4)
}

/// The first and third z-derivatives of theta1 at `z = 0`.
///
/// `theta1'(0) = 2 pi q^(1/4) sum (-1)^n (2n+1) q^(n(n+1))` and
/// `theta1'''(0) = -2 pi^3 q^(1/4) sum (-1)^n (2n+1)^3 q^(n(n+1))`;
/// their ratio carries the quasi-modular E2.
#[must_use]
pub fn theta1_derivatives(tau: &BallComplex, prec: u32) -> (BallComplex, BallComplex) {
    let wp = prec + 32;
    let q4 = nome_quarter(tau, wp);
    let q = q4.pow_i(4, wp);
    if q.is_indeterminate() {
        return (BallComplex::indeterminate(), BallComplex::indeterminate());
    }
    let qmag = q.abs_upper();
    let Some(bits) = bits_per_exponent(&qmag) else {
        return (BallComplex::indeterminate(), BallComplex::indeterminate());
    };
    #[allow(clippy::cast_precision_loss)]
    let cube_coeff = |n: u64| Mag::from_f64(((2 * n + 1) as f64).powi(3));
    #[allow(clippy::cast_precision_loss)]
    let cube_ratio = |n: u64| Mag::from_f64(((2 * n + 3) as f64 / (2 * n + 1) as f64).powi(3));
    // One plan covers both sums: the cubed coefficients dominate.
    let Some(plan) = plan_series(
        &qmag,
        prec,
        oblong_estimate(bits, prec),
        &|n| n * (n + 1),
        &cube_coeff,
        &cube_ratio,
    ) else {
        return (BallComplex::indeterminate(), BallComplex::indeterminate());
    };

    let order = plan.order;
    // The rectangular path carries (2n+1)^3 in machine words; past a
    // million terms that would overflow, so the addition-sequence walk
    // (which multiplies the weight in three factors) takes over again.
    let (mut s1, mut s3) = if order > RECT_CROSSOVER as u64 && order <= 1_000_000 {
        let lin: Vec<(u64, i64)> = (0..=order)
            .map(|n| {
                let sign = if n % 2 == 0 { 1 } else { -1 };
                #[allow(clippy::cast_possible_wrap)]
                let c = (2 * n + 1) as i64;
                (n * (n + 1), sign * c)
            })
            .collect();
        let cub: Vec<(u64, i64)> = (0..=order)
            .map(|n| {
                let sign = if n % 2 == 0 { 1 } else { -1 };
                #[allow(clippy::cast_possible_wrap)]
                let c = ((2 * n + 1) * (2 * n + 1) * (2 * n + 1)) as i64;
                (n * (n + 1), sign * c)
            })
            .collect();
        (rect_sum(&lin, &q, bits, wp), rect_sum(&cub, &q, bits, wp))
    } else {
        let targets: Vec<u64> = (1..=order).map(|n| n * (n + 1)).collect();
        let seq = AdditionSequence::build(&targets);
        let table = eval_power_table(&seq, &q, bits, wp);
        let mut s1 = BallComplex::zero(wp);
        let mut s3 = BallComplex::zero(wp);
        for n in 0..=order {
            let p = if n == 0 {
                BallComplex::one(wp)
            } else {
                table[seq.position(n * (n + 1))].clone()
            };
            #[allow(clippy::cast_possible_wrap)]
            let c = (2 * n + 1) as i64;
            let sign = if n % 2 == 0 { 1 } else { -1 };
            let linear = p.mul_i64(sign * c, wp);
            s1 = s1.add(&linear, wp);
            s3 = s3.add(&linear.mul_i64(c, wp).mul_i64(c, wp), wp);
        }
        (s1, s3)
    };
    s1.add_error(&plan.tail);
    s3.add_error(&plan.tail);

    let pi = BallReal::pi(wp);
    let d1 = s1.mul(&q4, wp).mul_real(&pi, prec).mul_2exp(1);
    let pi3 = pi.mul(&pi, wp).mul(&pi, wp);
    let d3 = s3.mul(&q4, wp).mul_real(&pi3, prec).mul_2exp(1).neg();
    (d1, d3)
}

/// The Dedekind eta q-series `eta(tau) = q^(1/12) sum_k (-1)^k q^(3k^2 - k)`
/// over all integers k, with `q = exp(i pi tau)`.
///
/// This is the bare pentagonal-number sum with its prefactor; the
/// modular layer owns fundamental-domain reduction and the 24th-root
/// epsilon factor.
#[must_use]
pub fn eta_sum(tau: &BallComplex, prec: u32) -> BallComplex {
    let wp = prec + 32;
    // q^(1/12) = exp(i pi tau / 12).
    let twelfth = tau
        .div_real(&BallReal::from_i64(12, wp), wp)
        .exp_pi_i(wp);
    let q = nome(tau, wp);
    if q.is_indeterminate() {
        return BallComplex::indeterminate();
    }
    let qmag = q.abs_upper();
    let Some(bits) = bits_per_exponent(&qmag) else {
        return BallComplex::indeterminate();
    };
    // Coefficient 2 covers the +/- k pair sharing each |k|.
    let two = |_: u64| Mag::from_2exp(1);
    let one_mag = |_: u64| Mag::from_2exp(0);
    let Some(plan) = plan_series(
        &qmag,
        prec,
        pentagonal_estimate(bits, prec),
        &|k| 3 * k * k - k,
        &two,
        &one_mag,
    ) else {
        return BallComplex::indeterminate();
    };

    let order = plan.order;
    let terms: Vec<(u64, i64)> = (1..=order)
        .flat_map(|k| {
            let sign = if k % 2 == 0 { 1 } else { -1 };
            [(3 * k * k - k, sign), (3 * k * k + k, sign)]
        })
        .collect();
    let mut s = if terms.len() > RECT_CROSSOVER {
        rect_sum(&terms, &q, bits, wp)
    } else {
        let targets: Vec<u64> = terms.iter().map(|&(e, _)| e).collect();
        let seq = AdditionSequence::build(&targets);
        let table = eval_power_table(&seq, &q, bits, wp);
        let mut s = BallComplex::zero(wp);
        for &(e, c) in &terms {
            s = s.add(&table[seq.position(e)].mul_i64(c, wp), wp);
        }
        s
    };
    s.add_error(&plan.tail);
    let total = BallComplex::one(wp).add(&s, wp);
    twelfth.mul(&total, prec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tau_i(prec: u32) -> BallComplex {
        BallComplex::i(prec)
    }

    fn approx(v: f64, prec: u32) -> BallComplex {
        let mut b = BallComplex::from_f64_pair(v, 0.0, prec);
        b.add_error(&Mag::from_f64(1.0e-13 * v.abs().max(1.0)));
        b
    }

    #[test]
    fn test_theta_constants_at_i() {
        // theta3(0|i) = pi^(1/4) / Gamma(3/4) = 1.08643481121330801...
        let (t2, t3, t4) = theta_const(&tau_i(128), 128);
        assert!(t3.overlaps(&approx(1.086_434_811_213_308, 128)));
        // At the S-fixed point theta2 and theta4 coincide.
        assert!(t2.overlaps(&t4));
        assert!(t3.rel_accuracy_bits() > 100);
    }

    #[test]
    fn test_jacobi_identity() {
        // theta3^4 = theta2^4 + theta4^4, here at tau = 1/3 + (3/2) i.
        let tau = BallComplex::from_f64_pair(1.0 / 3.0, 1.5, 160);
        let (t2, t3, t4) = theta_const(&tau, 160);
        let lhs = t3.pow_i(4, 160);
        let rhs = t2.pow_i(4, 160).add(&t4.pow_i(4, 160), 160);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_theta1_prime_is_product_of_constants() {
        // theta1'(0) = pi theta2 theta3 theta4 (z-derivative convention).
        let tau = BallComplex::from_f64_pair(0.25, 1.25, 160);
        let (t2, t3, t4) = theta_const(&tau, 160);
        let (d1, _) = theta1_derivatives(&tau, 160);
        let prod = t2
            .mul(&t3, 160)
            .mul(&t4, 160)
            .mul_real(&BallReal::pi(160), 160);
        assert!(d1.overlaps(&prod));
    }

    #[test]
    fn test_theta1_third_derivative_at_i() {
        // theta1'''(0)/theta1'(0) = -pi^2 E2(tau); E2(i) = 3/pi, so the
        // ratio at tau = i is -3 pi.
        let (d1, d3) = theta1_derivatives(&tau_i(160), 160);
        let ratio = d3.div(&d1, 160);
        let expect = BallComplex::from_real(BallReal::pi(160).mul_i64(-3, 160), 160);
        assert!(ratio.overlaps(&expect));
    }

    #[test]
    fn test_eta_at_i() {
        // eta(i) = Gamma(1/4) / (2 pi^(3/4)) = 0.76822542232605665...
        let e = eta_sum(&tau_i(128), 128);
        assert!(e.overlaps(&approx(0.768_225_422_326_056_6, 128)));
    }

    #[test]
    fn test_eta_cube_identity() {
        // eta(tau)^3 = theta1'(0)/(2 pi)  (both sides in the same
        // z-derivative convention).
        let tau = BallComplex::from_f64_pair(0.3, 0.9, 160);
        let e = eta_sum(&tau, 160);
        let (d1, _) = theta1_derivatives(&tau, 160);
        let lhs = e.pow_i(3, 160);
        let rhs = d1.div_real(&BallReal::pi(160), 160).mul_2exp(-1);
        assert!(lhs.overlaps(&rhs));
    }

    #[test]
    fn test_divergent_nome_is_indeterminate() {
        // tau on the real axis: |q| = 1, nothing converges.
        let tau = BallComplex::from_f64_pair(0.5, 0.0, 64);
        let (t2, t3, t4) = theta_const(&tau, 64);
        assert!(t2.is_indeterminate());
        assert!(t3.is_indeterminate());
        assert!(t4.is_indeterminate());
        assert!(eta_sum(&tau, 64).is_indeterminate());
    }

    #[test]
    fn test_precision_monotonicity() {
        let tau = BallComplex::from_f64_pair(0.125, 2.0, 512);
        let (_, lo, _) = theta_const(&tau, 64);
        let (_, hi, _) = theta_const(&tau, 512);
        assert!(
            hi.re().rad().cmp_mag(&lo.re().rad()) != std::cmp::Ordering::Greater
        );
        assert!(hi.rel_accuracy_bits() >= 500);
    }
}
