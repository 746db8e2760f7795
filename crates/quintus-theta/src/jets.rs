//! Derivative jets of the four Jacobi theta functions.
//!
//! `theta_jet` returns length-L jets of theta1..theta4 in the
//! z-variable: coefficient k is the k-th z-derivative divided by k!.
//! All four come from one shared q-power table and one pair of
//! `w = exp(i pi z)` power walks, which is why they are produced
//! together.
//!
//! The argument is first reduced quasi-periodically,
//! `z = z' + m tau + n`, with the exact prefactor
//! `sigma q^(-m^2) w'^(-2m) exp(-2 pi i m t)` restored as a jet
//! afterwards; the series then converges as fast as the constant case
//! up to the bounded `w'` powers.

use crate::addseq::AdditionSequence;
use crate::plan::{bits_per_exponent, mag_pow_u64, oblong_estimate, plan_series, square_estimate};
use crate::qpow::{eval_power_table, term_prec};
use crate::series::nome_quarter;
use quintus_ball::jet::jet_mul_trunc;
use quintus_ball::{BallComplex, BallReal, Mag};

/// The four theta jets, always produced together.
#[derive(Clone, Debug)]
pub struct ThetaQuadruple {
    /// Jet of theta1.
    pub t1: Vec<BallComplex>,
    /// Jet of theta2.
    pub t2: Vec<BallComplex>,
    /// Jet of theta3.
    pub t3: Vec<BallComplex>,
    /// Jet of theta4.
    pub t4: Vec<BallComplex>,
}

impl ThetaQuadruple {
    fn indeterminate(len: usize) -> Self {
        let j = vec![BallComplex::indeterminate(); len];
        Self {
            t1: j.clone(),
            t2: j.clone(),
            t3: j.clone(),
            t4: j,
        }
    }
}

/// Length-`len` jets of theta1..theta4 at `(z, tau)`.
///
/// Indeterminate throughout when the nome does not converge or the
/// inputs are already indeterminate.
#[must_use]
pub fn theta_jet(z: &BallComplex, tau: &BallComplex, len: usize, prec: u32) -> ThetaQuadruple {
    let len = len.max(1);
    let wp = prec + 32 + 2 * u32::try_from(len).unwrap_or(32);
    let q4 = nome_quarter(tau, wp);
    let q = q4.pow_i(4, wp);
    if q.is_indeterminate() || z.is_indeterminate() {
        return ThetaQuadruple::indeterminate(len);
    }
    let qmag = q.abs_upper();
    let Some(bits) = bits_per_exponent(&qmag) else {
        return ThetaQuadruple::indeterminate(len);
    };

    // Quasi-periodic reduction z = z' + m tau + n. The shift counts only
    // need to be integers, so f64 estimates are fine.
    let tau_im = tau.im().mid_f64();
    let ratio = z.im().mid_f64() / tau_im;
    let m = if tau_im > 0.0 && ratio.is_finite() && ratio.abs() < 1.0e9 {
        #[allow(clippy::cast_possible_truncation)]
        let m = ratio.round() as i64;
        m
    } else {
        0
    };
    let z1 = z.sub(&tau.mul_i64(m, wp), wp);
    let zre = z1.re().mid_f64();
    let n_shift = if zre.is_finite() && zre.abs() < 1.0e15 {
        #[allow(clippy::cast_possible_truncation)]
        let n = zre.round() as i64;
        n
    } else {
        0
    };
    let zr = z1.sub(&BallComplex::from_i64(n_shift, wp), wp);

    let w = zr.exp_pi_i(wp);
    let winv = w.inv(wp);
    if w.is_indeterminate() || winv.is_indeterminate() {
        return ThetaQuadruple::indeterminate(len);
    }
    let wmag = w.abs_upper().max(&winv.abs_upper());
    let wmag_sq = wmag.mul(&wmag);

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let lm1 = (len - 1) as i32;
    #[allow(clippy::cast_precision_loss)]
    let coeff34 = move |n: u64| {
        Mag::from_f64(((2 * n) as f64).powi(lm1))
            .mul(&mag_pow_u64(&wmag, 2 * n))
            .mul_2exp(1)
    };
    #[allow(clippy::cast_precision_loss)]
    let ratio34 = move |n: u64| {
        Mag::from_f64(((2 * n + 2) as f64 / (2 * n) as f64).powi(lm1)).mul(&wmag_sq)
    };
    #[allow(clippy::cast_precision_loss)]
    let coeff12 = move |n: u64| {
        Mag::from_f64(((2 * n + 1) as f64).powi(lm1))
            .mul(&mag_pow_u64(&wmag, 2 * n + 1))
            .mul_2exp(1)
    };
    #[allow(clippy::cast_precision_loss)]
    let ratio12 = move |n: u64| {
        Mag::from_f64(((2 * n + 3) as f64 / (2 * n + 1) as f64).powi(lm1)).mul(&wmag_sq)
    };

    // Extra terms to burn off the growth of the w powers.
    let wlog = wmag.log2_estimate();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let w_extra = if wlog > 0.0 && (2.0 * wlog / bits).is_finite() {
        (2.0 * wlog / bits).ceil().min(1.0e9) as u64
    } else {
        0
    };

    let plan34 = plan_series(
        &qmag,
        prec,
        square_estimate(bits, prec) + w_extra,
        &|n| n * n,
        &coeff34,
        &ratio34,
    );
    let plan12 = plan_series(
        &qmag,
        prec,
        oblong_estimate(bits, prec) + w_extra,
        &|n| n * (n + 1),
        &coeff12,
        &ratio12,
    );
    let (Some(plan34), Some(plan12)) = (plan34, plan12) else {
        return ThetaQuadruple::indeterminate(len);
    };

    let mut targets: Vec<u64> = (1..=plan34.order).map(|n| n * n).collect();
    targets.extend((1..=plan12.order).map(|n| n * (n + 1)));
    targets.sort_unstable();
    targets.dedup();
    let seq = AdditionSequence::build(&targets);
    let table = eval_power_table(&seq, &q, bits, wp);

    let mut a3 = vec![BallComplex::zero(wp); len];
    let mut a4 = vec![BallComplex::zero(wp); len];
    let mut b1 = vec![BallComplex::zero(wp); len];
    let mut b2 = vec![BallComplex::zero(wp); len];

    // Even powers: terms q^(n^2) (w^(2n) +/- w^(-2n)) feed theta3/theta4.
    let w2 = w.mul(&w, wp);
    let w2i = winv.mul(&winv, wp);
    let mut pn = w2.clone();
    let mut mn = w2i.clone();
    for n in 1..=plan34.order {
        let tp = term_prec(n * n, bits, prec);
        let qp = &table[seq.position(n * n)];
        let mut x = qp.mul(&pn, tp);
        let mut y = qp.mul(&mn, tp);
        let odd_n = n % 2 == 1;
        for k in 0..len {
            let s = if k % 2 == 0 {
                x.add(&y, tp)
            } else {
                x.sub(&y, tp)
            };
            a3[k] = a3[k].add(&s, wp);
            a4[k] = if odd_n {
                a4[k].sub(&s, wp)
            } else {
                a4[k].add(&s, wp)
            };
            if k + 1 < len {
                #[allow(clippy::cast_possible_wrap)]
                let f = (2 * n) as i64;
                x = x.mul_i64(f, tp);
                y = y.mul_i64(f, tp);
            }
        }
        if n < plan34.order {
            pn = pn.mul(&w2, wp);
            mn = mn.mul(&w2i, wp);
        }
    }

    // Odd powers: terms q^(n(n+1)) (w^(2n+1) -/+ w^-(2n+1)) feed
    // theta1/theta2 under the q^(1/4) prefactor.
    let mut on = w.clone();
    let mut oin = winv.clone();
    for n in 0..=plan12.order {
        let e = n * (n + 1);
        let tp = term_prec(e, bits, prec);
        let qp = if n == 0 {
            BallComplex::one(wp)
        } else {
            table[seq.position(e)].clone()
        };
        let mut x = qp.mul(&on, tp);
        let mut y = qp.mul(&oin, tp);
        let odd_n = n % 2 == 1;
        for k in 0..len {
            let (sum2, dif1) = if k % 2 == 0 {
                (x.add(&y, tp), x.sub(&y, tp))
            } else {
                (x.sub(&y, tp), x.add(&y, tp))
            };
            b2[k] = b2[k].add(&sum2, wp);
            b1[k] = if odd_n {
                b1[k].sub(&dif1, wp)
            } else {
                b1[k].add(&dif1, wp)
            };
            if k + 1 < len {
                #[allow(clippy::cast_possible_wrap)]
                let f = (2 * n + 1) as i64;
                x = x.mul_i64(f, tp);
                y = y.mul_i64(f, tp);
            }
        }
        if n < plan12.order {
            on = on.mul(&w2, wp);
            oin = oin.mul(&w2i, wp);
        }
    }

    for k in 0..len {
        a3[k].add_error(&plan34.tail);
        a4[k].add_error(&plan34.tail);
        b1[k].add_error(&plan12.tail);
        b2[k].add_error(&plan12.tail);
    }

    // Assemble: jet coefficient k carries (i pi)^k / k!.
    let pi = BallReal::pi(wp);
    let i_pi = BallComplex::from_re_im(BallReal::zero(wp), pi.clone());
    let one = BallComplex::one(wp);
    let mut fac = BallComplex::one(wp);
    let mut t1 = Vec::with_capacity(len);
    let mut t2 = Vec::with_capacity(len);
    let mut t3 = Vec::with_capacity(len);
    let mut t4 = Vec::with_capacity(len);
    for (k, ((a3k, a4k), (b1k, b2k))) in a3
        .iter()
        .zip(a4.iter())
        .zip(b1.iter().zip(b2.iter()))
        .enumerate()
    {
        if k > 0 {
            fac = fac
                .mul(&i_pi, wp)
                .div_real(&BallReal::from_i64(i64::try_from(k).expect("k fits"), wp), wp);
        }
        let mut c3 = a3k.mul(&fac, wp);
        let mut c4 = a4k.mul(&fac, wp);
        if k == 0 {
            c3 = c3.add(&one, wp);
            c4 = c4.add(&one, wp);
        }
        t3.push(c3);
        t4.push(c4);
        t2.push(b2k.mul(&fac, wp).mul(&q4, wp));
        t1.push(b1k.mul(&fac, wp).mul(&q4, wp).mul_i().neg());
    }

    // Restore the quasi-periodic prefactor.
    if m != 0 || n_shift != 0 {
        let neg_msq = m.checked_mul(m).and_then(|s| s.checked_neg());
        let Some(neg_msq) = neg_msq else {
            return ThetaQuadruple::indeterminate(len);
        };
        let c = q.pow_i(neg_msq, wp).mul(&winv.pow_i(2 * m, wp), wp);
        if c.is_indeterminate() {
            return ThetaQuadruple::indeterminate(len);
        }
        // pf(t) = c exp(-2 pi i m t), as a jet.
        let g = BallComplex::from_re_im(BallReal::zero(wp), pi.mul_i64(-2 * m, wp));
        let mut pf = Vec::with_capacity(len);
        pf.push(c);
        for k in 1..len {
            let next = pf[k - 1]
                .mul(&g, wp)
                .div_real(&BallReal::from_i64(i64::try_from(k).expect("k fits"), wp), wp);
            pf.push(next);
        }
        t1 = jet_mul_trunc(&t1, &pf, len, wp);
        t2 = jet_mul_trunc(&t2, &pf, len, wp);
        t3 = jet_mul_trunc(&t3, &pf, len, wp);
        t4 = jet_mul_trunc(&t4, &pf, len, wp);
        // sigma1 = (-1)^(n+m), sigma2 = (-1)^n, sigma3 = 1,
        // sigma4 = (-1)^m.
        let odd_n = n_shift.rem_euclid(2) == 1;
        let odd_m = m.rem_euclid(2) == 1;
        if odd_n != odd_m {
            t1 = t1.iter().map(BallComplex::neg).collect();
        }
        if odd_n {
            t2 = t2.iter().map(BallComplex::neg).collect();
        }
        if odd_m {
            t4 = t4.iter().map(BallComplex::neg).collect();
        }
    }

    ThetaQuadruple { t1, t2, t3, t4 }
}
