//! Short power series ("jets") over complex balls.
//!
//! A jet of length L holds the coefficients c0..c_{L-1} of a truncated
//! power series around some expansion point. Theta-function derivative
//! towers and the AGM-on-series recursion both work on jets of length
//! three to six, so these are plain dense routines; no FFT, no
//! allocation tricks.

use crate::complex::BallComplex;

/// The all-zero jet.
#[must_use]
pub fn jet_zero(len: usize, prec: u32) -> Vec<BallComplex> {
    vec![BallComplex::zero(prec); len]
}

/// The constant-one jet.
#[must_use]
pub fn jet_one(len: usize, prec: u32) -> Vec<BallComplex> {
    let mut out = jet_zero(len, prec);
    if !out.is_empty() {
        out[0] = BallComplex::one(prec);
    }
    out
}

/// A jet whose constant term is `c` and linear term is 1: the identity
/// perturbation `c + t`.
#[must_use]
pub fn jet_variable(c: &BallComplex, len: usize, prec: u32) -> Vec<BallComplex> {
    let mut out = jet_zero(len, prec);
    if !out.is_empty() {
        out[0] = c.clone();
    }
    if len > 1 {
        out[1] = BallComplex::one(prec);
    }
    out
}

/// Coefficientwise addition; the result has the longer length.
#[must_use]
pub fn jet_add(a: &[BallComplex], b: &[BallComplex], prec: u32) -> Vec<BallComplex> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|k| match (a.get(k), b.get(k)) {
            (Some(x), Some(y)) => x.add(y, prec),
            (Some(x), None) => x.clone(),
            (None, Some(y)) => y.clone(),
            (None, None) => unreachable!(),
        })
        .collect()
}

/// Coefficientwise subtraction.
#[must_use]
pub fn jet_sub(a: &[BallComplex], b: &[BallComplex], prec: u32) -> Vec<BallComplex> {
    jet_add(a, &jet_neg(b), prec)
}

/// Coefficientwise negation.
#[must_use]
pub fn jet_neg(a: &[BallComplex]) -> Vec<BallComplex> {
    a.iter().map(BallComplex::neg).collect()
}

/// Multiplies every coefficient by a scalar.
#[must_use]
pub fn jet_scalar_mul(a: &[BallComplex], s: &BallComplex, prec: u32) -> Vec<BallComplex> {
    a.iter().map(|c| c.mul(s, prec)).collect()
}

/// Truncated product of two jets.
#[must_use]
pub fn jet_mul_trunc(
    a: &[BallComplex],
    b: &[BallComplex],
    len: usize,
    prec: u32,
) -> Vec<BallComplex> {
    let p = prec + 4;
    let mut out = jet_zero(len, prec);
    for (i, ai) in a.iter().enumerate().take(len) {
        for (j, bj) in b.iter().enumerate() {
            if i + j >= len {
                break;
            }
            out[i + j] = out[i + j].add(&ai.mul(bj, p), p);
        }
    }
    out
}

/// Truncated quotient `a / b`. Every coefficient is indeterminate when
/// the constant term of `b` may vanish.
#[must_use]
pub fn jet_div_trunc(
    a: &[BallComplex],
    b: &[BallComplex],
    len: usize,
    prec: u32,
) -> Vec<BallComplex> {
    let p = prec + 8;
    if b.is_empty() || b[0].contains_zero() {
        return vec![BallComplex::indeterminate(); len];
    }
    let mut out = Vec::with_capacity(len);
    for k in 0..len {
        let mut acc = a.get(k).cloned().unwrap_or_else(|| BallComplex::zero(p));
        for i in 1..=k {
            if let Some(bi) = b.get(i) {
                acc = acc.sub(&bi.mul(&out[k - i], p), p);
            }
        }
        out.push(acc.div(&b[0], prec));
    }
    out
}

/// Truncated principal square root of a jet.
///
/// Indeterminate throughout when the constant term may vanish (the
/// series square root is singular there).
#[must_use]
pub fn jet_sqrt_trunc(a: &[BallComplex], len: usize, prec: u32) -> Vec<BallComplex> {
    let p = prec + 8;
    if a.is_empty() || a[0].contains_zero() {
        return vec![BallComplex::indeterminate(); len];
    }
    let mut out = Vec::with_capacity(len);
    out.push(a[0].sqrt(prec));
    let twice_s0 = out[0].mul_2exp(1);
    for k in 1..len {
        let mut acc = a.get(k).cloned().unwrap_or_else(|| BallComplex::zero(p));
        for i in 1..k {
            acc = acc.sub(&out[i].mul(&out[k - i], p), p);
        }
        out.push(acc.div(&twice_s0, prec));
    }
    out
}

/// Formal derivative: drops the constant term.
#[must_use]
pub fn jet_derivative(a: &[BallComplex], prec: u32) -> Vec<BallComplex> {
    a.iter()
        .enumerate()
        .skip(1)
        .map(|(k, c)| c.mul_i64(i64::try_from(k).expect("jet length fits i64"), prec))
        .collect()
}

/// Logarithmic derivative `a'/a`, truncated to `len`.
#[must_use]
pub fn jet_log_derivative(a: &[BallComplex], len: usize, prec: u32) -> Vec<BallComplex> {
    jet_div_trunc(&jet_derivative(a, prec), a, len, prec)
}
