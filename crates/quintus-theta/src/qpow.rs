//! Evaluation of q-power tables and rectangular splitting.
//!
//! Small series walk the addition sequence directly, computing each
//! power at a working precision matched to the size of the term it
//! feeds: a term of magnitude `2^-k` below the leading one needs `k`
//! fewer bits, and at high precision that scaling is most of the
//! speedup. Past [`plan::RECT_CROSSOVER`] table entries, constant
//! series switch to rectangular (baby-step giant-step) splitting:
//! write `e = a*m + r`, keep a table of `q^r` for the residues that
//! occur, and Horner over the giant step `Q = q^m`. That trades a
//! larger residue table for many fewer full-precision multiplications.

use crate::addseq::{AdditionSequence, Rule};
use quintus_ball::BallComplex;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Working precision for the power feeding exponent `e`, given the
/// per-exponent decay in bits.
pub(crate) fn term_prec(e: u64, bits: f64, prec: u32) -> u32 {
    let full = prec + 20;
    #[allow(clippy::cast_precision_loss)]
    let drop = (e as f64) * bits;
    if !drop.is_finite() || drop <= 0.0 {
        return full;
    }
    if drop >= f64::from(full) {
        return 32;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let kept = full - (drop as u32);
    kept.max(32)
}

/// Evaluates the powers of `q` prescribed by an addition sequence.
///
/// The result is indexed in step order; use
/// [`AdditionSequence::position`] to find an exponent.
pub(crate) fn eval_power_table(
    seq: &AdditionSequence,
    q: &BallComplex,
    bits: f64,
    prec: u32,
) -> Vec<BallComplex> {
    let mut table: Vec<BallComplex> = Vec::with_capacity(seq.len());
    for &(e, rule) in seq.steps() {
        let p = term_prec(e, bits, prec);
        let value = match rule {
            Rule::Base => q.clone(),
            Rule::Square(i) => table[i].mul(&table[i], p),
            Rule::Product(i, j) => table[i].mul(&table[j], p),
        };
        table.push(value);
    }
    table
}

/// Sums `sum_i c_i * q^(e_i)` by rectangular splitting.
///
/// Coefficients are machine integers; the theta and eta constant series
/// only ever need signs and small odd-power weights.
pub(crate) fn rect_sum(terms: &[(u64, i64)], q: &BallComplex, bits: f64, prec: u32) -> BallComplex {
    let wp = prec + 20;
    if terms.is_empty() {
        return BallComplex::zero(wp);
    }
    let emax = terms.iter().map(|&(e, _)| e).max().unwrap_or(0);
    if emax == 0 {
        let total: i64 = terms.iter().map(|&(_, c)| c).sum();
        return BallComplex::from_i64(total, wp);
    }
    let m = choose_step(terms, emax);

    // Residue powers, via their own addition sequence.
    let mut residue_targets: Vec<u64> = terms
        .iter()
        .map(|&(e, _)| e % m)
        .filter(|&r| r > 0)
        .collect();
    residue_targets.push(m);
    residue_targets.sort_unstable();
    residue_targets.dedup();
    let seq = AdditionSequence::build(&residue_targets);
    let table = eval_power_table(&seq, q, bits, prec);
    let giant = table[seq.position(m)].clone();

    // Group by giant-step quotient; almost every group holds a couple
    // of residues at most.
    let mut groups: BTreeMap<u64, SmallVec<[(u64, i64); 4]>> = BTreeMap::new();
    for &(e, c) in terms {
        groups.entry(e / m).or_default().push((e % m, c));
    }

    // Horner from the highest quotient down.
    let mut acc = BallComplex::zero(wp);
    let mut prev_a: Option<u64> = None;
    for (&a, group) in groups.iter().rev() {
        if let Some(pa) = prev_a {
            let gap = pa - a;
            acc = acc.mul(&giant.pow_i(i64::try_from(gap).expect("gap fits i64"), wp), wp);
        }
        let mut inner = BallComplex::zero(wp);
        for &(r, c) in group {
            let term = if r == 0 {
                BallComplex::from_i64(c, wp)
            } else {
                table[seq.position(r)].mul_i64(c, wp)
            };
            inner = inner.add(&term, wp);
        }
        acc = acc.add(&inner, wp);
        prev_a = Some(a);
    }
    if let Some(a0) = prev_a {
        if a0 > 0 {
            acc = acc.mul(&giant.pow_i(i64::try_from(a0).expect("gap fits i64"), wp), wp);
        }
    }
    acc
}

/// Picks the giant-step size by scoring a handful of candidates on the
/// work they imply: one table entry per distinct residue plus one
/// multiplication per giant step.
fn choose_step(terms: &[(u64, i64)], emax: u64) -> u64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let base = ((emax as f64).sqrt() as u64).max(1);
    let candidates = [
        base / 2,
        (base * 3) / 4,
        base,
        (base * 3) / 2,
        base * 2,
        base * 3,
    ];
    let mut best = base.max(1);
    let mut best_cost = u64::MAX;
    for &m in &candidates {
        if m == 0 {
            continue;
        }
        let mut residues: FxHashSet<u64> = FxHashSet::default();
        for &(e, _) in terms {
            residues.insert(e % m);
        }
        let cost = residues.len() as u64 + emax / m;
        if cost < best_cost {
            best_cost = cost;
            best = m;
        }
    }
    best
}
