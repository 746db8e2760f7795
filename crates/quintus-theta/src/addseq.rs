//! Addition sequences for q-power tables.
//!
//! The theta series need the powers `q^e` for a sparse set of exponents
//! (squares, oblong numbers, generalized pentagonal numbers). An
//! addition sequence orders those exponents, inserting helpers where
//! necessary, so that each power is one multiplication (or squaring) of
//! two earlier table entries. The result is O(N) ball multiplications
//! for N series terms, with squarings preferred since they are cheaper
//! at high precision.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// How a table entry is produced from earlier entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// The base power `q^1`.
    Base,
    /// Squaring of the entry at the given index.
    Square(usize),
    /// Product of the entries at the given indices.
    Product(usize, usize),
}

/// An evaluation plan: exponents in dependency order with their rules.
#[derive(Clone, Debug)]
pub struct AdditionSequence {
    steps: Vec<(u64, Rule)>,
    index: FxHashMap<u64, usize>,
}

impl AdditionSequence {
    /// Builds an addition sequence covering every target exponent.
    ///
    /// Zero exponents are the caller's business (`q^0 = 1`); targets must
    /// be positive.
    ///
    /// # Panics
    ///
    /// Panics if a target is zero, or on an internal inconsistency in the
    /// table construction (which would be a bug, not a data condition).
    #[must_use]
    pub fn build(targets: &[u64]) -> Self {
        let mut pending: BTreeSet<u64> = targets.iter().copied().collect();
        assert!(
            !pending.contains(&0),
            "malformed addition sequence: zero exponent"
        );
        pending.insert(1);

        let mut steps: Vec<(u64, Rule)> = Vec::with_capacity(pending.len() * 2);
        let mut index: FxHashMap<u64, usize> = FxHashMap::default();
        let mut realized: Vec<u64> = Vec::with_capacity(pending.len() * 2);

        let mut guard = 0usize;
        while let Some(e) = pending.pop_first() {
            guard += 1;
            assert!(
                guard < 1_000_000_000,
                "malformed addition sequence: no progress"
            );
            if index.contains_key(&e) {
                continue;
            }
            let rule = if e == 1 {
                Rule::Base
            } else if e % 2 == 0 && index.contains_key(&(e / 2)) {
                Rule::Square(index[&(e / 2)])
            } else if let Some((i, j)) = find_pair(&realized, &index, e) {
                Rule::Product(i, j)
            } else {
                // No pair of prior entries sums to e: queue the gap to the
                // largest prior entry as a helper and retry e afterwards.
                let largest = realized
                    .last()
                    .copied()
                    .expect("malformed addition sequence: empty table");
                let helper = e - largest.min(e - 1);
                pending.insert(helper);
                pending.insert(e);
                continue;
            };
            index.insert(e, steps.len());
            steps.push((e, rule));
            realized.push(e);
        }

        Self { steps, index }
    }

    /// The evaluation steps in dependency order.
    #[must_use]
    pub fn steps(&self) -> &[(u64, Rule)] {
        &self.steps
    }

    /// Number of table entries (multiplications to perform).
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of an exponent in the evaluated table.
    ///
    /// # Panics
    ///
    /// Panics when the exponent was not a target (table-construction bug).
    #[must_use]
    pub fn position(&self, exponent: u64) -> usize {
        *self
            .index
            .get(&exponent)
            .expect("malformed addition sequence: missing exponent")
    }
}

/// Scans the realized exponents (ascending) for a pair summing to `e`.
fn find_pair(
    realized: &[u64],
    index: &FxHashMap<u64, usize>,
    e: u64,
) -> Option<(usize, usize)> {
    for &a in realized.iter().rev() {
        if a >= e {
            continue;
        }
        let b = e - a;
        if b > a {
            // realized is ascending; once the complement exceeds `a`
            // every later pair has been seen from the other side.
            break;
        }
        if let Some(&j) = index.get(&b) {
            return Some((index[&a], j));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_covers(targets: &[u64]) {
        let seq = AdditionSequence::build(targets);
        // Replay the sequence over exact integers, verifying every rule.
        let mut values: Vec<u64> = Vec::new();
        for &(e, rule) in seq.steps() {
            let v = match rule {
                Rule::Base => 1,
                Rule::Square(i) => {
                    assert!(i < values.len());
                    2 * values[i]
                }
                Rule::Product(i, j) => {
                    assert!(i < values.len() && j < values.len());
                    values[i] + values[j]
                }
            };
            assert_eq!(v, e, "rule for {e} reproduces the wrong exponent");
            values.push(v);
        }
        for &t in targets {
            assert_eq!(seq.steps()[seq.position(t)].0, t);
        }
    }

    #[test]
    fn test_squares() {
        let targets: Vec<u64> = (1..=40u64).map(|n| n * n).collect();
        check_covers(&targets);
    }

    #[test]
    fn test_oblong() {
        let targets: Vec<u64> = (1..=40u64).map(|n| n * (n + 1)).collect();
        check_covers(&targets);
    }

    #[test]
    fn test_pentagonal() {
        let mut targets: Vec<u64> = Vec::new();
        for k in 1..=30i64 {
            targets.push((3 * k * k - k) as u64);
            targets.push((3 * k * k + k) as u64);
        }
        check_covers(&targets);
    }

    #[test]
    fn test_sparse_awkward() {
        check_covers(&[7, 100, 1000, 999, 17]);
    }

    #[test]
    fn test_cost_is_linear() {
        let targets: Vec<u64> = (1..=200u64).map(|n| n * n).collect();
        let seq = AdditionSequence::build(&targets);
        // Squares need the odd numbers as helpers; the table should stay
        // within a small constant of 2 entries per target.
        assert!(seq.len() < 3 * targets.len() + 16);
    }

    #[test]
    #[should_panic(expected = "malformed addition sequence")]
    fn test_zero_target_panics() {
        let _ = AdditionSequence::build(&[0, 4]);
    }
}
