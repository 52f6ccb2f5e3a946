//! Certifies whether a single equation pins down all of its unknowns.
//!
//! An equation `sum(c_i * x_i) = k` over 0/1 unknowns may admit zero, one or
//! many satisfying assignments. Only the "exactly one" case yields usable
//! facts, and only that case is reported; everything else is the normal
//! "not uniquely determined" outcome, never an error.
//!
//! The production path is a dynamic program over achievable partial sums,
//! linear in `unknowns x sum range`. [`enumerate_solutions`] is the
//! exhaustive 2^n reference with the same contract; the two must agree and
//! the test suite cross-checks them.

use crate::Point;
use crate::equation::Equation;
use std::collections::{BTreeMap, HashMap};

/// A total 0/1 assignment of an equation's unknowns (`true` = mined).
pub type Assignment = BTreeMap<Point, bool>;

/// Per partial sum: how many choice combinations reach it, and the current
/// unknown's bit on one achieving path. Sums reached more than once stay in
/// the table flagged non-unique so later unknowns still collide with them.
type SumTable = HashMap<i64, (u32, bool)>;

/// The single satisfying assignment of `equation`, if exactly one exists.
///
/// `None` means the equation alone does not determine its unknowns — it may
/// still be satisfiable. With no unknowns at all, the empty assignment is
/// returned exactly when the constant is 0.
pub fn unique_solution(equation: &Equation) -> Option<Assignment> {
    let unknowns: Vec<(Point, i64)> = equation.terms().collect();
    if unknowns.is_empty() {
        return (equation.constant() == 0).then(Assignment::new);
    }

    let mut layers: Vec<SumTable> = Vec::with_capacity(unknowns.len());
    let mut first = SumTable::new();
    first.insert(0, (1, false));
    first.insert(unknowns[0].1, (1, true));
    layers.push(first);

    for i in 1..unknowns.len() {
        let coefficient = unknowns[i].1;
        let mut layer = SumTable::with_capacity(layers[i - 1].len() * 2);
        for (&sum, &(ways, _)) in &layers[i - 1] {
            let hit = layer.entry(sum + coefficient).or_insert((0, true));
            hit.0 = hit.0.saturating_add(ways);
            hit.1 = true;
            let miss = layer.entry(sum).or_insert((0, false));
            miss.0 = miss.0.saturating_add(ways);
            miss.1 = false;
        }
        layers.push(layer);
    }

    let &(ways, _) = layers.last()?.get(&equation.constant())?;
    if ways != 1 {
        return None;
    }

    // A uniquely reached final sum is uniquely reached at every prefix, so
    // each recorded bit is the only choice on the path.
    let mut assignment = Assignment::new();
    let mut target = equation.constant();
    for (i, &(cell, coefficient)) in unknowns.iter().enumerate().rev() {
        let &(_, mined) = layers[i].get(&target)?;
        assignment.insert(cell, mined);
        if mined {
            target -= coefficient;
        }
    }
    Some(assignment)
}

/// Every satisfying assignment of `equation`, by exhaustive enumeration.
///
/// Cost is 2^n; intended for small equations and for cross-checking
/// [`unique_solution`] in tests.
pub fn enumerate_solutions(equation: &Equation) -> Vec<Assignment> {
    let unknowns: Vec<(Point, i64)> = equation.terms().collect();
    if unknowns.is_empty() {
        return if equation.constant() == 0 {
            vec![Assignment::new()]
        } else {
            Vec::new()
        };
    }

    (0u32..1 << unknowns.len())
        .filter(|mask| {
            let sum: i64 = unknowns
                .iter()
                .enumerate()
                .map(|(i, &(_, c))| if mask >> i & 1 == 1 { c } else { 0 })
                .sum();
            sum == equation.constant()
        })
        .map(|mask| {
            unknowns
                .iter()
                .enumerate()
                .map(|(i, &(cell, _))| (cell, mask >> i & 1 == 1))
                .collect()
        })
        .collect()
}
