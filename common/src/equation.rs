//! Sparse integer linear equations over cell unknowns.
//!
//! Each unknown is the 0/1 mine indicator of one covered cell. An equation
//! states `sum(coefficient * indicator) = constant`, e.g. the following
//! system over the covered cells `a`, `b` and `c`:
//!
//! ```txt
//! a * 1 + b * 1         = 1
//! a * 1 + b * 1 + c * 1 = 2
//!         b * 1 + c * 1 = 1
//! ```
//!
//! solves to `a = 1`, `b = 0`, `c = 1`. Coefficients other than 1 arise once
//! the elimination sweep starts cross-multiplying rows.
//!
//! Equations are value types: `add`, `sub`, `negate` and `scale` never touch
//! their operands. `reduce` is the sole in-place algebraic operation; the
//! substitution helpers mutate in place as well, since they retire an unknown
//! whose value the board has fixed.

use crate::Point;
use std::collections::BTreeMap;
use std::fmt;

/// A sparse linear equation: per-cell integer coefficients plus a constant
/// right-hand side.
///
/// Invariant: `terms` never holds a zero coefficient — arithmetic drops
/// zeroed unknowns eagerly. The constant is always present, zero included
/// ("the sum of these unknowns is 0" is meaningful).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Equation {
    terms: BTreeMap<Point, i64>,
    constant: i64,
}

impl Equation {
    /// An equation with no unknowns and the given right-hand side.
    pub fn with_constant(constant: i64) -> Self {
        Equation {
            terms: BTreeMap::new(),
            constant,
        }
    }

    /// Build an equation from `(cell, coefficient)` pairs. Duplicate cells
    /// accumulate; zero coefficients are dropped.
    pub fn from_terms<I>(terms: I, constant: i64) -> Self
    where
        I: IntoIterator<Item = (Point, i64)>,
    {
        let mut eq = Equation::with_constant(constant);
        for (cell, coefficient) in terms {
            let merged = eq.coefficient(cell) + coefficient;
            if merged == 0 {
                eq.terms.remove(&cell);
            } else {
                eq.terms.insert(cell, merged);
            }
        }
        eq
    }

    /// The coefficient of `cell`, 0 if absent.
    pub fn coefficient(&self, cell: Point) -> i64 {
        self.terms.get(&cell).copied().unwrap_or(0)
    }

    pub fn constant(&self) -> i64 {
        self.constant
    }

    /// Number of unknowns (the constant does not count).
    pub fn unknown_count(&self) -> usize {
        self.terms.len()
    }

    /// The unknowns with their coefficients, in stable `Point` order.
    pub fn terms(&self) -> impl Iterator<Item = (Point, i64)> + '_ {
        self.terms.iter().map(|(&cell, &coefficient)| (cell, coefficient))
    }

    /// The first unknown in the equation's stable ordering; the elimination
    /// sweep uses it as the pivot.
    pub fn first_unknown(&self) -> Option<Point> {
        self.terms.keys().next().copied()
    }

    /// Coefficient-wise sum. Unknowns whose summed coefficient is zero are
    /// dropped; the constants add.
    pub fn add(&self, other: &Equation) -> Equation {
        let mut out = self.clone();
        for (cell, coefficient) in other.terms() {
            let merged = out.coefficient(cell) + coefficient;
            if merged == 0 {
                out.terms.remove(&cell);
            } else {
                out.terms.insert(cell, merged);
            }
        }
        out.constant += other.constant;
        out
    }

    pub fn sub(&self, other: &Equation) -> Equation {
        self.add(&other.negate())
    }

    /// Every coefficient and the constant sign-flipped.
    pub fn negate(&self) -> Equation {
        Equation {
            terms: self.terms.iter().map(|(&c, &v)| (c, -v)).collect(),
            constant: -self.constant,
        }
    }

    /// Every coefficient and the constant multiplied by `k`. Scaling by 0
    /// drops all unknowns but keeps the (zero) constant.
    pub fn scale(&self, k: i64) -> Equation {
        if k == 0 {
            return Equation::with_constant(0);
        }
        Equation {
            terms: self.terms.iter().map(|(&c, &v)| (c, v * k)).collect(),
            constant: self.constant * k,
        }
    }

    /// Divide every coefficient and the constant by their collective GCD.
    ///
    /// No-op when the GCD is 0 (the degenerate empty equation `0 = 0`) or 1.
    /// Signs are preserved: the GCD is taken over absolute values.
    pub fn reduce(&mut self) {
        let g = self
            .terms
            .values()
            .fold(self.constant.abs(), |g, &c| gcd(g, c.abs()));
        if g <= 1 {
            return;
        }
        for c in self.terms.values_mut() {
            *c /= g;
        }
        self.constant /= g;
    }

    /// Fix `cell` to 0 (not mined) and drop it from the equation. The
    /// constant is untouched since the term contributed nothing.
    pub fn substitute_safe(&mut self, cell: Point) {
        self.terms.remove(&cell);
    }

    /// Fix `cell` to 1 (mined): its coefficient moves into the constant.
    pub fn substitute_mine(&mut self, cell: Point) {
        if let Some(coefficient) = self.terms.remove(&cell) {
            self.constant -= coefficient;
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0 = {}", self.constant);
        }
        for (i, (cell, coefficient)) in self.terms().enumerate() {
            if i == 0 {
                match coefficient {
                    1 => write!(f, "{cell}")?,
                    -1 => write!(f, "-{cell}")?,
                    c => write!(f, "{c}{cell}")?,
                }
            } else {
                let sign = if coefficient < 0 { '-' } else { '+' };
                match coefficient.abs() {
                    1 => write!(f, " {sign} {cell}")?,
                    c => write!(f, " {sign} {c}{cell}")?,
                }
            }
        }
        write!(f, " = {}", self.constant)
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: usize, y: usize) -> Point {
        Point::new(x, y)
    }

    fn eq(terms: &[(usize, usize, i64)], constant: i64) -> Equation {
        Equation::from_terms(
            terms.iter().map(|&(x, y, c)| (pt(x, y), c)),
            constant,
        )
    }

    #[test]
    fn add_then_sub_restores_coefficients() {
        let a = eq(&[(0, 0, 2), (1, 0, -1)], 3);
        let b = eq(&[(1, 0, 5), (2, 2, 1)], -4);
        let round_trip = a.add(&b).sub(&b);
        assert_eq!(round_trip, a);
    }

    #[test]
    fn zero_sums_are_dropped() {
        let a = eq(&[(0, 0, 1), (1, 0, 2)], 1);
        let b = eq(&[(0, 0, -1)], 0);
        let sum = a.add(&b);
        assert_eq!(sum.coefficient(pt(0, 0)), 0);
        assert_eq!(sum.unknown_count(), 1);
        assert_eq!(sum.constant(), 1);
    }

    #[test]
    fn scale_by_zero_keeps_the_constant() {
        let a = eq(&[(0, 0, 3), (1, 1, -2)], 7);
        let scaled = a.scale(0);
        assert_eq!(scaled.unknown_count(), 0);
        assert_eq!(scaled.constant(), 0);
    }

    #[test]
    fn negate_flips_everything() {
        let a = eq(&[(0, 0, 2), (1, 0, -3)], 5);
        let n = a.negate();
        assert_eq!(n.coefficient(pt(0, 0)), -2);
        assert_eq!(n.coefficient(pt(1, 0)), 3);
        assert_eq!(n.constant(), -5);
        assert_eq!(n.negate(), a);
    }

    #[test]
    fn reduce_divides_by_gcd_preserving_signs() {
        let mut a = eq(&[(0, 0, -2), (1, 0, 4)], 6);
        a.reduce();
        assert_eq!(a.coefficient(pt(0, 0)), -1);
        assert_eq!(a.coefficient(pt(1, 0)), 2);
        assert_eq!(a.constant(), 3);
    }

    #[test]
    fn reduce_is_idempotent() {
        let mut a = eq(&[(0, 0, 6), (1, 0, 9)], 12);
        a.reduce();
        let once = a.clone();
        a.reduce();
        assert_eq!(a, once);
    }

    #[test]
    fn reduce_ignores_zero_constant() {
        let mut a = eq(&[(0, 0, 2), (1, 0, 4)], 0);
        a.reduce();
        assert_eq!(a.coefficient(pt(0, 0)), 1);
        assert_eq!(a.coefficient(pt(1, 0)), 2);
        assert_eq!(a.constant(), 0);
    }

    #[test]
    fn reduce_on_degenerate_equation_is_a_no_op() {
        let mut empty = Equation::with_constant(0);
        empty.reduce();
        assert_eq!(empty, Equation::with_constant(0));

        // Constant-only with a value: collapses to the unit constant.
        let mut stranded = Equation::with_constant(5);
        stranded.reduce();
        assert_eq!(stranded.constant(), 1);
    }

    #[test]
    fn substitution_retires_unknowns() {
        let mut a = eq(&[(0, 0, 2), (1, 0, 3)], 4);
        a.substitute_safe(pt(0, 0));
        assert_eq!(a, eq(&[(1, 0, 3)], 4));
        a.substitute_mine(pt(1, 0));
        assert_eq!(a.unknown_count(), 0);
        assert_eq!(a.constant(), 1);
    }

    #[test]
    fn pivot_order_is_stable() {
        let a = eq(&[(2, 0, 1), (0, 1, 1), (0, 0, 1)], 1);
        assert_eq!(a.first_unknown(), Some(pt(0, 0)));
    }

    #[test]
    fn display_formats_signs_and_units() {
        let a = eq(&[(0, 0, 1), (1, 0, -2), (2, 0, -1)], 3);
        assert_eq!(a.to_string(), "(0, 0) - 2(1, 0) - (2, 0) = 3");
        assert_eq!(Equation::with_constant(0).to_string(), "0 = 0");
    }
}
