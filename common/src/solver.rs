//! The elimination engine.
//!
//! Holds one equation per piece of evidence — a revealed cell's adjacency
//! count, or the optional board-wide mine total — and repeatedly reduces the
//! system toward independence: each clue row cancels its leading unknown out
//! of every other row using integer cross-multiplication (no division, no
//! row swaps), then every small enough row is handed to the feasibility
//! solver and uniquely determined cells accumulate in the shared solution
//! set. One call performs one sweep; convergence comes from being invoked
//! again after every game move.

use crate::board::Board;
use crate::equation::Equation;
use crate::feasibility::{self, Assignment};
use crate::{GameError, Point};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// Where an equation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Evidence {
    /// The board-wide mine total over every covered cell.
    Total,
    /// The adjacency count revealed at this cell.
    Clue(Point),
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evidence::Total => f.write_str("total"),
            Evidence::Clue(cell) => write!(f, "clue {cell}"),
        }
    }
}

/// Rows with more unknowns than this are skipped by the certification pass;
/// enumerating them costs more than the information is worth.
const CERTIFY_LIMIT: usize = 8;

/// The equation system plus the facts certified from it so far.
///
/// Invariant: every unknown in every equation is a currently covered,
/// unflagged cell. The session maintains it by forwarding every reveal and
/// flag through [`record_reveal`](Self::record_reveal) and
/// [`record_flag`](Self::record_flag).
pub struct ConstraintSolver {
    equations: BTreeMap<Evidence, Equation>,
    solution: Assignment,
}

impl ConstraintSolver {
    /// `include_total` seeds the optional global row: the sum of every
    /// cell's mine indicator equals the board's mine count.
    pub fn new(board: &Board, include_total: bool) -> Self {
        let mut equations = BTreeMap::new();
        if include_total {
            equations.insert(
                Evidence::Total,
                Equation::from_terms(
                    board.points().map(|p| (p, 1)),
                    board.mine_count() as i64,
                ),
            );
        }
        ConstraintSolver {
            equations,
            solution: Assignment::new(),
        }
    }

    /// Bookkeeping for a revealed cell: it stops being an unknown everywhere
    /// (its mine status is now fixed at 0), and its adjacency count becomes
    /// a fresh equation over its still-covered, unflagged neighbors, with
    /// already-flagged neighbors pre-subtracted from the constant.
    pub fn record_reveal(&mut self, board: &Board, at: Point) {
        for equation in self.equations.values_mut() {
            equation.substitute_safe(at);
        }

        let unknowns: Vec<Point> = board
            .neighbors(at)
            .filter(|&n| board.is_covered(n) && !board.is_flagged(n))
            .collect();
        let flagged = board.neighbors(at).filter(|&n| board.is_flagged(n)).count();
        let constant = board.adjacent_mines(at) as i64 - flagged as i64;
        self.equations.insert(
            Evidence::Clue(at),
            Equation::from_terms(unknowns.into_iter().map(|p| (p, 1)), constant),
        );
    }

    /// Bookkeeping for a flagged cell: every equation absorbs the forced
    /// mine into its constant. This fold is why flags are permanent.
    pub fn record_flag(&mut self, at: Point) {
        for equation in self.equations.values_mut() {
            equation.substitute_mine(at);
        }
    }

    /// One elimination sweep over the current system.
    ///
    /// 1. Drop clue rows that no longer constrain anything.
    /// 2. Let each clue row in turn cancel its leading unknown out of every
    ///    other row: `F <- F * coef(E, pivot) - E * coef(F, pivot)`. The
    ///    total row is rewritten like any other but never pivots itself.
    /// 3. Certify rows with at most [`CERTIFY_LIMIT`] unknowns and merge the
    ///    uniquely determined cells into the solution set; a merge that
    ///    disagrees with an already certified value is a fatal
    ///    [`GameError::Contradiction`].
    /// 4. Drop exhausted rows (now including the total row) and `reduce`
    ///    every survivor to keep coefficients small.
    pub fn eliminate(&mut self) -> Result<(), GameError> {
        self.drop_exhausted(false);

        let sources: Vec<Evidence> = self
            .equations
            .keys()
            .copied()
            .filter(|&key| key != Evidence::Total)
            .collect();
        for source in sources {
            let Some(equation) = self.equations.get(&source) else {
                continue;
            };
            let Some(pivot) = equation.first_unknown() else {
                continue;
            };
            let pivot_coefficient = equation.coefficient(pivot);
            let pivot_row = equation.clone();

            for (&key, row) in self.equations.iter_mut() {
                if key == source {
                    continue;
                }
                let coefficient = row.coefficient(pivot);
                if coefficient == 0 {
                    continue;
                }
                *row = row.scale(pivot_coefficient).sub(&pivot_row.scale(coefficient));
            }
        }

        self.drop_exhausted(false);

        let mut certified: Vec<(Point, bool)> = Vec::new();
        for equation in self.equations.values() {
            if equation.unknown_count() > CERTIFY_LIMIT {
                continue;
            }
            if let Some(assignment) = feasibility::unique_solution(equation) {
                certified.extend(assignment);
            }
        }
        for (cell, mined) in certified {
            match self.solution.entry(cell) {
                Entry::Occupied(entry) => {
                    let recorded = *entry.get();
                    if recorded != mined {
                        return Err(GameError::Contradiction {
                            cell,
                            recorded,
                            derived: mined,
                        });
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(mined);
                }
            }
        }

        self.drop_exhausted(true);

        for equation in self.equations.values_mut() {
            equation.reduce();
        }
        Ok(())
    }

    /// Remove rows with no unknowns left. The total row is only eligible
    /// once `include_total` is set — mid-sweep it stays even when empty,
    /// matching its exclusion from the pivot loop.
    fn drop_exhausted(&mut self, include_total: bool) {
        self.equations.retain(|&key, equation| {
            (key == Evidence::Total && !include_total) || equation.unknown_count() > 0
        });
    }

    /// Certified cells accumulated so far (`true` = mined).
    pub fn solution(&self) -> &Assignment {
        &self.solution
    }

    /// Hand the accumulated facts over for move application, clearing them.
    pub fn take_solution(&mut self) -> Assignment {
        std::mem::take(&mut self.solution)
    }

    /// Current rows in evidence order, for the equation-system log dump.
    pub fn equations(&self) -> impl Iterator<Item = (Evidence, &Equation)> {
        self.equations.iter().map(|(&key, equation)| (key, equation))
    }
}
