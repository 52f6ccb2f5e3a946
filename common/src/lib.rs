//! Autonomous minesweeper player built around a symbolic equation solver.
//!
//! The board state is translated, reveal by reveal, into a system of sparse
//! integer linear equations over the covered cells. An elimination sweep plus
//! a bounded feasibility search certify cells as safe or mined; certified
//! cells become the next batch of moves, and the session falls back to a
//! uniform random reveal only when nothing is certain.

use thiserror::Error;

pub mod board;
pub mod config;
pub mod equation;
pub mod feasibility;
pub mod session;
pub mod solver;

pub use board::{Board, GameState};
pub use config::Config;
pub use equation::Equation;
pub use session::Session;
pub use solver::ConstraintSolver;

/// A 2D cell coordinate on the board.
///
/// Doubles as the unknown identifier in the equation system; the derived
/// lexicographic `Ord` gives every equation a stable unknown ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Point { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fatal conditions a session can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// Two elimination passes certified different mine values for the same
    /// cell. The equation system is unsatisfiable; if the board itself was
    /// consistent, this indicates a solver logic defect.
    #[error("contradiction at {cell}: recorded mined={recorded}, derived mined={derived}")]
    Contradiction {
        cell: Point,
        recorded: bool,
        derived: bool,
    },

    /// Flags are permanent for the whole session: their effect has already
    /// been folded into dependent equations' constants and cannot be
    /// reversed. Attempting to retract one is a contract violation.
    #[error("flag retraction at {at}: flags are permanent within a session")]
    FlagRetraction { at: Point },
}
