//! The playable grid: per-cell state, adjacency, reveal propagation, the
//! permanent-flag policy and the text snapshot used by the session log.

use crate::{GameError, Point};
use itertools::iproduct;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// State of a single cell.
#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    mined: bool,
    uncovered: bool,
    flagged: bool,
}

/// Where the game currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameState::Playing => "playing",
            GameState::Won => "win",
            GameState::Lost => "loss",
        })
    }
}

/// The board. Mine placement is deferred until the first reveal so that the
/// first revealed cell and its whole neighborhood are guaranteed mine-free.
pub struct Board {
    width: usize,
    height: usize,
    mine_count: usize,
    cells: Vec<Cell>,
    mines_placed: bool,
}

impl Board {
    pub fn new(width: usize, height: usize, mine_count: usize) -> Self {
        assert!(
            mine_count < width * height,
            "mine count must be less than the number of cells"
        );
        Board {
            width,
            height,
            mine_count,
            cells: vec![Cell::default(); width * height],
            mines_placed: false,
        }
    }

    /// A board with a fixed mine layout and no deferred placement. Used by
    /// deterministic tests and reproductions.
    pub fn with_mines(width: usize, height: usize, mines: &[Point]) -> Self {
        let mut board = Board {
            width,
            height,
            mine_count: mines.len(),
            cells: vec![Cell::default(); width * height],
            mines_placed: true,
        };
        for &p in mines {
            let i = board.index(p);
            board.cells[i].mined = true;
        }
        board
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    fn index(&self, p: Point) -> usize {
        p.x * self.height + p.y
    }

    fn cell(&self, p: Point) -> Cell {
        self.cells[self.index(p)]
    }

    pub fn is_covered(&self, p: Point) -> bool {
        !self.cell(p).uncovered
    }

    pub fn is_flagged(&self, p: Point) -> bool {
        self.cell(p).flagged
    }

    pub fn is_mined(&self, p: Point) -> bool {
        self.cell(p).mined
    }

    /// Every coordinate on the board, column by column.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        iproduct!(0..self.width, 0..self.height).map(|(x, y)| Point::new(x, y))
    }

    /// The up-to-8 in-bounds neighbors of `at`.
    pub fn neighbors(&self, at: Point) -> impl Iterator<Item = Point> {
        let width = self.width;
        let height = self.height;

        (-1..=1).flat_map(move |dy: isize| {
            (-1..=1).filter_map(move |dx: isize| {
                if dx == 0 && dy == 0 {
                    return None;
                }
                let nx = at.x as isize + dx;
                let ny = at.y as isize + dy;
                if nx >= 0 && nx < width as isize && ny >= 0 && ny < height as isize {
                    Some(Point::new(nx as usize, ny as usize))
                } else {
                    None
                }
            })
        })
    }

    /// Number of mined neighbors. Only meaningful once mines are placed.
    pub fn adjacent_mines(&self, at: Point) -> u8 {
        self.neighbors(at).filter(|&n| self.cell(n).mined).count() as u8
    }

    /// All covered, unflagged cells — the pool a random move draws from.
    pub fn covered_unflagged(&self) -> Vec<Point> {
        self.points()
            .filter(|&p| {
                let cell = self.cell(p);
                !cell.uncovered && !cell.flagged
            })
            .collect()
    }

    /// Uncover `at`, placing mines first if this is the session's first
    /// reveal. Cells with zero mined neighbors propagate to their whole
    /// neighborhood (iterative flood fill; the already-uncovered guard
    /// bounds it by the grid area). Returns the newly uncovered cells in
    /// reveal order.
    pub fn reveal<R: Rng + ?Sized>(&mut self, rng: &mut R, at: Point) -> Vec<Point> {
        if !self.mines_placed {
            self.place_mines(rng, at);
        }

        let mut revealed = Vec::new();
        let mut pending = vec![at];
        while let Some(p) = pending.pop() {
            if self.cell(p).uncovered {
                continue;
            }
            let i = self.index(p);
            self.cells[i].uncovered = true;
            revealed.push(p);

            if !self.cell(p).mined && self.adjacent_mines(p) == 0 {
                pending.extend(self.neighbors(p).filter(|&n| self.is_covered(n)));
            }
        }
        revealed
    }

    /// Scatter the session's mines uniformly over every cell outside the
    /// first reveal's neighborhood. Boards too small to host the full count
    /// get as many as fit.
    fn place_mines<R: Rng + ?Sized>(&mut self, rng: &mut R, safe: Point) {
        let mut candidates: Vec<Point> = self
            .points()
            .filter(|&p| p.x.abs_diff(safe.x) > 1 || p.y.abs_diff(safe.y) > 1)
            .collect();
        candidates.shuffle(rng);
        for &p in candidates.iter().take(self.mine_count) {
            let i = self.index(p);
            self.cells[i].mined = true;
        }
        self.mines_placed = true;
    }

    pub fn flag(&mut self, at: Point) {
        let i = self.index(at);
        self.cells[i].flagged = true;
    }

    /// Flags are permanent within a session: the solver has already folded
    /// the flagged cell into dependent equations' constants. Always errors.
    pub fn unflag(&mut self, at: Point) -> Result<(), GameError> {
        Err(GameError::FlagRetraction { at })
    }

    /// Uncover everything, mines included, for the final log snapshot.
    pub fn expose_all(&mut self) {
        for cell in &mut self.cells {
            cell.uncovered = true;
        }
    }

    pub fn state(&self) -> GameState {
        if self.cells.iter().any(|c| c.uncovered && c.mined) {
            return GameState::Lost;
        }
        if self.cells.iter().all(|c| c.uncovered || c.mined) {
            GameState::Won
        } else {
            GameState::Playing
        }
    }

    fn glyph(&self, p: Point) -> char {
        let cell = self.cell(p);
        if cell.uncovered {
            if cell.mined {
                '@'
            } else {
                match self.adjacent_mines(p) {
                    0 => ' ',
                    n => (b'0' + n) as char,
                }
            }
        } else if cell.flagged {
            '^'
        } else {
            '_'
        }
    }
}

/// Fixed-width snapshot with modulo-10 coordinate rulers on all four sides.
/// Consumed only by the session log, never parsed back.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(2 * self.width + 5);
        writeln!(f, "{rule}")?;
        write!(f, "   ")?;
        for x in 0..self.width {
            write!(f, "{} ", x % 10)?;
        }
        writeln!(f)?;
        writeln!(f)?;
        for y in 0..self.height {
            write!(f, "{}  ", y % 10)?;
            for x in 0..self.width {
                write!(f, "{} ", self.glyph(Point::new(x, y)))?;
            }
            writeln!(f, " {}", y % 10)?;
        }
        writeln!(f)?;
        write!(f, "   ")?;
        for x in 0..self.width {
            write!(f, "{} ", x % 10)?;
        }
        writeln!(f)?;
        write!(f, "{rule}")
    }
}
