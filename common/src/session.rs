//! One full game, from the first blind reveal to win, loss or contradiction.
//!
//! The session wires the board and the constraint solver together: every
//! reveal and flag is forwarded to the solver, every round ends with an
//! elimination pass, and certified cells become the next round's moves. Only
//! when nothing is certified does the session fall back to a uniform random
//! reveal. Everything noteworthy goes into an ordered log that is flushed to
//! a timestamped text artifact when the session ends.

use crate::board::{Board, GameState};
use crate::config::Config;
use crate::solver::ConstraintSolver;
use crate::Point;
use anyhow::Context;
use chrono::Local;
use rand::SeedableRng;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use std::fs;
use std::path::PathBuf;

pub struct Session {
    config: Config,
    board: Board,
    solver: ConstraintSolver,
    log: Vec<String>,
    rng: StdRng,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Deterministic session, for tests and reproductions.
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Self {
        let board = Board::new(config.width, config.height, config.mines);
        let solver = ConstraintSolver::new(&board, config.include_total_constraint);
        let log = vec![format!(
            "{} x {}, {} mines",
            board.width(),
            board.height(),
            board.mine_count()
        )];
        Session {
            config,
            board,
            solver,
            log,
            rng,
        }
    }

    /// Play the session to completion.
    ///
    /// Winning sessions always leave a log artifact; losing ones only when
    /// the persistence policy says so. A contradiction flushes the artifact
    /// and then propagates as the error.
    pub fn run(&mut self) -> anyhow::Result<GameState> {
        while self.board.state() == GameState::Playing {
            if let Err(error) = self.round() {
                self.log.push(error.to_string());
                self.flush()?;
                return Err(error);
            }
        }

        let outcome = self.board.state();
        self.log.push(outcome.to_string());
        if outcome == GameState::Won || !self.config.win_results_only {
            self.board.expose_all();
            self.log.push(self.board.to_string());
            self.flush()?;
        }
        Ok(outcome)
    }

    /// One round: apply the certified moves (or guess), then re-solve.
    fn round(&mut self) -> anyhow::Result<()> {
        let moves = self.solver.take_solution();
        if moves.is_empty() {
            let candidates = self.board.covered_unflagged();
            let &target = candidates
                .choose(&mut self.rng)
                .context("no covered cell left to guess")?;
            if self.config.show_actions {
                self.log.push(format!("random reveal {target}"));
            } else {
                self.log.push("random guess".to_string());
            }
            self.reveal(target);
        } else {
            for (cell, mined) in moves {
                if mined {
                    if self.board.is_flagged(cell) {
                        continue;
                    }
                    if self.config.show_actions {
                        self.log.push(format!("flag {cell}"));
                    }
                    self.board.flag(cell);
                    self.solver.record_flag(cell);
                } else {
                    if !self.board.is_covered(cell) {
                        continue;
                    }
                    if self.config.show_actions {
                        self.log.push(format!("reveal {cell}"));
                    }
                    self.reveal(cell);
                }
            }
        }
        self.log.push(self.board.to_string());

        // The solver only runs while the game is still open: a losing reveal
        // has been retired from the system as if it were safe, and solving
        // that system would report nonsense after the outcome is decided.
        if self.board.state() == GameState::Playing {
            self.solver.eliminate()?;
            if self.config.show_equations {
                self.log.push("equation system:".to_string());
                for (key, equation) in self.solver.equations() {
                    self.log.push(format!("  {key}: {equation}"));
                }
            }
        }
        self.log
            .push(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        Ok(())
    }

    /// Uncover a cell and feed every newly uncovered cell to the solver.
    fn reveal(&mut self, at: Point) {
        for cell in self.board.reveal(&mut self.rng, at) {
            self.solver.record_reveal(&self.board, cell);
        }
    }

    /// Write the accumulated log to `<output_dir>/<stamp> (<w> x <h>, <m>).txt`.
    fn flush(&self) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!("creating output dir {}", self.config.output_dir.display())
        })?;
        let stamp = Local::now().format("%Y-%m-%d %H-%M-%S");
        let name = format!(
            "{stamp} ({} x {}, {}).txt",
            self.board.width(),
            self.board.height(),
            self.board.mine_count()
        );
        let path = self.config.output_dir.join(name);
        fs::write(&path, self.log.join("\n"))
            .with_context(|| format!("writing session log {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: usize, y: usize) -> Point {
        Point::new(x, y)
    }

    fn config(width: usize, height: usize, mines: usize, dir: &std::path::Path) -> Config {
        Config {
            width,
            height,
            mines,
            output_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    /// A session over a fixed mine layout, bypassing deferred placement.
    fn rigged(config: Config, board: Board) -> Session {
        let solver = ConstraintSolver::new(&board, config.include_total_constraint);
        Session {
            config,
            board,
            solver,
            log: Vec::new(),
            rng: StdRng::seed_from_u64(0),
        }
    }

    #[test]
    fn zero_mine_board_wins_on_the_first_guess() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::with_seed(config(3, 3, 0, dir.path()), 11);

        assert_eq!(session.run().unwrap(), GameState::Won);
        // header, guess marker, snapshot, timestamp, outcome, final snapshot:
        // a single round settled it.
        assert_eq!(session.log.len(), 6);
    }

    #[test]
    fn certified_mine_is_flagged_never_revealed() {
        // 1 x 2, the mine pre-seeded in the far cell and the total row on:
        // after the safe reveal the remaining cell's equation certifies it
        // as mined.
        let dir = tempfile::tempdir().unwrap();
        let mut session = rigged(
            config(1, 2, 1, dir.path()),
            Board::with_mines(1, 2, &[pt(0, 1)]),
        );

        session.reveal(pt(0, 0));
        session.solver.eliminate().unwrap();
        assert_eq!(session.solver.solution().get(&pt(0, 1)), Some(&true));

        session.round().unwrap();
        assert!(session.board.is_flagged(pt(0, 1)));
        assert!(session.board.is_covered(pt(0, 1)));
        assert_eq!(session.board.state(), GameState::Won);
    }

    #[test]
    fn losing_session_leaves_no_artifact_under_win_only_policy() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = rigged(
            config(2, 2, 1, dir.path()),
            Board::with_mines(2, 2, &[pt(1, 1)]),
        );

        session.reveal(pt(1, 1));
        assert_eq!(session.run().unwrap(), GameState::Lost);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn losing_session_is_persisted_when_the_policy_allows() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(2, 2, 1, dir.path());
        cfg.win_results_only = false;
        let mut session = rigged(cfg, Board::with_mines(2, 2, &[pt(1, 1)]));

        session.reveal(pt(1, 1));
        assert_eq!(session.run().unwrap(), GameState::Lost);

        let entry = fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
        let name = entry.file_name().into_string().unwrap();
        assert!(name.ends_with("(2 x 2, 1).txt"));
        let contents = fs::read_to_string(entry.path()).unwrap();
        assert!(contents.contains("loss"));
        assert!(contents.contains('@'));
    }

    #[test]
    fn winning_artifact_carries_header_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::with_seed(config(3, 3, 0, dir.path()), 5);
        session.run().unwrap();

        let entry = fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
        let contents = fs::read_to_string(entry.path()).unwrap();
        assert!(contents.starts_with("3 x 3, 0 mines"));
        assert!(contents.contains("win"));
        assert!(contents.contains("-----------"));
    }

    #[test]
    fn equation_dump_and_actions_land_in_the_log_when_enabled() {
        // 1 x 4 with the mine third from the top: the opening flood exposes
        // two cells, the clue certifies the mine, and flagging it leaves the
        // bottom cell open so the round ends with another solving pass.
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(1, 4, 1, dir.path());
        cfg.include_total_constraint = false;
        cfg.show_equations = true;
        cfg.show_actions = true;
        let mut session = rigged(cfg, Board::with_mines(1, 4, &[pt(0, 2)]));

        session.reveal(pt(0, 0));
        session.solver.eliminate().unwrap();
        session.round().unwrap();

        assert!(session.board.is_flagged(pt(0, 2)));
        assert_eq!(session.board.state(), GameState::Playing);
        assert!(session.log.iter().any(|entry| entry == "flag (0, 2)"));
        assert!(session.log.iter().any(|entry| entry == "equation system:"));
    }

    #[test]
    fn sessions_end_without_contradictions_across_seeds() {
        let dir = tempfile::tempdir().unwrap();
        for include_total in [true, false] {
            for seed in 0..20 {
                let mut cfg = config(5, 5, 4, dir.path());
                cfg.include_total_constraint = include_total;
                let outcome = Session::with_seed(cfg, seed).run().unwrap();
                assert_ne!(outcome, GameState::Playing);
            }
        }
    }
}
