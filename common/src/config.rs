//! Session configuration.
//!
//! An explicit value passed into session construction — no ambient process
//! state. The binary optionally loads it from a TOML file; anything missing
//! falls back to the defaults.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
    /// Track the board-wide mine total as an extra equation.
    pub include_total_constraint: bool,
    /// Dump the equation system into the log after each solving pass.
    pub show_equations: bool,
    /// Log every individual move with its coordinates instead of a bare
    /// random-guess marker.
    pub show_actions: bool,
    /// Persist log artifacts for winning sessions only. Contradictions are
    /// persisted regardless.
    pub win_results_only: bool,
    /// How many sessions the binary plays back to back.
    pub sessions: usize,
    /// Where log artifacts are written.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 6,
            height: 6,
            mines: 15,
            include_total_constraint: true,
            show_equations: false,
            show_actions: false,
            win_results_only: true,
            sessions: 1,
            output_dir: PathBuf::from("outputs"),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str("width = 9\nmines = 10").unwrap();
        assert_eq!(config.width, 9);
        assert_eq!(config.mines, 10);
        assert_eq!(config.height, 6);
        assert!(config.include_total_constraint);
        assert!(config.win_results_only);
        assert_eq!(config.sessions, 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("widht = 9").is_err());
    }

    #[test]
    fn load_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autosweeper.toml");
        std::fs::write(&path, "width = 4\nheight = 5\nmines = 3").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!((config.width, config.height, config.mines), (4, 5, 3));
        assert!(Config::load(dir.path().join("missing.toml")).is_err());
    }
}
