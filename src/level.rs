//! Level templates
//!
//! A level is an ASCII map, one row per line:
//! - `#` Wall
//! - `+` Partition
//! - `.` Floor
//! - `P` player spawn (Floor)
//! - `1`..`9` numbered enemy spawn (Floor)
//! - `E` enemy spawn (Floor)
//!
//! Enemy ids run 1..=n: numbered spawns first in number order, then `E`
//! spawns in reading order.

use glam::IVec2;
use thiserror::Error;

use crate::sim::{Board, Tile};

/// Built-in level: walls spell "D" and "X"
pub const LEVEL_1: &str = "\
###############
#P+.+.+.+.+.+1#
#+###.+.#.#+.+#
#.#..#+..#.#+.#
#+#..#+3..#.+.#
#.#..#+..#.#+.#
#+###.+.#.#+.+#
#.+.+.+.+.+.+.#
#+++++++++++++#
#.+.+.+.+.+.+.#
#+++++++++++++#
#2+.+.+.+.+.+4#
###############
";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level map is empty")]
    Empty,
    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
    #[error("level has no player spawn")]
    MissingPlayer,
    #[error("second player spawn at ({x}, {y})")]
    DuplicatePlayer { x: usize, y: usize },
    #[error("enemy spawn {number} repeated at ({x}, {y})")]
    DuplicateEnemy { number: u32, x: usize, y: usize },
    #[error("outer ring is open at ({x}, {y})")]
    OpenBoundary { x: usize, y: usize },
}

/// Immutable round template. Each round deep-copies the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub board: Board,
    pub player_spawn: IVec2,
    pub enemy_spawns: Vec<IVec2>,
}

impl Level {
    pub fn parse(map: &str) -> Result<Self, LevelError> {
        let rows: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let width = rows.first().map(|r| r.chars().count()).ok_or(LevelError::Empty)?;
        let height = rows.len();

        let mut tiles = Vec::with_capacity(width * height);
        let mut player_spawn = None;
        let mut numbered: Vec<(u32, IVec2)> = Vec::new();
        let mut unnumbered = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(LevelError::Ragged {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let pos = IVec2::new(x as i32, y as i32);
                let tile = match glyph {
                    'P' => {
                        if player_spawn.replace(pos).is_some() {
                            return Err(LevelError::DuplicatePlayer { x, y });
                        }
                        Tile::Floor
                    }
                    'E' => {
                        unnumbered.push(pos);
                        Tile::Floor
                    }
                    '1'..='9' => {
                        let number = glyph.to_digit(10).unwrap_or_default();
                        if numbered.iter().any(|&(n, _)| n == number) {
                            return Err(LevelError::DuplicateEnemy { number, x, y });
                        }
                        numbered.push((number, pos));
                        Tile::Floor
                    }
                    c => Tile::from_glyph(c).ok_or(LevelError::UnknownGlyph { glyph: c, x, y })?,
                };
                let on_ring = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                if on_ring && tile != Tile::Wall {
                    return Err(LevelError::OpenBoundary { x, y });
                }
                tiles.push(tile);
            }
        }

        let player_spawn = player_spawn.ok_or(LevelError::MissingPlayer)?;
        numbered.sort_by_key(|&(n, _)| n);
        let enemy_spawns = numbered
            .into_iter()
            .map(|(_, pos)| pos)
            .chain(unnumbered)
            .collect();
        Ok(Self {
            board: Board::from_tiles(width, height, tiles),
            player_spawn,
            enemy_spawns,
        })
    }

    /// The built-in first level
    pub fn builtin() -> Self {
        Self::parse(LEVEL_1).expect("built-in level is valid")
    }
}
