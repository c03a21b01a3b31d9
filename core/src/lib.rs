//! Gameplay core for a touch-first minesweeper: a board engine with deferred
//! mine placement, a presentation controller that reports which view
//! properties changed, and a square packer that fits the grid into an
//! arbitrary viewport.

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use controller::*;
pub use error::*;
pub use packer::*;
pub use placement::*;
pub use types::*;

mod board;
mod cell;
mod controller;
mod error;
mod packer;
mod placement;
mod types;

/// Board shape and mine budget.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub columns: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(rows: Coord, columns: Coord, mines: CellCount) -> Self {
        Self {
            rows,
            columns,
            mines,
        }
    }

    /// Clamps the shape to at least one cell and the mine budget so that at
    /// least one safe cell remains; the first reveal can then always succeed.
    pub fn new(rows: Coord, columns: Coord, mines: CellCount) -> Self {
        let rows = rows.max(1);
        let columns = columns.max(1);
        let mines = mines.min(cell_product(rows, columns) - 1);
        Self::new_unchecked(rows, columns, mines)
    }

    pub const fn total_cells(&self) -> CellCount {
        cell_product(self.rows, self.columns)
    }
}

/// Preset board tiers plus free-form custom shapes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Custom(GameConfig),
}

impl Difficulty {
    /// Shape and mine budget for this tier; `Custom` shapes are normalized.
    pub fn config(self) -> GameConfig {
        match self {
            Self::Easy => GameConfig::new_unchecked(9, 9, 10),
            Self::Medium => GameConfig::new_unchecked(16, 16, 40),
            Self::Hard => GameConfig::new_unchecked(16, 30, 99),
            Self::Custom(config) => GameConfig::new(config.rows, config.columns, config.mines),
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Easy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_clamps_degenerate_shapes() {
        let config = GameConfig::new(0, 0, 10);

        assert_eq!(config, GameConfig::new_unchecked(1, 1, 0));
    }

    #[test]
    fn config_always_leaves_a_safe_cell() {
        let config = GameConfig::new(4, 4, 100);

        assert_eq!(config.mines, 15);
        assert_eq!(config.total_cells(), 16);
    }

    #[test]
    fn difficulty_presets_match_the_classic_tiers() {
        assert_eq!(Difficulty::Easy.config(), GameConfig::new_unchecked(9, 9, 10));
        assert_eq!(
            Difficulty::Medium.config(),
            GameConfig::new_unchecked(16, 16, 40)
        );
        assert_eq!(
            Difficulty::Hard.config(),
            GameConfig::new_unchecked(16, 30, 99)
        );
    }

    #[test]
    fn custom_difficulty_is_normalized() {
        let difficulty = Difficulty::Custom(GameConfig::new_unchecked(0, 5, 99));

        assert_eq!(difficulty.config(), GameConfig::new_unchecked(1, 5, 4));
    }
}
