use serde::{Deserialize, Serialize};

use crate::types::Coord;

/// Interaction state of a single cell as stored by the board engine.
///
/// Whether the cell hides a mine and how many mines surround it live in
/// separate grids; this enum only tracks what the player did to the cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed,
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Flat per-cell snapshot handed to presentation layers.
///
/// `mine` and `adjacent_mines` read as empty until mines are placed, which
/// only happens on the first reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub row: Coord,
    pub column: Coord,
    pub revealed: bool,
    pub flagged: bool,
    pub mine: bool,
    pub adjacent_mines: u8,
}
