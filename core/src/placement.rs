use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::GameConfig;
use crate::error::{GameError, Result};
use crate::types::{CellCount, Coord, Coord2, nd, neighbors};

/// Immutable mine positions for one game, plus the cached mine total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// Layout from an explicit mine mask.
    ///
    /// Panics when either dimension exceeds the `Coord` range, the
    /// addressable board limit.
    pub fn from_mask(mask: Array2<bool>) -> Self {
        let (rows, columns) = mask.dim();
        assert!(
            rows <= usize::from(Coord::MAX) && columns <= usize::from(Coord::MAX),
            "Mask of {rows}x{columns} cells exceeds the addressable board size"
        );
        let mine_count = mask.iter().filter(|&&mine| mine).count() as CellCount;
        Self { mask, mine_count }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mask: Array2<bool> = Array2::default([size.0 as usize, size.1 as usize]);

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::OutOfRange(coords));
            }
            mask[nd(coords)] = true;
        }

        Ok(Self::from_mask(mask))
    }

    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.mask.dim();
        (rows as Coord, columns as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        self.mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.mask[nd(coords)]
    }

    /// Mines in the in-bounds 8-neighborhood of `coords`.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        neighbors(coords, self.size())
            .filter(|&pos| self.contains_mine(pos))
            .count() as u8
    }
}

/// How much of the first-played neighborhood must stay clear of mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeStart {
    /// Only the played cell itself is kept mine-free.
    Cell,
    /// The played cell and all its in-bounds neighbors are kept mine-free, so
    /// the opening reveal always cascades.
    Neighborhood,
}

/// Strategy that produces the mine layout once the first cell is played.
pub trait MinePlacer {
    fn place(&self, config: GameConfig, start: Coord2) -> MineLayout;
}

/// Uniformly random placement outside the safe zone, fully determined by the
/// seed and the starting cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomMinePlacer {
    seed: u64,
    safe_start: SafeStart,
}

impl RandomMinePlacer {
    pub fn new(seed: u64, safe_start: SafeStart) -> Self {
        Self { seed, safe_start }
    }
}

impl MinePlacer for RandomMinePlacer {
    fn place(&self, config: GameConfig, start: Coord2) -> MineLayout {
        use rand::prelude::*;

        let size = (config.rows, config.columns);
        let total = config.total_cells() as usize;

        let mut excluded = vec![start];
        if matches!(self.safe_start, SafeStart::Neighborhood) {
            excluded.extend(neighbors(start, size));
        }
        if config.mines as usize + excluded.len() > total {
            log::warn!("Cannot keep the opening neighborhood clear, only the played cell stays safe");
            excluded.truncate(1);
        }

        let mut candidates: Vec<Coord2> = (0..config.rows)
            .flat_map(|row| (0..config.columns).map(move |column| (row, column)))
            .filter(|pos| !excluded.contains(pos))
            .collect();
        candidates.shuffle(&mut SmallRng::seed_from_u64(self.seed));

        let mut mask: Array2<bool> =
            Array2::default([config.rows as usize, config.columns as usize]);
        for &coords in candidates.iter().take(config.mines as usize) {
            mask[nd(coords)] = true;
        }

        let layout = MineLayout::from_mask(mask);
        // double check mine count
        if layout.mine_count() != config.mines {
            log::warn!(
                "Placed mine count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mines
            );
        }
        layout
    }
}
