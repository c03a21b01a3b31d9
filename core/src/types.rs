/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type wide enough for mine totals and whole-board cell totals.
pub type CellCount = u16;

/// Two-dimensional board position `(row, column)`, both 0-based.
pub type Coord2 = (Coord, Coord);

pub(crate) const fn nd(coords: Coord2) -> [usize; 2] {
    [coords.0 as usize, coords.1 as usize]
}

pub const fn cell_product(rows: Coord, columns: Coord) -> CellCount {
    (rows as CellCount).saturating_mul(columns as CellCount)
}

const DISPLACEMENTS: [(i16, i16); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// In-bounds 8-neighborhood of `center` on a board of `bounds.0` rows by
/// `bounds.1` columns, lazily produced in row-major order.
pub fn neighbors(center: Coord2, bounds: Coord2) -> Neighbors {
    Neighbors {
        center,
        bounds,
        index: 0,
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Neighbors {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl Iterator for Neighbors {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&(dr, dc)) = DISPLACEMENTS.get(usize::from(self.index)) {
            self.index += 1;

            let row = i16::from(self.center.0) + dr;
            let column = i16::from(self.center.1) + dc;
            if (0..i16::from(self.bounds.0)).contains(&row)
                && (0..i16::from(self.bounds.1)).contains(&column)
            {
                return Some((row as Coord, column as Coord));
            }
        }
        None
    }
}
