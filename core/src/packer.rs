use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Best grid arrangement found for a viewport.
///
/// An all-zero layout means no arrangement fits, spacing ate the whole
/// viewport; that is a valid answer, not an error.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquareLayout {
    pub side: f64,
    pub rows: u32,
    pub columns: u32,
}

/// Splits `max_squares` into the `rows x columns` grid whose squares come
/// out largest inside a `width x height` viewport, with `spacing` between
/// neighboring squares.
///
/// Every factorization of exactly `max_squares` is considered; per axis the
/// usable span is the viewport minus the inter-square gaps, and the side is
/// the smaller of the two per-axis fits. Ties keep the first candidate in
/// ascending row order. Pure and reentrant, callers may race it freely.
pub fn optimize(width: f64, height: f64, max_squares: u32, spacing: f64) -> Result<SquareLayout> {
    if !width.is_finite() || width <= 0.0 || !height.is_finite() || height <= 0.0 {
        return Err(GameError::EmptyViewport);
    }
    if max_squares == 0 {
        return Err(GameError::NoSquares);
    }
    if !spacing.is_finite() || spacing < 0.0 {
        return Err(GameError::InvalidSpacing);
    }

    let mut best = SquareLayout {
        side: 0.0,
        rows: 0,
        columns: 0,
    };

    for rows in 1..=max_squares {
        if max_squares % rows != 0 {
            continue;
        }
        let columns = max_squares / rows;

        let usable_width = width - spacing * f64::from(columns - 1);
        let usable_height = height - spacing * f64::from(rows - 1);
        if usable_width <= 0.0 || usable_height <= 0.0 {
            continue;
        }

        let side = (usable_width / f64::from(columns)).min(usable_height / f64::from(rows));
        if side > best.side {
            best = SquareLayout {
                side,
                rows,
                columns,
            };
        }
    }

    Ok(best)
}
