use crate::types::Coord2;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates {0:?} are outside the board")]
    OutOfRange(Coord2),
    #[error("Viewport width and height must be positive finite numbers")]
    EmptyViewport,
    #[error("Square budget must be at least one")]
    NoSquares,
    #[error("Spacing must be a non-negative finite number")]
    InvalidSpacing,
}

pub type Result<T> = core::result::Result<T, GameError>;
