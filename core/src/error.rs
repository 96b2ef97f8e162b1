use thiserror::Error;

use crate::{CellCount, Coord};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board size must be between {min}x{min} and {max}x{max}, got {width}x{height}")]
    InvalidSize {
        width: Coord,
        height: Coord,
        min: Coord,
        max: Coord,
    },
    #[error("Number of mines ({mines}) must be lower than the number of cells ({cells})")]
    TooManyMines { mines: CellCount, cells: CellCount },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

impl GameError {
    /// Configuration errors are shown to the player, no session gets created.
    pub const fn is_invalid_configuration(self) -> bool {
        matches!(self, Self::InvalidSize { .. } | Self::TooManyMines { .. })
    }

    /// Commands that arrive out of bounds or after the game ended, usually from stale input.
    pub const fn is_illegal_command(self) -> bool {
        matches!(self, Self::InvalidCoords | Self::AlreadyEnded)
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
