use serde::{Deserialize, Serialize};

/// Player-side state of a cell. Mine counts are derived from the layout, never stored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellMark {
    #[default]
    Hidden,
    Flagged,
    Revealed,
}

impl CellMark {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }
}

/// Full facet view of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub adjacent_mine_count: u8,
}

/// What a renderer should draw for a cell, end-of-game markings included.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellDisplay {
    Hidden,
    Flagged,
    Revealed(u8),
    /// Mine that ended the game.
    TriggeredMine,
    /// Unflagged mine shown after a loss.
    Mine,
    /// Mine the player had flagged, shown after a loss.
    FlaggedMine,
    /// Flag on a safe cell, shown after a loss.
    WrongFlag,
}

impl CellDisplay {
    /// Whether the cell still looks closed to the player.
    pub const fn is_closed(self) -> bool {
        matches!(
            self,
            Self::Hidden | Self::Flagged | Self::FlaggedMine | Self::WrongFlag
        )
    }
}
