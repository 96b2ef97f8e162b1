use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::*;

/// Smallest accepted board side.
pub const MIN_SIDE: Coord = 5;

/// Largest accepted board side.
pub const MAX_SIDE: Coord = 16;

/// Validated board dimensions and mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.size;
        let side_range = MIN_SIDE..=MAX_SIDE;
        if !side_range.contains(&width) || !side_range.contains(&height) {
            return Err(GameError::InvalidSize {
                width,
                height,
                min: MIN_SIDE,
                max: MAX_SIDE,
            });
        }

        let cells = self.total_cells();
        if self.mines >= cells {
            return Err(GameError::TooManyMines {
                mines: self.mines,
                cells,
            });
        }

        Ok(())
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }

    /// Board size as shown in the history log, `"WxH"`.
    pub fn size_label(&self) -> String {
        format!("{}x{}", self.size.0, self.size.1)
    }
}

/// Named presets plus free-form boards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Custom(GameConfig),
}

impl Difficulty {
    pub const PRESETS: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Builds a custom difficulty, rejecting invalid boards up front.
    pub fn custom(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        GameConfig::new((width, height), mines).map(Self::Custom)
    }

    pub const fn config(&self) -> GameConfig {
        match self {
            Self::Easy => GameConfig::new_unchecked((8, 8), 10),
            Self::Medium => GameConfig::new_unchecked((10, 10), 15),
            Self::Hard => GameConfig::new_unchecked((12, 12), 25),
            Self::Custom(config) => *config,
        }
    }

    /// Key used to file best times under, e.g. `easy` or `custom_9x7_12`.
    pub fn key(&self) -> String {
        match self {
            Self::Easy => "easy".to_string(),
            Self::Medium => "medium".to_string(),
            Self::Hard => "hard".to_string(),
            Self::Custom(config) => format!(
                "custom_{}x{}_{}",
                config.width(),
                config.height(),
                config.mines
            ),
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Easy
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(config) => write!(
                f,
                "custom {} with {} mines",
                config.size_label(),
                config.mines
            ),
            preset => f.write_str(&preset.key()),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown difficulty {0:?}, expected easy, medium or hard")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}
