use core::ops::Index;

use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cells kept free of mines around the first reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SafeZone {
    /// The clicked cell and its eight neighbors, so the first reveal opens a region.
    Neighborhood,
    /// Only the clicked cell, used when the board is too dense for the full neighborhood.
    CellOnly,
}

impl SafeZone {
    /// Widest zone that still leaves room for every mine of `config`.
    pub fn for_config(config: GameConfig, start: Coord2) -> Self {
        let neighborhood = Self::Neighborhood.cell_count(config, start);
        if config.total_cells().saturating_sub(neighborhood) >= config.mines {
            Self::Neighborhood
        } else {
            log::warn!(
                "Cannot keep the 3x3 around {:?} clear with {} mines on {}, only the start cell is safe",
                start,
                config.mines,
                config.size_label()
            );
            Self::CellOnly
        }
    }

    pub fn contains(self, start: Coord2, coords: Coord2) -> bool {
        match self {
            Self::Neighborhood => chebyshev_distance(start, coords) <= 1,
            Self::CellOnly => start == coords,
        }
    }

    fn cell_count(self, config: GameConfig, start: Coord2) -> CellCount {
        match self {
            Self::Neighborhood => 1 + NeighborIter::new(start, config.size).count() as CellCount,
            Self::CellOnly => 1,
        }
    }
}

/// Where the mines are. Fixed once generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// A board without mines, the state of a session before its first reveal.
    pub fn empty(size: Coord2) -> Self {
        Self {
            mine_mask: Array2::default(size.to_nd_index()),
            mine_count: 0,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut layout = Self::empty(size);

        for &coords in mine_coords {
            let coords = layout.validate_coords(coords)?;
            let cell = &mut layout.mine_mask[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                layout.mine_count += 1;
            }
        }

        Ok(layout)
    }

    /// Seeded placement keeping the [`SafeZone`] around `start` clear.
    pub fn generate(config: GameConfig, start: Coord2, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::generate_with(config, start, &mut rng)
    }

    /// Rejection sampling: draw uniform coordinates, skip taken cells and the safe zone.
    pub fn generate_with<R: Rng>(config: GameConfig, start: Coord2, rng: &mut R) -> Self {
        let zone = SafeZone::for_config(config, start);
        let available = config
            .total_cells()
            .saturating_sub(zone.cell_count(config, start));
        let target = if config.mines > available {
            log::warn!(
                "Requested {} mines but only {} cells are available, placing {}",
                config.mines,
                available,
                available
            );
            available
        } else {
            config.mines
        };

        let mut layout = Self::empty(config.size);
        let (width, height) = config.size;
        while layout.mine_count < target {
            let coords = (rng.gen_range(0..width), rng.gen_range(0..height));
            if zone.contains(start, coords) {
                continue;
            }

            let cell = &mut layout.mine_mask[coords.to_nd_index()];
            if *cell {
                continue;
            }
            *cell = true;
            layout.mine_count += 1;
        }

        log::debug!(
            "Placed {} mines on {} avoiding {:?} ({:?})",
            layout.mine_count,
            config.size_label(),
            start,
            zone
        );
        layout
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        let (x, y) = self.mine_mask.dim();
        (
            Coord::try_from(x).unwrap_or(Coord::MAX),
            Coord::try_from(y).unwrap_or(Coord::MAX),
        )
    }

    pub fn total_cells(&self) -> CellCount {
        let (x, y) = self.size();
        mult(x, y)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        iter_coords(self.size()).filter(|&coords| self[coords])
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_neighbors(coords)
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: Coord2, mines: CellCount) -> GameConfig {
        GameConfig::new(size, mines).unwrap()
    }

    #[test]
    fn from_mine_coords_counts_unique_mines() {
        let layout = MineLayout::from_mine_coords((5, 5), &[(0, 0), (4, 4), (0, 0)]).unwrap();
        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.safe_cell_count(), 23);
    }

    #[test]
    fn from_mine_coords_rejects_out_of_bounds() {
        assert_eq!(
            MineLayout::from_mine_coords((5, 5), &[(5, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn adjacent_count_clips_at_edges() {
        let layout = MineLayout::from_mine_coords((5, 5), &[(0, 1), (1, 1), (1, 0)]).unwrap();
        assert_eq!(layout.adjacent_mine_count((0, 0)), 3);
        assert_eq!(layout.adjacent_mine_count((2, 2)), 1);
        assert_eq!(layout.adjacent_mine_count((4, 4)), 0);
    }

    #[test]
    fn generate_keeps_neighborhood_clear() {
        for seed in 0..50 {
            let layout = MineLayout::generate(config((8, 8), 10), (3, 4), seed);
            assert_eq!(layout.mine_count(), 10);
            assert!(layout.iter_mines().all(|mine| chebyshev_distance(mine, (3, 4)) > 1));
        }
    }

    #[test]
    fn generate_is_reproducible_from_seed() {
        let a = MineLayout::generate(config((12, 12), 25), (0, 0), 7);
        let b = MineLayout::generate(config((12, 12), 25), (0, 0), 7);
        assert_eq!(a, b);
    }

    #[test]
    fn dense_board_falls_back_to_safe_start_cell() {
        let dense = config((5, 5), 20);
        assert_eq!(SafeZone::for_config(dense, (2, 2)), SafeZone::CellOnly);

        let layout = MineLayout::generate(dense, (2, 2), 3);
        assert_eq!(layout.mine_count(), 20);
        assert!(!layout.contains_mine((2, 2)));
    }

    #[test]
    fn corner_start_needs_only_four_free_cells() {
        // 25 - 4 = 21 cells left, enough for 21 mines
        let dense = config((5, 5), 21);
        assert_eq!(SafeZone::for_config(dense, (0, 0)), SafeZone::Neighborhood);

        let layout = MineLayout::generate(dense, (0, 0), 11);
        assert_eq!(layout.mine_count(), 21);
        assert_eq!(layout.adjacent_mine_count((0, 0)), 0);
    }
}
