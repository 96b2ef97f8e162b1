use std::collections::VecDeque;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Waiting for the first reveal, mines not placed yet
    #[default]
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl SessionStatus {
    pub const fn is_started(self) -> bool {
        !matches!(self, Self::NotStarted)
    }

    /// No moves are accepted anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One game from board selection to win or loss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    config: GameConfig,
    seed: u64,
    mine_layout: MineLayout,
    mines_placed: bool,
    board: Array2<CellMark>,
    revealed_safe: CellCount,
    flagged: CellCount,
    status: SessionStatus,
    started_at_ms: Option<u64>,
    ended_at_ms: Option<u64>,
    triggered_mine: Option<Coord2>,
}

impl GameSession {
    /// New session on a validated board, mines get placed by the first reveal.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "New session {} with {} mines, seed {:#x}",
            config.size_label(),
            config.mines,
            seed
        );
        Ok(Self::with_parts(
            config,
            seed,
            MineLayout::empty(config.size),
            false,
        ))
    }

    /// Session over a fixed layout, used for replays and tests. Skips size validation.
    pub fn from_layout(mine_layout: MineLayout) -> Self {
        let config = mine_layout.game_config();
        Self::with_parts(config, 0, mine_layout, true)
    }

    fn with_parts(config: GameConfig, seed: u64, mine_layout: MineLayout, mines_placed: bool) -> Self {
        Self {
            config,
            seed,
            mine_layout,
            mines_placed,
            board: Array2::default(config.size.to_nd_index()),
            revealed_safe: 0,
            flagged: 0,
            status: SessionStatus::NotStarted,
            started_at_ms: None,
            ended_at_ms: None,
            triggered_mine: None,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged
    }

    /// Flags the player may still place, never negative.
    pub fn flags_remaining(&self) -> CellCount {
        self.config.mines.saturating_sub(self.flagged)
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_safe
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn ended_at_ms(&self) -> Option<u64> {
        self.ended_at_ms
    }

    /// Time since the first reveal, frozen once the game ended, 0 if not started.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.started_at_ms {
            Some(started_at) => self.ended_at_ms.unwrap_or(now_ms).saturating_sub(started_at),
            None => 0,
        }
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Cell queries take in-bounds coordinates and panic otherwise, commands check
    /// bounds themselves and answer [`GameError::InvalidCoords`].
    ///
    /// # Panics
    ///
    /// When `coords` is outside the board, see [`Self::validate_coords`].
    pub fn mark_at(&self, coords: Coord2) -> CellMark {
        self.board[coords.to_nd_index()]
    }

    /// # Panics
    ///
    /// When `coords` is outside the board.
    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.mine_layout.contains_mine(coords)
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.mine_layout.adjacent_mine_count(coords)
    }

    /// # Panics
    ///
    /// When `coords` is outside the board.
    pub fn cell_at(&self, coords: Coord2) -> Cell {
        let mark = self.mark_at(coords);
        Cell {
            is_mine: self.has_mine_at(coords),
            is_revealed: mark.is_revealed(),
            is_flagged: mark.is_flagged(),
            adjacent_mine_count: self.adjacent_mine_count(coords),
        }
    }

    /// What the player sees at `coords`, with flags graded after a loss.
    ///
    /// # Panics
    ///
    /// When `coords` is outside the board.
    pub fn display_at(&self, coords: Coord2) -> CellDisplay {
        let mark = self.mark_at(coords);

        if self.status == SessionStatus::Lost {
            if self.triggered_mine == Some(coords) {
                return CellDisplay::TriggeredMine;
            }
            return match (mark, self.has_mine_at(coords)) {
                (CellMark::Flagged, true) => CellDisplay::FlaggedMine,
                (CellMark::Flagged, false) => CellDisplay::WrongFlag,
                (_, true) => CellDisplay::Mine,
                (CellMark::Revealed, false) => CellDisplay::Revealed(self.adjacent_mine_count(coords)),
                (CellMark::Hidden, false) => CellDisplay::Hidden,
            };
        }

        match mark {
            CellMark::Hidden => CellDisplay::Hidden,
            CellMark::Flagged => CellDisplay::Flagged,
            CellMark::Revealed => CellDisplay::Revealed(self.adjacent_mine_count(coords)),
        }
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        self.mine_layout.validate_coords(coords)
    }

    /// False for out-of-bounds coordinates.
    pub fn can_chord_reveal_at(&self, coords: Coord2) -> bool {
        if self.is_finished() || self.validate_coords(coords).is_err() {
            return false;
        }
        if !self.mark_at(coords).is_revealed() {
            return false;
        }
        let count = self.adjacent_mine_count(coords);
        count > 0 && count == self.count_flagged_neighbors(coords)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        let index = coords.to_nd_index();
        Ok(match self.board[index] {
            CellMark::Revealed => MarkOutcome::NoChange,
            CellMark::Flagged => {
                self.board[index] = CellMark::Hidden;
                self.flagged -= 1;
                MarkOutcome::Changed
            }
            CellMark::Hidden if self.flags_remaining() == 0 => {
                log::debug!("No flags left for {:?}", coords);
                MarkOutcome::OutOfFlags
            }
            CellMark::Hidden => {
                self.board[index] = CellMark::Flagged;
                self.flagged += 1;
                MarkOutcome::Changed
            }
        })
    }

    pub fn reveal(&mut self, coords: Coord2, now_ms: u64) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        if self.status == SessionStatus::NotStarted {
            self.start(coords, now_ms);
        }

        Ok(self.reveal_single_cell(coords, now_ms))
    }

    pub fn chord_reveal(&mut self, coords: Coord2, now_ms: u64) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        if !self.can_chord_reveal_at(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        let targets: SmallVec<[Coord2; 8]> = self
            .mine_layout
            .iter_neighbors(coords)
            .filter(|&pos| self.mark_at(pos) == CellMark::Hidden)
            .collect();

        let mut outcome = RevealOutcome::NoChange;
        for target in targets {
            outcome |= self.reveal_single_cell(target, now_ms);
            if self.is_finished() {
                break;
            }
        }
        Ok(outcome)
    }

    /// Opens every hidden cell after a loss, flags stay untouched so they can be graded.
    pub fn reveal_all_for_end_of_game(&mut self) {
        if self.status != SessionStatus::Lost {
            log::debug!("End of game reveal skipped, status is {:?}", self.status);
            return;
        }

        for mark in self.board.iter_mut() {
            if *mark == CellMark::Hidden {
                *mark = CellMark::Revealed;
            }
        }
    }

    fn start(&mut self, coords: Coord2, now_ms: u64) {
        if !self.mines_placed {
            self.mine_layout = MineLayout::generate(self.config, coords, self.seed);
            self.mines_placed = true;
        }
        self.status = SessionStatus::InProgress;
        self.started_at_ms = Some(now_ms);
        log::debug!("Started at {} with first reveal {:?}", now_ms, coords);
    }

    fn reveal_single_cell(&mut self, coords: Coord2, now_ms: u64) -> RevealOutcome {
        if self.mark_at(coords) != CellMark::Hidden {
            return RevealOutcome::NoChange;
        }

        if self.has_mine_at(coords) {
            self.triggered_mine = Some(coords);
            self.end_game(false, now_ms);
            return RevealOutcome::HitMine;
        }

        self.flood_fill(coords);

        if self.revealed_safe == self.mine_layout.safe_cell_count() {
            self.end_game(true, now_ms);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Work-queue flood fill: opens the connected zero region and its numbered border.
    fn flood_fill(&mut self, origin: Coord2) {
        let mut to_visit = VecDeque::from([origin]);

        while let Some(coords) = to_visit.pop_front() {
            // queued twice through different zero cells, or flagged meanwhile
            if self.mark_at(coords) != CellMark::Hidden {
                continue;
            }

            self.board[coords.to_nd_index()] = CellMark::Revealed;
            self.revealed_safe += 1;

            let count = self.adjacent_mine_count(coords);
            log::trace!("Opened {:?}, adjacent mines: {}", coords, count);

            if count == 0 {
                to_visit.extend(
                    self.mine_layout
                        .iter_neighbors(coords)
                        .filter(|&pos| self.mark_at(pos) == CellMark::Hidden),
                );
            }
        }
    }

    fn end_game(&mut self, won: bool, now_ms: u64) {
        if self.is_finished() {
            return;
        }

        self.ended_at_ms = Some(now_ms);
        if won {
            self.status = SessionStatus::Won;
            self.triggered_mine = None;
            self.flag_remaining_mines();
        } else {
            self.status = SessionStatus::Lost;
            self.reveal_all_for_end_of_game();
        }
        log::debug!(
            "Game {:?} after {} ms",
            self.status,
            self.elapsed_ms(now_ms)
        );
    }

    fn flag_remaining_mines(&mut self) {
        let mines: Vec<_> = self.mine_layout.iter_mines().collect();
        for coords in mines {
            self.board[coords.to_nd_index()] = CellMark::Flagged;
        }
        self.flagged = self.config.mines;
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.mine_layout
            .iter_neighbors(coords)
            .filter(|&pos| self.mark_at(pos).is_flagged())
            .count() as u8
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
