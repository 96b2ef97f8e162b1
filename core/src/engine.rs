use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::*;

/// What a command did, as far as the UI cares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    SessionCreated,
    Reveal(RevealOutcome),
    Mark(MarkOutcome),
    /// Stale or out-of-bounds command, nothing changed.
    Ignored(GameError),
}

impl CommandOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::SessionCreated => true,
            Self::Reveal(outcome) => outcome.has_update(),
            Self::Mark(outcome) => outcome.has_update(),
            Self::Ignored(_) => false,
        }
    }
}

/// Result of a finished game, produced once per session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub result: GameResult,
    pub elapsed_ms: u64,
    /// Only set for wins.
    pub best_time: Option<BestTimeOutcome>,
}

/// Everything a renderer needs to repaint after a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Update {
    pub session_id: u64,
    pub outcome: CommandOutcome,
    pub status: SessionStatus,
    pub flags_remaining: CellCount,
    /// Cells whose [`CellDisplay`] changed, row-major.
    pub changed: Vec<Coord2>,
    pub finish: Option<GameSummary>,
}

impl Update {
    pub fn has_update(&self) -> bool {
        self.outcome.has_update() || !self.changed.is_empty()
    }
}

/// Displayed cells before a command, to diff against afterwards.
struct Snapshot {
    size: Coord2,
    cells: Vec<CellDisplay>,
}

/// Owns the current session and the persistence around it.
///
/// Commands never fail once a session exists: stale input comes back as
/// [`CommandOutcome::Ignored`] and storage problems are only logged.
#[derive(Debug)]
pub struct GameEngine<S, C = SystemClock> {
    store: S,
    clock: C,
    rng: SmallRng,
    difficulty: Difficulty,
    session: GameSession,
    session_id: u64,
}

impl<S: KeyValueStore> GameEngine<S, SystemClock> {
    pub fn new(store: S, seed: u64, difficulty: Difficulty) -> Result<Self> {
        Self::with_clock(store, SystemClock, seed, difficulty)
    }
}

impl<S: KeyValueStore, C: Clock> GameEngine<S, C> {
    pub fn with_clock(store: S, clock: C, seed: u64, difficulty: Difficulty) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let session = GameSession::new(difficulty.config(), rng.next_u64())?;
        Ok(Self {
            store,
            clock,
            rng,
            difficulty,
            session,
            session_id: 0,
        })
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Changes on every session replacement, timers bound to an older id must stop.
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.session.elapsed_ms(self.clock.now_ms())
    }

    /// Replaces the session with a fresh board, invalid boards leave the current one alone.
    pub fn create_session(&mut self, difficulty: Difficulty) -> Result<Update> {
        let before = self.snapshot();
        let session = GameSession::new(difficulty.config(), self.rng.next_u64())?;

        self.difficulty = difficulty;
        self.replace_session(session);
        Ok(self.update(CommandOutcome::SessionCreated, &before, None))
    }

    /// Starts over with the current difficulty.
    pub fn new_session(&mut self) -> Update {
        let before = self.snapshot();
        let seed = self.rng.next_u64();
        let session = match GameSession::new(self.difficulty.config(), seed) {
            Ok(session) => session,
            // difficulty was validated when it was selected
            Err(err) => {
                log::warn!("Cannot restart {}: {}", self.difficulty, err);
                return self.update(CommandOutcome::Ignored(err), &before, None);
            }
        };

        self.replace_session(session);
        self.update(CommandOutcome::SessionCreated, &before, None)
    }

    pub fn reveal(&mut self, coords: Coord2) -> Update {
        self.apply(|session, now| session.reveal(coords, now).map(CommandOutcome::Reveal))
    }

    pub fn chord_reveal(&mut self, coords: Coord2) -> Update {
        self.apply(|session, now| {
            session
                .chord_reveal(coords, now)
                .map(CommandOutcome::Reveal)
        })
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Update {
        self.apply(|session, _| session.toggle_flag(coords).map(CommandOutcome::Mark))
    }

    pub fn history(&self) -> History {
        History::load_or_default(&self.store)
    }

    /// Best time for the current difficulty, unreadable records count as missing.
    pub fn best_time(&self) -> Option<u64> {
        best_time(&self.store, &self.difficulty).unwrap_or_else(|err| {
            log::warn!("Ignoring best time for {}: {}", self.difficulty, err);
            None
        })
    }

    fn replace_session(&mut self, session: GameSession) {
        self.session = session;
        self.session_id = self.session_id.wrapping_add(1);
        log::debug!("Session {} for {}", self.session_id, self.difficulty);
    }

    fn apply(
        &mut self,
        command: impl FnOnce(&mut GameSession, u64) -> Result<CommandOutcome>,
    ) -> Update {
        let before = self.snapshot();
        let was_finished = self.session.is_finished();
        let now = self.clock.now_ms();

        let outcome = command(&mut self.session, now).unwrap_or_else(|err| {
            log::debug!("Ignoring command on session {}: {}", self.session_id, err);
            CommandOutcome::Ignored(err)
        });

        let finish = (!was_finished && self.session.is_finished()).then(|| self.finish_game(now));
        self.update(outcome, &before, finish)
    }

    fn finish_game(&mut self, now: u64) -> GameSummary {
        let result = match self.session.status() {
            SessionStatus::Won => GameResult::Win,
            _ => GameResult::Loss,
        };
        let elapsed_ms = self.session.elapsed_ms(now);

        self.record_history(HistoryRecord::new(self.session.config(), result, now));

        let best_time = match result {
            GameResult::Win => Some(self.record_best_time(elapsed_ms)),
            GameResult::Loss => None,
        };

        log::debug!("Session {} finished: {:?} in {} ms", self.session_id, result, elapsed_ms);
        GameSummary {
            result,
            elapsed_ms,
            best_time,
        }
    }

    /// Unreadable history is left in place rather than replaced by a one-entry list.
    fn record_history(&mut self, record: HistoryRecord) {
        let mut history = match load_json::<History>(&self.store, History::KEY) {
            Ok(history) => history.unwrap_or_default(),
            Err(err) => {
                log::warn!("Game history not updated, stored value is unreadable: {}", err);
                return;
            }
        };
        history.push(record);
        if let Err(err) = history.save(&mut self.store) {
            log::warn!("Game history not saved: {}", err);
        }
    }

    fn record_best_time(&mut self, elapsed_ms: u64) -> BestTimeOutcome {
        let outcome = BestTimeOutcome::compare(elapsed_ms, self.best_time());
        if outcome.is_new_record() {
            if let Err(err) = set_best_time(&mut self.store, &self.difficulty, elapsed_ms) {
                log::warn!("Best time not saved: {}", err);
            }
        }
        outcome
    }

    fn snapshot(&self) -> Snapshot {
        let size = self.session.size();
        Snapshot {
            size,
            cells: iter_coords(size)
                .map(|coords| self.session.display_at(coords))
                .collect(),
        }
    }

    fn update(
        &self,
        outcome: CommandOutcome,
        before: &Snapshot,
        finish: Option<GameSummary>,
    ) -> Update {
        let size = self.session.size();
        let changed = if before.size == size {
            iter_coords(size)
                .zip(&before.cells)
                .filter(|&(coords, &old)| self.session.display_at(coords) != old)
                .map(|(coords, _)| coords)
                .collect()
        } else {
            // board changed shape, everything needs a repaint
            iter_coords(size).collect()
        };

        Update {
            session_id: self.session_id,
            outcome,
            status: self.session.status(),
            flags_remaining: self.session.flags_remaining(),
            changed,
            finish,
        }
    }
}
