use std::io::{BufRead, Write};

use tapsweeper_core::{
    CommandOutcome, Difficulty, GameEngine, GameResult, GameSummary, KeyValueStore, MarkOutcome,
    SessionStatus, SystemClock, Update,
};

use crate::commands::{HELP, Input};
use crate::render;
use crate::ticker::Ticker;

/// Interactive game driving one engine from text commands.
pub struct Game<S> {
    engine: GameEngine<S>,
    ticker: Option<Ticker>,
}

impl<S: KeyValueStore> Game<S> {
    pub fn new(store: S, seed: u64, difficulty: Difficulty) -> tapsweeper_core::Result<Self> {
        Ok(Self {
            engine: GameEngine::new(store, seed, difficulty)?,
            ticker: None,
        })
    }

    pub fn engine(&self) -> &GameEngine<S> {
        &self.engine
    }

    /// Seconds shown on the timer counter.
    pub fn seconds(&self) -> u64 {
        match &self.ticker {
            Some(ticker) => ticker.seconds(),
            None => self.engine.elapsed_ms() / 1000,
        }
    }

    /// Runs one input line, returns `false` once the player quits.
    pub fn handle(&mut self, input: Input, out: &mut impl Write) -> anyhow::Result<bool> {
        let update = match input {
            Input::Quit => return Ok(false),
            Input::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(true);
            }
            Input::History => {
                write!(out, "{}", render::history(&self.engine.history()))?;
                return Ok(true);
            }
            Input::Reveal(coords) => self.engine.reveal(coords),
            Input::Flag(coords) => self.engine.toggle_flag(coords),
            Input::Chord(coords) => self.engine.chord_reveal(coords),
            Input::NewGame => self.engine.new_session(),
            Input::SetDifficulty(difficulty) => match self.engine.create_session(difficulty) {
                Ok(update) => update,
                Err(err) => {
                    writeln!(out, "{err}")?;
                    return Ok(true);
                }
            },
        };

        self.sync_ticker(&update);
        self.report(&update, out)?;
        Ok(true)
    }

    /// Keeps exactly one ticker alive for a running session, none otherwise.
    fn sync_ticker(&mut self, update: &Update) {
        let running = update.status == SessionStatus::InProgress;
        let current = self
            .ticker
            .as_ref()
            .is_some_and(|ticker| ticker.session_id() == update.session_id);

        if !running {
            self.ticker = None;
        } else if !current {
            let started_at_ms = self.engine.session().started_at_ms().unwrap_or_default();
            self.ticker = Some(Ticker::start(update.session_id, started_at_ms, SystemClock));
        }
    }

    fn report(&self, update: &Update, out: &mut impl Write) -> anyhow::Result<()> {
        match update.outcome {
            CommandOutcome::Ignored(err) => writeln!(out, "{err}")?,
            CommandOutcome::Mark(MarkOutcome::OutOfFlags) => writeln!(out, "No flags left")?,
            CommandOutcome::SessionCreated => writeln!(out, "New {} game", self.engine.difficulty())?,
            _ => {}
        }

        if update.has_update() {
            write!(out, "{}", render::board(self.engine.session(), self.seconds()))?;
        }
        if let Some(finish) = &update.finish {
            writeln!(out, "{}", summary(finish))?;
        }
        Ok(())
    }

    /// Reads commands until `q` or end of input.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> anyhow::Result<()> {
        writeln!(out, "{} game, type h for help", self.engine.difficulty())?;
        write!(out, "{}", render::board(self.engine.session(), 0))?;

        for line in input.lines() {
            let line = line?;
            let keep_going = match line.parse::<Input>() {
                Ok(input) => self.handle(input, out)?,
                Err(err) => {
                    writeln!(out, "{err}")?;
                    true
                }
            };
            if !keep_going {
                break;
            }
            out.flush()?;
        }
        self.ticker = None;
        Ok(())
    }
}

fn summary(finish: &GameSummary) -> String {
    let time = render::duration(finish.elapsed_ms);
    match (finish.result, finish.best_time) {
        (GameResult::Loss, _) => format!("Boom! Lost after {time}"),
        (GameResult::Win, Some(best)) if best.is_new_record() => {
            format!("Cleared in {time}, a new best time!")
        }
        (GameResult::Win, Some(best)) => format!(
            "Cleared in {time}, best is {}",
            render::duration(best.record_ms())
        ),
        (GameResult::Win, None) => format!("Cleared in {time}"),
    }
}

#[cfg(test)]
mod tests {
    use tapsweeper_core::{BestTimeOutcome, MemoryStore};

    use super::*;

    fn play(script: &str) -> (Game<MemoryStore>, String) {
        let mut game = Game::new(MemoryStore::new(), 7, Difficulty::Easy).unwrap();
        let mut out = Vec::new();
        game.run(script.as_bytes(), &mut out).unwrap();
        (game, String::from_utf8(out).unwrap())
    }

    #[test]
    fn first_reveal_starts_ticker_and_quit_stops_it() {
        let mut game = Game::new(MemoryStore::new(), 7, Difficulty::Easy).unwrap();
        let mut out = Vec::new();

        game.handle(Input::Reveal((4, 4)), &mut out).unwrap();
        if game.engine().session().status() == SessionStatus::InProgress {
            let ticker = game.ticker.as_ref().unwrap();
            assert_eq!(ticker.session_id(), game.engine().session_id());
        }

        game.handle(Input::NewGame, &mut out).unwrap();
        assert!(game.ticker.is_none());
        assert!(!game.handle(Input::Quit, &mut out).unwrap());
    }

    #[test]
    fn bad_lines_do_not_end_the_game() {
        let (game, out) = play("boom\nr 3\nr 99 99\nq\nr 0 0\n");

        assert!(out.contains("Unknown command \"boom\""));
        assert!(out.contains("Expected X Y after r"));
        assert!(out.contains("Invalid coordinates"));
        assert_eq!(game.engine().session().status(), SessionStatus::NotStarted);
    }

    #[test]
    fn switching_difficulty_redraws_board() {
        let (game, out) = play("d hard\nd 20 20 5\n");

        assert!(out.contains("New hard game"));
        assert!(out.contains("[025]"));
        assert_eq!(game.engine().difficulty(), Difficulty::Hard);
        assert_eq!(game.engine().session_id(), 1);
    }

    #[test]
    fn summaries() {
        let win = GameSummary {
            result: GameResult::Win,
            elapsed_ms: 9_500,
            best_time: Some(BestTimeOutcome::NotBeaten {
                time_ms: 9_500,
                record_ms: 8_000,
            }),
        };
        assert_eq!(summary(&win), "Cleared in 9.500s, best is 8.000s");

        let loss = GameSummary {
            result: GameResult::Loss,
            elapsed_ms: 1_000,
            best_time: None,
        };
        assert_eq!(summary(&loss), "Boom! Lost after 1.000s");
    }
}
