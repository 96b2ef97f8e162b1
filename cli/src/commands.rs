use std::str::FromStr;

use tapsweeper_core::{Coord, Coord2, Difficulty, GameError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Reveal(Coord2),
    Flag(Coord2),
    Chord(Coord2),
    NewGame,
    SetDifficulty(Difficulty),
    History,
    Help,
    Quit,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown command {0:?}, type h for help")]
    UnknownCommand(String),
    #[error("Expected {expected} after {command}")]
    WrongArguments {
        command: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    Difficulty(#[from] tapsweeper_core::UnknownDifficulty),
    #[error(transparent)]
    Board(#[from] GameError),
}

pub const HELP: &str = "\
r X Y      reveal a cell
f X Y      toggle a flag
c X Y      reveal around a satisfied number
n          new game
d NAME     switch to easy, medium or hard
d W H M    switch to a custom board
h          recent games
q          quit";

fn number<T: FromStr>(word: &str, command: &'static str, expected: &'static str) -> Result<T, InputError> {
    word.parse()
        .map_err(|_| InputError::WrongArguments { command, expected })
}

fn coords(command: &'static str, args: &[&str]) -> Result<Coord2, InputError> {
    const EXPECTED: &str = "X Y";
    match args {
        [x, y] => Ok((
            number::<Coord>(x, command, EXPECTED)?,
            number::<Coord>(y, command, EXPECTED)?,
        )),
        _ => Err(InputError::WrongArguments {
            command,
            expected: EXPECTED,
        }),
    }
}

impl FromStr for Input {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            return Ok(Self::Help);
        };

        match command.to_ascii_lowercase().as_str() {
            "r" => coords("r", args).map(Self::Reveal),
            "f" => coords("f", args).map(Self::Flag),
            "c" => coords("c", args).map(Self::Chord),
            "n" => Ok(Self::NewGame),
            "h" => Ok(Self::History),
            "?" | "help" => Ok(Self::Help),
            "q" | "quit" => Ok(Self::Quit),
            "d" => match args {
                [name] => Ok(Self::SetDifficulty(name.parse()?)),
                [width, height, mines] => {
                    const EXPECTED: &str = "W H M";
                    let difficulty = Difficulty::custom(
                        number(width, "d", EXPECTED)?,
                        number(height, "d", EXPECTED)?,
                        number(mines, "d", EXPECTED)?,
                    )?;
                    Ok(Self::SetDifficulty(difficulty))
                }
                _ => Err(InputError::WrongArguments {
                    command: "d",
                    expected: "NAME or W H M",
                }),
            },
            _ => Err(InputError::UnknownCommand(command.to_string())),
        }
    }
}
