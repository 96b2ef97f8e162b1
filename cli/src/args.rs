use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tapsweeper_core::{CellCount, Coord, Difficulty};

/// Minesweeper in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// What log level to use
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Settings file, defaults are used when it does not exist
    #[arg(long, env = "TAPSWEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where best times and history are kept
    #[arg(long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub board: BoardArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer one bot update read from stdin, printing the reply if any
    Webhook {
        #[arg(long, env = "TAPSWEEPER_BOT_TOKEN", hide_env_values = true)]
        bot_token: String,
        #[arg(long, env = "TAPSWEEPER_WEBAPP_URL")]
        webapp_url: String,
    },
}

#[derive(ClapArgs, Debug, Default)]
pub struct BoardArgs {
    /// Preset board
    #[arg(short, long, conflicts_with_all = ["width", "height", "mines"])]
    pub difficulty: Option<Difficulty>,

    /// Custom board width
    #[arg(long, requires_all = ["height", "mines"])]
    pub width: Option<Coord>,

    /// Custom board height
    #[arg(long, requires_all = ["width", "mines"])]
    pub height: Option<Coord>,

    /// Custom mine count
    #[arg(long, requires_all = ["width", "height"])]
    pub mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl BoardArgs {
    /// Board picked on the command line, if any.
    pub fn difficulty(&self) -> tapsweeper_core::Result<Option<Difficulty>> {
        match (self.width, self.height, self.mines) {
            (Some(width), Some(height), Some(mines)) => {
                Difficulty::custom(width, height, mines).map(Some)
            }
            _ => Ok(self.difficulty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn custom_board_from_flags() {
        let args = Args::try_parse_from(["tapsweeper", "--width", "9", "--height", "7", "--mines", "12"])
            .unwrap();
        let difficulty = args.board.difficulty().unwrap().unwrap();
        assert_eq!(difficulty.key(), "custom_9x7_12");
    }

    #[test]
    fn preset_and_custom_conflict() {
        assert!(
            Args::try_parse_from(["tapsweeper", "-d", "hard", "--width", "9", "--height", "9", "--mines", "3"])
                .is_err()
        );
    }

    #[test]
    fn oversized_custom_board_is_refused() {
        let args = Args::try_parse_from(["tapsweeper", "--width", "30", "--height", "7", "--mines", "12"])
            .unwrap();
        assert!(args.board.difficulty().unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn webhook_subcommand() {
        let args = Args::try_parse_from([
            "tapsweeper",
            "webhook",
            "--bot-token",
            "1:x",
            "--webapp-url",
            "https://example.org",
        ])
        .unwrap();
        assert!(matches!(args.command, Some(Command::Webhook { .. })));
    }
}
