use std::io::{self, Read};

use anyhow::Context;
use clap::Parser;
use tapsweeper_core::{Clock, KeyValueStore, MemoryStore, SystemClock};
use tapsweeper_protocol::{WebhookConfig, handle_update, parse_update};

use crate::args::{Args, Command};
use crate::game::Game;
use crate::settings::Settings;
use crate::store::FileStore;

mod args;
mod commands;
mod game;
mod render;
mod settings;
mod store;
mod ticker;

fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.command.take() {
        Some(Command::Webhook {
            bot_token,
            webapp_url,
        }) => webhook(bot_token, webapp_url),
        None => play(args),
    }
}

fn webhook(bot_token: String, webapp_url: String) -> anyhow::Result<()> {
    let config = WebhookConfig::new(bot_token, webapp_url)?;
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("Could not read update from stdin")?;

    let update = parse_update(&raw)?;
    if let Some(reply) = handle_update(&config, &update) {
        log::info!("Reply goes to {}", config.send_message_url());
        println!("{}", serde_json::to_string(&reply)?);
    }
    Ok(())
}

fn open_store(settings: &Settings, args: &Args) -> Box<dyn KeyValueStore> {
    let path = args.store.clone().unwrap_or_else(|| settings.store_path());
    match FileStore::open(&path) {
        Ok(store) => {
            log::debug!("Keeping scores in {}", store.path().display());
            Box::new(store)
        }
        Err(err) => {
            log::warn!("Scores will not be kept: {}", err);
            Box::new(MemoryStore::new())
        }
    }
}

fn play(args: Args) -> anyhow::Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let difficulty = args.board.difficulty()?.unwrap_or(settings.difficulty);
    let seed = args.board.seed.unwrap_or_else(|| SystemClock.now_ms());
    log::debug!("seed: {}", seed);

    let store = open_store(&settings, &args);
    let mut game = Game::new(store, seed, difficulty).context("Cannot start a game with these settings")?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    game.run(stdin.lock(), &mut stdout)?;
    log::debug!("Leaving after {} sessions", game.engine().session_id() + 1);
    Ok(())
}
