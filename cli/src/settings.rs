use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tapsweeper_core::Difficulty;

const DEFAULT_STORE: &str = "tapsweeper.json";

/// Values read from the settings file, anything missing falls back to defaults.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub store: Option<PathBuf>,
}

impl Settings {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Reads `path` when given, a missing file is the same as an empty one.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw).with_context(|| format!("Invalid settings in {}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err).with_context(|| format!("Could not read {}", path.display())),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.store_path(), PathBuf::from(DEFAULT_STORE));
    }

    #[test]
    fn preset_and_store() {
        let settings = Settings::parse("difficulty = \"hard\"\nstore = \"/tmp/scores.json\"\n").unwrap();
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.store_path(), PathBuf::from("/tmp/scores.json"));
    }

    #[test]
    fn custom_board_table() {
        let settings = Settings::parse("[difficulty.custom]\nsize = [9, 7]\nmines = 12\n").unwrap();
        assert_eq!(settings.difficulty.key(), "custom_9x7_12");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::parse("colour = \"blue\"").is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("tapsweeper-settings-that-does-not-exist.toml");
        assert_eq!(Settings::load(Some(&path)).unwrap(), Settings::default());
    }
}
