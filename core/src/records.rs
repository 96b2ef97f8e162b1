use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::*;

/// Most records kept in the history log.
pub const HISTORY_LIMIT: usize = 10;

const BEST_TIME_PREFIX: &str = "bestTime_";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
}

/// One finished game as kept in the history log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub size: String,
    pub mines: CellCount,
    pub result: GameResult,
}

impl HistoryRecord {
    pub fn new(config: GameConfig, result: GameResult, finished_at_ms: u64) -> Self {
        let nanos = i128::from(finished_at_ms) * 1_000_000;
        let timestamp =
            OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH);
        Self {
            timestamp,
            size: config.size_label(),
            mines: config.mines,
            result,
        }
    }
}

/// Finished games, most recent first, never longer than [`HISTORY_LIMIT`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    pub fn push(&mut self, record: HistoryRecord) {
        self.records.insert(0, record);
        self.records.truncate(HISTORY_LIMIT);
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StorageKey for History {
    const KEY: &'static str = "minesweeper_games";
}

pub fn best_time_key(difficulty: &Difficulty) -> String {
    format!("{BEST_TIME_PREFIX}{}", difficulty.key())
}

/// Stored best time in milliseconds, if any.
pub fn best_time(
    store: &impl KeyValueStore,
    difficulty: &Difficulty,
) -> core::result::Result<Option<u64>, StoreError> {
    load_json(store, &best_time_key(difficulty))
}

pub fn set_best_time(
    store: &mut impl KeyValueStore,
    difficulty: &Difficulty,
    time_ms: u64,
) -> core::result::Result<(), StoreError> {
    save_json(store, &best_time_key(difficulty), &time_ms)
}

/// How a winning time compares to the stored record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BestTimeOutcome {
    NewRecord { time_ms: u64, previous_ms: Option<u64> },
    NotBeaten { time_ms: u64, record_ms: u64 },
}

impl BestTimeOutcome {
    /// Only a strictly lower time beats the record, a tie keeps the old one.
    pub fn compare(time_ms: u64, record_ms: Option<u64>) -> Self {
        match record_ms {
            Some(record_ms) if time_ms >= record_ms => Self::NotBeaten { time_ms, record_ms },
            previous_ms => Self::NewRecord {
                time_ms,
                previous_ms,
            },
        }
    }

    pub const fn is_new_record(self) -> bool {
        matches!(self, Self::NewRecord { .. })
    }

    /// Best time after this game.
    pub const fn record_ms(self) -> u64 {
        match self {
            Self::NewRecord { time_ms, .. } => time_ms,
            Self::NotBeaten { record_ms, .. } => record_ms,
        }
    }
}
