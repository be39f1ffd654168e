//! Persistence behind a small key-value abstraction.
//!
//! The browser backend lives in `web`; [`MemoryStore`] backs tests and hosts
//! without storage. Writes are best-effort: failures are logged and swallowed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

pub const TIMER_KEY: &str = "kiwiTimerData";
pub const HIGH_SCORE_KEY: &str = "kiwiTimerHighScore";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// --- Countdown record ----------------------------------------------------------

/// On-disk shape: `{"targetTime": "<ISO>", "startTime": "<ISO>"}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimerRecord {
    target_time: String,
    start_time: String,
}

/// A restored countdown, instants in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedCountdown {
    pub target_ms: f64,
    pub start_ms: f64,
}

pub struct TimerStore<S> {
    backend: S,
}

impl<S: KeyValueStore> TimerStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn save(&mut self, target_ms: f64, start_ms: f64) {
        if let Err(err) = self.try_save(target_ms, start_ms) {
            log::warn!("failed to save countdown: {err}");
        }
    }

    fn try_save(&mut self, target_ms: f64, start_ms: f64) -> Result<(), StorageError> {
        let record = TimerRecord {
            target_time: iso_from_ms(target_ms)?,
            start_time: iso_from_ms(start_ms)?,
        };
        let json = serde_json::to_string(&record)?;
        self.backend.set(TIMER_KEY, &json)
    }

    /// Load the saved countdown. A record whose target has already passed is
    /// discarded and cleared; unreadable records count as "nothing saved".
    pub fn load(&mut self, now_ms: f64) -> Option<SavedCountdown> {
        match self.try_load() {
            Ok(Some(saved)) if saved.target_ms <= now_ms => {
                log::info!("discarding expired countdown record");
                self.clear();
                None
            }
            Ok(saved) => saved,
            Err(err) => {
                log::warn!("failed to load countdown: {err}");
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<SavedCountdown>, StorageError> {
        let Some(raw) = self.backend.get(TIMER_KEY)? else {
            return Ok(None);
        };
        let record: TimerRecord = serde_json::from_str(&raw)?;
        Ok(Some(SavedCountdown {
            target_ms: ms_from_iso(&record.target_time)?,
            start_ms: ms_from_iso(&record.start_time)?,
        }))
    }

    pub fn clear(&mut self) {
        if let Err(err) = self.backend.remove(TIMER_KEY) {
            log::warn!("failed to clear countdown: {err}");
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }
}

fn iso_from_ms(ms: f64) -> Result<String, StorageError> {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ms.round() as i64)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .ok_or_else(|| StorageError::Corrupt(format!("timestamp out of range: {ms}")))
}

fn ms_from_iso(iso: &str) -> Result<f64, StorageError> {
    chrono::DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.timestamp_millis() as f64)
        .map_err(|err| StorageError::Corrupt(format!("{iso:?}: {err}")))
}

// --- High score ----------------------------------------------------------------

/// Where the high score lives between sessions. Injected into the scoreboard.
pub trait ScoreStore {
    fn load_high_score(&self) -> u32;
    fn save_high_score(&mut self, score: u32);
}

impl<S: KeyValueStore> ScoreStore for S {
    fn load_high_score(&self) -> u32 {
        match self.get(HIGH_SCORE_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("ignoring corrupt high score {raw:?}");
                0
            }),
            Ok(None) => 0,
            Err(err) => {
                log::warn!("failed to load high score: {err}");
                0
            }
        }
    }

    fn save_high_score(&mut self, score: u32) {
        if let Err(err) = self.set(HIGH_SCORE_KEY, &score.to_string()) {
            log::warn!("failed to save high score: {err}");
        }
    }
}
