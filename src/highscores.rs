//! High score leaderboard
//!
//! Fed from the game-over result. Top 10 runs, persisted to LocalStorage on
//! wasm32 and to a JSON file natively.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::level_for_score;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Run length (ms of unpaused play)
    pub elapsed_ms: f64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, sorted by score descending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "stroop_rider_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Record a finished run. Returns the rank achieved (1-indexed) or None
    /// if it didn't qualify. Ties rank below earlier runs.
    pub fn record(&mut self, score: u64, elapsed_ms: f64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            level: level_for_score(score),
            elapsed_ms,
            timestamp,
        };

        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(scores) => {
                        log::info!("Loaded {} high scores", scores.entries.len());
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding stored high scores: {e}"),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;

        let json = self.to_json()?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| StorageError::Unavailable)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load from a JSON file; a missing file is an empty board
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, StorageError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), StorageError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("High scores saved to {} ({} entries)", path.display(), self.entries.len());
        Ok(())
    }
}

/// Run length as `m:ss`
pub fn format_elapsed(elapsed_ms: f64) -> String {
    let secs = (elapsed_ms.max(0.0) / 1000.0).floor() as u64;
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.record(0, 1000.0, 0.0), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_sorted_insert_and_level() {
        let mut scores = HighScores::new();
        assert_eq!(scores.record(30, 1000.0, 1.0), Some(1));
        assert_eq!(scores.record(120, 5000.0, 2.0), Some(1));
        assert_eq!(scores.record(30, 900.0, 3.0), Some(3));
        assert_eq!(scores.top_score(), Some(120));
        assert_eq!(scores.entries[0].level, 3);
        assert_eq!(scores.entries[1].timestamp, 1.0);
    }

    #[test]
    fn test_board_is_capped() {
        let mut scores = HighScores::new();
        for s in 1..=MAX_HIGH_SCORES as u64 {
            scores.record(s * 10, 0.0, 0.0);
        }
        assert!(!scores.qualifies(5));
        assert_eq!(scores.record(5, 0.0, 0.0), None);
        assert_eq!(scores.record(55, 0.0, 0.0), Some(6));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_json_errors_surface() {
        assert!(matches!(
            HighScores::from_json("{"),
            Err(StorageError::Json(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("stroop_rider_scores_{}.json", std::process::id()));
        let missing = HighScores::load_from(&path).unwrap();
        assert!(missing.is_empty());

        let mut scores = HighScores::new();
        scores.record(77, 61_000.0, 5.0);
        scores.save_to(&path).unwrap();
        assert_eq!(HighScores::load_from(&path).unwrap(), scores);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0.0), "0:00");
        assert_eq!(format_elapsed(61_500.0), "1:01");
    }
}
