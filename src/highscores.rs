//! High score leaderboard
//!
//! Keeps the top 5 scores with three-letter initials. The game talks to a
//! [`Leaderboard`] collaborator; [`HighScores`] is the in-memory board and
//! [`StoredLeaderboard`] persists it (LocalStorage on wasm32, a JSON file
//! natively).

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// Length of the initials code
pub const INITIALS_LEN: usize = 3;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub initials: String,
    pub score: u64,
}

/// Submit/fetch collaborator for final scores
pub trait Leaderboard {
    fn submit(&mut self, initials: &str, score: u64) -> Result<(), LeaderboardError>;
    fn fetch(&self) -> Result<Vec<HighScoreEntry>, LeaderboardError>;
}

/// Trim, cut to three characters and uppercase. The result must be three
/// ASCII letters.
pub fn normalize_initials(raw: &str) -> Result<String, LeaderboardError> {
    let initials: String = raw
        .trim()
        .chars()
        .take(INITIALS_LEN)
        .collect::<String>()
        .to_ascii_uppercase();

    if initials.len() == INITIALS_LEN && initials.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(initials)
    } else {
        Err(LeaderboardError::InvalidInitials(raw.to_string()))
    }
}

/// High score board, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the board. Any score fits while the
    /// board has room, zero included.
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score. Returns the rank achieved (1-indexed) or None if it
    /// didn't qualify. Ties rank below existing entries.
    pub fn add_score(&mut self, initials: &str, score: u64) -> Result<Option<usize>, LeaderboardError> {
        let initials = normalize_initials(initials)?;
        if !self.qualifies(score) {
            return Ok(None);
        }

        let entry = HighScoreEntry { initials, score };
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);

        Ok(Some(rank))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Restore ordering and size after loading untrusted data
    fn sanitize(mut self) -> Self {
        self.entries.retain(|e| normalize_initials(&e.initials).is_ok());
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, LeaderboardError> {
        Ok(serde_json::from_str::<HighScores>(json)?.sanitize())
    }

    pub fn to_json(&self) -> Result<String, LeaderboardError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Leaderboard for HighScores {
    fn submit(&mut self, initials: &str, score: u64) -> Result<(), LeaderboardError> {
        self.add_score(initials, score).map(|_| ())
    }

    fn fetch(&self) -> Result<Vec<HighScoreEntry>, LeaderboardError> {
        Ok(self.entries.clone())
    }
}

/// Board backed by persistent storage; every accepted submit is written
#[derive(Debug)]
pub struct StoredLeaderboard {
    scores: HighScores,
    #[cfg(not(target_arch = "wasm32"))]
    path: std::path::PathBuf,
}

impl StoredLeaderboard {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "neon_breakout_highscores";

    /// Load from LocalStorage; unreadable data starts a fresh board
    #[cfg(target_arch = "wasm32")]
    pub fn open() -> Self {
        let scores = Self::storage()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten())
            .map(|json| {
                HighScores::from_json(&json).unwrap_or_else(|e| {
                    log::warn!("Discarding unreadable high scores: {}", e);
                    HighScores::new()
                })
            })
            .unwrap_or_default();
        log::info!("Loaded {} high scores", scores.entries.len());
        Self { scores }
    }

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }

    #[cfg(target_arch = "wasm32")]
    fn persist(&self) -> Result<(), LeaderboardError> {
        let storage = Self::storage()
            .ok_or_else(|| LeaderboardError::Unavailable("no LocalStorage".to_string()))?;
        storage
            .set_item(Self::STORAGE_KEY, &self.scores.to_json()?)
            .map_err(|e| LeaderboardError::Unavailable(format!("{:?}", e)))?;
        log::info!("High scores saved ({} entries)", self.scores.entries.len());
        Ok(())
    }

    /// Load from a JSON file; a missing file starts a fresh board
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, LeaderboardError> {
        let path = path.into();
        let scores = if path.exists() {
            HighScores::from_json(&std::fs::read_to_string(&path)?)?
        } else {
            HighScores::new()
        };
        log::info!("Loaded {} high scores from {}", scores.entries.len(), path.display());
        Ok(Self { scores, path })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn persist(&self) -> Result<(), LeaderboardError> {
        std::fs::write(&self.path, self.scores.to_json()?)?;
        log::info!("High scores saved ({} entries)", self.scores.entries.len());
        Ok(())
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }
}

impl Leaderboard for StoredLeaderboard {
    fn submit(&mut self, initials: &str, score: u64) -> Result<(), LeaderboardError> {
        if self.scores.add_score(initials, score)?.is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn fetch(&self) -> Result<Vec<HighScoreEntry>, LeaderboardError> {
        self.scores.fetch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(scores: &[u64]) -> HighScores {
        let mut board = HighScores::new();
        for &s in scores {
            board.add_score("abc", s).unwrap();
        }
        board
    }

    #[test]
    fn test_initials_normalized() {
        assert_eq!(normalize_initials("abc").unwrap(), "ABC");
        assert_eq!(normalize_initials("  zed ").unwrap(), "ZED");
        assert_eq!(normalize_initials("abcdef").unwrap(), "ABC");
        assert!(normalize_initials("ab").is_err());
        assert!(normalize_initials("a1c").is_err());
        assert!(normalize_initials("").is_err());
    }

    #[test]
    fn test_board_keeps_top_five_sorted() {
        let board = board(&[50, 300, 10, 700, 120, 90, 400]);
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![700, 400, 300, 120, 90]);
        assert_eq!(board.top_score(), Some(700));
    }

    #[test]
    fn test_qualifies_and_rank() {
        let board = board(&[500, 400, 300, 200, 100]);
        assert!(!board.qualifies(100));
        assert!(board.qualifies(101));
        assert_eq!(board.potential_rank(450), Some(2));
        assert_eq!(board.potential_rank(50), None);
        assert!(HighScores::new().qualifies(0));
        assert_eq!(HighScores::new().potential_rank(5), Some(1));
    }

    #[test]
    fn test_ties_rank_below_existing() {
        let mut board = board(&[300]);
        let rank = board.add_score("xyz", 300).unwrap();
        assert_eq!(rank, Some(2));
        assert_eq!(board.entries[1].initials, "XYZ");
    }

    #[test]
    fn test_invalid_initials_leave_board_untouched() {
        let mut board = board(&[300]);
        let result = board.submit("!!", 900);
        assert!(matches!(result, Err(LeaderboardError::InvalidInitials(_))));
        assert_eq!(board.entries.len(), 1);
    }

    #[test]
    fn test_zero_score_is_stored() {
        let mut board = HighScores::new();
        board.submit("abc", 0).unwrap();
        let entries = board.fetch().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 0);
        assert_eq!(entries[0].initials, "ABC");

        // A zero never displaces anything from a full board
        for (i, initials) in ["AAA", "BBB", "CCC", "DDD", "EEE"].iter().enumerate() {
            board.add_score(initials, 100 * (i as u64 + 1)).unwrap();
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert!(!board.qualifies(0));
        assert!(board.entries.iter().all(|e| e.score > 0));
    }

    #[test]
    fn test_json_is_sanitized() {
        let json = r#"{"entries":[
            {"initials":"AAA","score":10},
            {"initials":"BBB","score":90},
            {"initials":"??","score":999}
        ]}"#;
        let board = HighScores::from_json(json).unwrap();
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.entries[0].initials, "BBB");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_stored_board_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("neon-scores-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut stored = StoredLeaderboard::open(&path).unwrap();
        stored.submit("neo", 1200).unwrap();
        stored.submit("tri", 800).unwrap();

        let reopened = StoredLeaderboard::open(&path).unwrap();
        let entries = reopened.fetch().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], HighScoreEntry {
            initials: "NEO".to_string(),
            score: 1200
        });
        let _ = std::fs::remove_file(&path);
    }
}
