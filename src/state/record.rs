//! Match records and history.
//!
//! Stores one record per match: participants, start/end timestamps, move
//! count, result and winner. Records are created when a match starts and
//! finalized exactly once; a finalized record never changes. The read side
//! offers the compact history tuples (date, player1, player2, winner) and a
//! rich row listing, both resolving pseudos through the
//! [`PlayerRegistry`](crate::state::player::PlayerRegistry).

use std::collections::HashMap;

use serde::Serialize;

use crate::state::board::Side;
use crate::state::engine::Outcome;
use crate::state::player::PlayerRegistry;

/// Default number of history entries returned.
pub const HISTORY_DEFAULT_LIMIT: usize = 50;

/// Hard cap on history entries per query.
pub const HISTORY_MAX_LIMIT: usize = 200;

/// Rich row listing cap.
pub const ROWS_LIMIT: usize = 100;

/// Maximum moves a 6x7 match can contain.
pub const MAX_MOVES: u8 = 42;

/// Final result of a recorded match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchResult {
    P1Win,
    P2Win,
    Draw,
}

impl MatchResult {
    /// Wire string ("P1_WIN" / "P2_WIN" / "DRAW").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P1Win => "P1_WIN",
            Self::P2Win => "P2_WIN",
            Self::Draw => "DRAW",
        }
    }

    /// Convert a terminal engine outcome. `None` while the match is open.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::Unset => None,
            Outcome::P1Win => Some(Self::P1Win),
            Outcome::P2Win => Some(Self::P2Win),
            Outcome::Draw => Some(Self::Draw),
        }
    }

    /// Winning side, if any.
    pub fn winner_side(&self) -> Option<Side> {
        match self {
            Self::P1Win => Some(Side::P1),
            Self::P2Win => Some(Side::P2),
            Self::Draw => None,
        }
    }
}

/// One match record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Unique match ID
    pub id: i64,

    /// Player 1's registry ID
    pub player1_id: i64,

    /// Player 2's registry ID
    pub player2_id: i64,

    /// When the match started
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// When the match finished, if it has
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,

    /// End minus start in milliseconds, floored at zero
    pub duration_ms: i64,

    /// Drops played (0..=42)
    pub moves_count: u8,

    /// Final result, `None` while the match is open
    pub result: Option<MatchResult>,

    /// Winner's registry ID, `None` for draws and open matches
    pub winner_id: Option<i64>,

    /// When the record was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MatchRecord {
    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "player1_id": self.player1_id,
            "player2_id": self.player2_id,
            "started_at": self.started_at.to_rfc3339(),
            "ended_at": self.ended_at.map(|t| t.to_rfc3339()),
            "duration_ms": self.duration_ms,
            "moves_count": self.moves_count,
            "result": self.result.map(|r| r.as_str()),
            "winner_id": self.winner_id,
        })
    }
}

/// One entry of the compact history view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Match end date, "YYYY-MM-DD"
    pub date: String,

    /// Player 1's pseudo
    pub player1: String,

    /// Player 2's pseudo
    pub player2: String,

    /// Winner's pseudo, or the literal "DRAW"
    pub winner: String,
}

impl HistoryEntry {
    /// The 4-tuple shape clients consume.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!([self.date, self.player1, self.player2, self.winner])
    }
}

/// Rich listing row with resolved pseudos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    pub id: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
    pub duration_ms: i64,
    pub moves_count: u8,
    pub result: Option<MatchResult>,
    pub player1: String,
    pub player2: String,
    pub winner: Option<String>,
}

/// Record errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A match needs two distinct players
    SamePlayer,
    /// Unknown match ID
    MatchNotFound,
    /// Finish attempted on an already finalized record
    AlreadyFinished,
    /// Move count above [`MAX_MOVES`]
    MovesOutOfRange,
    /// Non-draw result without a winner
    WinnerRequired,
    /// Winner is neither participant
    WinnerNotInMatch,
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SamePlayer => write!(f, "Both players must be different"),
            Self::MatchNotFound => write!(f, "Match not found"),
            Self::AlreadyFinished => write!(f, "Match is already finished"),
            Self::MovesOutOfRange => {
                write!(f, "Move count must be at most {}", MAX_MOVES)
            }
            Self::WinnerRequired => write!(f, "A winner is required unless the match is a draw"),
            Self::WinnerNotInMatch => write!(f, "Winner did not play in this match"),
        }
    }
}

impl std::error::Error for RecordError {}

/// Match store - tracks all match records.
#[derive(Debug, Default)]
pub struct MatchStore {
    /// Records by match ID
    records: HashMap<i64, MatchRecord>,

    /// Next ID to assign
    next_id: i64,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record for a match that is starting now.
    pub fn create(
        &mut self,
        player1_id: i64,
        player2_id: i64,
    ) -> Result<&MatchRecord, RecordError> {
        if player1_id == player2_id {
            return Err(RecordError::SamePlayer);
        }

        let now = chrono::Utc::now();
        self.next_id += 1;
        let id = self.next_id;
        let record = MatchRecord {
            id,
            player1_id,
            player2_id,
            started_at: now,
            ended_at: None,
            duration_ms: 0,
            moves_count: 0,
            result: None,
            winner_id: None,
            created_at: now,
        };
        self.records.insert(id, record);

        Ok(&self.records[&id])
    }

    /// Finalize a record.
    ///
    /// `ended_at` defaults to now when not supplied; the stored duration is
    /// end minus start, floored at zero. A non-draw result requires the
    /// winner's player ID and it must be one of the participants; a draw
    /// stores no winner regardless of what is passed.
    pub fn finish(
        &mut self,
        match_id: i64,
        result: MatchResult,
        moves_count: u8,
        winner_id: Option<i64>,
        ended_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<&MatchRecord, RecordError> {
        if moves_count > MAX_MOVES {
            return Err(RecordError::MovesOutOfRange);
        }

        let record = self
            .records
            .get_mut(&match_id)
            .ok_or(RecordError::MatchNotFound)?;

        if record.is_finished() {
            return Err(RecordError::AlreadyFinished);
        }

        let winner_id = match result {
            MatchResult::Draw => None,
            _ => {
                let id = winner_id.ok_or(RecordError::WinnerRequired)?;
                if id != record.player1_id && id != record.player2_id {
                    return Err(RecordError::WinnerNotInMatch);
                }
                Some(id)
            }
        };

        let ended_at = ended_at.unwrap_or_else(chrono::Utc::now);
        record.ended_at = Some(ended_at);
        record.duration_ms = (ended_at - record.started_at).num_milliseconds().max(0);
        record.moves_count = moves_count;
        record.result = Some(result);
        record.winner_id = winner_id;

        Ok(&self.records[&match_id])
    }

    /// Get a record by match ID.
    pub fn get(&self, match_id: i64) -> Option<&MatchRecord> {
        self.records.get(&match_id)
    }

    /// Count all records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Count finalized records.
    pub fn finished_count(&self) -> usize {
        self.records.values().filter(|r| r.is_finished()).count()
    }

    /// Finished matches, newest end first, reduced to history tuples.
    ///
    /// `limit` defaults to [`HISTORY_DEFAULT_LIMIT`] and is capped at
    /// [`HISTORY_MAX_LIMIT`]. The winner column carries the winner's pseudo,
    /// or "DRAW" for draws and for any finished match whose winner cannot be
    /// resolved to a pseudo.
    pub fn history(&self, registry: &PlayerRegistry, limit: Option<usize>) -> Vec<HistoryEntry> {
        let limit = limit.unwrap_or(HISTORY_DEFAULT_LIMIT).min(HISTORY_MAX_LIMIT);

        let mut finished: Vec<&MatchRecord> =
            self.records.values().filter(|r| r.is_finished()).collect();
        finished.sort_by(|a, b| b.ended_at.cmp(&a.ended_at));

        finished
            .into_iter()
            .take(limit)
            .filter_map(|record| {
                let player1 = registry.pseudo_of(record.player1_id)?.to_string();
                let player2 = registry.pseudo_of(record.player2_id)?.to_string();
                let winner = match record.result {
                    Some(MatchResult::Draw) | None => "DRAW".to_string(),
                    _ => record
                        .winner_id
                        .and_then(|id| registry.pseudo_of(id))
                        .unwrap_or("DRAW")
                        .to_string(),
                };
                let date = record
                    .ended_at
                    .unwrap_or(record.started_at)
                    .format("%Y-%m-%d")
                    .to_string();

                Some(HistoryEntry {
                    date,
                    player1,
                    player2,
                    winner,
                })
            })
            .collect()
    }

    /// All records as rich rows, newest created first, capped at
    /// [`ROWS_LIMIT`]. Serializable for a debug listing.
    pub fn rows(&self, registry: &PlayerRegistry) -> Vec<MatchRow> {
        let mut records: Vec<&MatchRecord> = self.records.values().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        records
            .into_iter()
            .take(ROWS_LIMIT)
            .filter_map(|record| {
                Some(MatchRow {
                    id: record.id,
                    started_at: record.started_at,
                    ended_at: record.ended_at,
                    duration_ms: record.duration_ms,
                    moves_count: record.moves_count,
                    result: record.result,
                    player1: registry.pseudo_of(record.player1_id)?.to_string(),
                    player2: registry.pseudo_of(record.player2_id)?.to_string(),
                    winner: record
                        .winner_id
                        .and_then(|id| registry.pseudo_of(id))
                        .map(str::to_string),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_players(registry: &mut PlayerRegistry) -> (i64, i64) {
        let p1 = registry.upsert("Alice").unwrap().id;
        let p2 = registry.upsert("Bob").unwrap().id;
        (p1, p2)
    }

    #[test]
    fn test_create_record() {
        let mut store = MatchStore::new();

        let record = store.create(1, 2).unwrap();
        assert!(!record.is_finished());
        assert_eq!(record.moves_count, 0);
        assert_eq!(record.result, None);

        assert_eq!(store.count(), 1);
        assert_eq!(store.finished_count(), 0);
    }

    #[test]
    fn test_create_same_player_rejected() {
        let mut store = MatchStore::new();
        assert_eq!(store.create(1, 1).err(), Some(RecordError::SamePlayer));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_finish_win() {
        let mut store = MatchStore::new();
        let id = store.create(1, 2).unwrap().id;

        let record = store
            .finish(id, MatchResult::P1Win, 7, Some(1), None)
            .unwrap();

        assert!(record.is_finished());
        assert_eq!(record.result, Some(MatchResult::P1Win));
        assert_eq!(record.winner_id, Some(1));
        assert_eq!(record.moves_count, 7);
        assert!(record.duration_ms >= 0);
        assert_eq!(store.finished_count(), 1);
    }

    #[test]
    fn test_finish_draw_ignores_winner() {
        let mut store = MatchStore::new();
        let id = store.create(1, 2).unwrap().id;

        let record = store
            .finish(id, MatchResult::Draw, 42, Some(1), None)
            .unwrap();

        assert_eq!(record.result, Some(MatchResult::Draw));
        assert_eq!(record.winner_id, None);
    }

    #[test]
    fn test_finish_validation() {
        let mut store = MatchStore::new();
        let id = store.create(1, 2).unwrap().id;

        assert_eq!(
            store.finish(99, MatchResult::Draw, 42, None, None).err(),
            Some(RecordError::MatchNotFound)
        );
        assert_eq!(
            store.finish(id, MatchResult::P1Win, 7, None, None).err(),
            Some(RecordError::WinnerRequired)
        );
        assert_eq!(
            store.finish(id, MatchResult::P1Win, 7, Some(3), None).err(),
            Some(RecordError::WinnerNotInMatch)
        );
        assert_eq!(
            store.finish(id, MatchResult::P1Win, 43, Some(1), None).err(),
            Some(RecordError::MovesOutOfRange)
        );

        // Rejections left the record open
        assert!(!store.get(id).unwrap().is_finished());

        store.finish(id, MatchResult::P1Win, 7, Some(1), None).unwrap();
        assert_eq!(
            store.finish(id, MatchResult::P1Win, 7, Some(1), None).err(),
            Some(RecordError::AlreadyFinished)
        );
    }

    #[test]
    fn test_duration_floored_at_zero() {
        let mut store = MatchStore::new();
        let id = store.create(1, 2).unwrap().id;

        // Client clock behind the server: ended_at before started_at
        let before_start = store.get(id).unwrap().started_at - chrono::Duration::seconds(30);
        let record = store
            .finish(id, MatchResult::P2Win, 10, Some(2), Some(before_start))
            .unwrap();

        assert_eq!(record.duration_ms, 0);
    }

    #[test]
    fn test_duration_from_supplied_end() {
        let mut store = MatchStore::new();
        let id = store.create(1, 2).unwrap().id;

        let ended = store.get(id).unwrap().started_at + chrono::Duration::milliseconds(90_500);
        let record = store
            .finish(id, MatchResult::P2Win, 20, Some(2), Some(ended))
            .unwrap();

        assert_eq!(record.duration_ms, 90_500);
        assert_eq!(record.ended_at, Some(ended));
    }

    #[test]
    fn test_history_ordering_and_winners() {
        use chrono::TimeZone;

        let mut registry = PlayerRegistry::new();
        let (p1, p2) = two_players(&mut registry);

        let mut store = MatchStore::new();

        let first = store.create(p1, p2).unwrap().id;
        let second = store.create(p1, p2).unwrap().id;
        let third = store.create(p2, p1).unwrap().id;

        let day = |d: u32| chrono::Utc.with_ymd_and_hms(2024, 6, d, 12, 0, 0).unwrap();

        store
            .finish(first, MatchResult::P1Win, 7, Some(p1), Some(day(1)))
            .unwrap();
        store
            .finish(second, MatchResult::Draw, 42, None, Some(day(2)))
            .unwrap();
        store
            .finish(third, MatchResult::P1Win, 9, Some(p2), Some(day(3)))
            .unwrap();

        let history = store.history(&registry, None);
        assert_eq!(history.len(), 3);

        // Newest end first
        assert_eq!(history[0].player1, "Bob");
        assert_eq!(history[0].winner, "Bob");
        assert_eq!(history[0].date, "2024-06-03");
        assert_eq!(history[1].winner, "DRAW");
        assert_eq!(history[2].winner, "Alice");
        assert_eq!(history[2].player1, "Alice");
        assert_eq!(history[2].player2, "Bob");
        assert_eq!(history[2].date, "2024-06-01");
    }

    #[test]
    fn test_history_skips_open_matches() {
        let mut registry = PlayerRegistry::new();
        let (p1, p2) = two_players(&mut registry);

        let mut store = MatchStore::new();
        store.create(p1, p2).unwrap();
        let done = store.create(p1, p2).unwrap().id;
        store
            .finish(done, MatchResult::P2Win, 12, Some(p2), None)
            .unwrap();

        let history = store.history(&registry, None);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].winner, "Bob");
    }

    #[test]
    fn test_history_falls_back_to_draw_for_unresolved_winner() {
        let mut registry = PlayerRegistry::new();
        let (p1, p2) = two_players(&mut registry);

        let mut store = MatchStore::new();
        let id = store.create(p1, p2).unwrap().id;
        store
            .finish(id, MatchResult::P1Win, 7, Some(p1), None)
            .unwrap();

        // A winner id with no registry entry renders as DRAW instead of
        // dropping or failing the row, matching how finished matches with
        // missing winner data have always been displayed.
        if let Some(record) = store.records.get_mut(&id) {
            record.winner_id = Some(999);
        }

        let history = store.history(&registry, None);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].winner, "DRAW");
    }

    #[test]
    fn test_history_limit_clamped() {
        let mut registry = PlayerRegistry::new();
        let (p1, p2) = two_players(&mut registry);

        let mut store = MatchStore::new();
        for _ in 0..5 {
            let id = store.create(p1, p2).unwrap().id;
            store
                .finish(id, MatchResult::P1Win, 7, Some(p1), None)
                .unwrap();
        }

        assert_eq!(store.history(&registry, Some(2)).len(), 2);
        assert_eq!(store.history(&registry, Some(500)).len(), 5);
        assert_eq!(store.history(&registry, None).len(), 5);
    }

    #[test]
    fn test_history_entry_tuple_json() {
        let entry = HistoryEntry {
            date: "2024-06-01".to_string(),
            player1: "Alice".to_string(),
            player2: "Bob".to_string(),
            winner: "Alice".to_string(),
        };

        assert_eq!(
            entry.to_json(),
            serde_json::json!(["2024-06-01", "Alice", "Bob", "Alice"])
        );
    }

    #[test]
    fn test_rows_serialization() {
        let mut registry = PlayerRegistry::new();
        let (p1, p2) = two_players(&mut registry);

        let mut store = MatchStore::new();
        let id = store.create(p1, p2).unwrap().id;
        store
            .finish(id, MatchResult::P1Win, 7, Some(p1), None)
            .unwrap();

        let rows = store.rows(&registry);
        assert_eq!(rows.len(), 1);

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["player1"], serde_json::json!("Alice"));
        assert_eq!(json["winner"], serde_json::json!("Alice"));
        assert_eq!(json["result"], serde_json::json!("P1_WIN"));
        assert_eq!(json["movesCount"], serde_json::json!(7));
        assert!(json["startedAt"].is_string());
    }

    #[test]
    fn test_result_strings() {
        assert_eq!(MatchResult::P1Win.as_str(), "P1_WIN");
        assert_eq!(MatchResult::P2Win.as_str(), "P2_WIN");
        assert_eq!(MatchResult::Draw.as_str(), "DRAW");
        assert_eq!(MatchResult::from_outcome(Outcome::Unset), None);
        assert_eq!(
            MatchResult::from_outcome(Outcome::P2Win),
            Some(MatchResult::P2Win)
        );
        assert_eq!(MatchResult::P1Win.winner_side(), Some(Side::P1));
        assert_eq!(MatchResult::Draw.winner_side(), None);
    }
}
