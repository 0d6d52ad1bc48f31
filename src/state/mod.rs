//! State management module for Puissance 4.
//!
//! This module provides the core state types and managers:
//!
//! - `board` - The 6x7 grid, gravity, and the anchored win check
//! - `engine` - Match state machine (turns, win/draw detection, lifecycle)
//! - `player` - Player registry (upsert by pseudo)
//! - `record` - Match records and the history read side
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           AppState                               │
//! │                                                                  │
//! │  ┌─────────────────┐          ┌─────────────────┐                │
//! │  │ PlayerRegistry  │          │   MatchStore    │                │
//! │  │                 │          │                 │                │
//! │  │ player_id →     │          │ match_id →      │                │
//! │  │   Player        │◀─history─│   MatchRecord   │                │
//! │  │                 │  lookup  │                 │                │
//! │  │ pseudo →        │          │                 │                │
//! │  │   player_id     │          │                 │                │
//! │  └─────────────────┘          └─────────────────┘                │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐    │
//! │  │               MatchEngine (one per running game)         │    │
//! │  │                                                          │    │
//! │  │  NotStarted ──▶ InProgress ──▶ Finished(win | draw)      │    │
//! │  │                    │    ▲                                │    │
//! │  │                    └────┘ drop_piece                     │    │
//! │  └──────────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is pure and owns no I/O; `AppState` owns the persistence-like
//! registries. Recording a finished match reads the engine immutably, so a
//! recording failure can never corrupt or roll back game state.

pub mod board;
pub mod engine;
pub mod player;
pub mod record;

// Re-export commonly used types
pub use board::{Board, Cell, Side, CELL_COUNT, COLS, CONNECT, ROWS};
pub use engine::{DropOutcome, EngineError, MatchEngine, MatchPhase, Outcome};
pub use player::{Player, PlayerError, PlayerRegistry, MAX_PSEUDO_LEN};
pub use record::{
    HistoryEntry, MatchRecord, MatchResult, MatchRow, MatchStore, RecordError,
    HISTORY_DEFAULT_LIMIT, HISTORY_MAX_LIMIT, MAX_MOVES,
};

/// Error starting a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// One of the pseudos failed validation
    Player(PlayerError),
    /// Record creation rejected (identical players)
    Record(RecordError),
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player(err) => write!(f, "{}", err),
            Self::Record(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for StartError {}

/// Error recording a finished match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishError {
    /// The engine has not reached a terminal state
    EngineNotFinished,
    /// The store rejected the finalization
    Record(RecordError),
}

impl std::fmt::Display for FinishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EngineNotFinished => write!(f, "Match is still in progress"),
            Self::Record(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FinishError {}

/// A freshly started match: the persisted identifiers plus a running engine.
#[derive(Debug)]
pub struct StartedMatch {
    pub match_id: i64,
    pub player1_id: i64,
    pub player2_id: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Engine already in progress, P1 to move
    pub engine: MatchEngine,
}

/// Combined application state.
///
/// This is an optional convenience struct that combines the registry and the
/// match store and mirrors the start/finish flow. You can also use the
/// individual managers and the engine directly.
#[derive(Debug, Default)]
pub struct AppState {
    pub players: PlayerRegistry,
    pub matches: MatchStore,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a match between two pseudos.
    ///
    /// Both players are upserted, the match record is created with a start
    /// timestamp, and a running [`MatchEngine`] is handed back to the caller,
    /// who owns it for the duration of the game.
    pub fn start_match(&mut self, pseudo1: &str, pseudo2: &str) -> Result<StartedMatch, StartError> {
        let player1_id = self.players.upsert(pseudo1).map_err(StartError::Player)?.id;
        let player2_id = self.players.upsert(pseudo2).map_err(StartError::Player)?.id;

        let record = self
            .matches
            .create(player1_id, player2_id)
            .map_err(StartError::Record)?;

        Ok(StartedMatch {
            match_id: record.id,
            player1_id,
            player2_id,
            started_at: record.started_at,
            engine: MatchEngine::started(),
        })
    }

    /// Record a finished engine into the match record.
    ///
    /// Reads the engine's terminal outcome and move count, resolves the
    /// winner to the record's participants, and finalizes the record.
    /// `ended_at` defaults to now. The engine is only borrowed: a rejected
    /// recording leaves game state untouched and the game locally playable.
    pub fn finish_match(
        &mut self,
        match_id: i64,
        engine: &MatchEngine,
        ended_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<&MatchRecord, FinishError> {
        let result = MatchResult::from_outcome(engine.outcome())
            .ok_or(FinishError::EngineNotFinished)?;

        let record = self
            .matches
            .get(match_id)
            .ok_or(FinishError::Record(RecordError::MatchNotFound))?;

        let winner_id = result.winner_side().map(|side| match side {
            Side::P1 => record.player1_id,
            Side::P2 => record.player2_id,
        });

        self.matches
            .finish(match_id, result, engine.moves(), winner_id, ended_at)
            .map_err(FinishError::Record)
    }

    /// Compact history view (see [`MatchStore::history`]).
    pub fn history(&self, limit: Option<usize>) -> Vec<HistoryEntry> {
        self.matches.history(&self.players, limit)
    }
}
