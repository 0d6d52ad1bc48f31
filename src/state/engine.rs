//! Match engine.
//!
//! Owns the board, the current turn and terminal-state detection for one
//! match at a time. The engine is a pure state machine: a sequence of column
//! drops deterministically produces board contents, turn order and a final
//! outcome, with no I/O, timers or persistence involved. Recording the match
//! is the owner's job (see [`crate::state::AppState`]) and happens after the
//! synchronous transition; a failed recording never rolls back engine state.

use crate::state::board::{Board, Side, CELL_COUNT, COLS};

/// Match lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPhase {
    /// Created, no drops accepted yet
    #[default]
    NotStarted,
    /// Match running, drops accepted
    InProgress,
    /// Terminal; only a fresh engine can host another game
    Finished,
}

impl MatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
        }
    }

    /// Check if the match can receive drops.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Check if the match can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Final result of a match. `Unset` while the match is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Unset,
    P1Win,
    P2Win,
    Draw,
}

impl Outcome {
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Winning side, if any.
    pub fn winner(&self) -> Option<Side> {
        match self {
            Self::P1Win => Some(Side::P1),
            Self::P2Win => Some(Side::P2),
            _ => None,
        }
    }

    /// Wire string, `None` while unset.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::Unset => None,
            Self::P1Win => Some("P1_WIN"),
            Self::P2Win => Some("P2_WIN"),
            Self::Draw => Some("DRAW"),
        }
    }

    fn win_for(side: Side) -> Self {
        match side {
            Side::P1 => Self::P1Win,
            Side::P2 => Self::P2Win,
        }
    }
}

/// What a successful drop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropOutcome {
    /// Row the piece landed in (derived, never caller-chosen)
    pub row: usize,
    /// Column the piece was dropped in
    pub col: usize,
    /// Side that moved
    pub side: Side,
    /// `Unset` when the match continues, terminal otherwise
    pub outcome: Outcome,
}

/// Engine errors. All are local and recoverable; a rejected drop leaves the
/// engine untouched and is safe to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Column index outside 0..=6
    InvalidColumn(usize),
    /// Target column has no empty cell
    ColumnFull(usize),
    /// Drop attempted before `start()`
    MatchNotStarted,
    /// Drop attempted after the match reached a terminal state
    MatchAlreadyFinished,
    /// `start()` called on a match that already left `NotStarted`
    AlreadyStarted,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidColumn(col) => write!(f, "Column {} is out of range", col),
            Self::ColumnFull(col) => write!(f, "Column {} is full", col),
            Self::MatchNotStarted => write!(f, "Match has not started"),
            Self::MatchAlreadyFinished => write!(f, "Match is already finished"),
            Self::AlreadyStarted => write!(f, "Match has already started"),
        }
    }
}

impl std::error::Error for EngineError {}

/// One match's state machine.
///
/// ```text
/// NotStarted ──start()──▶ InProgress ──drop (win or 42nd piece)──▶ Finished
///                             │ ▲
///                             └─┘ drop (no win, board not full)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchEngine {
    board: Board,
    turn: Side,
    moves: u8,
    outcome: Outcome,
    phase: MatchPhase,
}

impl MatchEngine {
    /// Create a fresh engine: empty board, P1 to move, not started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine already in progress. Used when the match record is
    /// registered with persistence at creation, before any drop.
    pub fn started() -> Self {
        Self {
            phase: MatchPhase::InProgress,
            ..Self::default()
        }
    }

    /// Start the match (`NotStarted` → `InProgress`). Distinct from the
    /// first drop; the owner registers the match record at this point.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.phase != MatchPhase::NotStarted {
            return Err(EngineError::AlreadyStarted);
        }
        self.phase = MatchPhase::InProgress;
        Ok(())
    }

    /// Drop the current side's piece in a column.
    ///
    /// The piece lands in the lowest empty row. Post-move evaluation order:
    /// win check anchored at the landed piece first, then the full-board
    /// draw check, then turn passing. A 42nd piece that connects four is a
    /// win, never a draw. On a win the turn does not change, so
    /// [`MatchEngine::turn`] still names the winner.
    pub fn drop_piece(&mut self, col: usize) -> Result<DropOutcome, EngineError> {
        match self.phase {
            MatchPhase::NotStarted => return Err(EngineError::MatchNotStarted),
            MatchPhase::Finished => return Err(EngineError::MatchAlreadyFinished),
            MatchPhase::InProgress => {}
        }

        if col >= COLS {
            return Err(EngineError::InvalidColumn(col));
        }

        let row = self
            .board
            .landing_row(col)
            .ok_or(EngineError::ColumnFull(col))?;

        let side = self.turn;
        self.board.place(row, col, side);
        self.moves += 1;

        if self.board.connects_four(row, col, side) {
            self.outcome = Outcome::win_for(side);
            self.phase = MatchPhase::Finished;
        } else if self.moves >= CELL_COUNT {
            self.outcome = Outcome::Draw;
            self.phase = MatchPhase::Finished;
        } else {
            self.turn = side.opponent();
        }

        Ok(DropOutcome {
            row,
            col,
            side,
            outcome: self.outcome,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move (the winner once the match is won).
    pub fn turn(&self) -> Side {
        self.turn
    }

    /// Number of drops played so far (0..=42).
    pub fn moves(&self) -> u8 {
        self.moves
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Convert full engine state to a JSON snapshot for clients.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "board": self.board.to_json(),
            "turn": self.turn.as_str(),
            "moves": self.moves,
            "phase": self.phase.as_str(),
            "outcome": self.outcome.as_str(),
        })
    }
}
