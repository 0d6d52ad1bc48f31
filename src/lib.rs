//! Puissance 4 State Library
//!
//! This crate provides state management for Puissance 4 (Connect Four)
//! game logic.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Match Engine** - A pure state machine for one match: board, gravity,
//!   turn alternation, anchored win detection and draw detection, with a
//!   validated lifecycle (not started, in progress, finished).
//!
//! - **Player Registry** - Players upserted by display name (trimmed,
//!   1-30 characters, case-sensitive exact match).
//!
//! - **Match Records** - Start/finish timestamps, durations, move counts,
//!   results and winners, plus the history view (date, player1, player2,
//!   winner-or-DRAW tuples, newest first).
//!
//! # Design Principles
//!
//! 1. **State machines validate transitions** - An out-of-range column, a
//!    full column, or a drop on a finished match is rejected with a clear
//!    error and never mutates state.
//!
//! 2. **No networking** - This crate is pure state, no HTTP. Transport and
//!    rendering live in the surrounding application.
//!
//! 3. **Recording never blocks play** - The engine is read-only to the
//!    record side; a failed recording leaves the game playable.
//!
//! 4. **Serialization-ready** - All types can be converted to JSON for
//!    clients.
//!
//! # Example
//!
//! ```rust
//! use puissance4_state::state::{AppState, MatchResult, Outcome};
//!
//! let mut app = AppState::new();
//!
//! // Register both players and open the match record
//! let started = app.start_match("Alice", "Bob").unwrap();
//! let mut engine = started.engine;
//!
//! // Alice stacks column 3 while Bob answers in column 4
//! for col in [3, 4, 3, 4, 3, 4, 3] {
//!     engine.drop_piece(col).unwrap();
//! }
//! assert_eq!(engine.outcome(), Outcome::P1Win);
//!
//! // Record the result; the history view now shows the match
//! let record = app.finish_match(started.match_id, &engine, None).unwrap();
//! assert_eq!(record.result, Some(MatchResult::P1Win));
//! assert_eq!(app.history(None)[0].winner, "Alice");
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
