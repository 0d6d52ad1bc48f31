//! Player registry.
//!
//! Players are identified by a display name ("pseudo"), trimmed and 1 to 30
//! characters. Lookup is case-sensitive on the exact trimmed string; no
//! further normalization. Creating a player is an upsert: the same pseudo
//! always resolves to the same player.

use std::collections::HashMap;

/// Maximum pseudo length, after trimming.
pub const MAX_PSEUDO_LEN: usize = 30;

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Unique player ID
    pub id: i64,

    /// Display name, trimmed
    pub pseudo: String,

    /// When the player was first seen
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Player {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "pseudo": self.pseudo,
            "created_at": self.created_at.to_rfc3339(),
        })
    }
}

/// Player errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// Pseudo is empty after trimming
    EmptyPseudo,
    /// Pseudo exceeds [`MAX_PSEUDO_LEN`] characters
    PseudoTooLong,
}

impl std::fmt::Display for PlayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPseudo => write!(f, "Pseudo must not be empty"),
            Self::PseudoTooLong => {
                write!(f, "Pseudo must be at most {} characters", MAX_PSEUDO_LEN)
            }
        }
    }
}

impl std::error::Error for PlayerError {}

/// Trim and validate a raw pseudo.
pub fn normalize_pseudo(raw: &str) -> Result<&str, PlayerError> {
    let pseudo = raw.trim();
    if pseudo.is_empty() {
        return Err(PlayerError::EmptyPseudo);
    }
    if pseudo.chars().count() > MAX_PSEUDO_LEN {
        return Err(PlayerError::PseudoTooLong);
    }
    Ok(pseudo)
}

/// Player registry - tracks all known players.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    /// Players by ID
    players: HashMap<i64, Player>,

    /// Pseudo to player ID mapping (exact match)
    pseudo_index: HashMap<String, i64>,

    /// Next ID to assign
    next_id: i64,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find or create a player by pseudo.
    ///
    /// The pseudo is trimmed and validated first; an exact match returns the
    /// existing player, otherwise a new one is created.
    pub fn upsert(&mut self, raw_pseudo: &str) -> Result<&Player, PlayerError> {
        let pseudo = normalize_pseudo(raw_pseudo)?;

        if let Some(&id) = self.pseudo_index.get(pseudo) {
            // Indexes only hold IDs of stored players
            return Ok(&self.players[&id]);
        }

        self.next_id += 1;
        let id = self.next_id;
        let player = Player {
            id,
            pseudo: pseudo.to_string(),
            created_at: chrono::Utc::now(),
        };
        self.pseudo_index.insert(player.pseudo.clone(), id);
        self.players.insert(id, player);

        Ok(&self.players[&id])
    }

    /// Get a player by ID.
    pub fn get(&self, id: i64) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Get a player by exact pseudo (pre-trimmed input expected).
    pub fn get_by_pseudo(&self, pseudo: &str) -> Option<&Player> {
        self.pseudo_index
            .get(pseudo)
            .and_then(|id| self.players.get(id))
    }

    /// Pseudo for a player ID, if known.
    pub fn pseudo_of(&self, id: i64) -> Option<&str> {
        self.players.get(&id).map(|p| p.pseudo.as_str())
    }

    /// Count registered players.
    pub fn count(&self) -> usize {
        self.players.len()
    }
}
