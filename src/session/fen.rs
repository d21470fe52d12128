use super::Side;
use serde::Deserialize;
use serde::Serialize;

/// Compact board-state encoding. The second whitespace-separated field
/// names the side to move, which is the single source of truth for turn
/// order; client identity is never trusted for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fen(String);

impl Fen {
    pub fn start() -> Self {
        Self("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string())
    }

    pub fn to_move(&self) -> Side {
        match self.0.split_whitespace().nth(1) {
            Some("b") => Side::Black,
            _ => Side::White,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for Fen {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Fen {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
