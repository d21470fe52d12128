use serde::Deserialize;
use serde::Serialize;

/// Why a session ended. Set exactly once, on the terminal transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    /// Coin toss resolved against the initiator's committed face.
    Flip,
    Checkmate,
    Stalemate,
    Draw,
    Resignation,
    Timeout,
    Cancelled,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Flip => write!(f, "flip"),
            Self::Checkmate => write!(f, "checkmate"),
            Self::Stalemate => write!(f, "stalemate"),
            Self::Draw => write!(f, "draw"),
            Self::Resignation => write!(f, "resignation"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}
