use serde::Deserialize;
use serde::Serialize;

/// The two faces of the coin. The initiator commits to one at creation;
/// the draw at resolution decides the winner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Heads,
    Tails,
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Heads => write!(f, "heads"),
            Self::Tails => write!(f, "tails"),
        }
    }
}
