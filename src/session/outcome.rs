use super::Reason;
use crate::UserId;
use serde::Serialize;

/// Winner and end reason, persisted atomically with the terminal status
/// so no observer ever sees a completed session without its outcome.
/// A drawn game has no winner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub winner: Option<UserId>,
    pub reason: Reason,
}

impl From<(Option<UserId>, Reason)> for Outcome {
    fn from((winner, reason): (Option<UserId>, Reason)) -> Self {
        Self { winner, reason }
    }
}
