use crate::SessionId;
use crate::session::Status;

/// Store failures. Conflict is the compare-and-set miss: the session was
/// not in the status the caller conditioned on, so nothing was written.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("session {0} not found")]
    Missing(SessionId),
    #[error("session {id} is {found}, expected {expected}")]
    Conflict {
        id: SessionId,
        expected: Status,
        found: Status,
    },
}
